//! XEX disk-sector mode on top of SEA-128.
//!
//! The 32-byte key splits into a data key and a tweak key. The tweak is
//! encrypted once under the tweak key, then stepped through the sector by
//! multiplying with x in GF(2^128) (XEX semantic) per block.

use crate::cipher::{sea128_decrypt_block, sea128_encrypt_block, xor_block};
use crate::field::FieldElement;
use crate::utils::*;

const ALPHA: FieldElement = FieldElement(2);

pub fn xex_encrypt(key: &[u8], tweak: &[u8; BLOCK_SIZE], input: &[u8]) -> Result<Vec<u8>> {
    xex_process(key, tweak, input, true)
}

pub fn xex_decrypt(key: &[u8], tweak: &[u8; BLOCK_SIZE], input: &[u8]) -> Result<Vec<u8>> {
    xex_process(key, tweak, input, false)
}

fn xex_process(
    key: &[u8],
    tweak: &[u8; BLOCK_SIZE],
    input: &[u8],
    encrypt: bool,
) -> Result<Vec<u8>> {
    if key.len() != 2 * BLOCK_SIZE {
        return Err(TaskError::BadArgument(format!("XEX needs a 32-byte key, got {}", key.len())).into());
    }
    let (data_key, tweak_key) = key.split_at(BLOCK_SIZE);
    let blocks = slice_blocks(input)?;

    let mut mask = sea128_encrypt_block(tweak_key, tweak)?;
    let mut output = Vec::with_capacity(input.len());

    for block in blocks {
        let masked = xor_block(&mask, &block);
        let core = if encrypt {
            sea128_encrypt_block(data_key, &masked)?
        } else {
            sea128_decrypt_block(data_key, &masked)?
        };
        output.extend_from_slice(&xor_block(&mask, &core));

        let stepped = FieldElement::from_xex_bytes(mask) * ALPHA;
        mask = stepped.to_xex_bytes();
    }

    Ok(output)
}
