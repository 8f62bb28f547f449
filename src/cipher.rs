//! Single-block cipher oracles.
//!
//! AES-128-ECB comes from OpenSSL with padding disabled; SEA-128 is
//! AES-128-ECB with the output XORed against a fixed constant. Both are
//! consumed as opaque `enc(key, block) -> block` oracles by the GCM and
//! XEX layers.

use openssl::symm::{Cipher, Crypter, Mode};

use crate::utils::*;

const SEA_MAGIC: [u8; BLOCK_SIZE] = [
    0xc0, 0xff, 0xee, 0xc0, 0xff, 0xee, 0xc0, 0xff, 0xee, 0xc0, 0xff, 0xee, 0xc0, 0xff, 0xee,
    0x11,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Aes128,
    Sea128,
}

impl Algorithm {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "aes128" => Ok(Algorithm::Aes128),
            "sea128" => Ok(Algorithm::Sea128),
            other => Err(TaskError::BadArgument(format!("unknown algorithm {other}")).into()),
        }
    }

    pub fn encrypt_block(self, key: &[u8], block: &[u8; BLOCK_SIZE]) -> Result<[u8; BLOCK_SIZE]> {
        match self {
            Algorithm::Aes128 => aes128_block(key, block, Mode::Encrypt),
            Algorithm::Sea128 => sea128_encrypt_block(key, block),
        }
    }

    pub fn decrypt_block(self, key: &[u8], block: &[u8; BLOCK_SIZE]) -> Result<[u8; BLOCK_SIZE]> {
        match self {
            Algorithm::Aes128 => aes128_block(key, block, Mode::Decrypt),
            Algorithm::Sea128 => sea128_decrypt_block(key, block),
        }
    }
}

fn aes128_block(key: &[u8], block: &[u8; BLOCK_SIZE], mode: Mode) -> Result<[u8; BLOCK_SIZE]> {
    let cipher = Cipher::aes_128_ecb();
    let mut crypter = Crypter::new(cipher, mode, key, None)?;
    // Pad is on by default and would smuggle in an extra block
    crypter.pad(false);

    let mut buffer = vec![0; 2 * BLOCK_SIZE];
    crypter.update(block, &mut buffer)?;

    let mut out = [0u8; BLOCK_SIZE];
    out.copy_from_slice(&buffer[..BLOCK_SIZE]);
    Ok(out)
}

pub fn sea128_encrypt_block(key: &[u8], block: &[u8; BLOCK_SIZE]) -> Result<[u8; BLOCK_SIZE]> {
    let encrypted = aes128_block(key, block, Mode::Encrypt)?;
    Ok(xor_block(&encrypted, &SEA_MAGIC))
}

pub fn sea128_decrypt_block(key: &[u8], block: &[u8; BLOCK_SIZE]) -> Result<[u8; BLOCK_SIZE]> {
    let unmasked = xor_block(block, &SEA_MAGIC);
    aes128_block(key, &unmasked, Mode::Decrypt)
}

pub fn xor_block(a: &[u8; BLOCK_SIZE], b: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let mut out = [0u8; BLOCK_SIZE];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = a[i] ^ b[i];
    }
    out
}
