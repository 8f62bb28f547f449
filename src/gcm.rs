//! GHASH and the GCM authenticated-encryption wrapper.
//!
//! GHASH folds 16-byte blocks through `Y <- (Y ^ B) * H` in GF(2^128);
//! GCM feeds it pad(AD) || pad(CT) || L and masks the result with the
//! encrypted initial counter block. The counter for the keystream starts
//! at 2 because 1 is reserved for that mask.

use byteorder::{BigEndian, WriteBytesExt};

use crate::cipher::{xor_block, Algorithm};
use crate::field::FieldElement;
use crate::utils::*;

pub const NONCE_SIZE: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcmCiphertext {
    pub ciphertext: Vec<u8>,
    pub tag: [u8; BLOCK_SIZE],
    pub l: [u8; BLOCK_SIZE],
    pub h: [u8; BLOCK_SIZE],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcmPlaintext {
    pub authentic: bool,
    pub plaintext: Vec<u8>,
}

/// GHASH over raw wire blocks (GCM semantic). H is already an internal
/// field element; blocks convert at this boundary.
pub fn ghash(h: FieldElement, blocks: &[[u8; BLOCK_SIZE]]) -> FieldElement {
    let mut y = FieldElement::ZERO;
    for &block in blocks {
        y = (y + FieldElement::from_gcm_bytes(block)) * h;
    }
    y
}

/// The full GHASH input for a message: zero-padded AD (one zero block when
/// empty), zero-padded ciphertext, then the length block.
pub fn ghash_blocks(ad: &[u8], ciphertext: &[u8]) -> Vec<[u8; BLOCK_SIZE]> {
    let mut blocks = if ad.is_empty() {
        vec![[0u8; BLOCK_SIZE]]
    } else {
        pad_blocks(ad)
    };
    blocks.extend(pad_blocks(ciphertext));
    blocks.push(length_block(ad.len(), ciphertext.len()));
    blocks
}

/// L = bit length of AD || bit length of CT, both big-endian u64.
fn length_block(ad_len: usize, ct_len: usize) -> [u8; BLOCK_SIZE] {
    let mut bytes = Vec::with_capacity(BLOCK_SIZE);
    bytes.write_u64::<BigEndian>(ad_len as u64 * 8).unwrap();
    bytes.write_u64::<BigEndian>(ct_len as u64 * 8).unwrap();
    let mut block = [0u8; BLOCK_SIZE];
    block.copy_from_slice(&bytes);
    block
}

/// Counter block Y_i = nonce || ctr (big-endian u32).
fn counter_block(nonce: &[u8], ctr: u32) -> [u8; BLOCK_SIZE] {
    let mut bytes = Vec::with_capacity(BLOCK_SIZE);
    bytes.extend_from_slice(nonce);
    bytes.write_u32::<BigEndian>(ctr).unwrap();
    let mut block = [0u8; BLOCK_SIZE];
    block.copy_from_slice(&bytes);
    block
}

/// CTR keystream starting at counter 2, XORed over the data. Encrypting
/// and decrypting are the same operation.
fn keystream_xor(alg: Algorithm, key: &[u8], nonce: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(data.len());
    for (i, chunk) in data.chunks(BLOCK_SIZE).enumerate() {
        let y = counter_block(nonce, i as u32 + 2);
        let keystream = alg.encrypt_block(key, &y)?;
        output.extend(xor_bytes(&keystream[..chunk.len()], chunk));
    }
    Ok(output)
}

fn check_nonce(nonce: &[u8]) -> Result<()> {
    if nonce.len() != NONCE_SIZE {
        return Err(
            TaskError::BadArgument(format!("GCM needs a 12-byte nonce, got {}", nonce.len()))
                .into(),
        );
    }
    Ok(())
}

pub fn gcm_encrypt(
    alg: Algorithm,
    nonce: &[u8],
    key: &[u8],
    plaintext: &[u8],
    ad: &[u8],
) -> Result<GcmCiphertext> {
    check_nonce(nonce)?;

    let h_bytes = alg.encrypt_block(key, &[0u8; BLOCK_SIZE])?;
    let h = FieldElement::from_gcm_bytes(h_bytes);

    let ciphertext = keystream_xor(alg, key, nonce, plaintext)?;

    let blocks = ghash_blocks(ad, &ciphertext);
    let hash = ghash(h, &blocks);

    let mask = alg.encrypt_block(key, &counter_block(nonce, 1))?;
    let tag = xor_block(&mask, &hash.to_gcm_bytes());

    Ok(GcmCiphertext {
        ciphertext,
        tag,
        l: length_block(ad.len(), plaintext.len()),
        h: h_bytes,
    })
}

/// Decrypts and recomputes the tag. The plaintext is returned even on a
/// tag mismatch; `authentic` is advisory and callers are expected to
/// discard unauthenticated output.
pub fn gcm_decrypt(
    alg: Algorithm,
    nonce: &[u8],
    key: &[u8],
    ciphertext: &[u8],
    ad: &[u8],
    tag: &[u8; BLOCK_SIZE],
) -> Result<GcmPlaintext> {
    check_nonce(nonce)?;

    let plaintext = keystream_xor(alg, key, nonce, ciphertext)?;

    let h = FieldElement::from_gcm_bytes(alg.encrypt_block(key, &[0u8; BLOCK_SIZE])?);
    let hash = ghash(h, &ghash_blocks(ad, ciphertext));
    let mask = alg.encrypt_block(key, &counter_block(nonce, 1))?;
    let expected = xor_block(&mask, &hash.to_gcm_bytes());

    Ok(GcmPlaintext {
        authentic: expected == *tag,
        plaintext,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes_encrypt_vector() {
        let out = gcm_encrypt(
            Algorithm::Aes128,
            &b64_to_bytes("4gF+BtR3ku/PUQci").unwrap(),
            &b64_to_bytes("Xjq/GkpTSWoe3ZH0F+tjrQ==").unwrap(),
            &b64_to_bytes("RGFzIGlzdCBlaW4gVGVzdA==").unwrap(),
            &b64_to_bytes("QUQtRGF0ZW4=").unwrap(),
        )
        .unwrap();
        assert_eq!(bytes_to_b64_str(&out.ciphertext), "ET3RmvH/Hbuxba63EuPRrw==");
        assert_eq!(block_to_b64(&out.tag), "Mp0APJb/ZIURRwQlMgNN/w==");
        assert_eq!(block_to_b64(&out.l), "AAAAAAAAAEAAAAAAAAAAgA==");
        assert_eq!(block_to_b64(&out.h), "Bu6ywbsUKlpmZXMQyuGAng==");
    }

    #[test]
    fn sea_encrypt_vector() {
        let out = gcm_encrypt(
            Algorithm::Sea128,
            &b64_to_bytes("4gF+BtR3ku/PUQci").unwrap(),
            &b64_to_bytes("Xjq/GkpTSWoe3ZH0F+tjrQ==").unwrap(),
            &b64_to_bytes("RGFzIGlzdCBlaW4gVGVzdA==").unwrap(),
            &b64_to_bytes("QUQtRGF0ZW4=").unwrap(),
        )
        .unwrap();
        assert_eq!(bytes_to_b64_str(&out.ciphertext), "0cI/Wg4R3URfrVFZ0hw/vg==");
        assert_eq!(block_to_b64(&out.tag), "ysDdzOSnqLH0MQ+Mkb23gw==");
        assert_eq!(block_to_b64(&out.l), "AAAAAAAAAEAAAAAAAAAAgA==");
        assert_eq!(block_to_b64(&out.h), "xhFcAUT66qWIpYz+Ch5ujw==");
    }

    #[test]
    fn aes_encrypt_multi_block_ad_vector() {
        let out = gcm_encrypt(
            Algorithm::Aes128,
            &b64_to_bytes("yv66vvrO263eyviI").unwrap(),
            &b64_to_bytes("/v/pkoZlcxxtao+UZzCDCA==").unwrap(),
            &b64_to_bytes("2TEyJfiEBuWlWQnFr/UmmoanqVMVNPfaLkwwPYoxinIcPAyVlWgJUy/PDiRJprUlsWrt9aoN5le6Y3s5").unwrap(),
            &b64_to_bytes("/u36zt6tvu/+7frO3q2+76ut2tI=").unwrap(),
        )
        .unwrap();
        assert_eq!(
            bytes_to_b64_str(&out.ciphertext),
            "QoMewiF3dCRLciG3hNDUnOOqIS8sAqTgNcF+IymsoS4h1RSyVGaTHH2PalqshKoFG6MLOWoKrJc9WOCR"
        );
        assert_eq!(block_to_b64(&out.tag), "W8lPvDIhpduU+ula5xIaRw==");
        assert_eq!(block_to_b64(&out.l), "AAAAAAAAAKAAAAAAAAAB4A==");
        assert_eq!(block_to_b64(&out.h), "uDtTNwi/U10KpuUpgNU7eA==");
    }

    #[test]
    fn decrypt_vector() {
        let out = gcm_decrypt(
            Algorithm::Aes128,
            &b64_to_bytes("4gF+BtR3ku/PUQci").unwrap(),
            &b64_to_bytes("Xjq/GkpTSWoe3ZH0F+tjrQ==").unwrap(),
            &b64_to_bytes("ET3RmvH/Hbuxba63EuPRrw==").unwrap(),
            &b64_to_bytes("QUQtRGF0ZW4=").unwrap(),
            &b64_to_block("Mp0APJb/ZIURRwQlMgNN/w==").unwrap(),
        )
        .unwrap();
        assert!(out.authentic);
        assert_eq!(bytes_to_b64_str(&out.plaintext), "RGFzIGlzdCBlaW4gVGVzdA==");
    }

    #[test]
    fn round_trip() {
        let nonce = [3u8; 12];
        let key = [9u8; 16];
        let plaintext = b"attack at dawn, bring snacks".to_vec();
        let ad = b"header".to_vec();
        for alg in [Algorithm::Aes128, Algorithm::Sea128] {
            let enc = gcm_encrypt(alg, &nonce, &key, &plaintext, &ad).unwrap();
            let dec = gcm_decrypt(alg, &nonce, &key, &enc.ciphertext, &ad, &enc.tag).unwrap();
            assert!(dec.authentic);
            assert_eq!(dec.plaintext, plaintext);
        }
    }

    #[test]
    fn bit_flips_break_authentication() {
        let nonce = [3u8; 12];
        let key = [9u8; 16];
        let plaintext = b"attack at dawn, bring snacks".to_vec();
        let ad = b"header".to_vec();
        let enc = gcm_encrypt(Algorithm::Aes128, &nonce, &key, &plaintext, &ad).unwrap();

        let mut ct = enc.ciphertext.clone();
        ct[4] ^= 0x10;
        let dec = gcm_decrypt(Algorithm::Aes128, &nonce, &key, &ct, &ad, &enc.tag).unwrap();
        assert!(!dec.authentic);

        let mut ad_flip = ad.clone();
        ad_flip[0] ^= 0x01;
        let dec =
            gcm_decrypt(Algorithm::Aes128, &nonce, &key, &enc.ciphertext, &ad_flip, &enc.tag)
                .unwrap();
        assert!(!dec.authentic);

        let mut tag = enc.tag;
        tag[15] ^= 0x80;
        let dec = gcm_decrypt(Algorithm::Aes128, &nonce, &key, &enc.ciphertext, &ad, &tag).unwrap();
        assert!(!dec.authentic);

        let other_nonce = [4u8; 12];
        let dec =
            gcm_decrypt(Algorithm::Aes128, &other_nonce, &key, &enc.ciphertext, &ad, &enc.tag)
                .unwrap();
        assert!(!dec.authentic);
    }

    #[test]
    fn empty_ad_and_plaintext() {
        let nonce = [1u8; 12];
        let key = [2u8; 16];
        let enc = gcm_encrypt(Algorithm::Aes128, &nonce, &key, &[], &[]).unwrap();
        assert!(enc.ciphertext.is_empty());
        let dec = gcm_decrypt(Algorithm::Aes128, &nonce, &key, &[], &[], &enc.tag).unwrap();
        assert!(dec.authentic);
        assert!(dec.plaintext.is_empty());
    }

    #[test]
    fn bad_nonce_length() {
        assert!(gcm_encrypt(Algorithm::Aes128, &[0u8; 11], &[2u8; 16], &[], &[]).is_err());
    }
}
