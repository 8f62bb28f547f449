#![allow(dead_code)]

// Re-export the pieces the rest of the crate leans on constantly
pub use crate::errors::TaskError;
pub use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};

pub const BLOCK_SIZE: usize = 16;

pub fn hex_to_bytes(input: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(input)?)
}

pub fn bytes_to_hex(input: &[u8]) -> String {
    hex::encode(input)
}

pub fn bytes_to_b64_str(input: &[u8]) -> String {
    general_purpose::STANDARD.encode(input)
}

pub fn b64_to_bytes(input: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(input)
        .map_err(|e| TaskError::InvalidEncoding(format!("base64: {e}")).into())
}

/// Decode a base64 string that must be exactly one 16-byte block.
pub fn b64_to_block(input: &str) -> Result<[u8; BLOCK_SIZE]> {
    let bytes = b64_to_bytes(input)?;
    bytes.as_slice().try_into().map_err(|_| {
        TaskError::InvalidEncoding(format!("expected 16 bytes, got {}", bytes.len())).into()
    })
}

pub fn block_to_b64(block: &[u8; BLOCK_SIZE]) -> String {
    general_purpose::STANDARD.encode(block)
}

pub fn xor_bytes(a: &[u8], x: &[u8]) -> Vec<u8> {
    std::iter::zip(a, x).map(|(&x, &y)| x ^ y).collect::<Vec<u8>>()
}

/// Split into 16-byte blocks, zero-padding the final partial block.
pub fn pad_blocks(bytes: &[u8]) -> Vec<[u8; BLOCK_SIZE]> {
    bytes
        .chunks(BLOCK_SIZE)
        .map(|chunk| {
            let mut block = [0u8; BLOCK_SIZE];
            block[..chunk.len()].copy_from_slice(chunk);
            block
        })
        .collect()
}

/// Split into exact 16-byte blocks; partial trailing data is an encoding error.
pub fn slice_blocks(bytes: &[u8]) -> Result<Vec<[u8; BLOCK_SIZE]>> {
    if bytes.len() % BLOCK_SIZE != 0 {
        return Err(TaskError::InvalidEncoding(format!(
            "length {} is not a multiple of 16",
            bytes.len()
        ))
        .into());
    }
    Ok(pad_blocks(bytes))
}
