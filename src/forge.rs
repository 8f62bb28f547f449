//! Key recovery against GCM under a repeated nonce.
//!
//! Two messages under the same (key, nonce) share the tag mask EKY0.
//! Writing each tag as the evaluation of a GHASH polynomial in the
//! authentication key H, the XOR of the two polynomials drops the mask,
//! leaving a known polynomial with H among its roots. Factoring it and
//! checking each linear root against a third captured message pins H down
//! and lets us tag arbitrary forgeries.

use crate::factor;
use crate::field::FieldElement;
use crate::gcm::{ghash, ghash_blocks};
use crate::poly::Polynomial;
use crate::utils::*;

#[derive(Debug, Clone)]
pub struct TaggedMessage {
    pub ciphertext: Vec<u8>,
    pub ad: Vec<u8>,
    pub tag: [u8; BLOCK_SIZE],
}

#[derive(Debug, Clone)]
pub struct ForgeryTarget {
    pub ciphertext: Vec<u8>,
    pub ad: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forgery {
    pub tag: [u8; BLOCK_SIZE],
    pub h: FieldElement,
    pub mask: FieldElement,
}

impl TaggedMessage {
    fn blocks(&self) -> Vec<[u8; BLOCK_SIZE]> {
        ghash_blocks(&self.ad, &self.ciphertext)
    }

    fn tag_element(&self) -> FieldElement {
        FieldElement::from_gcm_bytes(self.tag)
    }

    /// The polynomial G(Y) with G(H) = EKY0: coefficients are the GHASH
    /// blocks from the highest power down, with the tag as constant term.
    fn ghash_polynomial(&self) -> Polynomial {
        let blocks = self.blocks();
        let mut coeffs = Vec::with_capacity(blocks.len() + 1);
        coeffs.push(self.tag_element());
        for &block in blocks.iter().rev() {
            coeffs.push(FieldElement::from_gcm_bytes(block));
        }
        Polynomial::new(coeffs)
    }
}

/// Recover H from two same-nonce messages, verify against a third, and
/// produce the tag for the forgery target.
pub fn gcm_crack(
    m1: &TaggedMessage,
    m2: &TaggedMessage,
    m3: &TaggedMessage,
    target: &ForgeryTarget,
) -> Result<Forgery> {
    let difference = &m1.ghash_polynomial() + &m2.ghash_polynomial();
    if difference.is_zero() {
        return Err(
            TaskError::AttackFailed("the two captured messages are identical".into()).into(),
        );
    }

    let candidates = candidate_keys(&difference.make_monic()?)?;
    if candidates.is_empty() {
        return Err(TaskError::AttackFailed("difference polynomial has no roots".into()).into());
    }

    let m1_blocks = m1.blocks();
    let m3_blocks = m3.blocks();
    for h in candidates {
        let mask = ghash(h, &m1_blocks) + m1.tag_element();
        let t3 = ghash(h, &m3_blocks) + mask;
        if t3 == m3.tag_element() {
            let forged = ghash(h, &ghash_blocks(&target.ad, &target.ciphertext)) + mask;
            return Ok(Forgery {
                tag: forged.to_gcm_bytes(),
                h,
                mask,
            });
        }
    }

    Err(TaskError::AttackFailed("no candidate key verified against the third message".into()).into())
}

/// Every root of the monic difference polynomial: factor with SFF and DDF,
/// split the degree-1 parts with EDF, and read the constant off each
/// linear factor (Y + c has root c in characteristic 2).
fn candidate_keys(difference: &Polynomial) -> Result<Vec<FieldElement>> {
    let mut candidates = Vec::new();
    for square_free in factor::sff(difference)? {
        for part in factor::ddf(&square_free.factor)? {
            if part.degree != 1 {
                continue;
            }
            for linear in factor::edf(&part.factor, 1)? {
                if linear.degree() == 1 {
                    candidates.push(linear.coeffs()[0]);
                }
            }
        }
    }
    Ok(candidates)
}
