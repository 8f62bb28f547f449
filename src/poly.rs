//! The univariate polynomial ring GF(2^128)[X].
//!
//! Coefficients are stored ascending, `[c0, c1, ..., cd]`, and every public
//! operation returns a normalized value: either a single coefficient or a
//! nonzero leading one. The zero polynomial is `[0]`, the unit is `[1]`.

use std::cmp::Ordering;
use std::ops::{Add, Mul};

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::field::FieldElement;
use crate::utils::*;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Polynomial {
    coeffs: Vec<FieldElement>,
}

impl Polynomial {
    pub fn new(coeffs: Vec<FieldElement>) -> Self {
        let mut poly = Polynomial { coeffs };
        poly.normalize();
        poly
    }

    pub fn zero() -> Self {
        Polynomial {
            coeffs: vec![FieldElement::ZERO],
        }
    }

    pub fn one() -> Self {
        Polynomial {
            coeffs: vec![FieldElement::ONE],
        }
    }

    /// The monomial X.
    pub fn x() -> Self {
        Polynomial {
            coeffs: vec![FieldElement::ZERO, FieldElement::ONE],
        }
    }

    pub fn constant(c: FieldElement) -> Self {
        Polynomial { coeffs: vec![c] }
    }

    pub fn coeffs(&self) -> &[FieldElement] {
        &self.coeffs
    }

    /// Degree of the polynomial; the zero polynomial reports 0.
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn leading(&self) -> FieldElement {
        self.coeffs[self.coeffs.len() - 1]
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0].is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0] == FieldElement::ONE
    }

    fn normalize(&mut self) {
        while self.coeffs.len() > 1 && self.coeffs[self.coeffs.len() - 1].is_zero() {
            self.coeffs.pop();
        }
        if self.coeffs.is_empty() {
            self.coeffs.push(FieldElement::ZERO);
        }
    }

    /// Naive repeated multiplication; exponents here are small.
    pub fn pow(&self, k: u64) -> Polynomial {
        if k == 0 {
            return Polynomial::one();
        }
        let mut result = self.clone();
        for _ in 1..k {
            result = &result * self;
        }
        result
    }

    /// Long division returning (quotient, remainder).
    ///
    /// Division by the zero polynomial returns `(0, dividend)` by
    /// convention; it is not an error.
    pub fn divmod(&self, divisor: &Polynomial) -> Result<(Polynomial, Polynomial)> {
        if divisor.is_zero() {
            return Ok((Polynomial::zero(), self.clone()));
        }
        if self.is_zero() {
            return Ok((Polynomial::zero(), Polynomial::zero()));
        }
        if self.degree() < divisor.degree() {
            return Ok((Polynomial::zero(), self.clone()));
        }

        let lead_inv = divisor.leading().inv()?;
        let mut rem = self.coeffs.clone();
        let mut quot = vec![FieldElement::ZERO; self.degree() - divisor.degree() + 1];

        while rem.len() >= divisor.coeffs.len() {
            let lead = rem[rem.len() - 1];
            if lead.is_zero() {
                rem.pop();
                continue;
            }
            let q = lead * lead_inv;
            let pos = rem.len() - divisor.coeffs.len();
            quot[pos] = q;
            for (i, &d) in divisor.coeffs.iter().enumerate() {
                rem[pos + i] = rem[pos + i] + d * q;
            }
            // The leading term cancels exactly
            rem.pop();
        }

        Ok((Polynomial::new(quot), Polynomial::new(rem)))
    }

    /// Square-and-multiply modulo `modulus`, reducing after every step.
    /// Exponents are arbitrary-precision: DDF and EDF raise to q^d with
    /// q = 2^128.
    pub fn powmod(&self, modulus: &Polynomial, k: &BigUint) -> Result<Polynomial> {
        if k.is_zero() {
            return Ok(Polynomial::one());
        }
        let (_, base) = self.divmod(modulus)?;
        if k.is_one() {
            return Ok(base);
        }

        let mut result = Polynomial::one();
        let mut base = base;
        let mut k = k.clone();
        while !k.is_zero() {
            if k.bit(0) {
                result = (&result * &base).divmod(modulus)?.1;
            }
            base = (&base * &base).divmod(modulus)?.1;
            k >>= 1;
        }
        Ok(result)
    }

    /// Euclidean gcd, monicized. `gcd(P, 0)` is the monic form of P.
    pub fn gcd(&self, other: &Polynomial) -> Result<Polynomial> {
        let (mut f, mut g) = if other.degree() > self.degree() {
            (other.clone(), self.clone())
        } else {
            (self.clone(), other.clone())
        };
        while !g.is_zero() {
            let (_, r) = f.divmod(&g)?;
            f = g;
            g = r;
        }
        if f.is_zero() {
            return Ok(f);
        }
        f.make_monic()
    }

    /// Formal derivative in characteristic 2: coefficients at even degrees
    /// vanish, the rest shift down one position.
    pub fn derivative(&self) -> Polynomial {
        if self.coeffs.len() == 1 {
            return Polynomial::zero();
        }
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &c)| if i % 2 == 1 { c } else { FieldElement::ZERO })
            .collect();
        Polynomial::new(coeffs)
    }

    /// Square root of a perfect square: odd-degree coefficients are zero,
    /// so take the even-degree ones and field-sqrt each.
    pub fn sqrt(&self) -> Polynomial {
        let coeffs = self.coeffs.iter().step_by(2).map(|c| c.sqrt()).collect();
        Polynomial::new(coeffs)
    }

    /// Divide every coefficient by the leading one.
    pub fn make_monic(&self) -> Result<Polynomial> {
        let lead_inv = self.leading().inv()?;
        Ok(Polynomial::new(
            self.coeffs.iter().map(|&c| c * lead_inv).collect(),
        ))
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &Polynomial) -> Polynomial {
        let longest = self.coeffs.len().max(rhs.coeffs.len());
        let mut coeffs = vec![FieldElement::ZERO; longest];
        for (i, &c) in self.coeffs.iter().enumerate() {
            coeffs[i] = coeffs[i] + c;
        }
        for (i, &c) in rhs.coeffs.iter().enumerate() {
            coeffs[i] = coeffs[i] + c;
        }
        Polynomial::new(coeffs)
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;

    /// Schoolbook convolution.
    fn mul(self, rhs: &Polynomial) -> Polynomial {
        if self.is_zero() || rhs.is_zero() {
            return Polynomial::zero();
        }
        let mut coeffs = vec![FieldElement::ZERO; self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, &a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, &b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] = coeffs[i + j] + a * b;
            }
        }
        Polynomial::new(coeffs)
    }
}

/// Total order: degree first, then coefficients compared highest-degree
/// down, as in-core integer values. Used by `gfpoly_sort` and the
/// factorization outputs.
impl Ord for Polynomial {
    fn cmp(&self, other: &Self) -> Ordering {
        self.coeffs
            .len()
            .cmp(&other.coeffs.len())
            .then_with(|| {
                for (a, b) in self.coeffs.iter().rev().zip(other.coeffs.iter().rev()) {
                    match a.0.cmp(&b.0) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    }
                }
                Ordering::Equal
            })
    }
}

impl PartialOrd for Polynomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
