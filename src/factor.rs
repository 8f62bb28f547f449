//! Polynomial factorization over GF(2^128): square-free factorization,
//! distinct-degree factorization, and Cantor-Zassenhaus equal-degree
//! splitting. Inputs are expected to be monic; every emitted factor is
//! monic, and outputs are sorted by the polynomial total order.

use num_bigint::BigUint;
use num_traits::One;
use rand::Rng;

use crate::field::FieldElement;
use crate::poly::Polynomial;
use crate::utils::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SffFactor {
    pub factor: Polynomial,
    pub exponent: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DdfFactor {
    pub factor: Polynomial,
    pub degree: u64,
}

/// Square-free factorization, Yun's algorithm adapted to characteristic 2.
///
/// A vanishing derivative means F is a polynomial in X^2, i.e. a perfect
/// square; `gcd(F, 0) = F` then empties the loop and the recursion on
/// `sqrt(F)` picks the content up with doubled exponents.
pub fn sff(f: &Polynomial) -> Result<Vec<SffFactor>> {
    let mut c = f.gcd(&f.derivative())?;
    let (mut f, _) = f.divmod(&c)?;
    let mut factors = Vec::new();
    let mut e = 1u64;

    while !f.is_one() {
        let y = f.gcd(&c)?;
        if y != f {
            let (x, _) = f.divmod(&y)?;
            if !x.is_one() {
                factors.push(SffFactor {
                    factor: x,
                    exponent: e,
                });
            }
        }
        f = y;
        c = c.divmod(&f)?.0;
        e += 1;
    }

    if !c.is_one() {
        for square in sff(&c.sqrt())? {
            factors.push(SffFactor {
                factor: square.factor,
                exponent: 2 * square.exponent,
            });
        }
    }

    factors.sort_by(|a, b| a.factor.cmp(&b.factor));
    Ok(factors)
}

/// Distinct-degree factorization over F_q, q = 2^128: collect
/// `gcd(X^(q^d) - X, f)` for rising d.
pub fn ddf(f: &Polynomial) -> Result<Vec<DdfFactor>> {
    let x = Polynomial::x();
    let mut z = Vec::new();
    let mut f_ = f.clone();
    let mut d = 1u64;

    while f_.degree() >= 2 * d as usize {
        let exponent = BigUint::one() << (128 * d as usize);
        let h = x.powmod(&f_, &exponent)?;
        let g = (&h + &x).gcd(&f_)?;
        if !g.is_one() {
            f_ = f_.divmod(&g)?.0;
            z.push(DdfFactor {
                factor: g,
                degree: d,
            });
        }
        d += 1;
    }

    if !f_.is_one() {
        let degree = f_.degree() as u64;
        z.push(DdfFactor { factor: f_, degree });
    } else if z.is_empty() {
        z.push(DdfFactor {
            factor: f.clone(),
            degree: 1,
        });
    }

    z.sort_by(|a, b| a.factor.cmp(&b.factor));
    Ok(z)
}

/// Equal-degree factorization with the system RNG.
pub fn edf(f: &Polynomial, d: u64) -> Result<Vec<Polynomial>> {
    edf_with_rng(f, d, &mut rand::thread_rng())
}

/// Cantor-Zassenhaus: f must be a product of distinct monic irreducibles
/// of degree d. Random elements raised to (q^d - 1)/3 land in the cubic
/// subgroup, so `g + 1` shares a factor with each composite with
/// probability 1/3 per round.
///
/// The RNG is a parameter so tests can split factors reproducibly.
pub fn edf_with_rng<R: Rng>(f: &Polynomial, d: u64, rng: &mut R) -> Result<Vec<Polynomial>> {
    if d == 0 {
        return Err(TaskError::BadArgument("factor degree must be positive".into()).into());
    }
    let n = f.degree() / d as usize;
    let mut z = vec![f.clone()];
    if n <= 1 {
        return Ok(z);
    }

    let exponent = ((BigUint::one() << (128 * d as usize)) - BigUint::one()) / BigUint::from(3u8);

    while z.len() < n {
        let h = random_polynomial(f.degree(), rng);
        let g = &h.powmod(f, &exponent)? + &Polynomial::one();

        let mut next = Vec::with_capacity(z.len() + 1);
        for u in &z {
            if u.degree() > d as usize {
                let j = u.gcd(&g)?;
                if !j.is_one() && j != *u {
                    let (rest, _) = u.divmod(&j)?;
                    next.push(j);
                    next.push(rest);
                    continue;
                }
            }
            next.push(u.clone());
        }
        z = next;
    }

    z.sort();
    Ok(z)
}

/// Uniform random polynomial of degree below `bound` with a nonzero
/// leading coefficient.
fn random_polynomial<R: Rng>(bound: usize, rng: &mut R) -> Polynomial {
    let len = rng.gen_range(1..=bound);
    let mut coeffs: Vec<FieldElement> = (1..len).map(|_| FieldElement(rng.gen())).collect();
    let mut lead: u128 = rng.gen();
    while lead == 0 {
        lead = rng.gen();
    }
    coeffs.push(FieldElement(lead));
    Polynomial::new(coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn poly(coeffs: &[&str]) -> Polynomial {
        Polynomial::new(
            coeffs
                .iter()
                .map(|s| FieldElement::from_gcm_bytes(b64_to_block(s).unwrap()))
                .collect(),
        )
    }

    fn poly_b64(p: &Polynomial) -> Vec<String> {
        p.coeffs()
            .iter()
            .map(|c| bytes_to_b64_str(&c.to_gcm_bytes()))
            .collect()
    }

    #[test]
    fn sff_vector() {
        let f = poly(&[
            "vL77UwAAAAAAAAAAAAAAAA==",
            "mEHchYAAAAAAAAAAAAAAAA==",
            "9WJa0MAAAAAAAAAAAAAAAA==",
            "akHfwWAAAAAAAAAAAAAAAA==",
            "E12o/QAAAAAAAAAAAAAAAA==",
            "vKJ/FgAAAAAAAAAAAAAAAA==",
            "yctWwAAAAAAAAAAAAAAAAA==",
            "c1BXYAAAAAAAAAAAAAAAAA==",
            "o0AtAAAAAAAAAAAAAAAAAA==",
            "AbP2AAAAAAAAAAAAAAAAAA==",
            "k2YAAAAAAAAAAAAAAAAAAA==",
            "vBYAAAAAAAAAAAAAAAAAAA==",
            "dSAAAAAAAAAAAAAAAAAAAA==",
            "69gAAAAAAAAAAAAAAAAAAA==",
            "VkAAAAAAAAAAAAAAAAAAAA==",
            "a4AAAAAAAAAAAAAAAAAAAA==",
            "gAAAAAAAAAAAAAAAAAAAAA==",
        ]);
        let factors = sff(&f).unwrap();
        assert_eq!(factors.len(), 3);
        assert_eq!(factors[0].exponent, 1);
        assert_eq!(
            poly_b64(&factors[0].factor),
            vec!["q4AAAAAAAAAAAAAAAAAAAA==", "gAAAAAAAAAAAAAAAAAAAAA=="]
        );
        assert_eq!(factors[1].exponent, 2);
        assert_eq!(
            poly_b64(&factors[1].factor),
            vec![
                "iwAAAAAAAAAAAAAAAAAAAA==",
                "CAAAAAAAAAAAAAAAAAAAAA==",
                "AAAAAAAAAAAAAAAAAAAAAA==",
                "gAAAAAAAAAAAAAAAAAAAAA==",
            ]
        );
        assert_eq!(factors[2].exponent, 3);
        assert_eq!(
            poly_b64(&factors[2].factor),
            vec![
                "kAAAAAAAAAAAAAAAAAAAAA==",
                "CAAAAAAAAAAAAAAAAAAAAA==",
                "wAAAAAAAAAAAAAAAAAAAAA==",
                "gAAAAAAAAAAAAAAAAAAAAA==",
            ]
        );
    }

    #[test]
    fn sff_reconstructs_input() {
        let f = poly(&[
            "vL77UwAAAAAAAAAAAAAAAA==",
            "mEHchYAAAAAAAAAAAAAAAA==",
            "9WJa0MAAAAAAAAAAAAAAAA==",
            "akHfwWAAAAAAAAAAAAAAAA==",
            "E12o/QAAAAAAAAAAAAAAAA==",
            "vKJ/FgAAAAAAAAAAAAAAAA==",
            "yctWwAAAAAAAAAAAAAAAAA==",
            "c1BXYAAAAAAAAAAAAAAAAA==",
            "o0AtAAAAAAAAAAAAAAAAAA==",
            "AbP2AAAAAAAAAAAAAAAAAA==",
            "k2YAAAAAAAAAAAAAAAAAAA==",
            "vBYAAAAAAAAAAAAAAAAAAA==",
            "dSAAAAAAAAAAAAAAAAAAAA==",
            "69gAAAAAAAAAAAAAAAAAAA==",
            "VkAAAAAAAAAAAAAAAAAAAA==",
            "a4AAAAAAAAAAAAAAAAAAAA==",
            "gAAAAAAAAAAAAAAAAAAAAA==",
        ]);
        let mut product = Polynomial::one();
        for factor in sff(&f).unwrap() {
            product = &product * &factor.factor.pow(factor.exponent);
        }
        assert_eq!(product, f);
    }

    #[test]
    fn ddf_vector() {
        let f = poly(&[
            "tpkgAAAAAAAAAAAAAAAAAA==",
            "m6MQAAAAAAAAAAAAAAAAAA==",
            "8roAAAAAAAAAAAAAAAAAAA==",
            "3dUAAAAAAAAAAAAAAAAAAA==",
            "FwAAAAAAAAAAAAAAAAAAAA==",
            "/kAAAAAAAAAAAAAAAAAAAA==",
            "a4AAAAAAAAAAAAAAAAAAAA==",
            "gAAAAAAAAAAAAAAAAAAAAA==",
        ]);
        let factors = ddf(&f).unwrap();
        assert_eq!(factors.len(), 2);
        assert_eq!(factors[0].degree, 1);
        assert_eq!(
            poly_b64(&factors[0].factor),
            vec!["q4AAAAAAAAAAAAAAAAAAAA==", "gAAAAAAAAAAAAAAAAAAAAA=="]
        );
        assert_eq!(factors[1].degree, 3);
        assert_eq!(
            poly_b64(&factors[1].factor),
            vec![
                "mmAAAAAAAAAAAAAAAAAAAA==",
                "AbAAAAAAAAAAAAAAAAAAAA==",
                "zgAAAAAAAAAAAAAAAAAAAA==",
                "FwAAAAAAAAAAAAAAAAAAAA==",
                "AAAAAAAAAAAAAAAAAAAAAA==",
                "wAAAAAAAAAAAAAAAAAAAAA==",
                "gAAAAAAAAAAAAAAAAAAAAA==",
            ]
        );
    }

    #[test]
    fn edf_vector() {
        let f = poly(&[
            "mmAAAAAAAAAAAAAAAAAAAA==",
            "AbAAAAAAAAAAAAAAAAAAAA==",
            "zgAAAAAAAAAAAAAAAAAAAA==",
            "FwAAAAAAAAAAAAAAAAAAAA==",
            "AAAAAAAAAAAAAAAAAAAAAA==",
            "wAAAAAAAAAAAAAAAAAAAAA==",
            "gAAAAAAAAAAAAAAAAAAAAA==",
        ]);
        let mut rng = StdRng::seed_from_u64(99);
        let factors = edf_with_rng(&f, 3, &mut rng).unwrap();
        assert_eq!(factors.len(), 2);
        assert_eq!(
            poly_b64(&factors[0]),
            vec![
                "iwAAAAAAAAAAAAAAAAAAAA==",
                "CAAAAAAAAAAAAAAAAAAAAA==",
                "AAAAAAAAAAAAAAAAAAAAAA==",
                "gAAAAAAAAAAAAAAAAAAAAA==",
            ]
        );
        assert_eq!(
            poly_b64(&factors[1]),
            vec![
                "kAAAAAAAAAAAAAAAAAAAAA==",
                "CAAAAAAAAAAAAAAAAAAAAA==",
                "wAAAAAAAAAAAAAAAAAAAAA==",
                "gAAAAAAAAAAAAAAAAAAAAA==",
            ]
        );
    }

    #[test]
    fn edf_product_reconstructs() {
        let f = poly(&[
            "mmAAAAAAAAAAAAAAAAAAAA==",
            "AbAAAAAAAAAAAAAAAAAAAA==",
            "zgAAAAAAAAAAAAAAAAAAAA==",
            "FwAAAAAAAAAAAAAAAAAAAA==",
            "AAAAAAAAAAAAAAAAAAAAAA==",
            "wAAAAAAAAAAAAAAAAAAAAA==",
            "gAAAAAAAAAAAAAAAAAAAAA==",
        ]);
        let mut rng = StdRng::seed_from_u64(7);
        let factors = edf_with_rng(&f, 3, &mut rng).unwrap();
        let mut product = Polynomial::one();
        for factor in &factors {
            assert_eq!(factor.degree(), 3);
            product = &product * factor;
        }
        assert_eq!(product, f);
    }

    #[test]
    fn sff_of_square() {
        // (X + a)^2 = X^2 + a^2: derivative is zero, handled by recursion
        let a = FieldElement(0x1234);
        let linear = Polynomial::new(vec![a, FieldElement::ONE]);
        let square = &linear * &linear;
        let factors = sff(&square).unwrap();
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].factor, linear);
        assert_eq!(factors[0].exponent, 2);
    }

    #[test]
    fn ddf_of_linear() {
        // A bare linear factor never enters the loop; the trailing branch
        // must still emit it with degree 1.
        let f = poly(&[
            "q4AAAAAAAAAAAAAAAAAAAA==",
            "gAAAAAAAAAAAAAAAAAAAAA==",
        ]);
        let factors = ddf(&f).unwrap();
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].degree, 1);
        assert_eq!(factors[0].factor, f);
    }
}
