//! Maps JSON actions onto the core operations.
//!
//! `handle` is a pure function: it decodes base64 arguments, converts wire
//! semantics to the internal representation, runs the operation, and
//! re-encodes the result. All polynomial coefficients cross this boundary
//! in GCM semantic.

use num_bigint::BigUint;
use serde_json::{json, Value};

use crate::cipher::{sea128_decrypt_block, sea128_encrypt_block, Algorithm};
use crate::codec;
use crate::factor;
use crate::field::FieldElement;
use crate::forge::{self, ForgeryTarget, TaggedMessage};
use crate::gcm;
use crate::poly::Polynomial;
use crate::utils::*;
use crate::xex;

pub fn handle(action: &str, arguments: &Value) -> Result<Value> {
    match action {
        "poly2block" => handle_poly2block(arguments),
        "block2poly" => handle_block2poly(arguments),
        "gfmul" => handle_gfmul(arguments),
        "gfdiv" => handle_gfdiv(arguments),
        "sea128" => handle_sea128(arguments),
        "xex" => handle_xex(arguments),
        "gcm_encrypt" => handle_gcm_encrypt(arguments),
        "gcm_decrypt" => handle_gcm_decrypt(arguments),
        "gcm_crack" => handle_gcm_crack(arguments),
        "gfpoly_add" => handle_gfpoly_add(arguments),
        "gfpoly_mul" => handle_gfpoly_mul(arguments),
        "gfpoly_pow" => handle_gfpoly_pow(arguments),
        "gfpoly_divmod" => handle_gfpoly_divmod(arguments),
        "gfpoly_powmod" => handle_gfpoly_powmod(arguments),
        "gfpoly_sort" => handle_gfpoly_sort(arguments),
        "gfpoly_make_monic" => handle_gfpoly_make_monic(arguments),
        "gfpoly_sqrt" => handle_gfpoly_sqrt(arguments),
        "gfpoly_diff" => handle_gfpoly_diff(arguments),
        "gfpoly_gcd" => handle_gfpoly_gcd(arguments),
        "gfpoly_factor_sff" => handle_factor_sff(arguments),
        "gfpoly_factor_ddf" => handle_factor_ddf(arguments),
        "gfpoly_factor_edf" => handle_factor_edf(arguments),
        other => Err(TaskError::BadArgument(format!("unknown action {other}")).into()),
    }
}

fn arg<'a>(arguments: &'a Value, key: &str) -> Result<&'a Value> {
    arguments
        .get(key)
        .ok_or_else(|| TaskError::BadArgument(format!("missing argument {key}")).into())
}

fn str_arg<'a>(arguments: &'a Value, key: &str) -> Result<&'a str> {
    arg(arguments, key)?
        .as_str()
        .ok_or_else(|| TaskError::BadArgument(format!("{key} must be a string")).into())
}

fn u64_arg(arguments: &Value, key: &str) -> Result<u64> {
    arg(arguments, key)?
        .as_u64()
        .ok_or_else(|| TaskError::BadArgument(format!("{key} must be a non-negative integer")).into())
}

fn bytes_arg(arguments: &Value, key: &str) -> Result<Vec<u8>> {
    b64_to_bytes(str_arg(arguments, key)?)
}

fn block_arg(arguments: &Value, key: &str) -> Result<[u8; BLOCK_SIZE]> {
    b64_to_block(str_arg(arguments, key)?)
}

/// An array of base64 GCM-semantic blocks, as an internal polynomial.
fn poly_arg(arguments: &Value, key: &str) -> Result<Polynomial> {
    let entries = arg(arguments, key)?
        .as_array()
        .ok_or_else(|| TaskError::BadArgument(format!("{key} must be an array")))?;
    decode_poly(entries)
}

fn decode_poly(entries: &[Value]) -> Result<Polynomial> {
    let mut coeffs = Vec::with_capacity(entries.len());
    for entry in entries {
        let b64 = entry
            .as_str()
            .ok_or_else(|| TaskError::BadArgument("coefficients must be strings".into()))?;
        coeffs.push(FieldElement::from_gcm_bytes(b64_to_block(b64)?));
    }
    Ok(Polynomial::new(coeffs))
}

fn poly_value(p: &Polynomial) -> Value {
    Value::Array(
        p.coeffs()
            .iter()
            .map(|c| Value::String(bytes_to_b64_str(&c.to_gcm_bytes())))
            .collect(),
    )
}

fn handle_poly2block(arguments: &Value) -> Result<Value> {
    let coefficients = arg(arguments, "coefficients")?
        .as_array()
        .ok_or_else(|| TaskError::BadArgument("coefficients must be an array".into()))?
        .iter()
        .map(|v| {
            v.as_u64()
                .ok_or_else(|| TaskError::BadArgument("coefficients must be non-negative integers".into()))
        })
        .collect::<std::result::Result<Vec<u64>, TaskError>>()?;

    let value = match str_arg(arguments, "semantic")? {
        "xex" => codec::poly2block(&coefficients)?,
        "gcm" => codec::poly2block_gcm(&coefficients)?,
        other => return Err(TaskError::BadArgument(format!("unknown semantic {other}")).into()),
    };
    Ok(json!({ "block": bytes_to_b64_str(&value.to_le_bytes()) }))
}

fn handle_block2poly(arguments: &Value) -> Result<Value> {
    let block = block_arg(arguments, "block")?;
    let value = u128::from_le_bytes(block);
    let coefficients = match str_arg(arguments, "semantic")? {
        "xex" => codec::block2poly(value),
        "gcm" => codec::block2poly_gcm(value),
        other => return Err(TaskError::BadArgument(format!("unknown semantic {other}")).into()),
    };
    Ok(json!({ "coefficients": coefficients }))
}

fn handle_gfmul(arguments: &Value) -> Result<Value> {
    let a = block_arg(arguments, "a")?;
    let b = block_arg(arguments, "b")?;
    let product = match str_arg(arguments, "semantic")? {
        "xex" => {
            let p = FieldElement::from_xex_bytes(a) * FieldElement::from_xex_bytes(b);
            p.to_xex_bytes()
        }
        "gcm" => {
            let p = FieldElement::from_gcm_bytes(a) * FieldElement::from_gcm_bytes(b);
            p.to_gcm_bytes()
        }
        other => return Err(TaskError::BadArgument(format!("unknown semantic {other}")).into()),
    };
    Ok(json!({ "product": block_to_b64(&product) }))
}

fn handle_gfdiv(arguments: &Value) -> Result<Value> {
    let a = FieldElement::from_gcm_bytes(block_arg(arguments, "a")?);
    let b = FieldElement::from_gcm_bytes(block_arg(arguments, "b")?);
    let q = a.checked_div(b)?;
    Ok(json!({ "q": block_to_b64(&q.to_gcm_bytes()) }))
}

fn handle_sea128(arguments: &Value) -> Result<Value> {
    let key = block_arg(arguments, "key")?;
    let input = block_arg(arguments, "input")?;
    let output = match str_arg(arguments, "mode")? {
        "encrypt" => sea128_encrypt_block(&key, &input)?,
        "decrypt" => sea128_decrypt_block(&key, &input)?,
        other => return Err(TaskError::BadArgument(format!("unknown mode {other}")).into()),
    };
    Ok(json!({ "output": block_to_b64(&output) }))
}

fn handle_xex(arguments: &Value) -> Result<Value> {
    let key = bytes_arg(arguments, "key")?;
    let tweak = block_arg(arguments, "tweak")?;
    let input = bytes_arg(arguments, "input")?;
    let output = match str_arg(arguments, "mode")? {
        "encrypt" => xex::xex_encrypt(&key, &tweak, &input)?,
        "decrypt" => xex::xex_decrypt(&key, &tweak, &input)?,
        other => return Err(TaskError::BadArgument(format!("unknown mode {other}")).into()),
    };
    Ok(json!({ "output": bytes_to_b64_str(&output) }))
}

fn handle_gcm_encrypt(arguments: &Value) -> Result<Value> {
    let alg = Algorithm::from_name(str_arg(arguments, "algorithm")?)?;
    let nonce = bytes_arg(arguments, "nonce")?;
    let key = bytes_arg(arguments, "key")?;
    let plaintext = bytes_arg(arguments, "plaintext")?;
    let ad = bytes_arg(arguments, "ad")?;
    let out = gcm::gcm_encrypt(alg, &nonce, &key, &plaintext, &ad)?;
    Ok(json!({
        "ciphertext": bytes_to_b64_str(&out.ciphertext),
        "tag": block_to_b64(&out.tag),
        "L": block_to_b64(&out.l),
        "H": block_to_b64(&out.h),
    }))
}

fn handle_gcm_decrypt(arguments: &Value) -> Result<Value> {
    let alg = Algorithm::from_name(str_arg(arguments, "algorithm")?)?;
    let nonce = bytes_arg(arguments, "nonce")?;
    let key = bytes_arg(arguments, "key")?;
    let ciphertext = bytes_arg(arguments, "ciphertext")?;
    let ad = bytes_arg(arguments, "ad")?;
    let tag = block_arg(arguments, "tag")?;
    let out = gcm::gcm_decrypt(alg, &nonce, &key, &ciphertext, &ad, &tag)?;
    Ok(json!({
        "authentic": out.authentic,
        "plaintext": bytes_to_b64_str(&out.plaintext),
    }))
}

fn tagged_message_arg(arguments: &Value, key: &str) -> Result<TaggedMessage> {
    let message = arg(arguments, key)?;
    Ok(TaggedMessage {
        ciphertext: bytes_arg(message, "ciphertext")?,
        ad: bytes_arg(message, "associated_data")?,
        tag: block_arg(message, "tag")?,
    })
}

fn handle_gcm_crack(arguments: &Value) -> Result<Value> {
    let m1 = tagged_message_arg(arguments, "m1")?;
    let m2 = tagged_message_arg(arguments, "m2")?;
    let m3 = tagged_message_arg(arguments, "m3")?;
    let forgery = arg(arguments, "forgery")?;
    let target = ForgeryTarget {
        ciphertext: bytes_arg(forgery, "ciphertext")?,
        ad: bytes_arg(forgery, "associated_data")?,
    };
    let result = forge::gcm_crack(&m1, &m2, &m3, &target)?;
    Ok(json!({
        "tag": block_to_b64(&result.tag),
        "H": block_to_b64(&result.h.to_gcm_bytes()),
        "mask": block_to_b64(&result.mask.to_gcm_bytes()),
    }))
}

fn handle_gfpoly_add(arguments: &Value) -> Result<Value> {
    let a = poly_arg(arguments, "A")?;
    let b = poly_arg(arguments, "B")?;
    Ok(json!({ "S": poly_value(&(&a + &b)) }))
}

fn handle_gfpoly_mul(arguments: &Value) -> Result<Value> {
    let a = poly_arg(arguments, "A")?;
    let b = poly_arg(arguments, "B")?;
    Ok(json!({ "P": poly_value(&(&a * &b)) }))
}

fn handle_gfpoly_pow(arguments: &Value) -> Result<Value> {
    let a = poly_arg(arguments, "A")?;
    let k = u64_arg(arguments, "k")?;
    Ok(json!({ "Z": poly_value(&a.pow(k)) }))
}

fn handle_gfpoly_divmod(arguments: &Value) -> Result<Value> {
    let a = poly_arg(arguments, "A")?;
    let b = poly_arg(arguments, "B")?;
    let (q, r) = a.divmod(&b)?;
    Ok(json!({ "Q": poly_value(&q), "R": poly_value(&r) }))
}

fn handle_gfpoly_powmod(arguments: &Value) -> Result<Value> {
    let a = poly_arg(arguments, "A")?;
    let m = poly_arg(arguments, "M")?;
    let k = u64_arg(arguments, "k")?;
    let z = a.powmod(&m, &BigUint::from(k))?;
    Ok(json!({ "Z": poly_value(&z) }))
}

fn handle_gfpoly_sort(arguments: &Value) -> Result<Value> {
    let entries = arg(arguments, "polys")?
        .as_array()
        .ok_or_else(|| TaskError::BadArgument("polys must be an array".into()))?;
    let mut polys = Vec::with_capacity(entries.len());
    for entry in entries {
        let coeffs = entry
            .as_array()
            .ok_or_else(|| TaskError::BadArgument("polys entries must be arrays".into()))?;
        polys.push(decode_poly(coeffs)?);
    }
    polys.sort();
    Ok(json!({ "sorted_polys": polys.iter().map(poly_value).collect::<Vec<_>>() }))
}

fn handle_gfpoly_make_monic(arguments: &Value) -> Result<Value> {
    let a = poly_arg(arguments, "A")?;
    Ok(json!({ "A*": poly_value(&a.make_monic()?) }))
}

fn handle_gfpoly_sqrt(arguments: &Value) -> Result<Value> {
    let q = poly_arg(arguments, "Q")?;
    Ok(json!({ "S": poly_value(&q.sqrt()) }))
}

fn handle_gfpoly_diff(arguments: &Value) -> Result<Value> {
    let f = poly_arg(arguments, "F")?;
    Ok(json!({ "F'": poly_value(&f.derivative()) }))
}

fn handle_gfpoly_gcd(arguments: &Value) -> Result<Value> {
    let a = poly_arg(arguments, "A")?;
    let b = poly_arg(arguments, "B")?;
    Ok(json!({ "G": poly_value(&a.gcd(&b)?) }))
}

fn handle_factor_sff(arguments: &Value) -> Result<Value> {
    let f = poly_arg(arguments, "F")?;
    let factors = factor::sff(&f)?
        .into_iter()
        .map(|f| json!({ "factor": poly_value(&f.factor), "exponent": f.exponent }))
        .collect::<Vec<_>>();
    Ok(json!({ "factors": factors }))
}

fn handle_factor_ddf(arguments: &Value) -> Result<Value> {
    let f = poly_arg(arguments, "F")?;
    let factors = factor::ddf(&f)?
        .into_iter()
        .map(|f| json!({ "factor": poly_value(&f.factor), "degree": f.degree }))
        .collect::<Vec<_>>();
    Ok(json!({ "factors": factors }))
}

fn handle_factor_edf(arguments: &Value) -> Result<Value> {
    let f = poly_arg(arguments, "F")?;
    let d = u64_arg(arguments, "d")?;
    let factors = factor::edf(&f, d)?
        .iter()
        .map(poly_value)
        .collect::<Vec<_>>();
    Ok(json!({ "factors": factors }))
}
