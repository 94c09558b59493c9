// Password hashing.
//
// Uses scrypt (N=16384, r=16, p=1, dkLen=64) with a random 16-byte salt.
// Output format: "hex(salt):hex(key)"

use rand::RngCore;
use scrypt::{scrypt, Params};
use subtle::ConstantTimeEq;

use idem_core::IdemError;

/// Hash a password using scrypt.
///
/// Returns a string in the format `salt:key` where both are hex-encoded.
pub fn hash_password(password: &str) -> Result<String, IdemError> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt_hex = hex::encode(salt_bytes);

    let key = generate_key(password, &salt_hex)?;
    Ok(format!("{}:{}", salt_hex, hex::encode(key)))
}

/// Verify a password against a hash produced by `hash_password`.
///
/// Total: a malformed or foreign hash verifies as `false` rather than
/// erroring, so a social-only account (no hash at all) and a corrupted
/// record both land on the same invalid-credentials path.
pub fn verify_password(hash: &str, password: &str) -> bool {
    let Some((salt, key_hex)) = hash.split_once(':') else {
        return false;
    };
    let Ok(expected_key) = hex::decode(key_hex) else {
        return false;
    };
    let Ok(derived_key) = generate_key(password, salt) else {
        return false;
    };

    // ct_eq on slices of different lengths is still constant-time false.
    derived_key.ct_eq(&expected_key).into()
}

/// Internal: derive a 64-byte key using scrypt.
fn generate_key(password: &str, salt: &str) -> Result<Vec<u8>, IdemError> {
    // N=16384 → log2(N)=14, r=16, p=1, dkLen=64
    let params = Params::new(14, 16, 1, 64)
        .map_err(|e| IdemError::Crypto(format!("Invalid scrypt params: {e}")))?;

    let mut output = vec![0u8; 64];
    scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut output)
        .map_err(|e| IdemError::Crypto(format!("scrypt failed: {e}")))?;

    Ok(output)
}
