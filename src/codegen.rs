use crate::error::CodeError;
use rand::{rngs::OsRng, RngCore};

/// Symbols a short code is drawn from. Order matters: byte `b` maps to
/// `ALPHABET[b % 62]`.
pub const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generate a random short code of `length` symbols using the OS CSPRNG.
///
/// Codes are not guaranteed unique; the store's conditional insert decides
/// that. Each random byte is reduced modulo 62, so the low 8 symbols are very
/// slightly more likely than the rest (256 % 62 == 8).
pub fn generate(length: usize) -> Result<String, CodeError> {
    if length == 0 {
        return Err(CodeError::InvalidLength);
    }

    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CodeError::RandomSourceUnavailable(e.to_string()))?;

    Ok(encode(&bytes))
}

/// Map raw bytes onto the alphabet, one symbol per byte.
fn encode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn zero_length_is_rejected() {
        assert!(matches!(generate(0), Err(CodeError::InvalidLength)));
    }

    #[test]
    fn codes_have_requested_length_and_alphabet() {
        for len in [1, 7, 32] {
            let code = generate(len).unwrap();
            assert_eq!(code.len(), len);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)), "code={code}");
        }
    }

    #[test]
    fn byte_reduction_is_modulo_62() {
        assert_eq!(encode(&[0, 9, 10, 35, 36, 61]), "09AZaz");
        // Wraps around: 62 -> '0', 255 -> 255 % 62 = 7 -> '7'
        assert_eq!(encode(&[62, 124, 255]), "007");
    }

    #[test]
    fn successive_codes_differ() {
        let codes: HashSet<String> = (0..200).map(|_| generate(7).unwrap()).collect();
        assert_eq!(codes.len(), 200);
    }
}
