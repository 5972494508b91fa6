//! PBKDF2 derivation core (RFC 8018 §5.2).
//!
//! T_i = U_1 ^ U_2 ^ ... ^ U_c, where U_1 = PRF(P, S || BE32(i)) and
//! U_j = PRF(P, U_{j-1}). DK = T_1 || T_2 || ... truncated to dkLen.
//!
//! No parameter validation happens here; the caller guarantees a positive
//! iteration count and output length.

use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::hash::HashAlgorithm;
use crate::prf::Prf;

/// Derive `output_len` bytes from `secret` and `salt`.
pub fn derive(
    secret: &[u8],
    salt: &[u8],
    hash: HashAlgorithm,
    iterations: u32,
    output_len: usize,
) -> Result<Vec<u8>, CryptoError> {
    let prf = Prf::new(hash, secret)?;
    let h_len = prf.output_len();

    let block_count = output_len.div_ceil(h_len);
    if u32::try_from(block_count).is_err() {
        return Err(CryptoError::OutputTooLong(output_len));
    }

    let mut output = vec![0u8; output_len];

    // salt || BE32(i), counter rewritten in place per block
    let mut block_input = Vec::with_capacity(salt.len() + 4);
    block_input.extend_from_slice(salt);
    block_input.extend_from_slice(&[0u8; 4]);

    let mut u = Zeroizing::new(vec![0u8; h_len]);
    let mut next = Zeroizing::new(vec![0u8; h_len]);
    let mut t = Zeroizing::new(vec![0u8; h_len]);

    for (index, chunk) in output.chunks_mut(h_len).enumerate() {
        let block_index = (index + 1) as u32;
        block_input[salt.len()..].copy_from_slice(&block_index.to_be_bytes());

        prf.compute_into(&block_input, &mut u);
        t.copy_from_slice(&u);

        for _ in 1..iterations {
            prf.compute_into(&u, &mut next);
            std::mem::swap(&mut u, &mut next);
            xor_in_place(&mut t, &u);
        }

        chunk.copy_from_slice(&t[..chunk.len()]);
    }

    Ok(output)
}

fn xor_in_place(acc: &mut [u8], block: &[u8]) {
    for (a, b) in acc.iter_mut().zip(block) {
        *a ^= b;
    }
}
