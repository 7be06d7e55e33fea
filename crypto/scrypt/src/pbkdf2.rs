use crate::{
    hmac::{HashFunction, Hmac},
    Error,
};

/// PBKDF2 (RFC 8018) with HMAC-`D` as the pseudorandom function, filling
/// `res` completely.
///
/// Fails only when `res` is longer than `(2^32 - 1)` digest blocks, the point
/// at which the big-endian block counter would wrap.
#[allow(clippy::cast_possible_truncation)]
pub fn pbkdf2_hmac<D: HashFunction>(
    password: &[u8],
    salt: &[u8],
    rounds: u32,
    res: &mut [u8],
) -> Result<(), Error> {
    check_output_len::<D>(res.len())?;
    let block_len = <D as sha2::Digest>::output_size();
    let hmac = Hmac::<D>::new_from_slice(password);
    for (i, chunk) in res.chunks_mut(block_len).enumerate() {
        inner(i as u32, chunk, &hmac, salt, rounds);
    }
    Ok(())
}

pub(crate) fn check_output_len<D: HashFunction>(len: usize) -> Result<(), Error> {
    let blocks = len.div_ceil(<D as sha2::Digest>::output_size()) as u64;
    if blocks > u64::from(u32::MAX) {
        return Err(Error::OutputTooLong(len));
    }
    Ok(())
}

#[inline(always)]
fn inner<D: HashFunction>(i: u32, chunk: &mut [u8], hmac: &Hmac<D>, salt: &[u8], rounds: u32) {
    chunk.fill(0);
    let mut salt = {
        let mut hmac_clone = hmac.clone();
        hmac_clone.update(salt);
        hmac_clone.update(&(i + 1).to_be_bytes());
        let salt = hmac_clone.finalize_fixed();
        xor(chunk, &salt);
        salt
    };
    for _ in 1..rounds {
        let mut hmac_clone = hmac.clone();
        hmac_clone.update(&salt);
        salt = hmac_clone.finalize_fixed();
        xor(chunk, &salt);
    }
}

#[inline(always)]
fn xor(res: &mut [u8], salt: &[u8]) {
    debug_assert!(salt.len() >= res.len(), "length mismatch in xor");
    res.iter_mut().zip(salt.iter()).for_each(|(a, b)| *a ^= b);
}
