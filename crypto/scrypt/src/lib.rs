//! The scrypt password-based key derivation function (RFC 7914).
//!
//! ```
//! let key = scrypt::scrypt(b"password", b"NaCl", 1024, 8, 16, 64)?;
//! assert_eq!(key.len(), 64);
//! # Ok::<(), scrypt::Error>(())
//! ```
#![deny(
    dead_code,
    deprecated,
    future_incompatible,
    missing_copy_implementations,
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::inline_always
)]

mod config;
mod error;
mod hmac;
mod params;
mod pbkdf2;
mod romix;
mod salsa;
#[cfg(test)]
mod test_util;

pub use config::{Config, TomlConfig, DEFAULT_MAX_MEMORY};
pub use error::Error;
pub use hmac::{hmac, HashFunction, Hmac};
pub use params::Params;
pub use pbkdf2::pbkdf2_hmac;
pub use romix::{block_mix, ro_mix};
pub use salsa::{salsa20_8, Block};
pub use sha2::{Sha256, Sha512};

use crypto_common::erase::Erased;
use romix::Scratch;

/// Derives a `dk_len` byte key from `password` and `salt` with cost `n`
/// (a power of two greater than 1), block size `r` and parallelization `p`,
/// under the default [`Config`].
pub fn scrypt(
    password: &[u8],
    salt: &[u8],
    n: u64,
    r: u32,
    p: u32,
    dk_len: usize,
) -> Result<Vec<u8>, Error> {
    let params = Params::from_cost(n, r, p)?;
    let config = Config::default();
    validate(&params, &config, dk_len)?;
    let mut output = Vec::new();
    output
        .try_reserve_exact(dk_len)
        .map_err(|_| Error::OutOfMemory(dk_len as u64))?;
    output.resize(dk_len, 0);
    scrypt_into(password, salt, &params, &config, &mut output)?;
    Ok(output)
}

/// Fills `output` with the scrypt key for `password` and `salt`.
///
/// Every parameter is checked before anything is allocated, and `output` is
/// only written once mixing has succeeded.
pub fn scrypt_into(
    password: &[u8],
    salt: &[u8],
    params: &Params,
    config: &Config,
    output: &mut [u8],
) -> Result<(), Error> {
    validate(params, config, output.len())?;
    let parallel = config.runs_parallel(params);
    tracing::debug!(
        log_n = params.log_n(),
        r = params.r(),
        p = params.p(),
        dk_len = output.len(),
        parallel,
        "deriving scrypt key"
    );
    let lanes = params.lane_len() * params.p_usize();
    let mut b = Erased::new(Vec::new());
    b.try_reserve_exact(lanes)
        .map_err(|_| Error::OutOfMemory(lanes as u64))?;
    b.resize(lanes, 0);
    pbkdf2_hmac::<Sha256>(password, salt, 1, &mut b)?;
    mix_lanes(&mut b, params, parallel)?;
    pbkdf2_hmac::<Sha256>(password, &b, 1, output)
}

fn validate(params: &Params, config: &Config, dk_len: usize) -> Result<(), Error> {
    pbkdf2::check_output_len::<Sha256>(dk_len)?;
    config.check(params)
}

// each lane is mixed in place, so chunk order survives whatever order the
// lanes finish in.
fn mix_lanes(b: &mut [u8], params: &Params, parallel: bool) -> Result<(), Error> {
    let (r, n) = (params.r_usize(), params.n_usize());
    #[cfg(feature = "parallel")]
    if parallel {
        return mix_lanes_parallel(b, r, n);
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;
    let mut scratch = Scratch::allocate(r, n)?;
    for (lane, chunk) in b.chunks_mut(params.lane_len()).enumerate() {
        tracing::trace!(lane, "mixing lane");
        scratch.ro_mix(chunk);
    }
    Ok(())
}

#[cfg(feature = "parallel")]
fn mix_lanes_parallel(b: &mut [u8], r: usize, n: usize) -> Result<(), Error> {
    use rayon::prelude::*;
    b.par_chunks_mut(r * 128)
        .enumerate()
        .try_for_each(|(lane, chunk)| {
            tracing::trace!(lane, "mixing lane");
            Scratch::allocate(r, n)?.ro_mix(chunk);
            Ok(())
        })
}
