use crypto_common::erase::Erased;
use sha2::{
    digest::{Digest, Output},
    Sha256, Sha512,
};

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// A digest that can key an [`Hmac`].
pub trait HashFunction: Digest + Clone {
    /// Size in bytes of the blocks fed to the compression function.
    const BLOCK_SIZE: usize;
}

impl HashFunction for Sha256 {
    const BLOCK_SIZE: usize = 64;
}

impl HashFunction for Sha512 {
    const BLOCK_SIZE: usize = 128;
}

/// HMAC (RFC 2104) over any [`HashFunction`].
///
/// Both pads are absorbed up front, so cloning a keyed instance is the cheap
/// way to authenticate many messages under the same key. PBKDF2 relies on
/// this.
#[derive(Clone)]
pub struct Hmac<D: HashFunction> {
    digest: D,
    opad_digest: D,
}

impl<D: HashFunction> core::fmt::Debug for Hmac<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Hmac { ... }")
    }
}

impl<D: HashFunction> Hmac<D> {
    #[inline]
    #[must_use]
    pub fn new_from_slice(key: &[u8]) -> Self {
        let mut buf = get_der_key::<D>(key);
        for b in buf.iter_mut() {
            *b ^= IPAD;
        }
        let mut digest = D::new();
        Digest::update(&mut digest, buf.as_slice());
        for b in buf.iter_mut() {
            *b ^= IPAD ^ OPAD;
        }
        let mut opad_digest = D::new();
        Digest::update(&mut opad_digest, buf.as_slice());
        Self {
            digest,
            opad_digest,
        }
    }

    #[inline]
    pub fn update(&mut self, input: &[u8]) {
        Digest::update(&mut self.digest, input);
    }

    #[inline]
    #[must_use]
    pub fn finalize_fixed(self) -> Output<D> {
        let Self {
            digest,
            mut opad_digest,
        } = self;
        let inner = digest.finalize();
        Digest::update(&mut opad_digest, inner.as_slice());
        opad_digest.finalize()
    }
}

/// One-shot `HMAC(key, message)`.
#[must_use]
pub fn hmac<D: HashFunction>(key: &[u8], message: &[u8]) -> Output<D> {
    let mut mac = Hmac::<D>::new_from_slice(key);
    mac.update(message);
    mac.finalize_fixed()
}

// keys longer than a block are replaced by their digest, shorter ones are
// zero-padded. a key of exactly one block is used as is.
fn get_der_key<D: HashFunction>(key: &[u8]) -> Erased<Vec<u8>> {
    let mut der_key = Erased::new(vec![0; D::BLOCK_SIZE]);
    if key.len() <= D::BLOCK_SIZE {
        der_key[..key.len()].copy_from_slice(key);
    } else {
        let hash = D::digest(key);
        der_key[..hash.len()].copy_from_slice(&hash);
    }
    der_key
}
