use crate::Error;

/// scrypt cost parameters: `N = 2^log_n` (CPU/memory cost), `r` (block size)
/// and `p` (parallelization).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub(crate) log_n: u8,
    pub(crate) r: u32,
    pub(crate) p: u32,
}

impl Params {
    pub const RECOMMENDED_LOG_N: u8 = 17;
    pub const RECOMMENDED_R: u32 = 8;
    pub const RECOMMENDED_P: u32 = 1;

    /// Validates `(2^log_n, r, p)`.
    ///
    /// Besides `N > 1`, `r >= 1` and `p >= 1`, this enforces the RFC 7914
    /// bound `r * p < 2^30` and that a single lane's table of `128 * r * N`
    /// bytes is addressable.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(log_n: u8, r: u32, p: u32) -> Result<Self, Error> {
        if r == 0 {
            return Err(Error::InvalidParameter("r must be at least 1"));
        }
        if p == 0 {
            return Err(Error::InvalidParameter("p must be at least 1"));
        }
        if log_n == 0 {
            return Err(Error::InvalidParameter("N must be greater than 1"));
        }
        if u32::from(log_n) >= usize::BITS {
            return Err(Error::InvalidParameter("N does not fit in the address space"));
        }
        let (r_, p_) = (r as usize, p as usize);
        let n = 1_usize << log_n;
        let r128 = r_
            .checked_mul(128)
            .ok_or(Error::InvalidParameter("128 * r overflows"))?;
        r128.checked_mul(p_)
            .ok_or(Error::InvalidParameter("128 * r * p overflows"))?;
        r128.checked_mul(n)
            .ok_or(Error::InvalidParameter("128 * r * N overflows"))?;
        if u64::from(r) * u64::from(p) >= 0x4000_0000 {
            return Err(Error::InvalidParameter("r * p must be less than 2^30"));
        }
        Ok(Self { log_n, r, p })
    }

    /// Like [`Params::new`], but takes `N` itself, which must be a power of
    /// two greater than 1.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_cost(n: u64, r: u32, p: u32) -> Result<Self, Error> {
        if n < 2 {
            return Err(Error::InvalidParameter("N must be greater than 1"));
        }
        if !n.is_power_of_two() {
            return Err(Error::InvalidParameter("N must be a power of two"));
        }
        Self::new(n.trailing_zeros() as u8, r, p)
    }

    /// `N = 2^17, r = 8, p = 1`: 128 MiB per derivation.
    #[must_use]
    pub const fn recommended() -> Self {
        Self {
            log_n: Self::RECOMMENDED_LOG_N,
            r: Self::RECOMMENDED_R,
            p: Self::RECOMMENDED_P,
        }
    }

    #[must_use]
    pub const fn log_n(&self) -> u8 {
        self.log_n
    }

    #[must_use]
    pub const fn n(&self) -> u64 {
        1 << self.log_n
    }

    #[must_use]
    pub const fn r(&self) -> u32 {
        self.r
    }

    #[must_use]
    pub const fn p(&self) -> u32 {
        self.p
    }

    /// Bytes in one lane, `128 * r`.
    #[must_use]
    pub const fn lane_len(&self) -> usize {
        self.r as usize * 128
    }

    /// Bytes in the table one lane's ROMix allocates, `128 * r * N`.
    #[must_use]
    pub const fn memory_per_lane(&self) -> u64 {
        (self.lane_len() as u64) << self.log_n
    }

    pub(crate) const fn n_usize(&self) -> usize {
        1 << self.log_n
    }

    pub(crate) const fn r_usize(&self) -> usize {
        self.r as usize
    }

    pub(crate) const fn p_usize(&self) -> usize {
        self.p as usize
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::recommended()
    }
}
