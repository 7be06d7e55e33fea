use crate::{Error, Params};
use std::path::Path;

/// Ceiling on the scratch memory a single derivation may use, 2 GiB.
pub const DEFAULT_MAX_MEMORY: u64 = 2 * 1024 * 1024 * 1024;

/// Execution settings that do not change the derived key: the memory ceiling
/// and whether lanes are mixed on the rayon pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    max_memory: u64,
    parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_memory: DEFAULT_MAX_MEMORY,
            parallel: cfg!(feature = "parallel"),
        }
    }
}

impl Config {
    #[must_use]
    pub const fn with_max_memory(mut self, max_memory: u64) -> Self {
        self.max_memory = max_memory;
        self
    }

    /// Requests that lanes run concurrently. Without the `parallel` feature
    /// this is accepted and ignored.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub const fn max_memory(&self) -> u64 {
        self.max_memory
    }

    #[must_use]
    pub const fn parallel(&self) -> bool {
        self.parallel
    }

    pub(crate) const fn runs_parallel(&self, params: &Params) -> bool {
        cfg!(feature = "parallel") && self.parallel && params.p() > 1
    }

    /// Peak bytes a derivation with `params` holds at once: one table per
    /// concurrently running lane plus the `p` lanes themselves.
    #[must_use]
    pub fn memory_required(&self, params: &Params) -> u64 {
        let tables = if self.runs_parallel(params) {
            u64::from(params.p())
        } else {
            1
        };
        let lanes = params.lane_len() as u64 * u64::from(params.p());
        params
            .memory_per_lane()
            .saturating_mul(tables)
            .saturating_add(lanes)
    }

    pub(crate) fn check(&self, params: &Params) -> Result<(), Error> {
        let required = self.memory_required(params);
        if required > self.max_memory {
            tracing::debug!(
                required,
                max = self.max_memory,
                "scrypt parameters exceed the memory limit"
            );
            return Err(Error::MemoryLimit {
                max: self.max_memory,
                got: required,
            });
        }
        Ok(())
    }
}

/// Cost parameters and [`Config`] read from a TOML table.
///
/// Recognised keys: `log_n` or `n`, `r`, `p`, `max_memory` (bytes) and
/// `parallel`. Cost keys that are absent fall back to
/// [`Params::recommended`].
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone)]
pub struct TomlConfig {
    table: toml::value::Table,
}

impl TomlConfig {
    #[must_use]
    pub const fn new(table: toml::value::Table) -> Self {
        Self { table }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        Ok(Self::new(toml::from_str::<toml::value::Table>(s)?))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path)?;
        Self::parse(&s)
    }

    fn integer(&self, field: &'static str) -> Result<Option<i64>, Error> {
        match self.table.get(field) {
            None => Ok(None),
            Some(toml::Value::Integer(v)) => Ok(Some(*v)),
            Some(_) => Err(Error::InvalidField(field)),
        }
    }

    fn unsigned<T: TryFrom<i64>>(&self, field: &'static str) -> Result<Option<T>, Error> {
        self.integer(field)?
            .map(|v| T::try_from(v).map_err(|_| Error::InvalidField(field)))
            .transpose()
    }

    pub fn params(&self) -> Result<Params, Error> {
        let recommended = Params::recommended();
        let r = self.unsigned("r")?.unwrap_or(recommended.r());
        let p = self.unsigned("p")?.unwrap_or(recommended.p());
        match (self.unsigned::<u8>("log_n")?, self.unsigned::<u64>("n")?) {
            (Some(_), Some(_)) => Err(Error::InvalidField("n")),
            (Some(log_n), None) => Params::new(log_n, r, p),
            (None, Some(n)) => Params::from_cost(n, r, p),
            (None, None) => Params::new(recommended.log_n(), r, p),
        }
    }

    pub fn config(&self) -> Result<Config, Error> {
        let mut config = Config::default();
        if let Some(max_memory) = self.unsigned::<u64>("max_memory")? {
            if max_memory == 0 {
                return Err(Error::InvalidField("max_memory"));
            }
            config = config.with_max_memory(max_memory);
        }
        match self.table.get("parallel") {
            None => {}
            Some(toml::Value::Boolean(v)) => config = config.with_parallel(*v),
            Some(_) => return Err(Error::InvalidField("parallel")),
        }
        Ok(config)
    }
}
