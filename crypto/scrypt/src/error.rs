use std::fmt::{Debug, Display};

pub enum Error {
    InvalidField(&'static str),
    InvalidParameter(&'static str),
    Io(std::io::Error),
    MemoryLimit { max: u64, got: u64 },
    MissingField(&'static str),
    OutOfMemory(u64),
    OutputTooLong(usize),
    Toml(toml::de::Error),
}

impl Error {
    /// Whether the caller asked for something scrypt cannot compute, as
    /// opposed to the environment failing underneath it.
    #[must_use]
    pub const fn is_invalid_parameter(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter(_) | Self::MemoryLimit { .. } | Self::OutputTooLong(_)
        )
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidField(field) => write!(f, "invalid value for config field `{field}`"),
            Self::InvalidParameter(reason) => write!(f, "invalid scrypt parameters: {reason}"),
            Self::Io(e) => Display::fmt(e, f),
            Self::MemoryLimit { max, got } => write!(
                f,
                "{got} bytes of scratch memory required, but limit set to {max} bytes ({} MiB)",
                max / (1024 * 1024)
            ),
            Self::MissingField(field) => write!(f, "missing required config field `{field}`"),
            Self::OutOfMemory(len) => write!(f, "could not allocate {len} bytes of scratch memory"),
            Self::OutputTooLong(len) => write!(f, "requested output length {len} is too long"),
            Self::Toml(e) => write!(f, "could not parse TOML config: {e}"),
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Self::Toml(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_parameter_errors() {
        assert!(Error::InvalidParameter("r must be at least 1").is_invalid_parameter());
        assert!(Error::MemoryLimit { max: 1, got: 2 }.is_invalid_parameter());
        assert!(Error::OutputTooLong(usize::MAX).is_invalid_parameter());
        assert!(!Error::OutOfMemory(1 << 30).is_invalid_parameter());
        assert!(!Error::MissingField("r").is_invalid_parameter());
    }

    #[test]
    fn display_mentions_limits() {
        let e = Error::MemoryLimit {
            max: 16 * 1024 * 1024,
            got: 1 << 30,
        };
        assert_eq!(
            e.to_string(),
            "1073741824 bytes of scratch memory required, but limit set to 16777216 bytes (16 MiB)"
        );
        assert_eq!(
            format!("{:?}", Error::InvalidParameter("N must be a power of two")),
            "invalid scrypt parameters: N must be a power of two"
        );
    }
}
