use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A controller could not be brought up.
#[derive(Debug, Error)]
pub enum CreationError {
    /// The injection interface (`/dev/uinput`) could not be opened.
    #[error("uinput unavailable for controller {index}: {source}")]
    ResourceUnavailable {
        index: usize,
        #[source]
        source: io::Error,
    },
    /// The kernel rejected the capability declaration or the final create call.
    #[error("registration of controller {index} failed: {source}")]
    RegistrationFailed {
        index: usize,
        #[source]
        source: io::Error,
    },
}

impl CreationError {
    pub fn index(&self) -> usize {
        match self {
            CreationError::ResourceUnavailable { index, .. }
            | CreationError::RegistrationFailed { index, .. } => *index,
        }
    }
}

/// A write to an otherwise live controller failed.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("write to controller {index} failed: {source}")]
    Write {
        index: usize,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("controller index {index} out of range (pool holds {count})")]
    InvalidIndex { index: usize, count: usize },
    #[error("controller {index} was not created")]
    DeviceNotCreated { index: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
