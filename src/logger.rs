use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl Verbosity {
    pub fn from_u8(level: u8) -> Self {
        match level {
            0 => Verbosity::Low,
            1 => Verbosity::Medium,
            2 => Verbosity::High,
            _ => Verbosity::Low,
        }
    }

    /// Default filter directive: lifecycle at Low, emission detail at High.
    pub fn directive(self) -> &'static str {
        match self {
            Verbosity::Low => "info",
            Verbosity::Medium => "debug",
            Verbosity::High => "trace",
        }
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over `level` when set.
pub fn init(level: Verbosity) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish()
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_levels_fall_back_to_low() {
        assert_eq!(Verbosity::from_u8(0), Verbosity::Low);
        assert_eq!(Verbosity::from_u8(1), Verbosity::Medium);
        assert_eq!(Verbosity::from_u8(2), Verbosity::High);
        assert_eq!(Verbosity::from_u8(9), Verbosity::Low);
        assert!(Verbosity::Low < Verbosity::High);
    }
}
