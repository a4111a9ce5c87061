use clap::ValueEnum;
use tracing::Level;

/// Verbosity of diagnostics on stderr. Change records are printed regardless.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Trace => Some(Level::TRACE),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_disables_tracing() {
        assert_eq!(LogLevel::Silent.to_tracing_level(), None);
        assert_eq!(LogLevel::default().to_tracing_level(), Some(Level::WARN));
    }
}
