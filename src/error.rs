use std::backtrace::Backtrace;
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Configuration errors reported before any search state exists.
///
/// These are the only error conditions in the crate: a closure contradiction
/// or a failed long-rule check during the search is an ordinary branch
/// rejection, handled internally, and is never surfaced as an error value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("the maximum number of classes must be at least 1")]
    ZeroClassBound,
    #[error("the maximum number of classes must leave room for the adjoined identity node")]
    ClassBoundTooLarge,
    #[error("the presentation must have at least one generator")]
    EmptyPresentation,
    #[error("the number of threads must be at least 1")]
    ZeroThreads,
    #[error("the number of idle thread restarts must be at least 1")]
    ZeroIdleRestarts,
    #[error("rule contains letter {letter} but the alphabet is 0..{alphabet_size}")]
    LetterOutOfBounds { letter: u32, alphabet_size: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Inner: {inner}\n{backtrace}")]
    Inner {
        inner: Box<ConfigError>,
        backtrace: Box<Backtrace>,
    },
}

impl From<ConfigError> for Error {
    fn from(inner: ConfigError) -> Self {
        Error::Inner {
            inner: Box::new(inner),
            backtrace: Box::new(std::backtrace::Backtrace::capture()),
        }
    }
}

impl Error {
    /// The underlying configuration error.
    pub fn config_error(&self) -> &ConfigError {
        match self {
            Error::Inner { inner, .. } => inner,
        }
    }
}
