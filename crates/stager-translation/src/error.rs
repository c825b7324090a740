//! Error taxonomy shared by every Stager crate

use std::fmt;

use crate::message::TranslatableMessage;

/// Boxed lower-level cause attached to an [`Error`].
pub type Source = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for Stager operations
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of failure, independent of the message it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    Logic,
    InvalidArgument,
    Runtime,
    Precondition,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Io => "I/O error",
            Self::Logic => "logic error",
            Self::InvalidArgument => "invalid argument",
            Self::Runtime => "runtime error",
            Self::Precondition => "precondition not fulfilled",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in Stager operations.
///
/// Every variant renders its [`TranslatableMessage`] through the default
/// translator for `Display`; hosts that localize should call
/// [`Error::translatable_message`] and render it themselves.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A filesystem operation failed (copy, mkdir, remove, ...)
    #[error("{message}")]
    Io {
        message: TranslatableMessage,
        #[source]
        source: Option<Source>,
    },

    /// The host is misconfigured or an operation was called out of sequence
    #[error("{message}")]
    Logic {
        message: TranslatableMessage,
        #[source]
        source: Option<Source>,
    },

    /// Caller-supplied input is malformed
    #[error("{message}")]
    InvalidArgument {
        message: TranslatableMessage,
        #[source]
        source: Option<Source>,
    },

    /// An external process ran but failed or timed out
    #[error("{message}")]
    Runtime {
        message: TranslatableMessage,
        #[source]
        source: Option<Source>,
    },

    /// A lifecycle stage's safety checks were not met
    #[error("{message}")]
    Precondition {
        /// Name of the first unfulfilled precondition
        precondition: String,
        message: TranslatableMessage,
        #[source]
        source: Option<Source>,
    },
}

impl Error {
    pub fn io(message: TranslatableMessage, source: std::io::Error) -> Self {
        Self::Io {
            message,
            source: Some(Box::new(source)),
        }
    }

    pub fn logic(message: TranslatableMessage) -> Self {
        Self::Logic {
            message,
            source: None,
        }
    }

    pub fn invalid_argument(message: TranslatableMessage) -> Self {
        Self::InvalidArgument {
            message,
            source: None,
        }
    }

    pub fn runtime(message: TranslatableMessage) -> Self {
        Self::Runtime {
            message,
            source: None,
        }
    }

    pub fn precondition(precondition: impl Into<String>, message: TranslatableMessage) -> Self {
        Self::Precondition {
            precondition: precondition.into(),
            message,
            source: None,
        }
    }

    /// Attach a lower-level cause, replacing any existing one.
    pub fn with_source(mut self, cause: impl Into<Source>) -> Self {
        let slot = match &mut self {
            Self::Io { source, .. }
            | Self::Logic { source, .. }
            | Self::InvalidArgument { source, .. }
            | Self::Runtime { source, .. }
            | Self::Precondition { source, .. } => source,
        };
        *slot = Some(cause.into());
        self
    }

    /// Re-raise with a new message while keeping the kind.
    ///
    /// The original error becomes the source of the returned one.
    pub fn wrap(self, context: TranslatableMessage) -> Self {
        let kind = self.kind();
        let precondition = self.precondition_name().map(str::to_string);
        let source: Option<Source> = Some(Box::new(self));
        match kind {
            ErrorKind::Io => Self::Io { message: context, source },
            ErrorKind::Logic => Self::Logic { message: context, source },
            ErrorKind::InvalidArgument => Self::InvalidArgument { message: context, source },
            ErrorKind::Runtime => Self::Runtime { message: context, source },
            ErrorKind::Precondition => Self::Precondition {
                precondition: precondition.unwrap_or_default(),
                message: context,
                source,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::Logic { .. } => ErrorKind::Logic,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Runtime { .. } => ErrorKind::Runtime,
            Self::Precondition { .. } => ErrorKind::Precondition,
        }
    }

    pub fn translatable_message(&self) -> &TranslatableMessage {
        match self {
            Self::Io { message, .. }
            | Self::Logic { message, .. }
            | Self::InvalidArgument { message, .. }
            | Self::Runtime { message, .. }
            | Self::Precondition { message, .. } => message,
        }
    }

    /// Name of the failing precondition, for [`Error::Precondition`] only.
    pub fn precondition_name(&self) -> Option<&str> {
        match self {
            Self::Precondition { precondition, .. } => Some(precondition),
            _ => None,
        }
    }
}
