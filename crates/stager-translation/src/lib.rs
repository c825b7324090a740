//! Translatable messages and errors for Stager
//!
//! Every user-facing string produced by the workspace is a
//! [`TranslatableMessage`]: the message text (which doubles as its id), a map
//! of named parameters, and a [`Domain`]. Messages are rendered only at the
//! host boundary through a [`Translator`], so hosts can localize them.
//!
//! The same crate owns the error taxonomy shared by every layer above it:
//! each [`Error`] variant carries a translatable message in addition to its
//! plain rendered form.

pub mod error;
pub mod message;
pub mod translator;

pub use error::{Error, ErrorKind, Result};
pub use message::{Domain, MessageParameters, Parameters, TranslatableMessage};
pub use translator::{DefaultTranslator, Translator};
