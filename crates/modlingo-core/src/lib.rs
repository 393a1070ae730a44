//! # modlingo-core
//!
//! Core types, traits, configuration, and error handling for modlingo:
//! the localization document model, the format-preserving codec, and the
//! translation-necessity evaluator.

pub mod cancel;
pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod evaluator;
pub mod pairing;
pub mod placeholder;
pub mod traits;
