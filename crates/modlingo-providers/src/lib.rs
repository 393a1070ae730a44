//! # modlingo-providers
//!
//! Translation backends for modlingo.

pub mod languages;
pub mod ollama;
