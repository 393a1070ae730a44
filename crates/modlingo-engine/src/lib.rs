//! # modlingo-engine
//!
//! Drives translation of localization files: the bounded-concurrency batch
//! orchestrator, the per-file session state machine, and atomic persistence.

pub mod fs;
pub mod orchestrator;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
