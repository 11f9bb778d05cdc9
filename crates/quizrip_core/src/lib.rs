//! quizrip core - backend logic for building quiz audio clips
//!
//! This crate turns a sheet of quiz-track definitions into paired
//! question/answer clips by driving external audio tools. It has no
//! CLI dependencies and can be embedded in other front ends.

pub mod config;
pub mod logging;
pub mod models;
pub mod ops;
pub mod orchestrator;
pub mod records;
pub mod scratch;
pub mod tools;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
