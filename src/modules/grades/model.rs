//! Grade record DTOs, re-exported from the shared models crate.

pub use educore_models::grades::*;
