//! Class group models and DTOs, re-exported from the shared models crate.

pub use educore_models::class_groups::*;
