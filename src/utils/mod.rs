//! Utility modules for the Educore API.
//!
//! - [`email`]: SMTP email sending and the standing-engine mail notifier
//! - [`errors`]: Application error type and HTTP mapping

pub mod email;
pub mod errors;
