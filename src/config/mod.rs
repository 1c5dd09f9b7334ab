//! Configuration modules for the Educore API.
//!
//! Each submodule handles one concern, loaded from environment variables at
//! startup:
//!
//! - [`cors`]: allowed CORS origins
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`email`]: SMTP configuration for outbound notifications
//! - [`standing`]: academic standing policy (weights and thresholds)

pub mod cors;
pub mod database;
pub mod email;
pub mod standing;
