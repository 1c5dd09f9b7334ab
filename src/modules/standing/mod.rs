//! Wiring of the standing engine onto PostgreSQL and SMTP.

pub mod store;

pub use store::PgStandingStore;

use crate::utils::email::MailNotifier;
use educore_standing::AcademicStandingService;

/// The standing engine as deployed in this service.
pub type Standing = AcademicStandingService<PgStandingStore, MailNotifier>;
