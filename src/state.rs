use sqlx::PgPool;

use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::email::EmailConfig;
use crate::config::standing::standing_config_from_env;
use crate::modules::standing::{PgStandingStore, Standing};
use crate::utils::email::{EmailService, MailNotifier};
use educore_standing::AcademicStandingService;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub email: EmailService,
    pub cors_config: CorsConfig,
    pub standing: Standing,
}

pub async fn init_app_state() -> AppState {
    let db = init_db_pool().await;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    build_app_state(db)
}

/// Assemble the state around an existing pool. Split out so tests can hand
/// in their own pool without touching the environment-driven setup.
pub fn build_app_state(db: PgPool) -> AppState {
    let email = EmailService::new(EmailConfig::from_env());
    let standing_config = standing_config_from_env();
    let standing = AcademicStandingService::new(
        PgStandingStore::new(db.clone(), standing_config),
        MailNotifier::new(email.clone()),
        standing_config,
    );

    AppState {
        db,
        email,
        cors_config: CorsConfig::from_env(),
        standing,
    }
}
