use crate::application::services::*;
use crate::config::Config;
use crate::domain::ports::{
    ClientRepository, Clock, ContactEventRepository, HolidayRepository, SessionRepository,
    UserRepository,
};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::http::middleware::{ApiError, AppState};
use crate::infrastructure::persistence::Database;
use crate::shared::AuthRateLimiter;
use std::sync::Arc;
use std::time::Duration;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub async fn build_app_state(
    db: Database,
    config: &Config,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let state = build_app_state_with_clock(db, config, Arc::new(SystemClock));
    spawn_cleanup(
        state.session_service.clone(),
        state.auth_service.rate_limiter().clone(),
    );
    Ok(state)
}

/// Wires every service over `db`, reading "today" from `clock`.
pub fn build_app_state_with_clock(
    db: Database,
    config: &Config,
    clock: Arc<dyn Clock>,
) -> AppState {
    let user_repo = Arc::new(db.clone()) as Arc<dyn UserRepository>;
    let session_repo = Arc::new(db.clone()) as Arc<dyn SessionRepository>;
    let client_repo = Arc::new(db.clone()) as Arc<dyn ClientRepository>;
    let contact_repo = Arc::new(db.clone()) as Arc<dyn ContactEventRepository>;
    let holiday_repo = Arc::new(db) as Arc<dyn HolidayRepository>;

    let session_service = SessionService::new(session_repo, config.session_duration_hours);
    let rate_limiter = AuthRateLimiter::new();
    let auth_service = AuthService::new(
        user_repo.clone(),
        session_service.clone(),
        rate_limiter,
    );
    let user_service = UserService::new(user_repo, session_service.clone());
    let client_service = ClientService::new(client_repo.clone());
    let holiday_service = HolidayService::new(holiday_repo.clone());
    let contact_service = ContactService::new(
        contact_repo.clone(),
        client_repo.clone(),
        holiday_service.clone(),
        clock.clone(),
    );
    let agenda_service = AgendaService::new(contact_repo.clone(), clock.clone());
    let dashboard_service =
        DashboardService::new(contact_repo.clone(), client_repo.clone(), clock);
    let spreadsheet_service = SpreadsheetService::new(client_repo, contact_repo, holiday_repo);
    tracing::info!("Application services initialized");

    AppState {
        max_upload_bytes: config.max_upload_bytes,
        cors_origins: config.cors_origins.clone(),
        auth_service,
        session_service,
        user_service,
        client_service,
        contact_service,
        agenda_service,
        dashboard_service,
        holiday_service,
        spreadsheet_service,
    }
}

/// Hourly sweep of expired sessions and stale login lockouts.
fn spawn_cleanup(session_service: SessionService, rate_limiter: AuthRateLimiter) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            match session_service.sweep_expired().await {
                Ok(0) => {}
                Ok(count) => tracing::info!("Removed {} expired sessions", count),
                Err(e) => tracing::error!("Session cleanup failed: {}", e),
            }
            rate_limiter.cleanup().await;
        }
    });
    tracing::info!("Cleanup task started (hourly)");
}

pub async fn initialize_admin(db: &Database, config: &Config) -> Result<(), ApiError> {
    tracing::info!("Checking for master user initialization");

    let user_service = UserService::new(
        Arc::new(db.clone()) as Arc<dyn UserRepository>,
        SessionService::new(
            Arc::new(db.clone()) as Arc<dyn SessionRepository>,
            config.session_duration_hours,
        ),
    );

    if user_service
        .ensure_master_user(&config.admin_email, &config.admin_password)
        .await?
    {
        tracing::info!("Master user created: {}", config.admin_email);
    } else {
        tracing::info!("Master user already exists: {}", config.admin_email);
    }

    Ok(())
}
