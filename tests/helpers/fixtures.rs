use chrono::NaiveDate;
use oxicrm::application::services::auth_service::{generate_session_token, hash_password};
use oxicrm::bootstrap::build_app_state_with_clock;
use oxicrm::config::Config;
use oxicrm::domain::entities::{
    AuthenticatedUser, Client, ContactEvent, CreateContactEventRequest, Holiday, Session, User,
    UserProfile,
};
use oxicrm::domain::ports::{
    ClientRepository, ContactEventRepository, HolidayRepository, UserRepository,
};
use oxicrm::infrastructure::clock::FixedClock;
use oxicrm::infrastructure::http::middleware::AppState;
use oxicrm::infrastructure::persistence::Database;
use std::sync::Arc;

pub const TEST_PASSWORD: &str = "secret123";

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        admin_email: "admin@oxicrm.test".to_string(),
        admin_password: "admin123".to_string(),
        session_duration_hours: 24,
        cors_origins: vec!["*".to_string()],
        max_upload_bytes: 64 * 1024,
        otel_exporter_endpoint: None,
        service_name: "oxicrm-test".to_string(),
        metrics_port: 0,
    }
}

/// Application state whose clock is frozen at midday of `today`.
pub fn test_state(db: &Database, today: NaiveDate) -> AppState {
    build_app_state_with_clock(db.clone(), &test_config(), Arc::new(FixedClock::on(today)))
}

pub async fn create_test_user(
    db: &Database,
    name: &str,
    email: &str,
    profile: UserProfile,
) -> User {
    let hash = hash_password(TEST_PASSWORD).expect("Failed to hash password");
    let user = User::new(name.to_string(), email.to_string(), hash, profile);
    db.create_user(&user).await.expect("Failed to create user");
    user
}

pub async fn create_master(db: &Database) -> User {
    create_test_user(db, "Master", "master@oxicrm.test", UserProfile::Master).await
}

pub async fn create_seller(db: &Database, name: &str) -> User {
    let email = format!("{}@oxicrm.test", name.to_lowercase().replace(' ', "."));
    create_test_user(db, name, &email, UserProfile::Seller).await
}

/// Builds the request extension the auth middleware would insert for `user`.
pub fn authenticated(user: &User) -> AuthenticatedUser {
    let token = generate_session_token();
    AuthenticatedUser {
        user: user.clone(),
        session: Session::new(user.id.clone(), token.clone(), 24),
        token,
    }
}

pub async fn create_test_client(
    db: &Database,
    name: &str,
    code: i64,
    classification: Option<&str>,
) -> Client {
    let mut client = Client::new(name.to_string(), code);
    client.classification = classification.map(str::to_string);
    db.create_client(&client)
        .await
        .expect("Failed to create client");
    client
}

pub async fn create_test_holiday(db: &Database, name: &str, day: &str, recurring: bool) -> Holiday {
    let holiday = Holiday::new(name.to_string(), day.to_string(), recurring);
    db.create_holiday(&holiday)
        .await
        .expect("Failed to create holiday");
    holiday
}

pub fn contact_request(client_id: &str, seller: &str) -> CreateContactEventRequest {
    CreateContactEventRequest {
        client_id: Some(client_id.to_string()),
        contact_type: Some("A".to_string()),
        contact_result: Some("1".to_string()),
        seller: Some(seller.to_string()),
        ..Default::default()
    }
}

/// Inserts a contact event directly, bypassing scheduling.
pub async fn seed_contact(
    db: &Database,
    client_id: &str,
    seller: &str,
    contact_date: &str,
    next_contact_date: Option<&str>,
) -> ContactEvent {
    let mut event = ContactEvent::new(
        client_id.to_string(),
        contact_date.to_string(),
        "A".to_string(),
        "1".to_string(),
        seller.to_string(),
        format!("{} 10:00:00", contact_date),
    );
    event.next_contact_date = next_contact_date.map(str::to_string);
    db.create_contact_event(&event)
        .await
        .expect("Failed to create contact event");
    event
}
