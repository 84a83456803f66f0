use crate::infrastructure::http::controllers as api;
use crate::infrastructure::http::middleware::{require_auth, AppState};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        // Auth
        .route("/api/auth/me", get(api::auth::me))
        .route("/api/auth/logout", post(api::auth::logout))
        .route(
            "/api/auth/change-password",
            post(api::auth::change_password),
        )
        // Users
        .route(
            "/api/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route("/api/users/stats", get(api::users::user_stats))
        .route(
            "/api/users/:id",
            get(api::users::get_user)
                .put(api::users::update_user)
                .delete(api::users::delete_user),
        )
        .route(
            "/api/users/:id/toggle-status",
            post(api::users::toggle_user_status),
        )
        .route(
            "/api/users/:id/reset-password",
            post(api::users::reset_password),
        )
        // Clients
        .route(
            "/api/clients",
            get(api::clients::list_clients).post(api::clients::create_client),
        )
        .route("/api/clients/search", get(api::clients::search_clients))
        .route("/api/clients/stats", get(api::clients::client_stats))
        .route("/api/clients/branches", get(api::clients::list_branches))
        .route(
            "/api/clients/code/:code",
            get(api::clients::get_client_by_code),
        )
        .route(
            "/api/clients/:id",
            get(api::clients::get_client)
                .put(api::clients::update_client)
                .delete(api::clients::delete_client),
        )
        // Contact events
        .route(
            "/api/contacts",
            get(api::contacts::list_contacts).post(api::contacts::create_contact),
        )
        .route("/api/contacts/sellers", get(api::contacts::list_sellers))
        .route(
            "/api/contacts/:id",
            get(api::contacts::get_contact)
                .put(api::contacts::update_contact)
                .delete(api::contacts::delete_contact),
        )
        .route(
            "/api/contact-types",
            get(api::catalog::list_contact_types),
        )
        .route(
            "/api/contact-results",
            get(api::catalog::list_contact_results),
        )
        // Agenda
        .route("/api/agenda", get(api::agenda::list_agenda))
        .route("/api/agenda/grouped", get(api::agenda::grouped_agenda))
        .route("/api/agenda/stats", get(api::agenda::agenda_stats))
        .route(
            "/api/agenda/notifications",
            get(api::agenda::notifications),
        )
        // Dashboard
        .route("/api/dashboard/stats", get(api::dashboard::dashboard_stats))
        // Holidays
        .route(
            "/api/holidays",
            get(api::holidays::list_holidays).post(api::holidays::create_holiday),
        )
        .route("/api/holidays/import", post(api::holidays::import_holidays))
        .route(
            "/api/holidays/:id",
            get(api::holidays::get_holiday)
                .put(api::holidays::update_holiday)
                .delete(api::holidays::delete_holiday),
        )
        // Spreadsheets
        .route(
            "/api/spreadsheets/clients",
            post(api::spreadsheets::import_clients),
        )
        .route(
            "/api/spreadsheets/clients/template",
            get(api::spreadsheets::client_template),
        )
        .route(
            "/api/spreadsheets/clients/export",
            get(api::spreadsheets::export_clients),
        )
        .route(
            "/api/spreadsheets/contacts/export",
            get(api::spreadsheets::export_contacts),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let cors = cors_layer(&state.cors_origins);
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/auth/login", post(api::auth::login))
        .merge(protected)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": "oxicrm",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_handler() -> &'static str {
    "OK"
}
