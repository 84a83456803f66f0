pub mod agenda_service;
pub mod auth_service;
pub mod client_service;
pub mod contact_service;
pub mod dashboard_service;
pub mod holiday_service;
pub mod session_service;
pub mod spreadsheet_service;
pub mod user_service;

pub use agenda_service::AgendaService;
pub use auth_service::AuthService;
pub use client_service::ClientService;
pub use contact_service::ContactService;
pub use dashboard_service::DashboardService;
pub use holiday_service::HolidayService;
pub use session_service::SessionService;
pub use spreadsheet_service::SpreadsheetService;
pub use user_service::UserService;
