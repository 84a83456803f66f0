pub mod client_repository;
pub mod clock;
pub mod contact_event_repository;
pub mod holiday_repository;
pub mod session_repository;
pub mod user_repository;

pub use client_repository::ClientRepository;
pub use clock::Clock;
pub use contact_event_repository::ContactEventRepository;
pub use holiday_repository::HolidayRepository;
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;
