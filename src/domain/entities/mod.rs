pub mod agenda;
pub mod client;
pub mod contact_event;
pub mod dashboard;
pub mod holiday;
pub mod pagination;
pub mod session;
pub mod spreadsheet;
pub mod user;

pub use agenda::*;
pub use client::*;
pub use contact_event::*;
pub use dashboard::*;
pub use holiday::*;
pub use pagination::*;
pub use session::*;
pub use spreadsheet::*;
pub use user::*;
