pub mod clock;
pub mod http;
pub mod observability;
pub mod persistence;
