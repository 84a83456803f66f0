pub mod dates;
pub mod email_validator;
