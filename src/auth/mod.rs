pub mod accounts;
pub mod extractor;
pub mod password;
pub mod password_reset;
pub mod sessions;
pub mod token;
