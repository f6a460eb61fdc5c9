pub mod galleries;
pub mod password_resets;
pub mod sessions;
pub mod users;
