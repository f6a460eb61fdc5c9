mod gallery;
mod password_reset;
mod session;
mod user;

pub use gallery::Gallery;
pub use password_reset::PasswordReset;
pub use session::Session;
pub use user::User;
