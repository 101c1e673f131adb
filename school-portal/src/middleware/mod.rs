pub mod auth;

pub use auth::{CurrentUser, RecognizedUser, StaffUser};
