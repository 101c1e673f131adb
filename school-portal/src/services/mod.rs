pub mod access;
pub mod dashboard;
pub mod error;
pub mod resolver;
pub mod roster;
pub mod school;
pub mod session;
pub mod sheets_client;

pub use error::RosterError;
pub use resolver::{AdminAllowList, RoleResolver};
pub use roster::RosterSource;
pub use school::SchoolService;
pub use session::UserSession;
pub use sheets_client::SheetsClient;
