pub mod session;

pub use session::{logout, refresh_session, whoami};
