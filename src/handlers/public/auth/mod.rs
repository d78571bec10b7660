pub mod google;
pub mod login;
pub mod refresh;
pub mod register;
pub mod utils;

pub use google::login_google;
pub use login::login;
pub use refresh::refresh;
pub use register::register;
