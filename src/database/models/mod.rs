pub mod account;
pub mod opening_balance;
pub mod partner;
pub mod product;
pub mod tenant;
pub mod user;

pub use account::Account;
pub use opening_balance::{OpeningBalanceLine, OpeningBalancePeriod};
pub use partner::Partner;
pub use product::Product;
pub use tenant::{OnboardingStep, Tenant, TenantMember};
pub use user::User;
