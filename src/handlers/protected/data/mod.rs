pub mod accounts;
pub mod opening_balances;
pub mod partners;
pub mod products;
