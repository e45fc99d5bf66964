pub mod client;
pub mod employees;
pub mod loans;
pub mod types;
