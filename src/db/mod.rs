pub mod accounts;
pub mod appointments;
pub mod audit;
pub mod departments;
pub mod employees;
pub mod refresh_tokens;
pub mod templates;
