pub mod account;
pub mod appointment;
pub mod audit_event;
pub mod department;
pub mod employee;
pub mod refresh_token;
pub mod template;

pub use account::Account;
pub use appointment::Appointment;
pub use audit_event::AuditEvent;
pub use department::Department;
pub use employee::{Employee, EmployeeInput, Gender};
pub use refresh_token::RefreshToken;
pub use template::LetterTemplate;
