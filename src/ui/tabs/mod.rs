pub mod admin;
pub mod dashboard;
pub mod employees;
pub mod reviews;
