//! Data models for Employee Performance System entities.
//!
//! This module contains the data structures consumed from the backend:
//!
//! - `Employee`: person record with review rollups
//! - `PerformanceReview`: a rated review tied to an employee and period
//! - Statistics types: `EmployeeStats`, `ReviewStats` and their breakdowns
//!
//! Optional-field defaults live on the types themselves so the rest of the
//! application never re-derives them.

pub mod employee;
pub mod review;
pub mod stats;

pub use employee::{recent_employees, Employee, EmployeeInput, EmployeeSortColumn};
pub use review::{
    average_rating_label, filter_by_period, rating_counts, rating_label, PerformanceReview,
    ReviewInput,
};
pub use stats::{DepartmentCount, EmployeeStats, ListResponse, RatingCount, ReviewStats};
