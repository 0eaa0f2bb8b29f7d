//! REST API client module for the Employee Performance System backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! backend to fetch and mutate employee and performance review data.
//!
//! The API uses a cookie-based session plus an anti-forgery token that
//! must be echoed back in the `X-CSRFToken` header on mutating requests.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
