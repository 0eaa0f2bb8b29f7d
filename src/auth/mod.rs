//! Authentication module for managing the current session.
//!
//! This module provides:
//! - `Session` / `UserIdentity`: who the session cookie belongs to
//! - `AuthManager`: login, signup, logout, status check, and the admin
//!   capability predicate
//!
//! The session lives for the lifetime of the process; the server side of it
//! rides in the cookie store. Nothing here is persisted to disk.

pub mod manager;

pub use manager::{
    AuthManager, AuthResponse, AuthResult, AuthStatus, LoginRequest, Session, SignupRequest,
    UserIdentity,
};
