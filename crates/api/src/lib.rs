//! GXI API library.
//!
//! Multi-tenant account and catalog backend: registration with a
//! bootstrap-first-admin rule, JWT login, OTP-based password recovery,
//! role-gated user management over an ownership forest, and an admin-only
//! category catalog.
//!
//! The crate is a library so the binary in `main.rs` stays a thin shell and
//! the handlers and services remain testable.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod permissions;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
