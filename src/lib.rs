// ABOUTME: Library root for the trainlog workout tracking backend
// ABOUTME: Exposes auth, persistence, ordering, and HTTP route modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trainlog is a workout tracking backend with live set sequencing.
//!
//! The crate is organized around a `sqlx`/SQLite persistence layer, a pure
//! ordering engine that keeps set positions and per-exercise numbering
//! consistent, and an `axum` HTTP surface. The active-set tracker decides
//! which set a lifter should perform next, applying rest offsets when the
//! previous set just finished.

#![deny(unsafe_code)]

/// JWT authentication and password hashing
pub mod auth;
/// Environment-driven configuration
pub mod config;
/// Database access layer
pub mod database;
/// Error types and HTTP error responses
pub mod errors;
/// Structured logging initialization
pub mod logging;
/// Domain models
pub mod models;
/// Set ordering and active-set selection engine
pub mod ordering;
/// Shared server resources
pub mod resources;
/// HTTP route handlers
pub mod routes;
/// HTTP server assembly
pub mod server;
