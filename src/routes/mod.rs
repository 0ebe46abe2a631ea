// ABOUTME: HTTP route modules for the REST API surface
// ABOUTME: Each module exposes an XxxRoutes struct building an axum Router
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST API routes
//!
//! Every authenticated handler extracts the acting user from the
//! `Authorization` header via [`crate::auth::AuthManager::authenticate`] and
//! scopes all queries to it. Resources owned by other users surface as
//! 404, never 403.

/// User registration and login
pub mod auth;

/// Health and readiness endpoints
pub mod health;

/// Set endpoints: CRUD plus complete/skip/move/duplicate actions
pub mod sets;

/// Current-user profile endpoints
pub mod users;

/// Body-weight log endpoints
pub mod weights;

/// Workout endpoints: CRUD plus start/complete/duplicate lifecycle
pub mod workouts;
