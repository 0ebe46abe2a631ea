// ABOUTME: Shared server resources injected into route handlers
// ABOUTME: Bundles the database, auth manager, and configuration behind Arcs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dependency injection context shared by all routes

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use std::sync::Arc;

/// Resources shared across the HTTP surface
pub struct ServerResources {
    /// Database connection pool wrapper
    pub database: Arc<Database>,
    /// JWT auth manager
    pub auth_manager: Arc<AuthManager>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, config: Arc<ServerConfig>) -> Self {
        Self {
            database: Arc::new(database),
            auth_manager: Arc::new(auth_manager),
            config,
        }
    }
}
