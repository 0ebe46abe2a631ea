// ABOUTME: Configuration management module
// ABOUTME: Environment-based server configuration lives in environment.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration management

pub mod environment;
