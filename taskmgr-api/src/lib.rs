//! # Task Manager API Server Library
//!
//! HTTP surface over the rule layer in `taskmgr-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and actor resolution
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors whose rejections use the API error format
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
