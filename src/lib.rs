#![allow(clippy::doc_lazy_continuation)]
// src/lib.rs

// Authentication module
pub mod auth;

// Process-wide configuration
pub mod config;
