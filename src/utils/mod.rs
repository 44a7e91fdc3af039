//! Shared utilities for error handling, security, and validation

/// Error types and HTTP mappings
pub mod error;

/// Password hashing and token generation
pub mod security;

/// Input validation and violation formatting
pub mod validation;
