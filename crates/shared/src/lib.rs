//! Shared utilities and common types for WardOps backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (kiosk key generation, hashing)
//! - Common validation logic

pub mod crypto;
pub mod validation;
