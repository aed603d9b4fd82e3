//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (CSPRNG, SHA-256)
//! - One-time codes and reset tokens (hashed at rest)
//! - Password hashing (Argon2id) and password policy

pub mod crypto;
pub mod otp;
pub mod password;
