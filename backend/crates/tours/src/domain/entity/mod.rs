//! Entity Module

pub mod tour;
