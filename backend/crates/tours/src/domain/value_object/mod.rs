//! Value Object Module

pub mod difficulty;
pub mod tour_name;
