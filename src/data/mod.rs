//! Data layer - extraction constants

pub mod constants;
