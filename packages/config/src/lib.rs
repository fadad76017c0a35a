// ABOUTME: Configuration constants for Reqhub
// ABOUTME: Environment variable names and their defaults

pub mod constants;

pub use constants::*;
