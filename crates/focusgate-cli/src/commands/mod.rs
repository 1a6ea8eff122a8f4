pub mod blocked;
pub mod common;
pub mod config;
pub mod timer;
