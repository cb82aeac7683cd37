//! CLI command implementations

pub mod deploy;
pub mod info;
pub mod lifecycle;
