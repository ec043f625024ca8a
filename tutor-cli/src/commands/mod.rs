//! CLI subcommands

pub mod enroll;
pub mod serve;
