//! CLI subcommand implementations for the Storeprobe binary.

pub mod audit_cmd;
pub mod cache_cmd;
pub mod doctor;
