//! Configuration management for nfconv.
//!
//! User preferences ([`settings::Config`]) are stored as a TOML file and
//! loaded at startup. Every setting can also be given on the command line.

pub mod settings;
