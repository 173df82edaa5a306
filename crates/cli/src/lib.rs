//! `variantgen` library half: configuration, input parsing, and subcommands.

pub mod commands;
pub mod config;
pub mod input;
