//! `AquaNet` CLI Library
//!
//! Operator tooling for the access layer: inspect the permission catalog and
//! dry-run the route guard against a set of granted permissions.

pub mod catalog_cmd;
pub mod check_cmd;
pub mod cli;
pub mod config_cmd;
