//! Bloom Library
//!
//! Pregnancy companion: calculators, records, and the MCP server over them.

pub mod build_info;
pub mod calculators;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod services;
pub mod tools;
