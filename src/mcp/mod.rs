//! MCP server

mod server;

pub use server::{BloomContext, BloomService};
