//! Domain module containing the documentation records served by the tools
//!
//! These types describe n8n nodes independently of how they are stored or
//! how they travel over MCP.

pub mod node;

pub use node::*;
