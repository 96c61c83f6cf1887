//! HTTP and WebSocket request handlers
//!
//! This module organizes all API handlers into logical groups:
//! - `api` - Health check endpoint
//! - `metadata` - Project metadata from the `[meta]` table of the metadata file
//! - `session` - Session token issuance
//! - `voice_agent` - WebSocket relay to the voice agent

pub mod api;
pub mod metadata;
pub mod session;
pub mod voice_agent;

// Re-export commonly used handlers for convenient access
pub use voice_agent::voice_agent_handler;
