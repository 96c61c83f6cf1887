pub mod auth;

// Re-export middleware functions
pub use auth::subprotocol_auth_middleware;
