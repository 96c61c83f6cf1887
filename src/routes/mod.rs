pub mod api;
pub mod voice_agent;
