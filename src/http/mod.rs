//! HTTP and websocket API for sources, viewers and control clients
//!
//! REST surface:
//! - GET /health - Health check
//! - POST /sessions - Start a session
//! - GET /sessions/:id - Session stats
//! - POST /sessions/:id/end - End a session
//! - POST/GET /settings/:id - Accessibility settings
//!
//! Streaming surface:
//! - WS /ws/audio/:id - Audio sources push chunks
//! - WS /ws/summary/:id - Viewers receive summaries

mod handlers;
mod messages;
mod routes;
mod state;
mod ws;

pub use messages::AudioChunkMessage;
pub use routes::create_router;
pub use state::AppState;
