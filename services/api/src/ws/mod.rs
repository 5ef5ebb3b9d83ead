//! WebSocket Viewer Sessions
//!
//! This module hosts one step-sequence viewer per WebSocket connection. It is
//! structured into submodules for clarity:
//!
//! - `protocol`: Defines the JSON-based message format for client-server communication.
//! - `session`: Manages the WebSocket connection lifecycle, from handshake to termination.
//! - `player`: Forwards clip playback to the client and routes its acknowledgements back.

pub mod player;
pub mod protocol;
pub mod session;

pub use session::ws_handler;
