//! Real-time caption streaming
//!
//! This module holds the core of the service:
//! - `messages`: the tagged wire protocol spoken on the duplex channel
//! - `StreamingCoordinator`: drives transcribe -> translate -> persist for
//!   each inbound audio chunk and emits results on the same connection
//! - `CaptionChannel`: the client side of the channel, with a bounded connect
//!   timeout and a fixed-delay reconnect policy after abnormal closure

mod channel;
mod coordinator;
mod messages;

pub use channel::{CaptionChannel, ChannelConfig};
pub use coordinator::{duration_confidence, StreamingCoordinator};
pub use messages::{ClientMessage, ServerMessage};
