//! Message-bus adapter (C9): decode/encode for the `CAPTURE` / `METADATA` /
//! `CLIP.STATUS` / `STATUS` wire shapes, and the dispatch function that
//! folds a decoded message onto an [`camwatch_episode::EpisodeController`]
//! call. The actual socket/broker client is out of scope — see
//! [`transport::BusTransport`].

pub mod dispatch;
pub mod error;
pub mod messages;
pub mod transport;

pub use dispatch::dispatch;
pub use error::{BusError, BusResult};
pub use messages::{decode_message, encode_status, BusMessage};
pub use transport::{BusTransport, StdioBusTransport};

#[cfg(any(test, feature = "test-util"))]
pub use transport::fixture;
