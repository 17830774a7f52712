//! Control channel built from a pair of staging buffers.
//!
//! - [`ControlChannel`] - Input and output buffers behind a single lock
//! - [`Interpreter`] - Hook that turns buffered input into output
//! - `AsyncControlChannel` - `futures-io` adapter (requires `async-io`)

#[cfg(feature = "async-io")]
mod async_io;
mod control;

pub use control::{ChannelStats, ControlChannel, Interpreter, NoopInterpreter};

#[cfg(feature = "async-io")]
pub use async_io::AsyncControlChannel;
