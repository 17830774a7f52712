//! confbuf
//!
//! Bounded, chained byte staging for control channels.
//!
//! A [`StagingBuffer`] queues bytes between a producer and a consumer
//! without needing one contiguous allocation per operation. Producers
//! reserve contiguous regions at the tail, either of an exact size or "as
//! much as the current chunk has left". Consumers take contiguous runs from
//! the head and the buffer releases chunks as they are emptied. A hard cap
//! on live chunks is the back-pressure signal.
//!
//! The crate intentionally:
//! - does NOT define the format of the bytes it carries
//! - does NOT perform I/O itself
//! - does NOT lock inside the buffer (see [`ControlChannel`] for a locked pair)
//! - does NOT seek; bytes leave in the order they arrived
//!
//! # Sync
//!
//! ```
//! use confbuf::{BufferConfig, StagingBuffer};
//!
//! let mut buf = StagingBuffer::new(BufferConfig::new(2, 8)?);
//!
//! buf.reserve_write(5, false)?.copy_from_slice(b"AAAAA");
//! let short = buf.reserve_write(5, true)?;
//! assert_eq!(short.len(), 3);
//! short.copy_from_slice(b"BBB");
//! buf.reserve_write(5, false)?.copy_from_slice(b"CCCCC");
//!
//! assert_eq!(buf.peek_read(100), b"AAAAABBB");
//! assert_eq!(buf.peek_read(100), b"CCCCC");
//! assert!(buf.peek_read(100).is_empty());
//! # Ok::<(), confbuf::BufferError>(())
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use futures_util::io::{AsyncReadExt, AsyncWriteExt};
//! use confbuf::{AsyncControlChannel, BufferConfig};
//!
//! async fn demo(mut channel: AsyncControlChannel<MyInterpreter>) -> std::io::Result<()> {
//!     channel.write_all(b"set mtu 1500\n").await?;
//!
//!     let mut reply = [0u8; 64];
//!     let n = channel.read(&mut reply).await?;
//!     println!("reply {:?}", &reply[..n]);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod channel;
mod chunk;
mod config;
mod error;

//
// Public surface
//

pub use buffer::StagingBuffer;
pub use channel::{ChannelStats, ControlChannel, Interpreter, NoopInterpreter};
pub use chunk::{Chunk, ChunkChain};
pub use config::{BufferConfig, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CHUNKS};
pub use error::BufferError;

#[cfg(feature = "async-io")]
pub use channel::AsyncControlChannel;
