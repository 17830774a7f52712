//! Staging buffer built on a chain of chunks.
//!
//! - [`StagingBuffer`] - Bounded append-at-tail, drain-at-head byte queue
//!
//! The standard `Read`/`Write` traits and `bytes::Buf` are implemented in
//! the `io` submodule.

mod io;
mod staging;

pub use staging::StagingBuffer;
