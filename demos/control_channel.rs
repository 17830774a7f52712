//! Control channel demo: a `key=value` settings store behind an async channel.
//!
//! Run with:
//!     RUST_LOG=confbuf=debug cargo run --example control_channel

use std::collections::BTreeMap;

use confbuf::{AsyncControlChannel, BufferConfig, Interpreter, StagingBuffer};
use futures_util::io::{AsyncReadExt, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

/// Applies `key=value` lines and answers `ok <key>` or `err <line>`.
///
/// A reply that does not fit in the output buffer is kept in `pending` and
/// no further input is consumed until it has been written out.
#[derive(Default)]
struct Settings {
    line: Vec<u8>,
    pending: Vec<u8>,
    values: BTreeMap<String, String>,
}

impl Settings {
    fn apply(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.line).into_owned();
        self.line.clear();

        match line.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                self.values.insert(key.to_string(), value.to_string());
                format!("ok {}\n", key)
            }
            _ => format!("err {}\n", line),
        }
    }
}

impl Interpreter for Settings {
    fn interpret(&mut self, input: &mut StagingBuffer, output: &mut StagingBuffer) {
        loop {
            if !self.pending.is_empty() {
                let written = output.append(&self.pending).unwrap_or(0);
                self.pending.drain(..written);
                if !self.pending.is_empty() {
                    return;
                }
            }

            let Some(byte) = input.read_byte() else {
                return;
            };
            if byte != b'\n' {
                self.line.push(byte);
                continue;
            }
            let reply = self.apply();
            self.pending.extend_from_slice(reply.as_bytes());
        }
    }
}

/// Reads one reply line.
async fn read_line(mut stream: &AsyncControlChannel<Settings>) -> std::io::Result<String> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    while line.last() != Some(&b'\n') {
        stream.read_exact(&mut byte).await?;
        line.push(byte[0]);
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Small chunks so the commands below cross chunk boundaries
    let config = BufferConfig::new(4, 16).map_err(std::io::Error::from)?;
    let channel = AsyncControlChannel::with_interpreter(config, Settings::default());
    let mut stream = &channel;

    for command in ["mtu=1500\n", "rings=4\n", "bogus\n", "mode=native\n"] {
        stream.write_all(command.as_bytes()).await?;
        let reply = read_line(&channel).await?;
        println!("{:<14} -> {}", command.trim_end(), reply.trim_end());
    }

    stream.close().await
}
