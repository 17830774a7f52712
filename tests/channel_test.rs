// Integration tests for the ControlChannel collaborator
// Tests cover: interpreter hook, back-pressure, shutdown ordering, async adapter

use std::sync::{Arc, Mutex};

use confbuf::{BufferConfig, BufferError, ControlChannel, Interpreter, StagingBuffer};

/// Answers every complete line with its length, e.g. `"hello\n"` -> `"5\n"`.
///
/// Incomplete lines stay in the input buffer until more bytes arrive.
#[derive(Default)]
struct LineLength {
    line: Vec<u8>,
    log: Arc<Mutex<Vec<String>>>,
}

impl Interpreter for LineLength {
    fn interpret(&mut self, input: &mut StagingBuffer, output: &mut StagingBuffer) {
        while let Some(byte) = input.read_byte() {
            if byte != b'\n' {
                self.line.push(byte);
                continue;
            }

            let reply = format!("{}\n", self.line.len());
            self.log
                .lock()
                .unwrap()
                .push(String::from_utf8_lossy(&self.line).into_owned());
            self.line.clear();

            if output.append(reply.as_bytes()).is_err() {
                break;
            }
        }
    }
}

fn read_all(channel: &ControlChannel<LineLength>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = [0u8; 7];
    loop {
        let n = channel.read(&mut buf);
        if n == 0 {
            return out;
        }
        out.extend_from_slice(&buf[..n]);
    }
}

// ============================================================================
// Interpreter Hook
// ============================================================================

#[test]
fn test_parse_turns_input_into_output() {
    let channel = ControlChannel::with_interpreter(
        BufferConfig::new(4, 8).unwrap(),
        LineLength::default(),
    );

    channel.write(b"hello\nab").unwrap();
    channel.parse();
    assert_eq!(read_all(&channel), b"5\n");

    channel.write(b"c\n\n").unwrap();
    channel.parse();
    assert_eq!(read_all(&channel), b"3\n0\n");
}

#[test]
fn test_read_before_parse_is_empty() {
    let channel = ControlChannel::with_interpreter(
        BufferConfig::default(),
        LineLength::default(),
    );
    channel.write(b"pending\n").unwrap();

    let mut buf = [0u8; 8];
    assert_eq!(channel.read(&mut buf), 0);
    assert_eq!(channel.stats().input_bytes, 8);
}

// ============================================================================
// Back-Pressure
// ============================================================================

#[test]
fn test_input_back_pressure_relieved_by_parse() {
    let channel = ControlChannel::with_interpreter(
        BufferConfig::new(1, 4).unwrap(),
        LineLength::default(),
    );

    assert_eq!(channel.write(b"abcdefgh").unwrap(), 4);
    assert!(matches!(
        channel.write(b"x"),
        Err(BufferError::ResourceExhausted { max_chunks: 1 })
    ));

    channel.parse();
    assert_eq!(channel.write(b"\n").unwrap(), 1);
    channel.parse();
    assert_eq!(read_all(&channel), b"4\n");
}

// ============================================================================
// Shutdown
// ============================================================================

#[test]
fn test_shutdown_interprets_pending_input_first() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let interpreter = LineLength {
        line: Vec::new(),
        log: log.clone(),
    };
    let channel = ControlChannel::with_interpreter(BufferConfig::default(), interpreter);

    channel.write(b"last words\n").unwrap();
    channel.shutdown();

    assert_eq!(*log.lock().unwrap(), vec!["last words".to_string()]);
    assert!(channel.is_closed());

    // Replies produced during shutdown are released with the buffers.
    let mut buf = [0u8; 8];
    assert_eq!(channel.read(&mut buf), 0);
    assert_eq!(channel.write(b"more"), Err(BufferError::ChannelClosed));
}

#[test]
fn test_drop_interprets_pending_input() {
    let log = Arc::new(Mutex::new(Vec::new()));
    {
        let channel = ControlChannel::with_interpreter(
            BufferConfig::default(),
            LineLength {
                line: Vec::new(),
                log: log.clone(),
            },
        );
        channel.write(b"a\nbb\n").unwrap();
    }
    assert_eq!(log.lock().unwrap().len(), 2);
}

// ============================================================================
// Async Adapter
// ============================================================================

#[cfg(feature = "async-io")]
mod async_io {
    use std::sync::Arc;

    use confbuf::{AsyncControlChannel, BufferConfig};
    use futures_util::io::{AsyncReadExt, AsyncWriteExt};

    use super::LineLength;

    #[tokio::test]
    async fn test_request_reply() {
        let mut channel = AsyncControlChannel::with_interpreter(
            BufferConfig::new(2, 8).unwrap(),
            LineLength::default(),
        );

        channel.write_all(b"four\n").await.unwrap();

        let mut reply = [0u8; 2];
        channel.read_exact(&mut reply).await.unwrap();
        assert_eq!(&reply, b"4\n");
    }

    #[tokio::test]
    async fn test_reader_woken_by_writer() {
        let channel = Arc::new(AsyncControlChannel::with_interpreter(
            BufferConfig::new(2, 8).unwrap(),
            LineLength::default(),
        ));

        let reader = {
            let channel = channel.clone();
            tokio::spawn(async move {
                let mut r = &*channel;
                let mut reply = [0u8; 3];
                r.read_exact(&mut reply).await.unwrap();
                reply
            })
        };

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let mut w = &*channel;
        w.write_all(b"0123456789\n").await.unwrap();

        assert_eq!(&reader.await.unwrap(), b"10\n");
    }

    #[tokio::test]
    async fn test_close_wakes_parked_reader() {
        let channel = Arc::new(AsyncControlChannel::new(BufferConfig::default()));

        let reader = {
            let channel = channel.clone();
            tokio::spawn(async move {
                let mut r = &*channel;
                let mut out = Vec::new();
                r.read_to_end(&mut out).await.unwrap();
                out
            })
        };

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let mut w = &*channel;
        w.close().await.unwrap();

        assert!(reader.await.unwrap().is_empty());
    }
}
