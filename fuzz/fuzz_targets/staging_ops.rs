#![no_main]

use std::collections::VecDeque;

use confbuf::{BufferConfig, StagingBuffer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: Vec<u8>| {
    if data.len() < 2 {
        return;
    }

    // First two bytes pick the configuration
    let max_chunks = (data[0] % 8) as usize + 1;
    let chunk_size = (data[1] % 64) as usize + 1;
    let mut buf = StagingBuffer::new(BufferConfig::new(max_chunks, chunk_size).unwrap());
    let mut model: VecDeque<u8> = VecDeque::new();
    let mut next = 0u8;

    // Remaining bytes are an op stream: low bits select the op, the rest is the size
    for &op in &data[2..] {
        let size = (op >> 2) as usize;
        match op & 0b11 {
            0 | 1 => {
                let allow_short = op & 1 == 1;
                if let Ok(region) = buf.reserve_write(size, allow_short) {
                    if !allow_short {
                        assert_eq!(region.len(), size);
                    }
                    assert!(region.len() <= size);
                    for byte in region.iter_mut() {
                        *byte = next;
                        model.push_back(next);
                        next = next.wrapping_add(1);
                    }
                }
            }
            2 => {
                let run = buf.peek_read(size).to_vec();
                assert!(run.len() <= size);
                for byte in run {
                    assert_eq!(Some(byte), model.pop_front());
                }
            }
            _ => {
                if size == 0 {
                    buf.destroy();
                    model.clear();
                } else {
                    assert_eq!(buf.read_byte(), model.pop_front());
                }
            }
        }

        // Verify: bound and unread length always agree with the model
        assert!(buf.chunk_count() <= max_chunks);
        assert_eq!(buf.len(), model.len());
    }

    // Verify: draining yields exactly what is left in the model
    let mut rest = Vec::new();
    loop {
        let run = buf.peek_read(usize::MAX);
        if run.is_empty() {
            break;
        }
        rest.extend_from_slice(run);
    }
    assert_eq!(rest, model.into_iter().collect::<Vec<_>>());
    assert_eq!(buf.chunk_count(), 0);
});
