//! Raw PCM from a byte stream (stdin, a pipe, a socket).
//!
//! A reader thread turns little-endian s16 bytes into sample chunks and hands
//! them over a bounded channel, so `read_samples` can honour a timeout even
//! when the underlying reader cannot.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::Duration;

use crate::error::ReadError;

use super::source::SampleSource;

/// Chunks in flight between the reader thread and the consumer.
const CHANNEL_DEPTH: usize = 8;
const READ_BYTES: usize = 4096;

enum Message {
    Samples(Vec<i16>),
    Failed(String),
}

pub struct StreamSource {
    sample_rate: u32,
    rx: Receiver<Message>,
    pending: VecDeque<i16>,
    finished: bool,
}

impl StreamSource {
    pub fn new<R: Read + Send + 'static>(reader: R, sample_rate: u32) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::sync_channel(CHANNEL_DEPTH);
        thread::Builder::new()
            .name("pcm-reader".into())
            .spawn(move || pump(reader, tx))?;

        Ok(Self {
            sample_rate,
            rx,
            pending: VecDeque::new(),
            finished: false,
        })
    }

    fn drain_into(&mut self, buf: &mut [i16]) -> usize {
        let n = buf.len().min(self.pending.len());
        for (slot, s) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = s;
        }
        n
    }
}

impl SampleSource for StreamSource {
    fn read_samples(&mut self, buf: &mut [i16], timeout: Option<Duration>) -> Result<usize, ReadError> {
        while self.pending.len() < buf.len() && !self.finished {
            let message = match timeout {
                Some(t) => match self.rx.recv_timeout(t) {
                    Ok(m) => m,
                    Err(RecvTimeoutError::Timeout) => return Err(ReadError::Timeout(t)),
                    Err(RecvTimeoutError::Disconnected) => {
                        self.finished = true;
                        break;
                    }
                },
                None => match self.rx.recv() {
                    Ok(m) => m,
                    Err(_) => {
                        self.finished = true;
                        break;
                    }
                },
            };

            match message {
                Message::Samples(chunk) => self.pending.extend(chunk),
                Message::Failed(reason) => return Err(ReadError::Failed(reason)),
            }
        }

        if self.pending.is_empty() && self.finished {
            return Err(ReadError::EndOfStream);
        }
        Ok(self.drain_into(buf))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

fn pump<R: Read>(mut reader: R, tx: SyncSender<Message>) {
    let mut bytes = [0u8; READ_BYTES];
    // Odd trailing byte carried into the next read
    let mut carry: Option<u8> = None;

    loop {
        let n = match reader.read(&mut bytes) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("PCM reader stopped: {}", e);
                let _ = tx.send(Message::Failed(e.to_string()));
                break;
            }
        };

        let mut data = &bytes[..n];
        let mut samples = Vec::with_capacity(n / 2 + 1);
        if let Some(lo) = carry.take() {
            samples.push(i16::from_le_bytes([lo, data[0]]));
            data = &data[1..];
        }
        let mut pairs = data.chunks_exact(2);
        for pair in &mut pairs {
            samples.push(i16::from_le_bytes([pair[0], pair[1]]));
        }
        carry = pairs.remainder().first().copied();

        if !samples.is_empty() && tx.send(Message::Samples(samples)).is_err() {
            // Consumer is gone
            break;
        }
    }

    if carry.is_some() {
        log::debug!("PCM stream ended on an odd byte; dropped it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn pcm(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn reads_little_endian_chunks() {
        let input: Vec<i16> = (0..100).map(|i| i * 300 - 15000).collect();
        let mut source = StreamSource::new(Cursor::new(pcm(&input)), 16000).unwrap();
        let mut buf = [0i16; 64];

        assert_eq!(source.read_samples(&mut buf, None), Ok(64));
        assert_eq!(&buf[..], &input[..64]);
        assert_eq!(source.read_samples(&mut buf, None), Ok(36));
        assert_eq!(&buf[..36], &input[64..]);
        assert_eq!(source.read_samples(&mut buf, None), Err(ReadError::EndOfStream));
        assert_eq!(source.sample_rate(), 16000);
    }

    /// Hands out its bytes one at a time to exercise odd-length reads.
    struct Trickle(Vec<u8>, usize);

    impl Read for Trickle {
        fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
            if self.1 >= self.0.len() || out.is_empty() {
                return Ok(0);
            }
            out[0] = self.0[self.1];
            self.1 += 1;
            Ok(1)
        }
    }

    #[test]
    fn reassembles_split_samples() {
        let input = [1i16, -2, 300, -32768, 32767];
        let mut source = StreamSource::new(Trickle(pcm(&input), 0), 8000).unwrap();
        let mut buf = [0i16; 5];
        assert_eq!(source.read_samples(&mut buf, None), Ok(5));
        assert_eq!(buf, input);
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::Other, "device unplugged"))
        }
    }

    #[test]
    fn reader_failure_is_reported_then_stream_ends() {
        let mut source = StreamSource::new(Broken, 8000).unwrap();
        let mut buf = [0i16; 4];
        assert!(matches!(source.read_samples(&mut buf, None), Err(ReadError::Failed(_))));
        assert_eq!(source.read_samples(&mut buf, None), Err(ReadError::EndOfStream));
    }

    /// Never produces data and never closes.
    struct Stalled(std::sync::mpsc::Receiver<()>);

    impl Read for Stalled {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[test]
    fn times_out_when_no_data_arrives() {
        let (hold, rx) = std::sync::mpsc::channel();
        let mut source = StreamSource::new(Stalled(rx), 8000).unwrap();
        let mut buf = [0i16; 4];
        let timeout = Duration::from_millis(20);
        assert_eq!(source.read_samples(&mut buf, Some(timeout)), Err(ReadError::Timeout(timeout)));
        drop(hold);
        assert_eq!(source.read_samples(&mut buf, None), Err(ReadError::EndOfStream));
    }
}
