//! Log output that waits until the terminal is handed back
//!
//! While the TUI owns the alternate screen, anything written to stderr lands
//! on top of the frame. [`HeldLog`] buffers formatted records until
//! [`HeldLog::release`] is called, then writes the backlog to its target and
//! passes later records straight through.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Default)]
struct Held {
    buffer: Vec<u8>,
    released: bool,
}

/// `MakeWriter` that holds records back until released
#[derive(Clone)]
pub struct HeldLog<M> {
    target: M,
    state: Arc<Mutex<Held>>,
}

impl<M> HeldLog<M> {
    pub fn new(target: M) -> Self {
        Self {
            target,
            state: Arc::new(Mutex::new(Held::default())),
        }
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Held>> {
        self.state
            .lock()
            .map_err(|_| io::Error::other("log buffer lock poisoned"))
    }

    /// Bytes waiting for release
    pub fn pending(&self) -> usize {
        self.lock().map(|held| held.buffer.len()).unwrap_or(0)
    }
}

impl<M> HeldLog<M>
where
    M: for<'a> MakeWriter<'a>,
{
    /// Write the backlog to the target and stop holding
    pub fn release(&self) -> io::Result<()> {
        let backlog = {
            let mut held = self.lock()?;
            held.released = true;
            std::mem::take(&mut held.buffer)
        };
        if backlog.is_empty() {
            return Ok(());
        }
        let mut writer = self.target.make_writer();
        writer.write_all(&backlog)?;
        writer.flush()
    }
}

impl<'a, M> MakeWriter<'a> for HeldLog<M>
where
    M: MakeWriter<'a> + 'a,
{
    type Writer = HeldWriter<'a, M>;

    fn make_writer(&'a self) -> Self::Writer {
        HeldWriter { log: self }
    }
}

pub struct HeldWriter<'a, M> {
    log: &'a HeldLog<M>,
}

impl<'a, M> Write for HeldWriter<'a, M>
where
    M: MakeWriter<'a>,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let log: &'a HeldLog<M> = self.log;
        let mut held = log.lock()?;
        if held.released {
            drop(held);
            return log.target.make_writer().write(buf);
        }
        held.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shared in-memory sink usable as a `MakeWriter` target
    #[derive(Clone)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Sink {
        type Writer = Sink;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn captured(sink: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(sink.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn test_held_until_release() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let log = HeldLog::new(Sink(sink.clone()));

        log.make_writer().write_all(b"first\n").unwrap();
        assert_eq!(log.pending(), 6);
        assert_eq!(captured(&sink), "");

        log.release().unwrap();
        assert_eq!(log.pending(), 0);
        assert_eq!(captured(&sink), "first\n");

        log.make_writer().write_all(b"second\n").unwrap();
        assert_eq!(captured(&sink), "first\nsecond\n");
    }

    #[test]
    fn test_release_without_backlog() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let log = HeldLog::new(Sink(sink.clone()));
        log.release().unwrap();
        log.release().unwrap();
        assert_eq!(captured(&sink), "");
    }
}
