use std::io::{self, Read};

use crate::engine::tag::CancelToken;

pub type ProgressSink = Box<dyn FnMut(u8) + Send + 'static>;

/// Wraps an upload body and reports whole-percent progress as bytes are
/// pulled by the HTTP client. Reading fails once the token is cancelled,
/// which aborts the transfer.
pub struct ProgressReader<R> {
    inner: R,
    total: u64,
    sent: u64,
    last_percent: Option<u8>,
    sink: ProgressSink,
    cancel: CancelToken,
}

impl<R: Read> ProgressReader<R> {
    pub fn new(inner: R, total: u64, sink: ProgressSink, cancel: CancelToken) -> Self {
        Self {
            inner,
            total,
            sent: 0,
            last_percent: None,
            sink,
            cancel,
        }
    }

    fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.sent.min(self.total) * 100) / self.total) as u8
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.cancel.is_cancelled() {
            return Err(io::Error::other("upload cancelled"));
        }
        let n = self.inner.read(buf)?;
        self.sent += n as u64;
        let pct = self.percent();
        if self.last_percent.is_none_or(|last| pct > last) {
            self.last_percent = Some(pct);
            (self.sink)(pct);
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<u8>>>, ProgressSink) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink: ProgressSink = Box::new(move |p| sink_seen.lock().unwrap().push(p));
        (seen, sink)
    }

    #[test]
    fn reports_monotonic_percentages() {
        let data = vec![0u8; 400];
        let (seen, sink) = recorder();
        let mut reader = ProgressReader::new(&data[..], 400, sink, CancelToken::new());
        let mut buf = [0u8; 100];
        while reader.read(&mut buf).unwrap() > 0 {}

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[25, 50, 75, 100]);
    }

    #[test]
    fn cancelled_reader_errors() {
        let data = vec![0u8; 10];
        let (_seen, sink) = recorder();
        let cancel = CancelToken::new();
        let mut reader = ProgressReader::new(&data[..], 10, sink, cancel.clone());
        cancel.cancel();
        let mut buf = [0u8; 4];
        assert!(reader.read(&mut buf).is_err());
    }

    #[test]
    fn empty_body_reports_complete() {
        let (seen, sink) = recorder();
        let mut reader = ProgressReader::new(&[][..], 0, sink, CancelToken::new());
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(seen.lock().unwrap().as_slice(), &[100]);
    }
}
