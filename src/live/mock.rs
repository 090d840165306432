use super::Transport;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// In-process transport. Frames pushed through the paired
/// [`MockTransportHandle`] are delivered by `receive`; frames sent by the
/// session are recorded for inspection.
pub struct MockTransport {
    inbound: mpsc::UnboundedReceiver<Result<String>>,
    sent: Arc<Mutex<Vec<String>>>,
    open_count: Arc<Mutex<usize>>,
    close_count: Arc<Mutex<usize>>,
    fail_sends_after: Option<usize>,
    fail_close: bool,
    is_open: bool,
}

/// Test-side end of a [`MockTransport`].
#[derive(Clone)]
pub struct MockTransportHandle {
    inbound: Arc<Mutex<Option<mpsc::UnboundedSender<Result<String>>>>>,
    sent: Arc<Mutex<Vec<String>>>,
    open_count: Arc<Mutex<usize>>,
    close_count: Arc<Mutex<usize>>,
}

impl MockTransport {
    pub fn new() -> (Self, MockTransportHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let open_count = Arc::new(Mutex::new(0));
        let close_count = Arc::new(Mutex::new(0));

        let transport = Self {
            inbound: rx,
            sent: sent.clone(),
            open_count: open_count.clone(),
            close_count: close_count.clone(),
            fail_sends_after: None,
            fail_close: false,
            is_open: false,
        };
        let handle = MockTransportHandle {
            inbound: Arc::new(Mutex::new(Some(tx))),
            sent,
            open_count,
            close_count,
        };

        (transport, handle)
    }

    /// Fail every send once `count` frames have been accepted.
    pub fn with_send_failure_after(mut self, count: usize) -> Self {
        self.fail_sends_after = Some(count);
        self
    }

    /// Make `close` report an error after recording the call.
    pub fn with_close_failure(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&mut self) -> Result<()> {
        *self.open_count.lock().unwrap() += 1;
        self.is_open = true;
        Ok(())
    }

    async fn send(&mut self, frame: String) -> Result<()> {
        if !self.is_open {
            return Err(Error::Transport("mock transport is not open".to_string()));
        }

        let mut sent = self.sent.lock().unwrap();
        if let Some(limit) = self.fail_sends_after {
            if sent.len() >= limit {
                return Err(Error::Transport("mock send failure".to_string()));
            }
        }
        sent.push(frame);
        Ok(())
    }

    async fn receive(&mut self) -> Option<Result<String>> {
        self.inbound.recv().await
    }

    async fn close(&mut self) -> Result<()> {
        *self.close_count.lock().unwrap() += 1;
        self.is_open = false;
        if self.fail_close {
            return Err(Error::Transport("mock close failure".to_string()));
        }
        Ok(())
    }
}

impl MockTransportHandle {
    pub fn push_frame(&self, frame: impl Into<String>) {
        self.push_result(Ok(frame.into()));
    }

    /// Queues a receive failure that closes the session.
    pub fn push_error(&self, message: impl Into<String>) {
        self.push_result(Err(Error::Transport(message.into())));
    }

    /// Queues exactly what the next `receive` returns.
    pub fn push_result(&self, result: Result<String>) {
        if let Some(tx) = self.inbound.lock().unwrap().as_ref() {
            let _ = tx.send(result);
        }
    }

    /// Ends the inbound stream, as if the peer closed the channel.
    pub fn finish(&self) {
        self.inbound.lock().unwrap().take();
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn open_count(&self) -> usize {
        *self.open_count.lock().unwrap()
    }

    pub fn close_count(&self) -> usize {
        *self.close_count.lock().unwrap()
    }
}
