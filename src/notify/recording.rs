use tokio::sync::mpsc;

use super::{Notice, NotifyError};

pub type Sent = (String, Notice);

/// Captures notices on a channel so tests can await delivery.
#[derive(Clone)]
pub struct RecordingMailer {
    tx: mpsc::UnboundedSender<Sent>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Sent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, fail: false }, rx)
    }

    /// Records the notice, then reports a delivery failure.
    pub fn failing() -> (Self, mpsc::UnboundedReceiver<Sent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, fail: true }, rx)
    }

    pub fn send(&self, to: &str, notice: &Notice) -> Result<(), NotifyError> {
        let _ = self.tx.send((to.to_string(), notice.clone()));
        if self.fail {
            return Err(NotifyError::Delivery("recording mailer set to fail".into()));
        }
        Ok(())
    }
}
