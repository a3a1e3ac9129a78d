//! Upload progress notifications
//!
//! Each submission gets its own single-subscriber channel. The transport
//! holds the [`ProgressReporter`], the workflow holds the
//! [`ProgressReceiver`] and drops it as soon as the submission resolves, so
//! updates sent after that point go nowhere.

use tokio::sync::mpsc;

/// Create a reporter/receiver pair scoped to one submission
pub fn channel() -> (ProgressReporter, ProgressReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        ProgressReporter { sender, last: None },
        ProgressReceiver { receiver },
    )
}

/// `round(sent * 100 / total)`, clamped to 100. An empty body counts as done.
pub fn percent_complete(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let sent = u128::from(sent.min(total));
    let total = u128::from(total);
    let percent = (sent * 100 + total / 2) / total;
    u8::try_from(percent).unwrap_or(100).min(100)
}

/// Sending half, owned by the transport for the duration of one upload.
///
/// Values are forwarded only when they move forward, which keeps the
/// observed sequence monotonically non-decreasing.
#[derive(Debug)]
pub struct ProgressReporter {
    sender: mpsc::UnboundedSender<u8>,
    last: Option<u8>,
}

impl ProgressReporter {
    /// A reporter nobody listens to
    pub fn detached() -> Self {
        channel().0
    }

    pub fn report_bytes(&mut self, sent: u64, total: u64) {
        self.report_percent(percent_complete(sent, total));
    }

    pub fn report_percent(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        // A closed channel means the submission already resolved
        let _ = self.sender.send(percent);
    }

    pub fn last_reported(&self) -> Option<u8> {
        self.last
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Receiving half, owned by whoever drives the submission
#[derive(Debug)]
pub struct ProgressReceiver {
    receiver: mpsc::UnboundedReceiver<u8>,
}

impl ProgressReceiver {
    /// Next update, or `None` once the reporter is gone
    pub async fn recv(&mut self) -> Option<u8> {
        self.receiver.recv().await
    }

    /// Drain whatever is already buffered without waiting
    pub fn drain(&mut self) -> Vec<u8> {
        let mut updates = Vec::new();
        while let Ok(percent) = self.receiver.try_recv() {
            updates.push(percent);
        }
        updates
    }
}
