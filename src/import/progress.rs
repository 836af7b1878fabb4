use tokio::sync::mpsc::UnboundedSender;

/// Snapshot published after each processed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub percent: u8,
    pub processed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub fn percent_complete(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (processed as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

pub struct ProgressReporter {
    sender: Option<UnboundedSender<Progress>>,
    total: usize,
    yield_every: usize,
}

impl ProgressReporter {
    pub fn new(sender: Option<UnboundedSender<Progress>>, total: usize, yield_every: usize) -> Self {
        Self {
            sender,
            total,
            yield_every,
        }
    }

    /// Publishes progress for the row just processed and periodically
    /// yields to the runtime. A closed receiver is ignored.
    pub async fn row_done(&self, processed: usize, succeeded: usize, failed: usize) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(Progress {
                percent: percent_complete(processed, self.total),
                processed,
                total: self.total,
                succeeded,
                failed,
            });
        }

        if self.yield_every > 0 && processed % self.yield_every == 0 {
            tokio::task::yield_now().await;
        }
    }
}
