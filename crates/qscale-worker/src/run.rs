//! Event intake: one JSON message per line.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info};

use qscale_eval::dispatcher::{DispatchOutcome, MessageDispatcher};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub ignored: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.processed + self.ignored + self.failed
    }
}

/// Dispatch every non-blank line of `reader`. A failed event is logged and
/// counted; intake carries on with the next line.
pub async fn run_events<R>(
    dispatcher: &MessageDispatcher,
    topic: &str,
    reader: R,
) -> std::io::Result<RunSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = RunSummary::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let payload = line.trim();
        if payload.is_empty() {
            continue;
        }
        match dispatcher.dispatch(topic, payload.as_bytes()).await {
            Ok(DispatchOutcome::Done) => summary.processed += 1,
            Ok(DispatchOutcome::Ignored) => summary.ignored += 1,
            Err(e) => {
                error!(line = line_no, error = %e, transient = e.is_transient(), "event failed");
                summary.failed += 1;
            }
        }
    }

    info!(
        topic,
        processed = summary.processed,
        ignored = summary.ignored,
        failed = summary.failed,
        "intake finished"
    );
    Ok(summary)
}
