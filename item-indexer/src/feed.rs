//! Newline-delimited JSON input.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::IndexingError;
use item_indexer_pipeline::{ItemPipeline, PipelineError};

/// Counts for one pass over the input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedSummary {
    pub processed: usize,
    pub skipped: usize,
}

/// Push every line of `reader` through the pipeline.
///
/// Blank lines are ignored. Lines that are not JSON, and items the pipeline
/// rejects as records, are logged and skipped. Any other pipeline error stops
/// the feed and is returned.
pub async fn feed_lines<R, P>(reader: R, pipeline: &mut P) -> Result<FeedSummary, IndexingError>
where
    R: AsyncBufRead + Unpin,
    P: ItemPipeline<Value>,
{
    let mut lines = reader.lines();
    let mut summary = FeedSummary::default();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let item: Value = match serde_json::from_str(line) {
            Ok(item) => item,
            Err(e) => {
                warn!(error = %e, "Skipping line that is not valid JSON");
                summary.skipped += 1;
                continue;
            }
        };

        match pipeline.process_item(item).await {
            Ok(_) => summary.processed += 1,
            Err(PipelineError::InvalidRecord(e)) => {
                warn!(error = %e, "Skipping item");
                summary.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        "Reached end of input"
    );
    Ok(summary)
}
