//! Reads newline-delimited JSON items from stdin and feeds them through the
//! batching item pipeline.

use serde_json::Value;
use tokio::io::{self, BufReader};
use tokio::signal;
use tracing::{error, info};

use item_indexer::config::config_from_env;
use item_indexer::feed::feed_lines;
use item_indexer::telemetry::init_tracing;
use item_indexer::{Dependencies, IndexingError};
use item_indexer_pipeline::ItemPipeline;

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = config_from_env()?;
    let Dependencies { mut pipeline } = Dependencies::new(config).await?;

    ItemPipeline::<Value>::open(&mut pipeline).await?;
    let name = ItemPipeline::<Value>::name(&pipeline).to_string();
    info!(pipeline = %name, "Pipeline opened, reading items from stdin");

    // An interrupted flush leaves its batch buffered and its tasks pending,
    // so `close` below still submits and verifies them.
    let fed = tokio::select! {
        result = feed_lines(BufReader::new(io::stdin()), &mut pipeline) => result.map(|_| ()),
        _ = signal::ctrl_c() => {
            info!("Interrupted, closing pipeline");
            Ok(())
        }
    };

    let closed = ItemPipeline::<Value>::close(&mut pipeline).await;

    if let Err(ref e) = fed {
        error!(error = %e, "Feeding items failed");
    }
    if let Err(ref e) = closed {
        error!(error = %e, "Closing the pipeline failed");
    }

    info!(
        failed_tasks = pipeline.failed_tasks().len(),
        "Pipeline closed"
    );

    fed?;
    closed?;
    Ok(())
}
