//! Batch execution demo: a flaky "render" work function run under a
//! concurrency limit, with and without stop-on-error.
//!
//! Run with: `RUST_LOG=debug cargo run --example batch_demo`

use std::time::{Duration, Instant};

use batchgate::{aggregate, BatchExecutor};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

async fn render(_cancel: CancellationToken, prompt: String) -> Result<String, String> {
    tokio::time::sleep(Duration::from_millis(30)).await;
    if prompt.is_empty() {
        Err("empty prompt".to_string())
    } else {
        Ok(format!("image for: {prompt}"))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prompts: Vec<String> = vec![
        "A red apple on a wooden table",
        "A green pear in a ceramic bowl",
        "",
        "A sliced orange showing segments",
        "A yellow banana on a white plate",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    let cancel = CancellationToken::new();

    println!("=== batch with concurrency 2 ===");
    let executor = BatchExecutor::new().with_concurrency(2);
    let start = Instant::now();
    let outcomes = executor.run(&cancel, prompts.clone(), render).await;
    println!(
        "processed {} items in {:?} ({} ok, {} failed)",
        outcomes.len(),
        start.elapsed(),
        aggregate::success_count(&outcomes),
        aggregate::failure_count(&outcomes),
    );
    for outcome in &outcomes {
        match &outcome.result {
            Ok(value) => println!("  [{}] {}", outcome.index, value),
            Err(error) => println!("  [{}] failed: {}", outcome.index, error),
        }
    }

    println!("\n=== same batch, stop on first error ===");
    let executor = BatchExecutor::new()
        .with_concurrency(1)
        .with_stop_on_error(true)
        .with_progress(|done, total| println!("  progress: {done}/{total}"));
    let outcomes = executor.run(&cancel, prompts, render).await;
    let summary = aggregate::summarize(&outcomes);
    println!(
        "total {}, succeeded {}, failed {}",
        summary.total, summary.succeeded, summary.failed
    );
}
