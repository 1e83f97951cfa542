//! Stop-on-error semantics: the first failure halts admission of items not
//! yet dispatched, without aborting work already underway.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use batchgate::{aggregate, BatchExecutor, TaskError};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn failure_skips_items_not_yet_admitted() {
    // Three items at concurrency one: the empty prompt fails, so the third
    // item is never attempted and is marked skipped rather than failed.
    let executor = BatchExecutor::new()
        .with_concurrency(1)
        .with_stop_on_error(true);
    let cancel = CancellationToken::new();

    let items = vec!["ok".to_string(), "".to_string(), "ok".to_string()];
    let outcomes = executor
        .run(&cancel, items, |_c: CancellationToken, prompt: String| async move {
            if prompt.is_empty() {
                Err("empty prompt".to_string())
            } else {
                Ok(format!("rendered: {prompt}"))
            }
        })
        .await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].value(), Some(&"rendered: ok".to_string()));
    assert_eq!(
        outcomes[1].error().and_then(TaskError::work_error),
        Some(&"empty prompt".to_string())
    );
    assert!(outcomes[2].error().is_some_and(TaskError::is_skipped));
}

#[tokio::test]
async fn skip_is_distinct_from_cancellation() {
    let executor = BatchExecutor::new()
        .with_concurrency(1)
        .with_stop_on_error(true);
    let cancel = CancellationToken::new();

    let outcomes = executor
        .run(&cancel, vec![0u32, 1, 2], |_c: CancellationToken, n: u32| async move {
            if n == 0 {
                Err(format!("bad item {n}"))
            } else {
                Ok(n)
            }
        })
        .await;

    for outcome in &outcomes[1..] {
        let error = outcome.error().expect("later items should be skipped");
        assert!(error.is_skipped());
        assert!(!error.is_cancelled());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dispatched_items_run_to_completion() {
    // Item 0 fails quickly while item 1 is already in flight. Item 1 keeps
    // its real outcome; only item 2, not yet admitted, is skipped.
    let executor = BatchExecutor::new()
        .with_concurrency(2)
        .with_stop_on_error(true);
    let cancel = CancellationToken::new();

    let outcomes = executor
        .run(&cancel, vec![0u32, 1, 2], |_c: CancellationToken, n: u32| async move {
            match n {
                0 => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Err(format!("item {n} failed"))
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(250)).await;
                    Ok(n)
                }
            }
        })
        .await;

    assert!(outcomes[0].error().is_some_and(|e| e.work_error().is_some()));
    assert_eq!(outcomes[1].value(), Some(&1));
    assert!(outcomes[2].error().is_some_and(TaskError::is_skipped));
}

#[tokio::test]
async fn disabled_stop_attempts_every_item() {
    // Without stop-on-error, sibling failures never cause skips: every item
    // is attempted exactly once.
    let executor = BatchExecutor::new().with_concurrency(2);
    let cancel = CancellationToken::new();

    let attempts = Arc::new(AtomicUsize::new(0));
    let work = {
        let attempts = Arc::clone(&attempts);
        move |_c: CancellationToken, n: u32| {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 {
                    Err(format!("even item {n}"))
                } else {
                    Ok(n)
                }
            }
        }
    };

    let outcomes = executor.run(&cancel, (0u32..10).collect(), work).await;

    assert_eq!(attempts.load(Ordering::SeqCst), 10);
    assert_eq!(aggregate::success_count(&outcomes), 5);
    assert_eq!(aggregate::failure_count(&outcomes), 5);
    assert!(aggregate::failures(&outcomes)
        .iter()
        .all(|e| e.work_error().is_some()));
}

#[tokio::test]
async fn first_item_failing_skips_the_rest() {
    let executor = BatchExecutor::new()
        .with_concurrency(1)
        .with_stop_on_error(true);
    let cancel = CancellationToken::new();

    let attempts = Arc::new(AtomicUsize::new(0));
    let work = {
        let attempts = Arc::clone(&attempts);
        move |_c: CancellationToken, _n: u32| {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>("always fails".to_string())
            }
        }
    };

    let outcomes = executor.run(&cancel, (0u32..8).collect(), work).await;

    // Only the first item ran; the stop flag was already set for the rest.
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(outcomes[0].error().is_some_and(|e| e.work_error().is_some()));
    for outcome in &outcomes[1..] {
        assert!(outcome.error().is_some_and(TaskError::is_skipped));
    }
}
