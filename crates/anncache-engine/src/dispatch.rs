//! Bounded worker pool for one batch of items.
//!
//! A pool is built fresh per batch and torn down when the batch completes;
//! nothing survives across batches. Workers claim items exclusively from a
//! shared queue, so no item is ever processed twice within one call, and a
//! failing item never disturbs its siblings.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::ProcessingError;
use crate::item::Item;
use crate::pipeline::AnalysisPipeline;

/// Process every item in `items` through `pipeline` using `concurrency`
/// workers, returning the failures keyed by item id.
///
/// Guarantees:
///
/// - each item is claimed by exactly one worker and processed exactly once,
///   for any `concurrency`;
/// - with `concurrency == 1` items are processed in submission order;
/// - a pipeline failure is caught, logged and recorded; the worker moves on
///   and the batch always runs to completion;
/// - the call returns only after every worker has finished its last item;
/// - successful items leave no trace in the returned map.
///
/// A `concurrency` of 0 is treated as 1. No lock is held across the
/// pipeline call itself; the queue and result locks only cover the claim
/// and record operations.
pub async fn submit_batch(
    items: Vec<Item>,
    pipeline: Arc<dyn AnalysisPipeline>,
    concurrency: usize,
) -> HashMap<i64, ProcessingError> {
    let workers = concurrency.max(1).min(items.len().max(1));
    let queue = Arc::new(Mutex::new(VecDeque::from(items)));
    let failures: Arc<Mutex<HashMap<i64, ProcessingError>>> =
        Arc::new(Mutex::new(HashMap::new()));

    let handles: Vec<_> = (0..workers)
        .map(|worker| {
            let queue = Arc::clone(&queue);
            let failures = Arc::clone(&failures);
            let pipeline = Arc::clone(&pipeline);

            tokio::spawn(async move {
                loop {
                    let claimed = { queue.lock().await.pop_front() };
                    let Some(item) = claimed else { break };

                    debug!(worker, item = %item, "claimed item");
                    match pipeline.process(&item).await {
                        Ok(()) => debug!(worker, item = %item, "pipeline succeeded"),
                        Err(cause) => {
                            warn!(worker, item = %item, error = %cause, "pipeline failed");
                            failures
                                .lock()
                                .await
                                .insert(item.id, ProcessingError { item, cause });
                        },
                    }
                }
            })
        })
        .collect();

    for joined in join_all(handles).await {
        if let Err(error) = joined {
            warn!(%error, "worker task did not run to completion");
        }
    }

    let mut failures = failures.lock().await;
    std::mem::take(&mut *failures)
}
