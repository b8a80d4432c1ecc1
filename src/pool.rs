use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

/// Fan-out/fan-in over `items` with at most `limit` tasks running at once.
///
/// Results come back in input order regardless of completion order.
/// Dropping the returned future cancels every task that has not finished.
pub async fn run_bounded<I, T, F, Fut>(items: I, limit: usize, task: F) -> Vec<T>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = T>,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let futures = items.into_iter().map(|item| {
        let semaphore = Arc::clone(&semaphore);
        let fut = task(item);
        async move {
            // The semaphore is never closed, so acquire cannot fail.
            let _permit = semaphore.acquire().await.ok();
            fut.await
        }
    });
    join_all(futures).await
}
