use std::future::Future;

use futures::stream::{self, StreamExt};

use super::types::{Mutation, MutationResult};
use crate::store::{DocumentStore, StoreError};

/// Apply a single mutation to the store.
pub async fn apply(store: &dyn DocumentStore, mutation: Mutation) -> Result<MutationResult, StoreError> {
    let operation = mutation.operation();
    let result = match mutation {
        Mutation::Create {
            collection,
            document,
        } => {
            let id = store.add(&collection, document).await?;
            MutationResult { id, operation }
        }
        Mutation::Update { path, document } => {
            store.set(&path, document).await?;
            MutationResult {
                id: path.id().to_string(),
                operation,
            }
        }
        Mutation::Delete { path } => {
            store.delete(&path).await?;
            MutationResult {
                id: path.id().to_string(),
                operation,
            }
        }
    };
    tracing::debug!(id = %result.id, operation = ?result.operation, "mutation applied");
    Ok(result)
}

/// Run every task with at most `limit` in flight and collect all outcomes.
///
/// Nothing is cancelled when a task fails; the caller decides what a failure
/// means for the batch. Outcomes are returned in completion order.
pub async fn run_bounded<F, T, E>(tasks: Vec<F>, limit: usize) -> Vec<Result<T, E>>
where
    F: Future<Output = Result<T, E>>,
{
    stream::iter(tasks)
        .buffer_unordered(limit.max(1))
        .collect()
        .await
}
