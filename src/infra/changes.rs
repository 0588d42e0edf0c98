//! Table change feed backing the reactive read streams.
//!
//! Writers publish the tables they touched; an observed query re-runs each
//! time one of the tables it reads from changes, and yields the fresh
//! result. Dropping the stream drops its subscription.

use std::future::Future;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::config::CHANGE_FEED_CAPACITY;

/// Tables that can be observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Products,
    Orders,
    OrderItems,
    CartItems,
    FavoriteItems,
}

#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<Table>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self { sender }
    }

    /// Publish a change to one table.
    pub fn notify(&self, table: Table) {
        // No subscribers is the common case
        let _ = self.sender.send(table);
    }

    /// Publish changes to several tables.
    pub fn notify_all(&self, tables: &[Table]) {
        for table in tables {
            self.notify(*table);
        }
    }

    /// Observe a query: yields its result immediately, then again after
    /// every change to one of `tables`.
    ///
    /// A lagging subscriber skips the missed events and re-queries once.
    pub fn watch<T, F, Fut>(&self, tables: &'static [Table], fetch: F) -> BoxStream<'static, T>
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let receiver = self.sender.subscribe();

        stream::unfold(
            (receiver, fetch, true),
            move |(mut receiver, fetch, first)| async move {
                if !first {
                    loop {
                        match receiver.recv().await {
                            Ok(table) if tables.contains(&table) => break,
                            Ok(_) => continue,
                            Err(RecvError::Lagged(skipped)) => {
                                tracing::debug!(skipped, "Change feed subscriber lagged");
                                break;
                            }
                            Err(RecvError::Closed) => return None,
                        }
                    }
                }

                let value = fetch().await;
                Some((value, (receiver, fetch, false)))
            },
        )
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_stream(feed: &ChangeFeed, tables: &'static [Table]) -> BoxStream<'static, usize> {
        let calls = Arc::new(AtomicUsize::new(0));
        feed.watch(tables, move || {
            let calls = calls.clone();
            async move { calls.fetch_add(1, Ordering::SeqCst) + 1 }
        })
    }

    #[tokio::test]
    async fn test_emits_initial_value() {
        let feed = ChangeFeed::new();
        let mut stream = counting_stream(&feed, &[Table::Products]);

        assert_eq!(stream.next().await, Some(1));
    }

    #[tokio::test]
    async fn test_reemits_on_relevant_change_only() {
        let feed = ChangeFeed::new();
        let mut stream = counting_stream(&feed, &[Table::CartItems]);
        assert_eq!(stream.next().await, Some(1));

        feed.notify(Table::Users);
        feed.notify(Table::CartItems);
        assert_eq!(stream.next().await, Some(2));

        feed.notify_all(&[Table::Orders, Table::CartItems]);
        assert_eq!(stream.next().await, Some(3));
    }

    #[tokio::test]
    async fn test_ends_when_feed_is_dropped() {
        let feed = ChangeFeed::new();
        let mut stream = counting_stream(&feed, &[Table::Orders]);
        assert_eq!(stream.next().await, Some(1));

        drop(feed);
        assert_eq!(stream.next().await, None);
    }
}
