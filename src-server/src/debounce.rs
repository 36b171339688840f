//! Edit debouncing
//!
//! Code changes arrive on every keystroke; the preview only re-renders once
//! the source has been stable for the quiet period. Only the latest value is
//! delivered.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;

pub struct EditDebouncer {
    tx: mpsc::UnboundedSender<String>,
}

impl EditDebouncer {
    /// Spawn the debounce task. `on_settled` runs with the latest value after
    /// `delay` passes without a newer one; settled values are handled one at a
    /// time in submission order.
    pub fn spawn<F, Fut>(delay: Duration, mut on_settled: F) -> Self
    where
        F: FnMut(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => latest = value,
                            None => break,
                        },
                        _ = tokio::time::sleep(delay) => break,
                    }
                }
                on_settled(latest).await;
            }
            log::debug!("Edit debouncer stopped");
        });

        Self { tx }
    }

    /// Queue a new value, restarting the quiet period
    pub fn submit(&self, value: impl Into<String>) -> bool {
        self.tx.send(value.into()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, EditDebouncer) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let debouncer = EditDebouncer::spawn(Duration::from_millis(50), move |value| {
            let sink = sink.clone();
            async move {
                sink.lock().push(value);
            }
        });
        (seen, debouncer)
    }

    #[tokio::test]
    async fn test_burst_delivers_only_latest() {
        let (seen, debouncer) = recorder();
        debouncer.submit("a");
        debouncer.submit("ab");
        debouncer.submit("abc");

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(*seen.lock(), vec!["abc".to_string()]);
    }

    #[tokio::test]
    async fn test_separate_edits_each_settle() {
        let (seen, debouncer) = recorder();
        debouncer.submit("first");
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.submit("second");
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(*seen.lock(), vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn test_nothing_fires_before_quiet_period() {
        let (seen, debouncer) = recorder();
        debouncer.submit("x");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(seen.lock().is_empty());
    }
}
