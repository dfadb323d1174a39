//! Keystroke debouncing for server-side search

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

#[derive(Debug, Default)]
struct Latest {
    generation: AtomicU64,
    term: Mutex<String>,
}

/// One keystroke's search request
///
/// A ticket goes stale as soon as a later keystroke is issued on any clone
/// of the [`Debounce`] that created it, including while it is settling.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    generation: u64,
    deadline: Instant,
    term: String,
    latest: Arc<Latest>,
}

impl SearchTicket {
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_current(&self) -> bool {
        self.latest.generation.load(Ordering::SeqCst) == self.generation
    }

    /// Wait out the quiet period; `false` if the ticket is (or became) stale
    ///
    /// Returns at once when the deadline has already passed.
    pub async fn settle(&self) -> bool {
        if !self.is_current() {
            return false;
        }
        sleep_until(self.deadline).await;
        self.is_current()
    }
}

impl PartialEq for SearchTicket {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.latest, &other.latest)
            && self.generation == other.generation
            && self.term == other.term
    }
}

impl Eq for SearchTicket {}

/// Lets only the latest of a burst of keystrokes through
///
/// Clones share the keystroke counter, so a clone held by the input side can
/// supersede tickets that are already waiting elsewhere.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    latest: Arc<Latest>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: Arc::default(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a keystroke; earlier tickets become stale
    pub fn issue(&self, term: impl Into<String>) -> SearchTicket {
        let term = term.into();
        *self
            .latest
            .term
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = term.clone();
        let generation = self.latest.generation.fetch_add(1, Ordering::SeqCst) + 1;

        SearchTicket {
            generation,
            deadline: Instant::now() + self.delay,
            term,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Term of the most recent keystroke
    pub fn latest_term(&self) -> String {
        self.latest
            .term
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_only_latest_ticket_settles() {
        let debounce = Debounce::new(Duration::from_millis(5));
        let first = debounce.issue("MH");
        let second = debounce.issue("MH12");

        assert!(!first.settle().await);
        assert!(second.settle().await);
        assert_eq!(second.term(), "MH12");
        assert_eq!(debounce.latest_term(), "MH12");
    }

    #[tokio::test]
    async fn test_keystroke_during_wait_supersedes_ticket() {
        let debounce = Debounce::new(Duration::from_millis(100));
        let waiting = debounce.issue("M");

        let input = debounce.clone();
        let typing = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            input.issue("MH")
        });

        assert!(!waiting.settle().await);
        let latest = typing.await.unwrap();
        assert!(latest.settle().await);
    }
}
