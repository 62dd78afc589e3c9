//! Bounded log of recently shown words.
//!
//! [`RecencyLog`] keeps the last [`LOG_CAPACITY`] words in the order they were
//! shown, oldest first.  Appending past capacity drops the oldest entry.

use std::collections::VecDeque;

use thiserror::Error;

/// Number of words kept in the log.
pub const LOG_CAPACITY: usize = 10;

/// Index outside the current log contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Log index {index} out of range (log holds {len} words)")]
pub struct IndexError {
    pub index: usize,
    pub len: usize,
}

// ---------------------------------------------------------------------------
// RecencyLog
// ---------------------------------------------------------------------------

/// FIFO of recently shown words.
///
/// # Example
/// ```rust
/// use word_picker::words::RecencyLog;
///
/// let mut log = RecencyLog::new();
/// log.append("cat");
/// log.append("dog");
/// assert_eq!(log.snapshot(), vec!["cat", "dog"]);
/// assert_eq!(log.select(1).unwrap(), "dog");
/// ```
#[derive(Debug, Clone)]
pub struct RecencyLog {
    words: VecDeque<String>,
    capacity: usize,
}

impl RecencyLog {
    /// An empty log holding up to [`LOG_CAPACITY`] words.
    pub fn new() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }

    /// An empty log with a custom bound (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            words: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add `word` as the newest entry, evicting the oldest when full.
    pub fn append(&mut self, word: impl Into<String>) {
        if self.words.len() >= self.capacity {
            self.words.pop_front();
        }
        self.words.push_back(word.into());
    }

    /// Current contents, oldest first.
    pub fn snapshot(&self) -> Vec<&str> {
        self.words.iter().map(String::as_str).collect()
    }

    /// The word at `index` (0 = oldest).  The log is left unchanged.
    pub fn select(&self, index: usize) -> Result<&str, IndexError> {
        self.words
            .get(index)
            .map(String::as_str)
            .ok_or(IndexError {
                index,
                len: self.words.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecencyLog {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
