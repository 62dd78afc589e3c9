//! Word data: the loaded spreadsheet grid and the log of recent picks.
//!
//! # Quick start
//!
//! ```rust
//! use rand::SeedableRng;
//! use word_picker::words::{RecencyLog, TabularData, WordSource};
//!
//! let mut source = WordSource::new();
//! source
//!     .load_grid(TabularData::from_rows(vec![vec!["cat", "dog"], vec!["fish"]]))
//!     .unwrap();
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(3);
//! let mut log = RecencyLog::new();
//! let word = source.pick_random(&mut rng).unwrap();
//! log.append(word);
//! assert_eq!(log.len(), 1);
//! ```

pub mod recency;
pub mod source;

pub use recency::{IndexError, RecencyLog, LOG_CAPACITY};
pub use source::{read_grid, TabularData, WordSource, WordSourceError};
