//! Storage layer: the local watchlist file.

mod error;
pub use error::StoreError;

mod watchlist;
pub use watchlist::{HistoryAction, HistoryEvent, TrackedItem, Watchlist, WatchlistStore};
