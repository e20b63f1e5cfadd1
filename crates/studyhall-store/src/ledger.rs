//! Typed ledger persistence over a `LocalStore`
//!
//! Loads heal silently: malformed or missing values come back as the
//! type-appropriate zero default, and invalid history entries are dropped
//! at the collection level. Saves are best-effort; on storage failure the
//! in-memory state remains the source of truth.

use std::sync::Arc;
use tracing::{debug, warn};

use studyhall_api::{HISTORY_CAPACITY, LedgerRecord, SessionEntry};

use crate::{LocalStore, codec};

/// Persisted key for today's ledger
pub const TODAY_KEY: &str = "stopwatch_today";
/// Persisted key for the all-time ledger
pub const ALL_TIME_KEY: &str = "stopwatch_alltime";
/// Persisted key for the session history
pub const SESSIONS_KEY: &str = "stopwatch_sessions";
/// Persisted key (plain string) for the last-seen calendar date
pub const LAST_DATE_KEY: &str = "stopwatch_lastdate";

/// Typed façade the stopwatch engine persists through
pub struct LedgerStore {
    store: Arc<dyn LocalStore>,
}

impl LedgerStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub fn load_today(&self) -> LedgerRecord {
        self.load_ledger(TODAY_KEY)
    }

    pub fn load_all_time(&self) -> LedgerRecord {
        self.load_ledger(ALL_TIME_KEY)
    }

    fn load_ledger(&self, key: &str) -> LedgerRecord {
        match self.store.get(key) {
            Ok(Some(encoded)) => codec::decode(&encoded).unwrap_or_else(|| {
                warn!(key, "Malformed ledger record, using zero default");
                LedgerRecord::default()
            }),
            Ok(None) => LedgerRecord::default(),
            Err(e) => {
                warn!(key, error = %e, "Ledger read failed, using zero default");
                LedgerRecord::default()
            }
        }
    }

    /// Load the session history. Filtering is per entry: one malformed
    /// or sub-second entry is dropped without losing its neighbors.
    pub fn load_history(&self) -> Vec<SessionEntry> {
        let raw: Vec<serde_json::Value> = match self.store.get(SESSIONS_KEY) {
            Ok(Some(encoded)) => codec::decode(&encoded).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "History read failed, starting empty");
                Vec::new()
            }
        };

        raw.into_iter()
            .filter_map(|value| serde_json::from_value::<SessionEntry>(value).ok())
            .filter(SessionEntry::is_valid)
            .take(HISTORY_CAPACITY)
            .collect()
    }

    /// Persist all three records as one logical unit.
    ///
    /// Returns `false` if any write failed; callers keep their in-memory
    /// state and may retry on the next mutation.
    pub fn save_all(
        &self,
        today: &LedgerRecord,
        all_time: &LedgerRecord,
        history: &[SessionEntry],
    ) -> bool {
        let capped = &history[..history.len().min(HISTORY_CAPACITY)];

        let result = codec::encode(today)
            .and_then(|v| self.store.set(TODAY_KEY, &v))
            .and_then(|_| codec::encode(all_time))
            .and_then(|v| self.store.set(ALL_TIME_KEY, &v))
            .and_then(|_| codec::encode(&capped))
            .and_then(|v| self.store.set(SESSIONS_KEY, &v));

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to save ledger data");
                false
            }
        }
    }

    /// Compare the stored calendar date against `today_stamp`; on a new
    /// day, zero the today ledger and stamp the date. The all-time ledger
    /// and history are untouched.
    ///
    /// Returns whether a rollover happened.
    pub fn roll_over_if_new_day(&self, today_stamp: &str) -> bool {
        let last = self.store.get(LAST_DATE_KEY).ok().flatten();

        if last.as_deref() == Some(today_stamp) {
            return false;
        }

        debug!(last = ?last, today = today_stamp, "Daily rollover");

        if let Err(e) = self.store.set(LAST_DATE_KEY, today_stamp) {
            warn!(error = %e, "Failed to stamp rollover date");
        }

        let zeroed = match codec::encode(&LedgerRecord::default()) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Failed to encode zero ledger");
                return true;
            }
        };
        if let Err(e) = self.store.set(TODAY_KEY, &zeroed) {
            warn!(error = %e, "Failed to reset today ledger");
        }

        true
    }

    /// Reset both ledgers and the history to empty and persist
    pub fn clear_all(&self) -> bool {
        self.save_all(&LedgerRecord::default(), &LedgerRecord::default(), &[])
    }
}
