//! Stopwatch state machine and ledger accumulation

use chrono::{DateTime, Local};
use std::time::Duration;
use tracing::{debug, error, info};

use studyhall_api::{HISTORY_CAPACITY, LedgerRecord, MIN_SESSION_MS, SessionEntry};
use studyhall_store::LedgerStore;
use studyhall_util::{
    MonotonicInstant, day_stamp, format_elapsed, format_entry_date, format_entry_time,
};

/// Stopwatch states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwatchState {
    Idle,
    Running,
}

/// Outcome of a commit attempt
#[derive(Debug)]
pub enum CommitOutcome {
    /// Session recorded and ledgers advanced. `persisted` is false when
    /// the save failed; in-memory state is still the source of truth.
    Saved {
        entry: SessionEntry,
        persisted: bool,
    },
    /// Elapsed under one second; nothing changed
    TooShort,
    /// The built entry failed validation; nothing changed
    Invalid,
    /// A ledger total would wrap; nothing changed
    Overflow,
}

/// The stopwatch engine.
///
/// Owns the in-memory ledgers and history, persisting through a
/// `LedgerStore` after every mutation. All operations take explicit
/// time parameters so state transitions are deterministic under test.
pub struct Stopwatch {
    ledger: LedgerStore,
    today: LedgerRecord,
    all_time: LedgerRecord,
    history: Vec<SessionEntry>,

    /// Elapsed time accumulated before the current run segment
    carried: Duration,
    /// Start of the current run segment; `Some` iff running
    run_started: Option<MonotonicInstant>,
}

impl Stopwatch {
    /// Load persisted state, applying the daily rollover first
    pub fn load(ledger: LedgerStore, now: &DateTime<Local>) -> Self {
        let rolled = ledger.roll_over_if_new_day(&day_stamp(now));
        if rolled {
            info!("New day, today's ledger reset");
        }

        let today = ledger.load_today();
        let all_time = ledger.load_all_time();
        let history = ledger.load_history();

        debug!(
            today_ms = today.total_ms,
            all_time_ms = all_time.total_ms,
            history_len = history.len(),
            "Stopwatch state loaded"
        );

        Self {
            ledger,
            today,
            all_time,
            history,
            carried: Duration::ZERO,
            run_started: None,
        }
    }

    pub fn state(&self) -> StopwatchState {
        if self.run_started.is_some() {
            StopwatchState::Running
        } else {
            StopwatchState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_started.is_some()
    }

    /// Start or stop the stopwatch. Each call strictly alternates state;
    /// elapsed-so-far is preserved across a pause.
    pub fn toggle(&mut self, now_mono: MonotonicInstant) -> StopwatchState {
        match self.run_started.take() {
            None => {
                self.run_started = Some(now_mono);
                StopwatchState::Running
            }
            Some(started) => {
                self.carried += now_mono.saturating_duration_since(started);
                StopwatchState::Idle
            }
        }
    }

    /// Elapsed time of the current (possibly paused) run
    pub fn elapsed(&self, now_mono: MonotonicInstant) -> Duration {
        match self.run_started {
            Some(started) => self.carried + now_mono.saturating_duration_since(started),
            None => self.carried,
        }
    }

    fn elapsed_ms(&self, now_mono: MonotonicInstant) -> u64 {
        self.elapsed(now_mono).as_millis() as u64
    }

    /// Elapsed rendered as `HH:MM:SS` for the 1 Hz display tick
    pub fn display(&self, now_mono: MonotonicInstant) -> String {
        format_elapsed(self.elapsed_ms(now_mono))
    }

    /// Commit the current run as a session entry.
    ///
    /// Runs under one second are a no-op. On success the entry is
    /// prepended to the history (capped at 20), both ledgers advance,
    /// elapsed resets to zero, and the state is forced to idle; all
    /// three records persist as one logical unit. Overflow on either
    /// ledger aborts the commit before any mutation.
    pub fn commit(&mut self, now: &DateTime<Local>, now_mono: MonotonicInstant) -> CommitOutcome {
        let duration_ms = self.elapsed_ms(now_mono);
        if duration_ms < MIN_SESSION_MS {
            return CommitOutcome::TooShort;
        }

        let entry = SessionEntry {
            duration_ms,
            formatted: format_elapsed(duration_ms),
            date: format_entry_date(now),
            time: format_entry_time(now),
            timestamp_ms: now.timestamp_millis(),
        };

        if !entry.is_valid() {
            error!(duration_ms, "Invalid session entry rejected");
            return CommitOutcome::Invalid;
        }

        let Some(new_today_total) = self.today.total_ms.checked_add(duration_ms) else {
            error!(duration_ms, "Today total would overflow, commit aborted");
            return CommitOutcome::Overflow;
        };
        let Some(new_all_time_total) = self.all_time.total_ms.checked_add(duration_ms) else {
            error!(duration_ms, "All-time total would overflow, commit aborted");
            return CommitOutcome::Overflow;
        };

        self.history.insert(0, entry.clone());
        self.history.truncate(HISTORY_CAPACITY);

        self.today.total_ms = new_today_total;
        self.today.sessions += 1;
        self.all_time.total_ms = new_all_time_total;
        self.all_time.sessions += 1;

        self.carried = Duration::ZERO;
        self.run_started = None;

        let persisted = self
            .ledger
            .save_all(&self.today, &self.all_time, &self.history);

        info!(
            duration_ms,
            today_sessions = self.today.sessions,
            persisted,
            "Session committed"
        );

        CommitOutcome::Saved { entry, persisted }
    }

    /// Reset both ledgers, the history, and the elapsed time.
    /// The caller is responsible for user confirmation.
    pub fn clear_all(&mut self) -> bool {
        self.today = LedgerRecord::default();
        self.all_time = LedgerRecord::default();
        self.history.clear();
        self.carried = Duration::ZERO;
        self.run_started = None;

        let persisted = self.ledger.clear_all();
        info!(persisted, "All stopwatch data cleared");
        persisted
    }

    pub fn today(&self) -> &LedgerRecord {
        &self.today
    }

    pub fn all_time(&self) -> &LedgerRecord {
        &self.all_time
    }

    pub fn history(&self) -> &[SessionEntry] {
        &self.history
    }
}
