//! Record types shared across the studyhall crates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studyhall_util::{GroupId, UserId};

/// Minimum duration for a committable stopwatch run, in milliseconds
pub const MIN_SESSION_MS: u64 = 1_000;

/// Maximum number of session entries kept in history
pub const HISTORY_CAPACITY: usize = 20;

/// Default member capacity for a new group
pub const DEFAULT_MAX_GROUP_SIZE: u32 = 10;

/// Group name length bounds (after trimming)
pub const GROUP_NAME_MIN: usize = 2;
pub const GROUP_NAME_MAX: usize = 100;

/// Aggregate total time and session count for a tracked period
/// (today or all-time)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Accumulated milliseconds
    pub total_ms: u64,
    /// Committed session count
    pub sessions: u64,
}

/// One completed, committed stopwatch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    /// Run length in milliseconds
    pub duration_ms: u64,
    /// Run length rendered as `HH:MM:SS`
    pub formatted: String,
    /// Local calendar date at commit time
    pub date: String,
    /// Local time of day at commit time
    pub time: String,
    /// Commit instant as epoch milliseconds
    pub timestamp_ms: i64,
}

impl SessionEntry {
    /// A stored entry is usable iff its duration clears the minimum.
    /// Type-level decoding already rejects non-numeric fields.
    pub fn is_valid(&self) -> bool {
        self.duration_ms >= MIN_SESSION_MS
    }
}

/// A named membership set with a capacity bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
    pub created_by: UserId,
    /// Assigned by the backend at insert time
    pub created_at: DateTime<Utc>,
    /// Ordered, duplicate-free member list
    pub members: Vec<UserId>,
    pub max_size: u32,
}

impl GroupRecord {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_size as usize
    }
}

/// Payload for creating a group; the backend assigns id and timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub created_by: UserId,
    pub max_size: u32,
}

/// One row of the live group listing, evaluated for a viewing user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRow {
    pub id: GroupId,
    pub name: String,
    pub member_count: usize,
    pub max_size: u32,
    /// Whether the viewing user is currently a member
    pub joined: bool,
}

impl GroupRow {
    /// Occupancy rendered as `members/capacity`
    pub fn occupancy(&self) -> String {
        format!("{}/{}", self.member_count, self.max_size)
    }
}

/// Check a proposed group name: trims to 2-100 characters
pub fn validate_group_name(name: &str) -> bool {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    (GROUP_NAME_MIN..=GROUP_NAME_MAX).contains(&len)
}

/// Trim and truncate a group name for storage or display
pub fn sanitize_group_name(name: &str) -> String {
    name.trim().chars().take(GROUP_NAME_MAX).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_record_default_is_zero() {
        let record = LedgerRecord::default();
        assert_eq!(record.total_ms, 0);
        assert_eq!(record.sessions, 0);
    }

    #[test]
    fn ledger_record_round_trip() {
        let record = LedgerRecord {
            total_ms: 65_000,
            sessions: 3,
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: LedgerRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }

    #[test]
    fn ledger_record_rejects_negative_numbers() {
        // Stored data from a hostile or corrupted source
        let result = serde_json::from_str::<LedgerRecord>(r#"{"total_ms":-5,"sessions":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn session_entry_validity() {
        let entry = SessionEntry {
            duration_ms: 65_000,
            formatted: "00:01:05".into(),
            date: "2025-12-25".into(),
            time: "14:30:45".into(),
            timestamp_ms: 1_766_673_045_000,
        };
        assert!(entry.is_valid());

        let short = SessionEntry {
            duration_ms: 999,
            ..entry
        };
        assert!(!short.is_valid());
    }

    #[test]
    fn group_capacity_checks() {
        let mut group = GroupRecord {
            id: GroupId::new("g1"),
            name: "Chess Club".into(),
            created_by: UserId::new("u1"),
            created_at: Utc::now(),
            members: vec![UserId::new("u1")],
            max_size: 2,
        };

        assert!(group.is_member(&UserId::new("u1")));
        assert!(!group.is_member(&UserId::new("u2")));
        assert!(!group.is_full());

        group.members.push(UserId::new("u2"));
        assert!(group.is_full());
    }

    #[test]
    fn group_name_validation() {
        assert!(validate_group_name("Chess Club"));
        assert!(validate_group_name("  ab  "));
        assert!(!validate_group_name("a"));
        assert!(!validate_group_name("   "));
        assert!(!validate_group_name(&"x".repeat(101)));
        assert!(validate_group_name(&"x".repeat(100)));
    }

    #[test]
    fn group_name_sanitization() {
        assert_eq!(sanitize_group_name("  Chess Club  "), "Chess Club");
        assert_eq!(sanitize_group_name(&"x".repeat(150)).len(), 100);
    }

    #[test]
    fn group_row_occupancy() {
        let row = GroupRow {
            id: GroupId::new("g1"),
            name: "Chess Club".into(),
            member_count: 3,
            max_size: 10,
            joined: false,
        };
        assert_eq!(row.occupancy(), "3/10");
    }
}
