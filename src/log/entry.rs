use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;

/// Named binary fields carried by a single log entry.
pub type FieldMap = HashMap<String, Bytes>;

/// Identifier of one entry within a session log.
///
/// Ids order by wall-clock milliseconds with a per-millisecond sequence
/// suffix. The owning log bumps the sequence instead of reusing or
/// rewinding ids when the clock stalls or steps backwards, so every id it
/// hands out compares strictly greater than the one before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId {
    millis: u64,
    seq: u64,
}

impl EntryId {
    /// Sentinel that sorts before every real id. Readers start here to
    /// replay a log from the beginning.
    pub const ZERO: EntryId = EntryId { millis: 0, seq: 0 };

    pub fn new(millis: u64, seq: u64) -> Self {
        Self { millis, seq }
    }

    /// Next id to assign given the current clock reading. Strictly greater
    /// than `self` even when `now_millis` has not advanced.
    pub(crate) fn successor(self, now_millis: u64) -> EntryId {
        if now_millis > self.millis {
            EntryId {
                millis: now_millis,
                seq: 0,
            }
        } else {
            EntryId {
                millis: self.millis,
                seq: self.seq + 1,
            }
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.millis, self.seq)
    }
}

/// One immutable record in a session log.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub id: EntryId,
    pub fields: FieldMap,
}

impl LogEntry {
    pub fn field(&self, name: &str) -> Option<&Bytes> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_by_millis_then_seq() {
        assert!(EntryId::new(1, 0) < EntryId::new(2, 0));
        assert!(EntryId::new(2, 0) < EntryId::new(2, 1));
        assert!(EntryId::ZERO < EntryId::new(0, 1));
    }

    #[test]
    fn successor_is_strictly_greater_when_clock_stalls() {
        let id = EntryId::new(100, 3);
        assert_eq!(id.successor(100), EntryId::new(100, 4));
        assert_eq!(id.successor(101), EntryId::new(101, 0));
    }

    #[test]
    fn successor_is_strictly_greater_when_clock_steps_back() {
        let id = EntryId::new(100, 3);
        assert_eq!(id.successor(50), EntryId::new(100, 4));
    }

    #[test]
    fn display_matches_stream_style() {
        assert_eq!(EntryId::new(1699999999123, 7).to_string(), "1699999999123-7");
        assert_eq!(EntryId::ZERO.to_string(), "0-0");
    }
}
