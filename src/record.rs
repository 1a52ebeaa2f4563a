use chrono::{DateTime, TimeZone, Utc};

/// Time attached to an incoming record before it is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordTime {
    EpochSeconds(i64),
    /// Epoch seconds rendered as text. Anything but ASCII digits is ignored.
    Text(String),
    DateTime(DateTime<Utc>),
}

impl RecordTime {
    pub fn from_datetime<Tz: TimeZone>(time: &DateTime<Tz>) -> Self {
        RecordTime::DateTime(time.with_timezone(&Utc))
    }

    /// Zero counts as no time at all.
    fn to_millis(&self) -> Option<i64> {
        let seconds = match self {
            RecordTime::EpochSeconds(seconds) => *seconds,
            RecordTime::Text(text) => {
                if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }

                text.parse::<i64>().ok()?
            }
            RecordTime::DateTime(time) => return Some(time.timestamp_millis()),
        };

        match seconds {
            0 => None,
            seconds => seconds.checked_mul(1000),
        }
    }
}

/// One unit of log output, ready to be shipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    timestamp_millis: i64,
    message: String,
}

impl LogRecord {
    /// Creates a record stamped with the current time.
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_time(message, None)
    }

    /// Creates a record from a caller supplied time, falling back to the
    /// current time when it can't be interpreted.
    pub fn with_time(message: impl Into<String>, time: Option<RecordTime>) -> Self {
        let timestamp_millis = time
            .and_then(|t| t.to_millis())
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        Self {
            timestamp_millis,
            message: message.into(),
        }
    }

    pub fn at_millis(message: impl Into<String>, timestamp_millis: i64) -> Self {
        Self {
            timestamp_millis,
            message: message.into(),
        }
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp_millis
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn into_message(self) -> String {
        self.message
    }
}

/// A non-empty, insertion ordered run of records taken out of a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    records: Vec<LogRecord>,
}

impl Batch {
    /// Returns `None` for an empty vector, a batch is never empty.
    pub fn new(records: Vec<LogRecord>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        Some(Self { records })
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<LogRecord> {
        self.records
    }
}

impl IntoIterator for Batch {
    type Item = LogRecord;
    type IntoIter = std::vec::IntoIter<LogRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
