// Append-only log of the actions the agent has taken

use chrono::{DateTime, FixedOffset, SecondsFormat};
use rusqlite::params;
use tracing::debug;

use crate::error::{MagpieError, MagpieResult};
use crate::reinforcement::{EngagementAction, TimeBucket};
use crate::store::Store;

/// One action the agent performed, immutable once written.
///
/// `interactions` is the engagement snapshot measured immediately before the
/// action; the next invocation's update step reads it to compute the reward.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub recorded_at: DateTime<FixedOffset>,
    pub bucket: TimeBucket,
    pub action: EngagementAction,
    pub interactions: i64,
}

/// Persistent append-only record of actions, ordered by timestamp
#[derive(Debug, Clone)]
pub struct ActionLog {
    store: Store,
}

impl ActionLog {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Append a record. Written exactly once per invocation, after the
    /// action's side effect has been performed.
    pub fn append(&self, record: &ActionRecord) -> MagpieResult<()> {
        debug!(
            "Logging action {} in bucket {} with {} interactions",
            record.action, record.bucket, record.interactions
        );

        self.store.with_connection(|conn| {
            conn.execute(
                "INSERT INTO action_log (recorded_at, bucket, action, interactions)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    // Whole seconds keep the text form within what SQLite's
                    // datetime() parses for ordering
                    record
                        .recorded_at
                        .to_rfc3339_opts(SecondsFormat::Secs, false),
                    record.bucket.as_str(),
                    record.action.as_str(),
                    record.interactions
                ],
            )?;
            Ok(())
        })
    }

    /// The record with the maximum timestamp, or `None` when the log is empty
    pub fn latest(&self) -> MagpieResult<Option<ActionRecord>> {
        let row: Option<(String, String, String, i64)> = self.store.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT recorded_at, bucket, action, interactions FROM action_log
                 ORDER BY datetime(recorded_at) DESC, id DESC LIMIT 1",
            )?;
            let mut rows = stmt.query([])?;
            match rows.next()? {
                Some(row) => Ok(Some((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))),
                None => Ok(None),
            }
        })?;

        let Some((recorded_at, bucket, action, interactions)) = row else {
            return Ok(None);
        };

        let recorded_at = DateTime::parse_from_rfc3339(&recorded_at).map_err(|e| {
            MagpieError::other(format!("malformed timestamp in action log: {}", e))
        })?;
        let bucket = TimeBucket::parse(&bucket).ok_or_else(|| {
            MagpieError::other(format!("unknown bucket key '{}' in action log", bucket))
        })?;
        let action = EngagementAction::parse(&action).ok_or_else(|| {
            MagpieError::other(format!("unknown action key '{}' in action log", action))
        })?;

        Ok(Some(ActionRecord {
            recorded_at,
            bucket,
            action,
            interactions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record_at(hour: u32, interactions: i64) -> ActionRecord {
        let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
        let recorded_at = eastern
            .with_ymd_and_hms(2023, 6, 1, hour, 0, 0)
            .single()
            .unwrap();
        ActionRecord {
            recorded_at,
            bucket: TimeBucket::from_hour(hour),
            action: EngagementAction::Like,
            interactions,
        }
    }

    #[test]
    fn test_empty_log_has_no_latest() {
        let log = ActionLog::new(Store::open(None::<&str>).unwrap());
        assert_eq!(log.latest().unwrap(), None);
    }

    #[test]
    fn test_latest_is_max_timestamp() {
        let log = ActionLog::new(Store::open(None::<&str>).unwrap());

        // Appended out of chronological order on purpose
        log.append(&record_at(9, 100)).unwrap();
        log.append(&record_at(20, 130)).unwrap();
        log.append(&record_at(14, 115)).unwrap();

        let latest = log.latest().unwrap().unwrap();
        assert_eq!(latest.interactions, 130);
        assert_eq!(latest.bucket, TimeBucket::Evening);
    }

    #[test]
    fn test_record_fields_round_trip() {
        let log = ActionLog::new(Store::open(None::<&str>).unwrap());

        let record = record_at(11, 42);
        log.append(&record).unwrap();

        assert_eq!(log.latest().unwrap().unwrap(), record);
    }
}
