// The value table: one value estimate per (time bucket, action) pair

use rusqlite::params;
use tracing::debug;

use crate::error::{MagpieError, MagpieResult};
use crate::reinforcement::{EngagementAction, TimeBucket, ValueRow};
use crate::store::Store;

/// Persistent mapping from time bucket to per-action value estimates.
///
/// The table is assumed to be pre-seeded with a complete row (all 4 actions)
/// for every bucket the agent will query. Lookups never synthesize defaults;
/// a missing row or missing action key signals a seeding bug and is fatal.
#[derive(Debug, Clone)]
pub struct ValueTable {
    store: Store,
}

impl ValueTable {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Fetch the full value row for a bucket
    pub fn get_row(&self, bucket: TimeBucket) -> MagpieResult<ValueRow> {
        let entries: Vec<(String, f64)> = self.store.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT action, value FROM value_table WHERE bucket = ?1")?;
            let rows = stmt
                .query_map(params![bucket.as_str()], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        if entries.is_empty() {
            return Err(MagpieError::row_not_found(bucket.as_str()));
        }

        let mut row = ValueRow::new();
        for (key, value) in entries {
            let action = EngagementAction::parse(&key).ok_or_else(|| {
                MagpieError::other(format!("unknown action key '{}' in value table", key))
            })?;
            row.insert(action, value);
        }

        // No partial rows: every action must be present
        for action in EngagementAction::ALL {
            if !row.contains_key(&action) {
                return Err(MagpieError::action_not_found(bucket.as_str(), action));
            }
        }

        Ok(row)
    }

    /// Fetch a single action's value estimate
    pub fn get_value(&self, bucket: TimeBucket, action: EngagementAction) -> MagpieResult<f64> {
        let row = self.get_row(bucket)?;
        row.get(&action)
            .copied()
            .ok_or_else(|| MagpieError::action_not_found(bucket.as_str(), action))
    }

    /// Overwrite a single action's value estimate, leaving the rest of the
    /// row untouched. Fails if the cell does not exist.
    pub fn set_value(
        &self,
        bucket: TimeBucket,
        action: EngagementAction,
        value: f64,
    ) -> MagpieResult<()> {
        debug!(
            "Setting value for bucket {} action {} to {}",
            bucket, action, value
        );

        let updated = self.store.with_connection(|conn| {
            Ok(conn.execute(
                "UPDATE value_table SET value = ?3 WHERE bucket = ?1 AND action = ?2",
                params![bucket.as_str(), action.as_str(), value],
            )?)
        })?;

        if updated == 0 {
            return Err(MagpieError::row_not_found(bucket.as_str()));
        }

        Ok(())
    }

    /// Insert a complete row for a bucket. Seeding/operational helper; the
    /// agent loop itself never creates rows.
    pub fn insert_row(&self, bucket: TimeBucket, row: &ValueRow) -> MagpieResult<()> {
        for action in EngagementAction::ALL {
            let value = row
                .get(&action)
                .copied()
                .ok_or_else(|| MagpieError::action_not_found(bucket.as_str(), action))?;

            self.store.with_connection(|conn| {
                conn.execute(
                    "INSERT INTO value_table (bucket, action, value) VALUES (?1, ?2, ?3)",
                    params![bucket.as_str(), action.as_str(), value],
                )?;
                Ok(())
            })?;
        }

        Ok(())
    }
}
