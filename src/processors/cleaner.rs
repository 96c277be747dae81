use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{ExplorerError, Result};
use crate::models::{CanonicalRecord, NumericColumn, RawRecord};

/// Turns the concatenated raw record set into the canonical dataset rows.
///
/// Consumes its input: after cleaning, the raw records no longer exist as a
/// separate structure. Order of operations matches the dashboard contract:
/// timestamp reconstruction, numeric interpolation, categorical forward
/// fill, derived grouping keys.
pub struct Cleaner;

impl Cleaner {
    pub fn new() -> Self {
        Self
    }

    pub fn clean(&self, raw: Vec<RawRecord>) -> Result<Vec<CanonicalRecord>> {
        let mut records = Vec::with_capacity(raw.len());

        for (index, record) in raw.into_iter().enumerate() {
            let datetime = NaiveDate::from_ymd_opt(record.year, record.month, record.day)
                .and_then(|date| date.and_hms_opt(record.hour, 0, 0))
                .ok_or_else(|| ExplorerError::InvalidTimestamp {
                    file: record.station.clone(),
                    row: index + 1,
                    year: record.year,
                    month: record.month,
                    day: record.day,
                    hour: record.hour,
                })?;
            records.push(CanonicalRecord::from_raw(record, datetime));
        }

        for column in NumericColumn::ALL {
            let filled = Self::interpolate_column(&mut records, column);
            debug!(column = column.name(), filled, "interpolated missing values");
        }

        Self::forward_fill_wind_direction(&mut records);

        info!(rows = records.len(), "cleaned record set");
        Ok(records)
    }

    /// Linear interpolation over row position in concatenated order.
    ///
    /// A missing run with a known value on both sides is filled linearly; a
    /// run touching the first or last row has no neighbor on one side and
    /// stays missing. Row position, not the timestamp, is the axis: a gap
    /// spanning a file boundary interpolates between two stations' values.
    /// That blending is observed upstream behavior and reproduced as is.
    fn interpolate_column(records: &mut [CanonicalRecord], column: NumericColumn) -> usize {
        let mut filled = 0;
        let mut last_known: Option<(usize, f64)> = None;

        for index in 0..records.len() {
            let Some(value) = column.get(&records[index]) else {
                continue;
            };

            if let Some((known_index, known_value)) = last_known {
                let gap = index - known_index;
                if gap > 1 {
                    for offset in 1..gap {
                        let fraction = offset as f64 / gap as f64;
                        let interpolated = known_value + (value - known_value) * fraction;
                        column.set(&mut records[known_index + offset], Some(interpolated));
                        filled += 1;
                    }
                }
            }
            last_known = Some((index, value));
        }

        filled
    }

    /// Fill each missing wind direction with the most recent prior value.
    /// A leading gap has no prior value and stays missing. Idempotent.
    fn forward_fill_wind_direction(records: &mut [CanonicalRecord]) {
        let mut last: Option<String> = None;

        for record in records.iter_mut() {
            match &record.wind_direction {
                Some(value) => last = Some(value.clone()),
                None => record.wind_direction = last.clone(),
            }
        }
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}
