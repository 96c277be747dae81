use crate::models::CanonicalRecord;

/// The fully cleaned, timestamp-normalized unified record set.
///
/// Built once per distinct input directory content and shared read-only for
/// the rest of the session. Station order is first-seen order in the
/// concatenated data, which matches file-discovery order.
#[derive(Debug)]
pub struct CanonicalDataset {
    records: Vec<CanonicalRecord>,
    stations: Vec<String>,
    year_bounds: Option<(i32, i32)>,
}

impl CanonicalDataset {
    pub fn new(records: Vec<CanonicalRecord>) -> Self {
        let mut stations: Vec<String> = Vec::new();
        let mut year_bounds: Option<(i32, i32)> = None;

        for record in &records {
            if !stations.iter().any(|s| s == &record.station) {
                stations.push(record.station.clone());
            }
            year_bounds = match year_bounds {
                None => Some((record.year, record.year)),
                Some((lo, hi)) => Some((lo.min(record.year), hi.max(record.year))),
            };
        }

        Self {
            records,
            stations,
            year_bounds,
        }
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Station identifiers in first-seen order, for the station multiselect
    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    /// Observed (min, max) year, for the year-range selector bounds
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        self.year_bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRecord;

    fn record(station: &str, year: i32) -> CanonicalRecord {
        let raw = RawRecord {
            station: station.to_string(),
            year,
            month: 6,
            day: 15,
            hour: 12,
            pm25: Some(40.0),
            pm10: None,
            so2: None,
            no2: None,
            co: None,
            o3: None,
            temperature: Some(20.0),
            pressure: None,
            dew_point: None,
            rain: Some(0.0),
            wind_direction: None,
            wind_speed: Some(2.0),
        };
        let datetime = chrono::NaiveDate::from_ymd_opt(year, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        CanonicalRecord::from_raw(raw, datetime)
    }

    #[test]
    fn test_station_list_first_seen_order() {
        let dataset = CanonicalDataset::new(vec![
            record("Changping", 2013),
            record("Aotizhongxin", 2014),
            record("Changping", 2015),
        ]);

        assert_eq!(dataset.stations(), ["Changping", "Aotizhongxin"]);
        assert_eq!(dataset.year_bounds(), Some((2013, 2015)));
    }

    #[test]
    fn test_empty_dataset_has_no_bounds() {
        let dataset = CanonicalDataset::new(vec![]);
        assert!(dataset.is_empty());
        assert!(dataset.stations().is_empty());
        assert_eq!(dataset.year_bounds(), None);
    }
}
