use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analyzers::sampling::sample_rows;
use crate::models::{CanonicalRecord, NumericColumn};
use crate::processors::WorkingSubset;
use crate::utils::constants::{
    PM25_GOOD_BELOW, PM25_MODERATE_BELOW, SCATTER_SAMPLE_CAP, WINTER_MONTHS,
};

/// Qualitative air condition derived from mean PM2.5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AirCondition {
    Good,
    Moderate,
    Poor,
}

impl AirCondition {
    pub fn from_mean_pm25(mean: f64) -> Self {
        if mean < PM25_GOOD_BELOW {
            AirCondition::Good
        } else if mean < PM25_MODERATE_BELOW {
            AirCondition::Moderate
        } else {
            AirCondition::Poor
        }
    }
}

impl fmt::Display for AirCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AirCondition::Good => "Good",
            AirCondition::Moderate => "Moderate",
            AirCondition::Poor => "Poor",
        };
        write!(f, "{label}")
    }
}

/// Headline metrics of the working subset; all `None` for an empty subset
#[derive(Debug, Serialize)]
pub struct ScalarSummary {
    pub mean_pm25: Option<f64>,
    pub max_pm25: Option<f64>,
    pub mean_temperature: Option<f64>,
    pub condition: Option<AirCondition>,
}

/// Pairwise Pearson correlation over the fixed eleven numeric columns.
/// Symmetric; undefined entries (too few paired observations, constant
/// column) are NaN, never zero.
#[derive(Debug, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<&'static str>,
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Serialize)]
pub struct TrendPoint {
    pub month_start: NaiveDate,
    pub mean_pm25: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SeasonalPoint {
    pub month: u32,
    pub mean_pm25: Option<f64>,
    pub winter: bool,
}

#[derive(Debug, Serialize)]
pub struct ScatterPoint {
    pub weather: f64,
    pub pm25: f64,
}

/// The three weather-vs-PM2.5 sample sets, built from one deterministic
/// sample of the working subset. The rain set keeps strictly positive
/// rainfall only.
#[derive(Debug, Serialize)]
pub struct WeatherScatter {
    pub temperature: Vec<ScatterPoint>,
    pub wind: Vec<ScatterPoint>,
    pub rain: Vec<ScatterPoint>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// Pearson correlation of paired observations; NaN when fewer than two
/// pairs or either side has zero variance
fn pearson_of_pairs(pairs: impl Iterator<Item = (f64, f64)>) -> f64 {
    let mut n = 0usize;
    let (mut sum_x, mut sum_y) = (0.0, 0.0);
    let (mut sum_xx, mut sum_yy, mut sum_xy) = (0.0, 0.0, 0.0);

    for (x, y) in pairs {
        n += 1;
        sum_x += x;
        sum_y += y;
        sum_xx += x * x;
        sum_yy += y * y;
        sum_xy += x * y;
    }

    if n < 2 {
        return f64::NAN;
    }

    let n = n as f64;
    let cov = sum_xy - sum_x * sum_y / n;
    let var_x = sum_xx - sum_x * sum_x / n;
    let var_y = sum_yy - sum_y * sum_y / n;

    if var_x <= 0.0 || var_y <= 0.0 {
        return f64::NAN;
    }

    cov / (var_x * var_y).sqrt()
}

pub fn pearson(points: &[ScatterPoint]) -> f64 {
    pearson_of_pairs(points.iter().map(|p| (p.weather, p.pm25)))
}

pub fn scalar_summary(subset: &WorkingSubset) -> ScalarSummary {
    let mean_pm25 = mean(subset.rows().iter().filter_map(|r| r.pm25));
    let max_pm25 = subset
        .rows()
        .iter()
        .filter_map(|r| r.pm25)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
    let mean_temperature = mean(subset.rows().iter().filter_map(|r| r.temperature));

    ScalarSummary {
        mean_pm25,
        max_pm25,
        mean_temperature,
        condition: mean_pm25.map(AirCondition::from_mean_pm25),
    }
}

pub fn correlation_matrix(subset: &WorkingSubset) -> CorrelationMatrix {
    let columns: Vec<&'static str> = NumericColumn::ALL.iter().map(|c| c.name()).collect();
    let size = NumericColumn::ALL.len();
    let mut values = vec![vec![f64::NAN; size]; size];

    for (i, left) in NumericColumn::ALL.iter().enumerate() {
        for (j, right) in NumericColumn::ALL.iter().enumerate().skip(i) {
            // pairwise-complete observations only
            let r = pearson_of_pairs(subset.rows().iter().filter_map(|&record| {
                match (left.get(record), right.get(record)) {
                    (Some(x), Some(y)) => Some((x, y)),
                    _ => None,
                }
            }));
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix { columns, values }
}

/// Mean PM2.5 per calendar (year, month), chronological order
pub fn monthly_trend(subset: &WorkingSubset) -> Vec<TrendPoint> {
    let mut groups: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();

    for record in subset.rows() {
        let entry = groups.entry((record.year, record.month)).or_insert((0.0, 0));
        if let Some(value) = record.pm25 {
            entry.0 += value;
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .filter_map(|((year, month), (sum, count))| {
            let month_start = NaiveDate::from_ymd_opt(year, month, 1)?;
            let mean_pm25 = (count > 0).then(|| sum / count as f64);
            Some(TrendPoint {
                month_start,
                mean_pm25,
            })
        })
        .collect()
}

/// Mean PM2.5 per month-of-year, with the winter-emphasis flag
pub fn seasonal_pattern(subset: &WorkingSubset) -> Vec<SeasonalPoint> {
    let mut groups: BTreeMap<u32, (f64, usize)> = BTreeMap::new();

    for record in subset.rows() {
        let entry = groups.entry(record.month).or_insert((0.0, 0));
        if let Some(value) = record.pm25 {
            entry.0 += value;
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(month, (sum, count))| SeasonalPoint {
            month,
            mean_pm25: (count > 0).then(|| sum / count as f64),
            winter: WINTER_MONTHS.contains(&month),
        })
        .collect()
}

pub fn weather_scatter(subset: &WorkingSubset) -> WeatherScatter {
    let sampled = sample_rows(subset.rows(), SCATTER_SAMPLE_CAP);

    fn points(
        rows: &[&CanonicalRecord],
        weather: impl Fn(&CanonicalRecord) -> Option<f64>,
    ) -> Vec<ScatterPoint> {
        rows.iter()
            .filter_map(|&record| match (weather(record), record.pm25) {
                (Some(weather), Some(pm25)) => Some(ScatterPoint { weather, pm25 }),
                _ => None,
            })
            .collect()
    }

    let temperature = points(&sampled, |r| r.temperature);
    let wind = points(&sampled, |r| r.wind_speed);
    let mut rain = points(&sampled, |r| r.rain);
    rain.retain(|point| point.weather > 0.0);

    WeatherScatter {
        temperature,
        wind,
        rain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalDataset, RawRecord};
    use crate::processors::FilterParams;

    fn record(
        year: i32,
        month: u32,
        hour: u32,
        pm25: Option<f64>,
        temperature: Option<f64>,
        rain: Option<f64>,
        wind_speed: Option<f64>,
    ) -> crate::models::CanonicalRecord {
        let raw = RawRecord {
            station: "Changping".to_string(),
            year,
            month,
            day: 15,
            hour,
            pm25,
            pm10: pm25.map(|v| v * 2.0),
            so2: None,
            no2: None,
            co: None,
            o3: None,
            temperature,
            pressure: Some(1020.0),
            dew_point: None,
            rain,
            wind_direction: Some("N".to_string()),
            wind_speed,
        };
        let datetime = NaiveDate::from_ymd_opt(year, month, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        crate::models::CanonicalRecord::from_raw(raw, datetime)
    }

    fn subset_of(records: Vec<crate::models::CanonicalRecord>) -> CanonicalDataset {
        CanonicalDataset::new(records)
    }

    #[test]
    fn test_condition_thresholds() {
        assert_eq!(AirCondition::from_mean_pm25(49.9), AirCondition::Good);
        assert_eq!(AirCondition::from_mean_pm25(50.0), AirCondition::Moderate);
        assert_eq!(AirCondition::from_mean_pm25(99.9), AirCondition::Moderate);
        assert_eq!(AirCondition::from_mean_pm25(100.0), AirCondition::Poor);
        assert_eq!(AirCondition::from_mean_pm25(150.0), AirCondition::Poor);
    }

    #[test]
    fn test_scalar_summary_skips_missing_values() {
        let data = subset_of(vec![
            record(2013, 3, 0, Some(40.0), Some(10.0), Some(0.0), Some(2.0)),
            record(2013, 3, 1, None, Some(20.0), Some(0.0), Some(2.0)),
            record(2013, 3, 2, Some(60.0), None, Some(0.0), Some(2.0)),
        ]);
        let subset = FilterParams::for_dataset(&data).apply(&data);

        let summary = scalar_summary(&subset);
        assert_eq!(summary.mean_pm25, Some(50.0));
        assert_eq!(summary.max_pm25, Some(60.0));
        assert_eq!(summary.mean_temperature, Some(15.0));
        assert_eq!(summary.condition, Some(AirCondition::Moderate));
    }

    #[test]
    fn test_scalar_summary_of_empty_subset() {
        let data = subset_of(vec![]);
        let subset = FilterParams::new(Vec::<String>::new(), 2013, 2013).apply(&data);

        let summary = scalar_summary(&subset);
        assert_eq!(summary.mean_pm25, None);
        assert_eq!(summary.max_pm25, None);
        assert_eq!(summary.mean_temperature, None);
        assert_eq!(summary.condition, None);
    }

    #[test]
    fn test_correlation_symmetry_and_diagonal() {
        let data = subset_of(
            (0..50)
                .map(|i| {
                    record(
                        2013,
                        3,
                        i % 24,
                        Some(10.0 + i as f64),
                        Some(5.0 + (i as f64) * 0.5),
                        Some(0.0),
                        Some(3.0 - (i as f64) * 0.01),
                    )
                })
                .collect(),
        );
        let subset = FilterParams::for_dataset(&data).apply(&data);

        let matrix = correlation_matrix(&subset);
        assert_eq!(matrix.columns.len(), 11);

        let pm25 = 0;
        let temp = 6;
        assert!((matrix.values[pm25][temp] - matrix.values[temp][pm25]).abs() < 1e-12);
        assert!((matrix.values[pm25][pm25] - 1.0).abs() < 1e-9);
        assert!((matrix.values[pm25][temp] - 1.0).abs() < 1e-9); // perfectly linear
    }

    #[test]
    fn test_constant_column_correlation_is_nan_not_zero() {
        let data = subset_of(
            (0..10)
                .map(|i| {
                    // rain held constant at zero
                    record(2013, 3, i, Some(10.0 + i as f64), Some(5.0), Some(0.0), Some(2.0))
                })
                .collect(),
        );
        let subset = FilterParams::for_dataset(&data).apply(&data);

        let matrix = correlation_matrix(&subset);
        let pm25 = 0;
        let rain = 9;
        assert!(matrix.values[pm25][rain].is_nan());
        assert!(matrix.values[rain][rain].is_nan());
    }

    #[test]
    fn test_monthly_trend_is_chronological() {
        let data = subset_of(vec![
            record(2014, 1, 0, Some(80.0), Some(0.0), Some(0.0), Some(1.0)),
            record(2013, 12, 0, Some(120.0), Some(-5.0), Some(0.0), Some(1.0)),
            record(2013, 12, 1, Some(100.0), Some(-4.0), Some(0.0), Some(1.0)),
            record(2013, 5, 0, Some(30.0), Some(20.0), Some(0.0), Some(1.0)),
        ]);
        let subset = FilterParams::for_dataset(&data).apply(&data);

        let trend = monthly_trend(&subset);
        let months: Vec<NaiveDate> = trend.iter().map(|p| p.month_start).collect();
        assert_eq!(
            months,
            vec![
                NaiveDate::from_ymd_opt(2013, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2013, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
            ]
        );
        assert_eq!(trend[1].mean_pm25, Some(110.0));
    }

    #[test]
    fn test_seasonal_pattern_flags_winter_months() {
        let data = subset_of(vec![
            record(2013, 11, 0, Some(100.0), Some(2.0), Some(0.0), Some(1.0)),
            record(2013, 12, 0, Some(120.0), Some(-3.0), Some(0.0), Some(1.0)),
            record(2014, 1, 0, Some(110.0), Some(-6.0), Some(0.0), Some(1.0)),
            record(2014, 2, 0, Some(90.0), Some(-1.0), Some(0.0), Some(1.0)),
            record(2014, 6, 0, Some(40.0), Some(25.0), Some(0.0), Some(1.0)),
        ]);
        let subset = FilterParams::for_dataset(&data).apply(&data);

        let pattern = seasonal_pattern(&subset);
        for point in &pattern {
            let expected = matches!(point.month, 11 | 12 | 1 | 2);
            assert_eq!(point.winter, expected, "month {}", point.month);
        }
        assert_eq!(pattern.len(), 5);
    }

    #[test]
    fn test_rain_scatter_keeps_positive_rainfall_only() {
        let data = subset_of(vec![
            record(2013, 7, 0, Some(20.0), Some(25.0), Some(0.0), Some(1.0)),
            record(2013, 7, 1, Some(15.0), Some(24.0), Some(2.5), Some(1.5)),
            record(2013, 7, 2, Some(10.0), Some(23.0), None, Some(2.0)),
        ]);
        let subset = FilterParams::for_dataset(&data).apply(&data);

        let scatter = weather_scatter(&subset);
        assert_eq!(scatter.temperature.len(), 3);
        assert_eq!(scatter.rain.len(), 1);
        assert_eq!(scatter.rain[0].weather, 2.5);
    }

    #[test]
    fn test_scatter_rows_missing_either_value_are_dropped() {
        let data = subset_of(vec![
            record(2013, 7, 0, Some(20.0), None, Some(0.0), Some(1.0)),
            record(2013, 7, 1, None, Some(24.0), Some(0.0), Some(1.5)),
            record(2013, 7, 2, Some(10.0), Some(23.0), Some(0.0), None),
        ]);
        let subset = FilterParams::for_dataset(&data).apply(&data);

        let scatter = weather_scatter(&subset);
        assert_eq!(scatter.temperature.len(), 1);
        assert_eq!(scatter.wind.len(), 1);
    }

    #[test]
    fn test_pearson_of_degenerate_sets_is_nan() {
        assert!(pearson(&[]).is_nan());
        assert!(pearson(&[ScatterPoint {
            weather: 1.0,
            pm25: 2.0
        }])
        .is_nan());
    }
}
