use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Missing-value marker used by the station files
const MISSING_MARKER: &str = "NA";

fn de_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some(MISSING_MARKER) => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn de_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some(MISSING_MARKER) => Ok(None),
        Some(value) => Ok(Some(value.to_string())),
    }
}

/// One hourly observation exactly as it appears in a station file.
///
/// The four integer time components are kept until the cleaner folds them
/// into a single timestamp; every measurement may be missing.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub station: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    #[serde(rename = "PM2.5", deserialize_with = "de_opt_f64")]
    pub pm25: Option<f64>,
    #[serde(rename = "PM10", deserialize_with = "de_opt_f64")]
    pub pm10: Option<f64>,
    #[serde(rename = "SO2", deserialize_with = "de_opt_f64")]
    pub so2: Option<f64>,
    #[serde(rename = "NO2", deserialize_with = "de_opt_f64")]
    pub no2: Option<f64>,
    #[serde(rename = "CO", deserialize_with = "de_opt_f64")]
    pub co: Option<f64>,
    #[serde(rename = "O3", deserialize_with = "de_opt_f64")]
    pub o3: Option<f64>,
    #[serde(rename = "TEMP", deserialize_with = "de_opt_f64")]
    pub temperature: Option<f64>,
    #[serde(rename = "PRES", deserialize_with = "de_opt_f64")]
    pub pressure: Option<f64>,
    #[serde(rename = "DEWP", deserialize_with = "de_opt_f64")]
    pub dew_point: Option<f64>,
    #[serde(rename = "RAIN", deserialize_with = "de_opt_f64")]
    pub rain: Option<f64>,
    #[serde(rename = "wd", deserialize_with = "de_opt_string")]
    pub wind_direction: Option<String>,
    #[serde(rename = "WSPM", deserialize_with = "de_opt_f64")]
    pub wind_speed: Option<f64>,
}

/// One cleaned hourly observation.
///
/// The timestamp replaces the raw time components; `year` and `month` are
/// re-derived from it as cheap grouping keys. Numeric fields stay optional
/// because interpolation cannot fill a run touching the first or last row
/// of the concatenated set, and a leading wind-direction gap survives
/// forward fill.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalRecord {
    pub station: String,
    pub datetime: NaiveDateTime,
    pub year: i32,
    pub month: u32,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub so2: Option<f64>,
    pub no2: Option<f64>,
    pub co: Option<f64>,
    pub o3: Option<f64>,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub dew_point: Option<f64>,
    pub rain: Option<f64>,
    pub wind_direction: Option<String>,
    pub wind_speed: Option<f64>,
}

impl CanonicalRecord {
    pub fn from_raw(raw: RawRecord, datetime: NaiveDateTime) -> Self {
        Self {
            station: raw.station,
            datetime,
            year: datetime.year(),
            month: datetime.month(),
            pm25: raw.pm25,
            pm10: raw.pm10,
            so2: raw.so2,
            no2: raw.no2,
            co: raw.co,
            o3: raw.o3,
            temperature: raw.temperature,
            pressure: raw.pressure,
            dew_point: raw.dew_point,
            rain: raw.rain,
            wind_direction: raw.wind_direction,
            wind_speed: raw.wind_speed,
        }
    }
}

/// The eleven numeric measurement columns, in the fixed order used by the
/// correlation matrix and the imputation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    Pm25,
    Pm10,
    So2,
    No2,
    Co,
    O3,
    Temperature,
    Pressure,
    DewPoint,
    Rain,
    WindSpeed,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 11] = [
        NumericColumn::Pm25,
        NumericColumn::Pm10,
        NumericColumn::So2,
        NumericColumn::No2,
        NumericColumn::Co,
        NumericColumn::O3,
        NumericColumn::Temperature,
        NumericColumn::Pressure,
        NumericColumn::DewPoint,
        NumericColumn::Rain,
        NumericColumn::WindSpeed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NumericColumn::Pm25 => "PM2.5",
            NumericColumn::Pm10 => "PM10",
            NumericColumn::So2 => "SO2",
            NumericColumn::No2 => "NO2",
            NumericColumn::Co => "CO",
            NumericColumn::O3 => "O3",
            NumericColumn::Temperature => "TEMP",
            NumericColumn::Pressure => "PRES",
            NumericColumn::DewPoint => "DEWP",
            NumericColumn::Rain => "RAIN",
            NumericColumn::WindSpeed => "WSPM",
        }
    }

    pub fn get(&self, record: &CanonicalRecord) -> Option<f64> {
        match self {
            NumericColumn::Pm25 => record.pm25,
            NumericColumn::Pm10 => record.pm10,
            NumericColumn::So2 => record.so2,
            NumericColumn::No2 => record.no2,
            NumericColumn::Co => record.co,
            NumericColumn::O3 => record.o3,
            NumericColumn::Temperature => record.temperature,
            NumericColumn::Pressure => record.pressure,
            NumericColumn::DewPoint => record.dew_point,
            NumericColumn::Rain => record.rain,
            NumericColumn::WindSpeed => record.wind_speed,
        }
    }

    pub fn set(&self, record: &mut CanonicalRecord, value: Option<f64>) {
        match self {
            NumericColumn::Pm25 => record.pm25 = value,
            NumericColumn::Pm10 => record.pm10 = value,
            NumericColumn::So2 => record.so2 = value,
            NumericColumn::No2 => record.no2 = value,
            NumericColumn::Co => record.co = value,
            NumericColumn::O3 => record.o3 = value,
            NumericColumn::Temperature => record.temperature = value,
            NumericColumn::Pressure => record.pressure = value,
            NumericColumn::DewPoint => record.dew_point = value,
            NumericColumn::Rain => record.rain = value,
            NumericColumn::WindSpeed => record.wind_speed = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(header: &str, row: &str) -> RawRecord {
        let data = format!("{header}\n{row}\n");
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        reader
            .deserialize()
            .next()
            .expect("one row")
            .expect("valid row")
    }

    const HEADER: &str =
        "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM,station";

    #[test]
    fn test_parse_complete_row() {
        let record = parse_one(
            HEADER,
            "1,2013,3,1,0,4,8,3,7,300,77,-0.7,1023.0,-18.8,0,NNW,4.4,Aotizhongxin",
        );

        assert_eq!(record.station, "Aotizhongxin");
        assert_eq!((record.year, record.month, record.day, record.hour), (2013, 3, 1, 0));
        assert_eq!(record.pm25, Some(4.0));
        assert_eq!(record.temperature, Some(-0.7));
        assert_eq!(record.wind_direction.as_deref(), Some("NNW"));
    }

    #[test]
    fn test_na_fields_deserialize_as_missing() {
        let record = parse_one(
            HEADER,
            "2,2013,3,1,1,NA,NA,4,7,300,77,-1.1,1023.2,-18.2,0,NA,4.7,Aotizhongxin",
        );

        assert_eq!(record.pm25, None);
        assert_eq!(record.pm10, None);
        assert_eq!(record.wind_direction, None);
        assert_eq!(record.so2, Some(4.0));
    }

    #[test]
    fn test_derived_year_month_follow_timestamp() {
        let raw = parse_one(
            HEADER,
            "3,2014,12,31,23,10,20,3,7,300,77,2.0,1020.0,-10.0,0,N,1.0,Changping",
        );
        let datetime = chrono::NaiveDate::from_ymd_opt(2014, 12, 31)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();

        let canonical = CanonicalRecord::from_raw(raw, datetime);
        assert_eq!(canonical.year, 2014);
        assert_eq!(canonical.month, 12);
    }

    #[test]
    fn test_numeric_column_roundtrip() {
        let raw = parse_one(
            HEADER,
            "4,2013,3,1,2,5,9,3,7,300,77,0.0,1023.0,-18.0,0,N,4.0,Dingling",
        );
        let datetime = chrono::NaiveDate::from_ymd_opt(2013, 3, 1)
            .unwrap()
            .and_hms_opt(2, 0, 0)
            .unwrap();
        let mut record = CanonicalRecord::from_raw(raw, datetime);

        for column in NumericColumn::ALL {
            column.set(&mut record, Some(1.5));
            assert_eq!(column.get(&record), Some(1.5), "column {}", column.name());
        }
    }
}
