/// Extension of the per-station data files
pub const DATA_FILE_EXTENSION: &str = "csv";

/// Columns every station file must provide. Extra columns (e.g. a row
/// counter) are ignored.
pub const REQUIRED_COLUMNS: [&str; 17] = [
    "station", "year", "month", "day", "hour", "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP",
    "PRES", "DEWP", "RAIN", "wd", "WSPM",
];

/// Qualitative air-condition thresholds on mean PM2.5 (ug/m3)
pub const PM25_GOOD_BELOW: f64 = 50.0;
pub const PM25_MODERATE_BELOW: f64 = 100.0;

/// Months flagged as high-pollution season in the seasonal pattern
pub const WINTER_MONTHS: [u32; 4] = [11, 12, 1, 2];

/// Fixed seed shared by all deterministic sampling and k-means runs
pub const SAMPLE_SEED: u64 = 42;

/// Row caps before deterministic sampling kicks in
pub const SCATTER_SAMPLE_CAP: usize = 5_000;
pub const CLUSTER_SAMPLE_CAP: usize = 10_000;

/// K-means configuration
pub const CLUSTER_COUNT: usize = 3;
pub const KMEANS_RESTARTS: usize = 10;
pub const KMEANS_MAX_ITERATIONS: u64 = 300;
pub const KMEANS_TOLERANCE: f64 = 1e-4;
