pub mod clustering;
pub mod metrics;
pub mod sampling;

pub use clustering::{run_clustering, ClusteredRow, ClusteringOutcome, CLUSTER_FEATURES};
pub use metrics::{
    correlation_matrix, monthly_trend, pearson, scalar_summary, seasonal_pattern, weather_scatter,
    AirCondition, CorrelationMatrix, ScalarSummary, ScatterPoint, SeasonalPoint, TrendPoint,
    WeatherScatter,
};
pub use sampling::sample_rows;
