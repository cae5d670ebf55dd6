/// Rolling retention window for observation and allocation rows, in days.
/// Also the cold-start bootstrap depth of the ingestion controller.
pub const RETENTION_DAYS: i64 = 200;

/// Price history depth loaded by the risk engine, in days.
pub const RISK_LOOKBACK_DAYS: i64 = 200;

/// Liquidity averaging window of the risk engine, in days.
pub const LIQUIDITY_WINDOW_DAYS: i64 = 30;

/// Price history depth loaded by the performance engine, in days.
pub const PERFORMANCE_LOOKBACK_DAYS: i64 = 120;

/// Evaluation window of the performance engine, in days.
pub const PERFORMANCE_WINDOW_DAYS: i64 = 90;

/// Minimum number of aligned (risk) or windowed (performance) return days.
pub const MIN_RETURN_OBSERVATIONS: usize = 30;

/// Minimum peer group size before falling back to a broader group.
pub const MIN_PEER_GROUP_SIZE: usize = 5;

/// Catch-all peer group name.
pub const PEER_GROUP_ALL: &str = "ALL";

/// Small constant guarding divisions by volatility and MAD.
pub const EPSILON: f64 = 1e-9;

/// Standard deviations at or below this are treated as zero.
pub const NEAR_ZERO_VOLATILITY: f64 = 1e-12;

/// Scale factor turning a MAD into a normal-consistent sigma estimate.
pub const MAD_SCALE: f64 = 1.4826;

/// Decimal places kept for stored scores.
pub const SCORE_DECIMALS: i32 = 6;

/// Tolerance on the sum of portfolio weights.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

/// Default number of days per crawler request.
pub const DEFAULT_CHUNK_DAYS: i64 = 7;

/// Default pause between crawler requests, in milliseconds.
pub const DEFAULT_CHUNK_PAUSE_MS: u64 = 1000;
