use crate::types::ForecastError;
use crate::types::Result;

/// Number of trailing periods the forecast averages over.
pub const FORECAST_WINDOW: usize = 3;

/// Forecast the next period as the rounded mean of the last [`FORECAST_WINDOW`] periods.
///
/// Ties (`x.5`) round away from zero.
pub fn forecast(series: &[u32]) -> Result<u32> {
    forecast_with_window(series, FORECAST_WINDOW)
}

/// Naive moving-average forecast over the last `window` periods of `series`.
pub fn forecast_with_window(series: &[u32], window: usize) -> Result<u32> {
    if window == 0 || series.len() < window {
        return Err(ForecastError::InsufficientHistory {
            required: window.max(1),
            actual:   series.len(),
        });
    }

    let tail = &series[series.len() - window..];
    let sum: u64 = tail.iter().map(|&v| v as u64).sum();
    let mean = sum as f64 / window as f64;

    Ok(mean.round() as u32)
}
