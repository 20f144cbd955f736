use crate::{
    errors::FetchError,
    models::{
        request_params::HistoryRequest,
        timeframe::{TimeFrame, TimeFrameUnit},
    },
};

/// Intervals the chart API accepts.
const SUPPORTED_INTERVALS: &[(u32, TimeFrameUnit)] = &[
    (1, TimeFrameUnit::Minute),
    (2, TimeFrameUnit::Minute),
    (5, TimeFrameUnit::Minute),
    (15, TimeFrameUnit::Minute),
    (30, TimeFrameUnit::Minute),
    (60, TimeFrameUnit::Minute),
    (90, TimeFrameUnit::Minute),
    (1, TimeFrameUnit::Hour),
    (1, TimeFrameUnit::Day),
    (5, TimeFrameUnit::Day),
    (1, TimeFrameUnit::Week),
    (1, TimeFrameUnit::Month),
    (3, TimeFrameUnit::Month),
];

pub fn validate_interval(interval: &TimeFrame) -> Result<(), FetchError> {
    if SUPPORTED_INTERVALS.contains(&(interval.amount, interval.unit)) {
        Ok(())
    } else {
        Err(FetchError::Validation(format!(
            "interval {interval} is not supported by the chart API"
        )))
    }
}

/// Builds the query string pairs for a chart request.
pub fn construct_params(request: &HistoryRequest) -> Vec<(String, String)> {
    vec![
        ("range".to_string(), request.period.to_string()),
        ("interval".to_string(), request.interval.to_string()),
        ("includePrePost".to_string(), "false".to_string()),
    ]
}
