//! Bar intervals and look-back periods.
//!
//! A [`TimeFrame`] is the sampling resolution of a bar series (`5m`, `1d`,
//! `1wk`); a [`Period`] is how far back the series reaches (`1d`, `7d`,
//! `3mo`, `1y`). Both render to the compact strings chart APIs expect and
//! parse back from them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFrameError {
    #[error("Invalid amount for {:?}: {}", unit, message)]
    InvalidAmount {
        unit: TimeFrameUnit,
        message: String,
    },

    #[error("Invalid input: {}", message)]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl TimeFrameUnit {
    fn suffix(self) -> &'static str {
        match self {
            TimeFrameUnit::Minute => "m",
            TimeFrameUnit::Hour => "h",
            TimeFrameUnit::Day => "d",
            TimeFrameUnit::Week => "wk",
            TimeFrameUnit::Month => "mo",
        }
    }
}

/// A sampling interval = amount × unit (e.g., 5-Minute, 1-Week).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeFrame {
    pub amount: u32,
    pub unit: TimeFrameUnit,
}

impl TimeFrame {
    pub fn new(amount: u32, unit: TimeFrameUnit) -> Result<Self, TimeFrameError> {
        if amount == 0 {
            return Err(TimeFrameError::InvalidAmount {
                unit,
                message: "amount must be greater than zero".into(),
            });
        }
        Ok(Self { amount, unit })
    }

    pub const fn minutes(amount: u32) -> Self {
        Self { amount, unit: TimeFrameUnit::Minute }
    }

    pub const fn day() -> Self {
        Self { amount: 1, unit: TimeFrameUnit::Day }
    }

    pub const fn week() -> Self {
        Self { amount: 1, unit: TimeFrameUnit::Week }
    }

    /// `true` for minute and hour bars.
    pub fn is_intraday(&self) -> bool {
        matches!(self.unit, TimeFrameUnit::Minute | TimeFrameUnit::Hour)
    }
}

/// Display/parse for query strings (`"5m"`, `"1d"`, `"1wk"`, `"3mo"`)
impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for TimeFrame {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (amount, suffix) = split_amount(s)?;
        let unit = match suffix {
            "m" => TimeFrameUnit::Minute,
            "h" => TimeFrameUnit::Hour,
            "d" => TimeFrameUnit::Day,
            "wk" => TimeFrameUnit::Week,
            "mo" => TimeFrameUnit::Month,
            _ => {
                return Err(TimeFrameError::InvalidInput {
                    message: format!("unknown interval unit: {suffix}"),
                });
            }
        };
        TimeFrame::new(amount, unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodUnit {
    Day,
    Month,
    Year,
}

/// How far back a history request reaches, counted from now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub amount: u32,
    pub unit: PeriodUnit,
}

impl Period {
    pub const fn days(amount: u32) -> Self {
        Self { amount, unit: PeriodUnit::Day }
    }

    pub const fn months(amount: u32) -> Self {
        Self { amount, unit: PeriodUnit::Month }
    }

    pub const fn years(amount: u32) -> Self {
        Self { amount, unit: PeriodUnit::Year }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let u = match self.unit {
            PeriodUnit::Day => "d",
            PeriodUnit::Month => "mo",
            PeriodUnit::Year => "y",
        };
        write!(f, "{}{u}", self.amount)
    }
}

impl FromStr for Period {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (amount, suffix) = split_amount(s)?;
        if amount == 0 {
            return Err(TimeFrameError::InvalidInput {
                message: "period must be greater than zero".into(),
            });
        }
        let unit = match suffix {
            "d" => PeriodUnit::Day,
            "mo" => PeriodUnit::Month,
            "y" => PeriodUnit::Year,
            _ => {
                return Err(TimeFrameError::InvalidInput {
                    message: format!("unknown period unit: {suffix}"),
                });
            }
        };
        Ok(Period { amount, unit })
    }
}

fn split_amount(s: &str) -> Result<(u32, &str), TimeFrameError> {
    let s = s.trim();
    let idx = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| TimeFrameError::InvalidInput {
            message: format!("missing unit in {s:?}"),
        })?;
    let (digits, suffix) = s.split_at(idx);
    let amount = digits.parse::<u32>().map_err(|_| TimeFrameError::InvalidInput {
        message: format!("missing amount in {s:?}"),
    })?;
    Ok((amount, suffix))
}
