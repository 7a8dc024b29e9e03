//! Pure time-derived arithmetic over campaign and stream fields.
//!
//! Every function here is a function of stored fields plus an explicit
//! `now` — no clocks are read internally, so results are reproducible in
//! tests and identical whichever backend supplied the raw data.

use std::fmt;

use crate::errors::{LedgerError, Result};
use crate::types::{Stream, StreamStatus};

const SECS_PER_HOUR: i64 = 60 * 60;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

/// Funding progress as a percentage of the goal.
///
/// Defined only for a positive goal; a zero goal is a degenerate
/// denominator and fails rather than dividing.
pub fn percent_funded(goal: u64, raised: u64) -> Result<f64> {
    if goal == 0 {
        return Err(LedgerError::InvalidGoal);
    }
    Ok(raised as f64 / goal as f64 * 100.0)
}

/// Whole-unit time remaining before a deadline.
///
/// Floors to whole days when at least one remains, else whole hours —
/// never rounding up into a unit that would overstate the remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLeft {
    Ended,
    Days(i64),
    Hours(i64),
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ended => write!(f, "Ended"),
            Self::Days(1) => write!(f, "1 day left"),
            Self::Days(n) => write!(f, "{n} days left"),
            Self::Hours(1) => write!(f, "1 hour left"),
            Self::Hours(n) => write!(f, "{n} hours left"),
        }
    }
}

/// Time remaining until `ends_at`, or [`TimeLeft::Ended`] once passed.
///
/// Natural expiry is a display fact only — it never flips the campaign's
/// `active` flag, which stays whatever the backend last set.
pub fn time_left(now: i64, ends_at: i64) -> TimeLeft {
    let remaining = ends_at - now;
    if remaining <= 0 {
        return TimeLeft::Ended;
    }
    let days = remaining / SECS_PER_DAY;
    if days > 0 {
        TimeLeft::Days(days)
    } else {
        TimeLeft::Hours(remaining / SECS_PER_HOUR)
    }
}

/// Fraction of the stream window elapsed at `now`, clamped to [0, 1].
pub fn stream_progress(now: i64, start: i64, end: i64) -> Result<f64> {
    if end <= start {
        return Err(LedgerError::InvalidDuration);
    }
    let elapsed = (now - start).clamp(0, end - start);
    Ok(elapsed as f64 / (end - start) as f64)
}

/// Amount vested at `now`.
///
/// Frozen at the ratio held at `canceled_at` once the stream is canceled,
/// regardless of how much later `now` is; reaches `total_amount` exactly
/// at `end_time` when never canceled.
pub fn streamed_amount(now: i64, stream: &Stream) -> Result<f64> {
    let effective_now = match stream.canceled_at {
        Some(canceled_at) => now.min(canceled_at),
        None => now,
    };
    let ratio = stream_progress(effective_now, stream.start_time, stream.end_time)?;
    Ok(stream.total_amount as f64 * ratio)
}

/// Stream status with precedence canceled > completed > active: a
/// canceled stream reports canceled even past its natural end time.
pub fn stream_status(now: i64, stream: &Stream) -> StreamStatus {
    if stream.canceled_at.is_some() {
        StreamStatus::Canceled
    } else if now >= stream.end_time {
        StreamStatus::Completed
    } else {
        StreamStatus::Active
    }
}
