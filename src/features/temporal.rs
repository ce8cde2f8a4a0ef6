//! Calendar/session-of-day context for a candle. Cheap to compute, but
//! informative: FX liquidity and volatility both have a strong
//! time-of-day/day-of-week signature.

use chrono::{DateTime, Datelike, Timelike, Utc};

#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalContext {
    pub hour_of_day: f64,
    pub day_of_week: f64,
    pub session_asia: f64,
    pub session_london: f64,
    pub session_ny: f64,
}

/// Classifies a candle's open time (UTC) into the three major FX sessions.
/// Sessions overlap at their edges, matching how liquidity actually hands
/// off between centers, so more than one flag can be 1.0 at once.
pub fn temporal_context(t_open_ns: i64) -> TemporalContext {
    let secs = t_open_ns.div_euclid(1_000_000_000);
    let dt: DateTime<Utc> = DateTime::from_timestamp(secs, 0).unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap());
    let hour = dt.hour();

    TemporalContext {
        hour_of_day: hour as f64,
        day_of_week: dt.weekday().num_days_from_monday() as f64,
        session_asia: in_session(hour, 0, 9) as u8 as f64,
        session_london: in_session(hour, 7, 16) as u8 as f64,
        session_ny: in_session(hour, 12, 21) as u8 as f64,
    }
}

fn in_session(hour: u32, start: u32, end: u32) -> bool {
    hour >= start && hour < end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_london_ny_overlap() {
        // 14:00 UTC sits inside both the London and New York windows.
        let ctx = temporal_context(14 * 3600 * 1_000_000_000);
        assert_eq!(ctx.session_london, 1.0);
        assert_eq!(ctx.session_ny, 1.0);
        assert_eq!(ctx.session_asia, 0.0);
    }

    #[test]
    fn classifies_asia_session() {
        let ctx = temporal_context(2 * 3600 * 1_000_000_000);
        assert_eq!(ctx.session_asia, 1.0);
        assert_eq!(ctx.session_london, 0.0);
    }
}
