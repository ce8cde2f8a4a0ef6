//! Candle shape signature: a short code summarizing direction, body/wick
//! shape, and relative volatility, e.g. `"UB:V"` (up, big body, volatile).
//! Used to group pattern occurrences within a (regime, movement level,
//! direction) bucket.

use crate::domain::Candle;

const VOLATILE_RANGE_PIPS: f64 = 8.0;

/// Encodes a single candle's shape. `pip_size` converts the candle's raw
/// price range into pips for the volatility qualifier.
pub fn candle_signature(candle: &Candle, pip_size: f64) -> String {
    let range = candle.range();
    let body = (candle.close - candle.open).abs();

    let direction = if candle.close >= candle.open { 'U' } else { 'D' };

    let upper_wick = candle.high - candle.open.max(candle.close);
    let lower_wick = candle.open.min(candle.close) - candle.low;
    let body_frac = if range > f64::EPSILON { body / range } else { 0.0 };

    let shape = if range <= f64::EPSILON || body_frac < 0.1 {
        'D' // doji: negligible body relative to range
    } else if lower_wick > 2.0 * body && lower_wick > upper_wick {
        'H' // hammer-like: long lower wick
    } else if upper_wick > 2.0 * body && upper_wick > lower_wick {
        'S' // shooting-star-like: long upper wick
    } else if body_frac > 0.6 {
        'B' // big body dominates the range
    } else {
        'N' // no dominant feature
    };

    let range_pips = if pip_size > f64::EPSILON { range / pip_size } else { 0.0 };
    let qualifier = if range_pips > VOLATILE_RANGE_PIPS { "V" } else { "N" };

    format!("{direction}{shape}:{qualifier}")
}
