//! The two signal invariants every template shares, enforced once here
//! rather than re-implemented per template — the "repeatedly-regressed bug
//! class" the spec calls out is re-deriving these from row index instead of
//! wall-clock time.

use std::collections::HashMap;

const NS_PER_DAY: i64 = 86_400_000_000_000;

/// Zeroes out any signal that violates `cooldown_minutes` since the last
/// accepted non-zero signal, or that would exceed `max_trades_per_day` for
/// its UTC calendar day. Both checks are wall-clock (nanosecond epoch
/// timestamps divided into real minutes/days), never row-index based.
pub fn enforce_invariants(raw: &[i8], t_open_ns: &[i64], cooldown_minutes: u32, max_trades_per_day: u32) -> Vec<i8> {
    debug_assert_eq!(raw.len(), t_open_ns.len());

    let cooldown_ns = cooldown_minutes as i64 * 60_000_000_000;
    let mut out = vec![0i8; raw.len()];
    let mut last_accepted_ns: Option<i64> = None;
    let mut trades_today: HashMap<i64, u32> = HashMap::new();

    for i in 0..raw.len() {
        if raw[i] == 0 {
            continue;
        }
        let t = t_open_ns[i];

        if let Some(last) = last_accepted_ns {
            if t - last < cooldown_ns {
                continue;
            }
        }

        let day = t.div_euclid(NS_PER_DAY);
        let count = trades_today.entry(day).or_insert(0);
        if *count >= max_trades_per_day {
            continue;
        }

        *count += 1;
        last_accepted_ns = Some(t);
        out[i] = raw[i];
    }

    out
}
