mod maths_utils;
mod perf;
mod time_utils;

pub use time_utils::interval_to_string;
pub use time_utils::{
    AppInstant, MS_IN_1_M, MS_IN_2_H, MS_IN_3_D, MS_IN_3_MIN, MS_IN_4_H, MS_IN_5_MIN, MS_IN_6_H,
    MS_IN_8_H, MS_IN_12_H, MS_IN_15_MIN, MS_IN_30_MIN, MS_IN_D, MS_IN_H, MS_IN_MIN, MS_IN_S,
    MS_IN_W, epoch_ms_to_date_string, format_duration, now_timestamp_ms, now_utc,
};

pub(crate) use maths_utils::{calculate_stats, get_max, get_min, normalize_max, smooth_data};
