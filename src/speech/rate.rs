//! Speech rate in words per minute and its mapping onto backend rates.
//!
//! The UI works in WPM (slider range [`MIN_RATE_WPM`]..=[`MAX_RATE_WPM`]).
//! Platform backends each use their own scale, so the WPM value is mapped
//! linearly with [`NORMAL_RATE_WPM`] landing on the backend's normal rate.

/// Slowest selectable rate.
pub const MIN_RATE_WPM: u32 = 100;
/// Fastest selectable rate.
pub const MAX_RATE_WPM: u32 = 300;
/// Rate selected at startup when the config does not override it.
pub const DEFAULT_RATE_WPM: u32 = 100;
/// WPM that corresponds to the backend's `normal_rate`.
pub const NORMAL_RATE_WPM: u32 = 200;

/// Clamp a WPM value into the selectable range.
pub fn clamp_wpm(wpm: u32) -> u32 {
    wpm.clamp(MIN_RATE_WPM, MAX_RATE_WPM)
}

/// Map `wpm` onto a backend rate scale described by `min`, `normal`, `max`.
///
/// ```
/// use word_picker::speech::wpm_to_backend_rate;
///
/// // 200 WPM is the backend's normal speed.
/// assert_eq!(wpm_to_backend_rate(200, 0.1, 1.0, 10.0), 1.0);
/// ```
pub fn wpm_to_backend_rate(wpm: u32, min: f32, normal: f32, max: f32) -> f32 {
    let wpm = clamp_wpm(wpm) as f32;
    let rate = normal * wpm / NORMAL_RATE_WPM as f32;
    if min <= max {
        rate.clamp(min, max)
    } else {
        rate
    }
}
