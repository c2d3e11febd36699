//! Unified progress across both phases.
//!
//! Downloader and transcoder percentages are not comparable, so the bar is
//! driven by wall-clock time instead: the fraction is the share of the
//! estimated total (elapsed plus remaining) that has already elapsed.

use betinha_models::Phase;

/// Estimated totals below this many seconds report a zero fraction.
const MIN_ESTIMATED_TOTAL_SECS: f64 = 0.01;

/// What a shell shows on its single progress bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnifiedProgress {
    /// Fraction in [0, 1]
    pub fraction: f64,
    /// Remaining seconds, never negative
    pub remaining_secs: f64,
}

impl UnifiedProgress {
    pub const ZERO: UnifiedProgress = UnifiedProgress {
        fraction: 0.0,
        remaining_secs: 0.0,
    };

    pub const DONE: UnifiedProgress = UnifiedProgress {
        fraction: 1.0,
        remaining_secs: 0.0,
    };
}

/// Combine the per-phase estimates into one fraction and ETA.
///
/// While downloading, the transcode estimate is usually still 0, which makes
/// the ETA optimistic until the second phase starts.
pub fn unified_progress(
    phase: Phase,
    elapsed_secs: f64,
    download_remaining_secs: f64,
    transcode_remaining_secs: f64,
) -> UnifiedProgress {
    let remaining_secs = match phase {
        Phase::Idle => return UnifiedProgress::ZERO,
        Phase::Downloading => {
            non_negative(download_remaining_secs) + non_negative(transcode_remaining_secs)
        }
        Phase::Transcoding => non_negative(transcode_remaining_secs),
    };

    let elapsed_secs = non_negative(elapsed_secs);
    let estimated_total = elapsed_secs + remaining_secs;
    let fraction = if estimated_total > MIN_ESTIMATED_TOTAL_SECS {
        (elapsed_secs / estimated_total).clamp(0.0, 1.0)
    } else {
        0.0
    };

    UnifiedProgress {
        fraction,
        remaining_secs,
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
