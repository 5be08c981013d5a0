//! Static layout of the twelve ring segments.
//!
//! A session is split into [`SEGMENT_COUNT`] equal slices, both in time and in
//! angle. The layout is built once when a run starts; the resolver derives new
//! copies with updated status on every tick.

use serde::{Deserialize, Serialize};

use super::error::TimerError;

pub const SEGMENT_COUNT: usize = 12;
pub const DEGREES_PER_SEGMENT: f64 = 360.0 / SEGMENT_COUNT as f64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SegmentStatus {
    #[default]
    Idle,
    Running,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SegmentAngle {
    pub start: f64,
    pub end: f64,
}

impl SegmentAngle {
    fn for_index(index: usize) -> Self {
        Self {
            start: DEGREES_PER_SEGMENT * index as f64,
            end: DEGREES_PER_SEGMENT * (index + 1) as f64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SegmentInfo {
    pub index: usize,
    /// Milliseconds from session start.
    pub start_time: u64,
    pub end_time: u64,
    pub duration: u64,
    pub angle: SegmentAngle,
    pub status: SegmentStatus,
    /// 0..=100, only meaningful while running.
    pub progress: f64,
}

impl SegmentInfo {
    /// Half-open `[start_time, end_time)`.
    pub fn contains(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.start_time && elapsed_ms < self.end_time
    }
}

pub fn calculate_segments(total_duration_ms: u64) -> Result<Vec<SegmentInfo>, TimerError> {
    if total_duration_ms == 0 {
        return Err(TimerError::InvalidTotal);
    }

    let count = SEGMENT_COUNT as u64;
    let duration = total_duration_ms / count;

    // Boundaries come from the total rather than summing widths, so the last
    // segment always ends exactly on the total. Widened so any u64 total fits.
    let boundary =
        |i: u64| (u128::from(total_duration_ms) * u128::from(i) / u128::from(count)) as u64;

    Ok((0..SEGMENT_COUNT)
        .map(|index| SegmentInfo {
            index,
            start_time: boundary(index as u64),
            end_time: boundary(index as u64 + 1),
            duration,
            angle: SegmentAngle::for_index(index),
            status: SegmentStatus::Idle,
            progress: 0.0,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_invariants() {
        for total in [1_u64, 11, 12, 13, 60_000, 1_500_000, 59_940_000, 1_000_003] {
            let segments = calculate_segments(total).unwrap();
            assert_eq!(segments.len(), SEGMENT_COUNT);
            assert_eq!(segments[0].start_time, 0);
            assert_eq!(segments[SEGMENT_COUNT - 1].end_time, total);

            for pair in segments.windows(2) {
                assert_eq!(pair[0].end_time, pair[1].start_time);
            }
            for (i, segment) in segments.iter().enumerate() {
                assert_eq!(segment.index, i);
                assert_eq!(segment.angle.end - segment.angle.start, 30.0);
                assert_eq!(segment.status, SegmentStatus::Idle);
                assert_eq!(segment.progress, 0.0);
            }
        }
    }

    #[test]
    fn test_minute_durations_are_equal_width() {
        let segments = calculate_segments(25 * 60_000).unwrap();
        for segment in &segments {
            assert_eq!(segment.duration, 125_000);
            assert_eq!(segment.end_time - segment.start_time, 125_000);
        }
        assert_eq!(segments[11].angle.start, 330.0);
        assert_eq!(segments[11].angle.end, 360.0);
    }

    #[test]
    fn test_huge_totals_stay_contiguous() {
        for total in [u64::MAX / 12 + 1, u64::MAX / 6, u64::MAX] {
            let segments = calculate_segments(total).unwrap();
            assert_eq!(segments[0].start_time, 0);
            assert_eq!(segments[SEGMENT_COUNT - 1].end_time, total);
            for pair in segments.windows(2) {
                assert_eq!(pair[0].end_time, pair[1].start_time);
                assert!(pair[0].start_time < pair[0].end_time);
            }
        }
    }

    #[test]
    fn test_zero_total_is_rejected() {
        assert_eq!(calculate_segments(0), Err(TimerError::InvalidTotal));
    }

    #[test]
    fn test_contains_is_half_open() {
        let segments = calculate_segments(120_000).unwrap();
        assert!(segments[0].contains(0));
        assert!(segments[0].contains(9_999));
        assert!(!segments[0].contains(10_000));
        assert!(segments[1].contains(10_000));
    }
}
