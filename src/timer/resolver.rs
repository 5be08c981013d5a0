use super::segments::{SegmentInfo, SegmentStatus, SEGMENT_COUNT};

/// Index of the segment containing `elapsed_ms`. Falls back to the last
/// segment once elapsed reaches the end of the ring.
pub fn current_segment(elapsed_ms: u64, segments: &[SegmentInfo]) -> usize {
    segments
        .iter()
        .position(|segment| segment.contains(elapsed_ms))
        .unwrap_or(SEGMENT_COUNT - 1)
}

/// Linear progress through `segment`, clamped to `0.0..=100.0`.
pub fn segment_progress(elapsed_ms: u64, segment: &SegmentInfo) -> f64 {
    if elapsed_ms <= segment.start_time {
        return 0.0;
    }
    if elapsed_ms >= segment.end_time || segment.end_time == segment.start_time {
        return 100.0;
    }

    let into = (elapsed_ms - segment.start_time) as f64;
    let width = (segment.end_time - segment.start_time) as f64;
    (into / width * 100.0).clamp(0.0, 100.0)
}

/// Builds a fresh copy of `segments` with status and progress set relative to
/// `current`. The input is never modified, so snapshots can be compared by
/// identity to spot boundary crossings.
pub fn update_segment_statuses(
    segments: &[SegmentInfo],
    current: usize,
    elapsed_ms: u64,
) -> Vec<SegmentInfo> {
    segments
        .iter()
        .map(|segment| {
            let (status, progress) = if segment.index < current {
                (SegmentStatus::Completed, 100.0)
            } else if segment.index == current {
                (SegmentStatus::Running, segment_progress(elapsed_ms, segment))
            } else {
                (SegmentStatus::Idle, 0.0)
            };

            SegmentInfo {
                status,
                progress,
                ..segment.clone()
            }
        })
        .collect()
}
