use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FormattedTime {
    pub minutes: u64,
    pub seconds: u64,
    pub total_seconds: u64,
    pub display: String,
}

/// Countdown text for `ms`. Rounds up to the next whole second so the display
/// only reaches `00:00` when nothing is left; the carry keeps seconds in 0..60.
pub fn format_time(ms: u64) -> FormattedTime {
    let total_seconds = ms.div_ceil(1000);
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;

    FormattedTime {
        minutes,
        seconds,
        total_seconds,
        display: format!("{:02}:{:02}", minutes, seconds),
    }
}
