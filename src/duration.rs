use std::time::Duration;

/// Formats a duration as `HH:MM:SS.mmm`, widening the hour field past 99.
pub fn time_str(duration: Duration) -> String {
    let ms = duration.as_millis();
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let milliseconds = ms % 1000;

    format!(
        "{hours:0width$}:{minutes:02}:{seconds:02}.{milliseconds:03}",
        width = if hours >= 100 { 0 } else { 2 }
    )
}

#[test]
fn format_durations() {
    assert_eq!(time_str(Duration::ZERO), "00:00:00.000");
    assert_eq!(time_str(Duration::from_millis(26)), "00:00:00.026");
    assert_eq!(time_str(Duration::from_secs(3 * 3600 + 25 * 60 + 7)), "03:25:07.000");
    assert_eq!(time_str(Duration::from_secs(123 * 3600)), "123:00:00.000");
}
