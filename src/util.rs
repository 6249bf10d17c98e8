use chrono::{DateTime, Duration, TimeZone, Timelike};

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 3600;

/// Splits a second count into (hours, minutes, seconds)
pub fn split_seconds(seconds: u64) -> (u64, u64, u64) {
    (
        seconds / SECS_PER_HOUR,
        (seconds % SECS_PER_HOUR) / SECS_PER_MINUTE,
        seconds % SECS_PER_MINUTE,
    )
}

/// `HH:MM:SS`, zero padded. Hours are not wrapped at 24.
pub fn format_time(seconds: u64) -> String {
    let (hours, minutes, secs) = split_seconds(seconds);
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// 24-hour `HH:MM` of a wall-clock time
pub fn format_clock<T: Timelike>(time: &T) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

pub fn minutes_to_seconds(minutes: u32) -> u64 {
    u64::from(minutes) * SECS_PER_MINUTE
}

pub fn calculate_finish_time<Tz: TimeZone>(start: &DateTime<Tz>, minutes: u32) -> DateTime<Tz> {
    start.clone() + Duration::minutes(i64::from(minutes))
}

/// Human readable paper duration.
///
/// The minute part is always rendered as "minutes", even for a single minute
/// ("1 minutes", "1 hour 1 minutes").
pub fn format_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{} minutes", minutes);
    }

    let hours = minutes / 60;
    let remaining_minutes = minutes % 60;
    let hour_label = if hours > 1 { "hours" } else { "hour" };

    if remaining_minutes == 0 {
        format!("{} {}", hours, hour_label)
    } else {
        format!("{} {} {} minutes", hours, hour_label, remaining_minutes)
    }
}

fn plural(count: u64, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Spoken form of the remaining time, e.g. "1 hour 1 minute 1 second remaining"
pub fn describe_remaining(seconds: u64) -> String {
    let (hours, minutes, secs) = split_seconds(seconds);

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(plural(minutes, "minute"));
    }
    if secs > 0 || seconds == 0 {
        parts.push(plural(secs, "second"));
    }

    format!("{} remaining", parts.join(" "))
}

/// Elapsed fraction of the paper, in `[0, 1]`
pub fn progress_ratio(remaining: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let elapsed = total.saturating_sub(remaining);
    (elapsed as f64 / total as f64).clamp(0.0, 1.0)
}

pub fn is_low_time(remaining: u64, threshold: u64) -> bool {
    remaining > 0 && remaining <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveTime, Utc};

    #[test]
    fn test_format_time_leading_zeros() {
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(5), "00:00:05");
        assert_eq!(format_time(65), "00:01:05");
        assert_eq!(format_time(3661), "01:01:01");
    }

    #[test]
    fn test_format_time_large_values() {
        assert_eq!(format_time(36000), "10:00:00");
        assert_eq!(format_time(90061), "25:01:01");
        assert_eq!(format_time(360_000), "100:00:00");
    }

    #[test]
    fn test_format_time_edges() {
        assert_eq!(format_time(59), "00:00:59");
        assert_eq!(format_time(60), "00:01:00");
        assert_eq!(format_time(3599), "00:59:59");
        assert_eq!(format_time(3600), "01:00:00");
    }

    #[test]
    fn test_format_time_decomposes_back() {
        for s in (0..200_000u64).step_by(997) {
            let text = format_time(s);
            let fields: Vec<u64> = text.split(':').map(|f| f.parse().unwrap()).collect();
            assert_eq!(fields, vec![s / 3600, s % 3600 / 60, s % 60], "{}", s);
        }
    }

    #[test]
    fn test_format_clock() {
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(format_clock(&at(9, 0)), "09:00");
        assert_eq!(format_clock(&at(14, 30)), "14:30");
        assert_eq!(format_clock(&at(0, 5)), "00:05");
        assert_eq!(format_clock(&at(0, 0)), "00:00");
        assert_eq!(format_clock(&at(12, 0)), "12:00");
        assert_eq!(format_clock(&at(23, 59)), "23:59");
    }

    #[test]
    fn test_minutes_to_seconds() {
        assert_eq!(minutes_to_seconds(0), 0);
        assert_eq!(minutes_to_seconds(1), 60);
        assert_eq!(minutes_to_seconds(75), 4500);
        assert_eq!(minutes_to_seconds(90), 5400);
    }

    #[test]
    fn test_calculate_finish_time() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let finish = calculate_finish_time(&start, 75);
        assert_eq!((finish.hour(), finish.minute(), finish.second()), (10, 15, 0));
        // start is left untouched
        assert_eq!(start.hour(), 9);
    }

    #[test]
    fn test_calculate_finish_time_crosses_boundaries() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 9, 45, 0).unwrap();
        let finish = calculate_finish_time(&start, 30);
        assert_eq!((finish.hour(), finish.minute()), (10, 15));

        let start = Utc.with_ymd_and_hms(2024, 1, 15, 23, 30, 0).unwrap();
        let finish = calculate_finish_time(&start, 60);
        assert_eq!(finish.day(), 16);
        assert_eq!((finish.hour(), finish.minute()), (0, 30));
    }

    #[test]
    fn test_format_duration_minutes_only() {
        assert_eq!(format_duration(0), "0 minutes");
        assert_eq!(format_duration(1), "1 minutes");
        assert_eq!(format_duration(45), "45 minutes");
        assert_eq!(format_duration(59), "59 minutes");
    }

    #[test]
    fn test_format_duration_whole_hours() {
        assert_eq!(format_duration(60), "1 hour");
        assert_eq!(format_duration(120), "2 hours");
        assert_eq!(format_duration(1440), "24 hours");
    }

    #[test]
    fn test_format_duration_mixed() {
        assert_eq!(format_duration(61), "1 hour 1 minutes");
        assert_eq!(format_duration(75), "1 hour 15 minutes");
        assert_eq!(format_duration(90), "1 hour 30 minutes");
        assert_eq!(format_duration(121), "2 hours 1 minutes");
        assert_eq!(format_duration(150), "2 hours 30 minutes");
    }

    #[test]
    fn test_describe_remaining() {
        assert_eq!(describe_remaining(0), "0 seconds remaining");
        assert_eq!(describe_remaining(1), "1 second remaining");
        assert_eq!(describe_remaining(3661), "1 hour 1 minute 1 second remaining");
        assert_eq!(describe_remaining(7322), "2 hours 2 minutes 2 seconds remaining");
        assert_eq!(describe_remaining(3600), "1 hour remaining");
        assert_eq!(describe_remaining(4500), "1 hour 15 minutes remaining");
        assert_eq!(describe_remaining(61), "1 minute 1 second remaining");
    }

    #[test]
    fn test_progress_ratio() {
        assert_eq!(progress_ratio(0, 0), 0.0);
        assert_eq!(progress_ratio(100, 100), 0.0);
        assert_eq!(progress_ratio(50, 100), 0.5);
        assert_eq!(progress_ratio(0, 100), 1.0);
        assert_eq!(progress_ratio(150, 100), 0.0);
    }

    #[test]
    fn test_is_low_time() {
        assert!(!is_low_time(0, 60));
        assert!(is_low_time(1, 60));
        assert!(is_low_time(60, 60));
        assert!(!is_low_time(61, 60));
    }
}
