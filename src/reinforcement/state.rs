// State representation for the engagement agent
// The state is the time of day, discretized into fixed 3-hour buckets

use std::fmt;

use chrono::{DateTime, FixedOffset, Timelike, Utc};

/// One of the 8 fixed 3-hour windows of the day, used as the agent's state.
/// The persisted key is the bucket index as a string ("0" through "7").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBucket {
    /// Midnight to 3am
    Overnight,
    /// 3am to 6am
    EarlyMorning,
    /// 6am to 9am
    Morning,
    /// 9am to noon
    LateMorning,
    /// Noon to 3pm
    Afternoon,
    /// 3pm to 6pm
    LateAfternoon,
    /// 6pm to 9pm
    Evening,
    /// 9pm to midnight
    Night,
}

impl TimeBucket {
    /// All 8 buckets, in chronological order
    pub const ALL: [TimeBucket; 8] = [
        TimeBucket::Overnight,
        TimeBucket::EarlyMorning,
        TimeBucket::Morning,
        TimeBucket::LateMorning,
        TimeBucket::Afternoon,
        TimeBucket::LateAfternoon,
        TimeBucket::Evening,
        TimeBucket::Night,
    ];

    /// Map an hour of day to its bucket. Total over all hour values.
    pub fn from_hour(hour: u32) -> TimeBucket {
        if hour < 3 {
            TimeBucket::Overnight
        } else if hour < 6 {
            TimeBucket::EarlyMorning
        } else if hour < 9 {
            TimeBucket::Morning
        } else if hour < 12 {
            TimeBucket::LateMorning
        } else if hour < 15 {
            TimeBucket::Afternoon
        } else if hour < 18 {
            TimeBucket::LateAfternoon
        } else if hour < 21 {
            TimeBucket::Evening
        } else {
            TimeBucket::Night
        }
    }

    /// Bucket for a specific point in time
    pub fn for_time(time: &DateTime<FixedOffset>) -> TimeBucket {
        TimeBucket::from_hour(time.hour())
    }

    /// Bucket for the current wall-clock time in the agent's civil timezone
    pub fn current(timezone: &FixedOffset) -> TimeBucket {
        TimeBucket::for_time(&Utc::now().with_timezone(timezone))
    }

    /// The string key used for persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::Overnight => "0",
            TimeBucket::EarlyMorning => "1",
            TimeBucket::Morning => "2",
            TimeBucket::LateMorning => "3",
            TimeBucket::Afternoon => "4",
            TimeBucket::LateAfternoon => "5",
            TimeBucket::Evening => "6",
            TimeBucket::Night => "7",
        }
    }

    /// Parse a persisted string key back into a bucket
    pub fn parse(s: &str) -> Option<TimeBucket> {
        match s {
            "0" => Some(TimeBucket::Overnight),
            "1" => Some(TimeBucket::EarlyMorning),
            "2" => Some(TimeBucket::Morning),
            "3" => Some(TimeBucket::LateMorning),
            "4" => Some(TimeBucket::Afternoon),
            "5" => Some(TimeBucket::LateAfternoon),
            "6" => Some(TimeBucket::Evening),
            "7" => Some(TimeBucket::Night),
            _ => None,
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_every_hour_maps_to_its_window() {
        for hour in 0..24 {
            let expected = TimeBucket::ALL[(hour / 3) as usize];
            assert_eq!(TimeBucket::from_hour(hour), expected, "hour {}", hour);
        }
    }

    #[test]
    fn test_boundary_hours() {
        assert_eq!(TimeBucket::from_hour(2), TimeBucket::Overnight);
        assert_eq!(TimeBucket::from_hour(3), TimeBucket::EarlyMorning);
        assert_eq!(TimeBucket::from_hour(11), TimeBucket::LateMorning);
        assert_eq!(TimeBucket::from_hour(23), TimeBucket::Night);
    }

    #[test]
    fn test_for_time_uses_local_hour() {
        // 03:30 UTC is 22:30 the previous day at UTC-5
        let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
        let time = eastern
            .with_ymd_and_hms(2023, 6, 1, 22, 30, 0)
            .single()
            .unwrap();
        assert_eq!(TimeBucket::for_time(&time), TimeBucket::Night);
    }

    #[test]
    fn test_string_keys_round_trip() {
        for bucket in TimeBucket::ALL {
            assert_eq!(TimeBucket::parse(bucket.as_str()), Some(bucket));
        }
        assert_eq!(TimeBucket::parse("8"), None);
    }
}
