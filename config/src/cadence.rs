use chrono::{
    DateTime,
    Datelike as _,
    Duration,
    NaiveDateTime,
    NaiveTime,
    TimeZone,
    Timelike as _,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
};

/// How often the collection re-runs after the initial run at startup.
#[derive(Debug, Default, Clone, Copy, Display, EnumIter, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Cadence {
    #[default]
    Hourly,
    Daily,
    Weekly,
}

impl Cadence {
    /// Resolves a schedule name. Anything unrecognized runs hourly.
    pub fn from_name(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        name.parse().unwrap_or_else(|_| {
            warn!(schedule = %name, "Unknown schedule, falling back to hourly");
            Cadence::Hourly
        })
    }

    /// The next time this cadence fires, strictly after `now`.
    ///
    /// Mirrors cron's `@hourly`, `@daily` and `@weekly`: top of the hour, midnight and Sunday midnight in the
    /// time zone of `now`.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let local = now.naive_local();
        let midnight = local.date().and_time(NaiveTime::MIN);
        let next: NaiveDateTime = match self {
            Cadence::Hourly => midnight + Duration::hours(i64::from(local.hour()) + 1),
            Cadence::Daily => midnight + Duration::days(1),
            Cadence::Weekly => {
                let days = 7 - i64::from(local.weekday().num_days_from_sunday());
                midnight + Duration::days(days)
            }
        };

        // A local time inside a DST gap does not exist; fire an hour from now instead.
        now.timezone()
            .from_local_datetime(&next)
            .earliest()
            .unwrap_or_else(|| now.clone() + Duration::hours(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use strum::IntoEnumIterator as _;

    // 2024-03-06 is a Wednesday.
    fn wednesday_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 6, 10, 15, 30).unwrap()
    }

    #[test]
    fn unknown_names_fall_back_to_hourly() {
        assert_eq!(Cadence::from_name("weekly"), Cadence::Weekly);
        assert_eq!(Cadence::from_name("Daily"), Cadence::Daily);
        assert_eq!(Cadence::from_name(" hourly "), Cadence::Hourly);
        assert_eq!(Cadence::from_name("monthly"), Cadence::Hourly);
        assert_eq!(Cadence::from_name(""), Cadence::Hourly);
    }

    #[test]
    fn names_round_trip_through_display() {
        for cadence in Cadence::iter() {
            assert_eq!(Cadence::from_name(cadence.to_string()), cadence);
        }
    }

    #[test]
    fn hourly_fires_at_the_next_top_of_the_hour() {
        let next = Cadence::Hourly.next_after(&wednesday_morning());
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 6, 11, 0, 0).unwrap());

        let on_the_hour = Utc.with_ymd_and_hms(2024, 3, 6, 23, 0, 0).unwrap();
        assert_eq!(
            Cadence::Hourly.next_after(&on_the_hour),
            Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn daily_fires_at_the_next_midnight() {
        let next = Cadence::Daily.next_after(&wednesday_morning());
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).unwrap());

        let midnight = Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).unwrap();
        assert_eq!(
            Cadence::Daily.next_after(&midnight),
            Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn weekly_fires_on_the_next_sunday_midnight() {
        let next = Cadence::Weekly.next_after(&wednesday_morning());
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());

        let sunday = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(
            Cadence::Weekly.next_after(&sunday),
            Utc.with_ymd_and_hms(2024, 3, 17, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn respects_the_offset_of_now() {
        let tz = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 6, 23, 30, 0).unwrap();
        let next = Cadence::Daily.next_after(&now);
        assert_eq!(next, tz.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).unwrap());
        assert_eq!(next.with_timezone(&Utc), Utc.with_ymd_and_hms(2024, 3, 6, 22, 0, 0).unwrap());
    }
}
