//! The calendar-day window activities are filtered against.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike};

use crate::activity::ActivityRecord;

/// Probes used to step past a DST gap that swallows local midnight.
/// Real-world gaps are at most two hours and start on a quarter hour.
const GAP_PROBE_MINUTES: i64 = 15;
const GAP_PROBES: i64 = 12;

/// Half-open interval `[start, end)` covering one local calendar day.
#[derive(Debug, Clone)]
pub struct DayWindow<Tz: TimeZone> {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl<Tz: TimeZone> DayWindow<Tz> {
    /// The day `now` falls in, in `now`'s own timezone.
    ///
    /// `end` is the start of the next calendar day, so a window spanning a
    /// DST change is 23 or 25 hours long.
    pub fn containing(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();

        let start = start_of_day(&tz, today)
            .unwrap_or_else(|| {
                now.clone() - Duration::seconds(i64::from(now.num_seconds_from_midnight()))
            });
        let end = today
            .succ_opt()
            .and_then(|tomorrow| start_of_day(&tz, tomorrow))
            .unwrap_or_else(|| start.clone() + Duration::days(1));

        Self { start, end }
    }

    pub fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    pub fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    /// Lower bound inclusive, upper bound exclusive.
    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        self.start <= *instant && *instant < self.end
    }

    /// Whether the record's effective timestamp falls inside the window.
    pub fn includes(&self, record: &ActivityRecord) -> bool {
        record
            .occurred_at(&self.start.timezone())
            .is_some_and(|at| self.contains(&at))
    }

    /// Drop every record outside the window, keeping the rest in order.
    pub fn filter(&self, mut records: Vec<ActivityRecord>) -> Vec<ActivityRecord> {
        records.retain(|record| self.includes(record));
        records
    }
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    (0..=GAP_PROBES).find_map(|step| {
        let candidate = midnight + Duration::minutes(step * GAP_PROBE_MINUTES);
        tz.from_local_datetime(&candidate).earliest()
    })
}
