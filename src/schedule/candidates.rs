//! Candidate generation per schedule strategy.
//!
//! Every strategy walks `lookback_days` day passes, current day first, and orders
//! the issuance hours inside a pass its own way. Instants later than `now` are
//! dropped, never guessed.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};

use crate::domain::{Candidate, ChartFamily, Schedule};

/// Ordered candidate list for `family` at `now`, nearest-plausible first.
///
/// Lazy and finite; calling it again with the same `now` yields the same sequence.
pub fn candidates(family: &ChartFamily, now: DateTime<Utc>) -> impl Iterator<Item = Candidate> {
    let key = family.key;
    let schedule = family.schedule;
    let zone = family.zone();
    let local_now = now.with_timezone(&zone);
    let today = local_now.date_naive();
    let hour_now = local_now.hour();

    let fixed = matches!(schedule, Schedule::Static).then_some(Candidate { family: key, at: now });
    let passes = if fixed.is_some() { 0 } else { family.lookback_days };

    fixed.into_iter().chain(
        (0..passes)
            .flat_map(move |pass| day_slots(schedule, pass, hour_now))
            .filter_map(move |(days_back, hour)| slot_instant(zone, today, days_back, hour))
            .filter(move |at| *at <= now)
            .map(move |at| Candidate { family: key, at }),
    )
}

/// The scheduled issuance immediately before `at`.
///
/// Wraps to the last scheduled hour of the previous day when `at` is on or
/// before the day's first scheduled hour. `None` for static schedules.
pub fn previous_issuance(family: &ChartFamily, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let hours = sorted_hours(family.schedule.hours());
    let last = *hours.last()?;
    let zone = family.zone();
    let local = at.with_timezone(&zone);
    let date = local.date_naive();

    match hours.iter().rposition(|&h| h < local.hour()) {
        Some(i) => slot_instant(zone, date, 0, hours[i]),
        None => slot_instant(zone, date, 1, last),
    }
}

/// Backward rotation of a wrap-around hour list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    /// Starts at the base hour and walks backward, modulo the list length.
    pub hours: Vec<u32>,
    /// No scheduled hour is <= now yet; the base hour is yesterday's last one.
    pub from_previous_day: bool,
}

/// Rotation used by `Schedule::WrapAround` for the current hour.
///
/// Hours `[2, 5, 8, 11, 14, 17, 20, 23]` at hour 9 give `[8, 5, 2, 23, 20, 17, 14, 11]`.
pub fn wrap_rotation(hours: &[u32], hour_now: u32) -> Rotation {
    let hours = sorted_hours(hours);
    let n = hours.len();
    if n == 0 {
        return Rotation {
            hours: Vec::new(),
            from_previous_day: false,
        };
    }

    let (base, from_previous_day) = match hours.iter().rposition(|&h| h <= hour_now) {
        Some(i) => (i, false),
        None => (n - 1, true),
    };

    Rotation {
        hours: (0..n).map(|i| hours[(base + n - i) % n]).collect(),
        from_previous_day,
    }
}

/// `(days_back, hour)` slots of one day pass, in try order.
fn day_slots(schedule: Schedule, pass: u32, hour_now: u32) -> Vec<(u32, u32)> {
    match schedule {
        Schedule::Static => Vec::new(),
        Schedule::FixedHours { hours } => latest_first(hours)
            .into_iter()
            .map(|h| (pass, h))
            .collect(),
        Schedule::NearestHours { hours } => nearest_first(hours, hour_now)
            .into_iter()
            .map(|h| (pass, h))
            .collect(),
        Schedule::HourlyList { hours } => {
            let ordered = if pass == 0 {
                nearest_first(hours, hour_now)
            } else {
                latest_first(hours)
            };
            ordered.into_iter().map(|h| (pass, h)).collect()
        }
        Schedule::WrapAround { hours } => {
            let rotation = wrap_rotation(hours, hour_now);
            // Same rotation on each day pass; hours still ahead on the base day are filtered out later.
            let days_back = pass + u32::from(rotation.from_previous_day);
            rotation.hours.into_iter().map(|h| (days_back, h)).collect()
        }
    }
}

fn slot_instant(zone: FixedOffset, today: NaiveDate, days_back: u32, hour: u32) -> Option<DateTime<Utc>> {
    let date = today.checked_sub_days(Days::new(u64::from(days_back)))?;
    let naive = date.and_hms_opt(hour, 0, 0)?;
    zone.from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

fn sorted_hours(hours: &[u32]) -> Vec<u32> {
    let mut out: Vec<u32> = hours.iter().copied().filter(|h| *h < 24).collect();
    out.sort_unstable();
    out.dedup();
    out
}

fn latest_first(hours: &[u32]) -> Vec<u32> {
    let mut out = sorted_hours(hours);
    out.reverse();
    out
}

fn nearest_first(hours: &[u32], hour_now: u32) -> Vec<u32> {
    let mut out = sorted_hours(hours);
    // Stable sort keeps ascending hour order between equal distances.
    out.sort_by_key(|h| h.abs_diff(hour_now));
    out
}
