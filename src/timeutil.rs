/*
 *  timeutil.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  Pure time helpers: digit decomposition, date formatting, and the
 *  UK BST (British Summer Time) rule.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike, Weekday};

/// Source of "now" for everything that tells the time. Components take a
/// `ClockSource` rather than calling `Local::now()` so tests can drive a
/// fake clock.
pub trait ClockSource: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The host wall clock (disciplined externally, e.g. by systemd-timesyncd).
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Date of the last Sunday of the given month, found by walking backward
/// one day at a time from the last calendar day of the month.
pub fn last_sunday(year: i32, month: u32) -> NaiveDate {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    // Months 1-12 and years >= 1970 always yield a valid date
    let mut day = first_of_next
        .and_then(|d| d.pred_opt())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    while day.weekday() != Weekday::Sun {
        day = day.pred_opt().unwrap();
    }
    day
}

/// Whether BST applies at the given local instant.
///
/// Active from 01:00 on the last Sunday of March until 02:00 on the last
/// Sunday of October. The boundary hours are asymmetric on purpose: before
/// 01:00 on the start day is not yet BST, while before 02:00 on the end day
/// still is.
pub fn is_bst(dt: NaiveDateTime) -> bool {
    let start = last_sunday(dt.year(), 3).and_hms_opt(1, 0, 0).unwrap();
    let end = last_sunday(dt.year(), 10).and_hms_opt(2, 0, 0).unwrap();
    dt >= start && dt < end
}

/// The instant to actually display: shifted forward one hour when
/// `bst_enabled` is set and the instant falls inside the BST window.
pub fn effective_time(dt: NaiveDateTime, bst_enabled: bool) -> NaiveDateTime {
    if bst_enabled && is_bst(dt) {
        dt + Duration::hours(1)
    } else {
        dt
    }
}

/// Split the current time into six digit values (hours, minutes, seconds;
/// tens and ones each), after any BST shift.
pub fn time_digits(dt: NaiveDateTime, bst_enabled: bool) -> [u8; 6] {
    let shifted = effective_time(dt, bst_enabled);
    let (h, m, s) = (shifted.hour(), shifted.minute(), shifted.second());
    [
        (h / 10) as u8,
        (h % 10) as u8,
        (m / 10) as u8,
        (m % 10) as u8,
        (s / 10) as u8,
        (s % 10) as u8,
    ]
}

/// Format a date as "DD MMM YYYY" for the line beneath the clock.
pub fn format_date(date: NaiveDate) -> String {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun",
        "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    format!(
        "{:02} {} {:04}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn last_sunday_known_dates() {
        assert_eq!(last_sunday(2024, 3), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(last_sunday(2024, 10), NaiveDate::from_ymd_opt(2024, 10, 27).unwrap());
        assert_eq!(last_sunday(2023, 3), NaiveDate::from_ymd_opt(2023, 3, 26).unwrap());
        // December wraps the year boundary when finding the month's last day
        assert_eq!(last_sunday(2024, 12), NaiveDate::from_ymd_opt(2024, 12, 29).unwrap());
    }

    #[test]
    fn bst_transition_march() {
        // 2024: last Sunday of March is the 31st
        assert!(!is_bst(at(2024, 3, 31, 0, 30)));
        assert!(is_bst(at(2024, 3, 31, 1, 30)));
    }

    #[test]
    fn bst_transition_october() {
        // 2024: last Sunday of October is the 27th
        assert!(is_bst(at(2024, 10, 27, 1, 30)));
        assert!(!is_bst(at(2024, 10, 27, 2, 30)));
    }

    #[test]
    fn bst_midsummer_and_midwinter() {
        assert!(is_bst(at(2024, 6, 21, 12, 0)));
        assert!(!is_bst(at(2024, 12, 21, 12, 0)));
        assert!(!is_bst(at(1970, 1, 1, 0, 0)));
    }

    #[test]
    fn digits_split() {
        let dt = at(2024, 1, 1, 0, 0);
        assert_eq!(time_digits(dt, false), [0, 0, 0, 0, 0, 0]);
        let dt = NaiveDate::from_ymd_opt(2024, 12, 5)
            .unwrap()
            .and_hms_opt(23, 59, 48)
            .unwrap();
        assert_eq!(time_digits(dt, false), [2, 3, 5, 9, 4, 8]);
    }

    #[test]
    fn digits_shift_one_hour_in_bst() {
        let dt = at(2024, 6, 21, 9, 15);
        assert_eq!(time_digits(dt, true)[..2], [1, 0]);
        assert_eq!(time_digits(dt, false)[..2], [0, 9]);
        // Outside the window the flag has no effect
        let dt = at(2024, 12, 21, 9, 15);
        assert_eq!(time_digits(dt, true)[..2], [0, 9]);
    }

    #[test]
    fn date_formatting() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2023, 9, 20).unwrap()), "20 Sep 2023");
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), "01 Jan 2024");
    }
}
