//! Calendar rules deciding which engine hooks fire on a trading date.
//!
//! Dates are fed in ascending order, one call per trading date. The first
//! `warmup_days` dates are warm-up; the first date of each calendar month
//! triggers a rebalance.
//!
//! The very first date fed has no predecessor to compare months with. It
//! counts as a month start only when no earlier day of its month could have
//! been a trading day, i.e. every earlier day is a weekend or New Year's Day.
//! A replay starting mid-month waits for the next month to rebalance.

use chrono::{Datelike, NaiveDate, Weekday};

pub const DEFAULT_WARMUP_DAYS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPlan {
    pub warming_up: bool,
    pub month_start: bool,
}

#[derive(Debug, Clone)]
pub struct Schedule {
    warmup_days: usize,
    days_seen: usize,
    last_date: Option<NaiveDate>,
}

impl Schedule {
    pub fn new(warmup_days: usize) -> Self {
        Schedule {
            warmup_days,
            days_seen: 0,
            last_date: None,
        }
    }

    /// Advance to `date`. Repeating the current date returns the same plan
    /// without advancing the warm-up counter. Dates earlier than the last one
    /// seen are rejected with `None`.
    pub fn advance(&mut self, date: NaiveDate) -> Option<DayPlan> {
        let month_start = match self.last_date {
            Some(last) if date < last => return None,
            Some(last) if date == last => {
                return Some(DayPlan {
                    warming_up: self.days_seen <= self.warmup_days,
                    month_start: false,
                });
            }
            Some(last) => (last.year(), last.month()) != (date.year(), date.month()),
            None => opens_month(date),
        };

        self.days_seen += 1;
        self.last_date = Some(date);
        Some(DayPlan {
            warming_up: self.days_seen <= self.warmup_days,
            month_start,
        })
    }

    pub fn days_seen(&self) -> usize {
        self.days_seen
    }
}

fn opens_month(date: NaiveDate) -> bool {
    (1..date.day())
        .filter_map(|day| date.with_day(day))
        .all(|earlier| {
            matches!(earlier.weekday(), Weekday::Sat | Weekday::Sun)
                || (earlier.month(), earlier.day()) == (1, 1)
        })
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::new(DEFAULT_WARMUP_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn warm_up_covers_first_n_dates() {
        let mut s = Schedule::new(2);
        assert!(s.advance(d(2020, 1, 2)).unwrap().warming_up);
        assert!(s.advance(d(2020, 1, 3)).unwrap().warming_up);
        assert!(!s.advance(d(2020, 1, 6)).unwrap().warming_up);
        assert_eq!(s.days_seen(), 3);
    }

    #[test]
    fn zero_warm_up() {
        let mut s = Schedule::new(0);
        assert!(!s.advance(d(2020, 1, 2)).unwrap().warming_up);
    }

    #[test]
    fn first_date_mid_month_is_not_month_start() {
        let mut s = Schedule::new(0);
        assert!(!s.advance(d(2020, 1, 30)).unwrap().month_start);
        assert!(!s.advance(d(2020, 1, 31)).unwrap().month_start);
        assert!(s.advance(d(2020, 2, 3)).unwrap().month_start);
    }

    #[test]
    fn first_date_after_weekend_or_new_year_is_month_start() {
        assert!(Schedule::new(0).advance(d(2020, 1, 2)).unwrap().month_start);
        assert!(Schedule::new(0).advance(d(2020, 2, 3)).unwrap().month_start);
        assert!(Schedule::new(0).advance(d(2020, 3, 2)).unwrap().month_start);
        assert!(Schedule::new(0).advance(d(2020, 4, 1)).unwrap().month_start);
        // Feb 3 2020 was a Monday; Feb 4 follows a trading day.
        assert!(!Schedule::new(0).advance(d(2020, 2, 4)).unwrap().month_start);
    }

    #[test]
    fn first_trading_day_of_month_after_weekend() {
        let mut s = Schedule::new(0);
        s.advance(d(2020, 1, 31));
        // Feb 1-2 2020 fell on a weekend.
        let plan = s.advance(d(2020, 2, 3)).unwrap();
        assert!(plan.month_start);
        assert!(!s.advance(d(2020, 2, 4)).unwrap().month_start);
    }

    #[test]
    fn year_boundary_is_month_start() {
        let mut s = Schedule::new(0);
        s.advance(d(2020, 12, 31));
        assert!(s.advance(d(2021, 1, 4)).unwrap().month_start);
    }

    #[test]
    fn same_month_next_year_is_month_start() {
        let mut s = Schedule::new(0);
        s.advance(d(2020, 3, 10));
        assert!(s.advance(d(2021, 3, 10)).unwrap().month_start);
    }

    #[test]
    fn repeated_date_does_not_advance() {
        let mut s = Schedule::new(1);
        let first = s.advance(d(2020, 1, 2)).unwrap();
        let again = s.advance(d(2020, 1, 2)).unwrap();
        assert!(first.month_start);
        assert!(!again.month_start);
        assert!(again.warming_up);
        assert_eq!(s.days_seen(), 1);
    }

    #[test]
    fn out_of_order_date_is_rejected() {
        let mut s = Schedule::default();
        s.advance(d(2020, 1, 10));
        assert!(s.advance(d(2020, 1, 9)).is_none());
    }
}
