//! Exam timetable generation.
//!
//! Subjects are placed one at a time, highest credit points first, by
//! walking a date cursor from the start of the window:
//!
//! 1. Skip the cursor past any weekend.
//! 2. If the cursor has left the window, stop and report how many
//!    subjects were placed.
//! 3. Pick a preferred session at random, fall back to the other session
//!    on the same day, and on a fully booked day advance the cursor by
//!    random gaps until an open day (or the end of the window) is found,
//!    then retry the same subject.
//! 4. After a placement, advance the cursor by a random gap of
//!    `1..=day_gap` days.
//!
//! The walk is randomized by design; two runs over the same input are
//! different but equally valid. Every invariant (weekdays only, at most
//! one exam per session, one entry per date, ascending order) holds for
//! every run.

pub mod rng;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use thiserror::Error;

use crate::models::{ScheduleDay, Session, SessionAssignment, Subject};
use rng::SessionRng;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("The end date must be after the start date.")]
    EndBeforeStart,

    #[error("Please add at least one subject with a name.")]
    NoValidSubjects,

    #[error("The max day gap must be at least 1.")]
    ZeroDayGap,
}

/// Outcome of one generation run. `warning` is set when the date window
/// ran out before every subject was placed; the days built so far are
/// still returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTimetable {
    pub days: Vec<ScheduleDay>,
    pub placed: usize,
    pub requested: usize,
    pub warning: Option<String>,
}

pub fn generate_timetable<R: SessionRng + ?Sized>(
    subjects: &[Subject],
    start_date: NaiveDate,
    end_date: NaiveDate,
    day_gap: u32,
    rng: &mut R,
) -> Result<GeneratedTimetable, ScheduleError> {
    if day_gap == 0 {
        return Err(ScheduleError::ZeroDayGap);
    }
    if start_date > end_date {
        return Err(ScheduleError::EndBeforeStart);
    }

    let ranked = rank_subjects(subjects);
    if ranked.is_empty() {
        return Err(ScheduleError::NoValidSubjects);
    }

    let mut days: Vec<ScheduleDay> = Vec::new();
    let mut cursor = start_date;
    let mut placed = 0usize;
    let mut warning = None;

    'subjects: for (index, subject) in ranked.iter().enumerate() {
        loop {
            cursor = skip_weekend(cursor);
            if cursor > end_date {
                warning = Some(format!(
                    "Warning: Could only schedule {placed} out of {} subjects within the \
                     date range. Consider extending the end date or increasing the max day gap.",
                    ranked.len()
                ));
                break 'subjects;
            }

            let preferred = rng.pick_session();
            let day = day_index(&mut days, cursor);
            match open_session(&days[day], preferred) {
                Some(session) => {
                    days[day].assign(session, SessionAssignment::new(subject, session, index + 1));
                    placed += 1;
                    // No weekend skip here; it is re-applied before the
                    // next placement.
                    cursor = cursor + Days::new(u64::from(rng.pick_gap(day_gap)));
                    continue 'subjects;
                }
                None => {
                    cursor = advance_past_booked(&days, cursor, end_date, day_gap, rng);
                }
            }
        }
    }

    days.sort_by_key(|day| day.date);
    Ok(GeneratedTimetable {
        days,
        placed,
        requested: ranked.len(),
        warning,
    })
}

/// Drops blank-named subjects and orders the rest by descending credit
/// points. The sort is stable, so ties keep their submitted order.
fn rank_subjects(subjects: &[Subject]) -> Vec<Subject> {
    let mut ranked: Vec<Subject> = subjects
        .iter()
        .filter(|subject| !subject.name.trim().is_empty())
        .cloned()
        .collect();
    ranked.sort_by_key(|subject| std::cmp::Reverse(subject.credits.unwrap_or(0)));
    ranked
}

fn skip_weekend(mut date: NaiveDate) -> NaiveDate {
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date = date + Days::new(1);
    }
    date
}

/// Index of the entry for `date`, inserting a fresh day if none exists.
fn day_index(days: &mut Vec<ScheduleDay>, date: NaiveDate) -> usize {
    match days.iter().position(|day| day.date == date) {
        Some(index) => index,
        None => {
            days.push(ScheduleDay::new(date));
            days.len() - 1
        }
    }
}

/// The preferred session if free, otherwise the other one, otherwise
/// `None` when the day is fully booked.
fn open_session(day: &ScheduleDay, preferred: Session) -> Option<Session> {
    if day.slot(preferred).is_none() {
        Some(preferred)
    } else if day.slot(preferred.other()).is_none() {
        Some(preferred.other())
    } else {
        None
    }
}

/// Advances the cursor by random gaps, re-skipping weekends, until it
/// reaches a date with a free session or leaves the window. Each step
/// moves at least one day forward, so the loop is bounded by `end_date`.
fn advance_past_booked<R: SessionRng + ?Sized>(
    days: &[ScheduleDay],
    mut cursor: NaiveDate,
    end_date: NaiveDate,
    day_gap: u32,
    rng: &mut R,
) -> NaiveDate {
    loop {
        cursor = skip_weekend(cursor + Days::new(u64::from(rng.pick_gap(day_gap))));
        if cursor > end_date || !fully_booked(days, cursor) {
            return cursor;
        }
    }
}

fn fully_booked(days: &[ScheduleDay], date: NaiveDate) -> bool {
    days.iter().any(|day| day.date == date && day.is_full())
}

#[cfg(test)]
mod tests {
    use super::rng::FixedSessionRng;
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn morning_walk() -> FixedSessionRng {
        FixedSessionRng {
            session: Session::Morning,
            gap: 1,
        }
    }

    // 2025-01-06 is a Monday.
    const MONDAY: (i32, u32, u32) = (2025, 1, 6);

    fn monday() -> NaiveDate {
        date(MONDAY.0, MONDAY.1, MONDAY.2)
    }

    #[test]
    fn places_by_priority_with_fixed_walk() {
        let subjects = vec![Subject::new("Art", Some(2)), Subject::new("Math", Some(5))];
        let result = generate_timetable(
            &subjects,
            monday(),
            monday() + Days::new(4),
            1,
            &mut morning_walk(),
        )
        .unwrap();

        assert_eq!(result.placed, 2);
        assert!(result.warning.is_none());
        assert_eq!(result.days.len(), 2);

        let first = result.days[0].morning.as_ref().unwrap();
        assert_eq!(result.days[0].date, monday());
        assert_eq!(first.name, "Math");
        assert_eq!(first.code, "MAT001");
        assert_eq!(first.session, Session::Morning);
        assert_eq!(first.time, "9:00 AM - 12:00 PM");

        let second = result.days[1].morning.as_ref().unwrap();
        assert_eq!(result.days[1].date, monday() + Days::new(1));
        assert_eq!(second.name, "Art");
        assert_eq!(second.code, "ART002");
        assert!(result.days[1].afternoon.is_none());
    }

    #[test]
    fn afternoon_preference_fills_afternoon() {
        let subjects = vec![Subject::new("Math", Some(5))];
        let mut rng = FixedSessionRng {
            session: Session::Afternoon,
            gap: 1,
        };
        let result =
            generate_timetable(&subjects, monday(), monday() + Days::new(4), 1, &mut rng).unwrap();

        let day = &result.days[0];
        assert!(day.morning.is_none());
        let exam = day.afternoon.as_ref().unwrap();
        assert_eq!(exam.session, Session::Afternoon);
        assert_eq!(exam.time, "12:30 PM - 3:30 PM");
    }

    #[test]
    fn reports_partial_schedule_when_window_too_short() {
        let subjects = vec![
            Subject::new("Math", Some(5)),
            Subject::new("Physics", Some(4)),
            Subject::new("Art", Some(2)),
        ];
        // Two weekdays only.
        let result = generate_timetable(
            &subjects,
            monday(),
            monday() + Days::new(1),
            1,
            &mut morning_walk(),
        )
        .unwrap();

        assert_eq!(result.placed, 2);
        assert_eq!(result.requested, 3);
        assert_eq!(result.days.len(), 2);
        let warning = result.warning.unwrap();
        assert!(warning.contains("2 out of 3"), "unexpected warning: {warning}");
        // The dropped subject is the lowest priority one.
        assert!(result.days.iter().all(|day| {
            day.morning.as_ref().map(|exam| exam.name.as_str()) != Some("Art")
        }));
    }

    #[test]
    fn generation_is_deterministic_under_a_fixed_walk() {
        let subjects = vec![
            Subject::new("Math", Some(5)),
            Subject::new("Physics", Some(4)),
            Subject::new("Art", None),
        ];
        let run = |rng: &mut FixedSessionRng| {
            generate_timetable(&subjects, monday(), monday() + Days::new(13), 2, rng).unwrap()
        };
        assert_eq!(run(&mut morning_walk()), run(&mut morning_walk()));
    }

    #[test]
    fn starts_after_the_weekend() {
        let saturday = date(2025, 1, 4);
        let subjects = vec![Subject::new("Math", Some(5))];
        let result = generate_timetable(
            &subjects,
            saturday,
            saturday + Days::new(7),
            1,
            &mut morning_walk(),
        )
        .unwrap();
        assert_eq!(result.days[0].date, monday());
        assert_eq!(result.days[0].day, "Mon");
    }

    #[test]
    fn gap_walk_skips_over_the_weekend() {
        let friday = date(2025, 1, 3);
        let subjects = vec![Subject::new("Math", Some(5)), Subject::new("Art", Some(2))];
        let result = generate_timetable(
            &subjects,
            friday,
            date(2025, 1, 10),
            1,
            &mut morning_walk(),
        )
        .unwrap();

        assert_eq!(result.days[0].date, friday);
        // Friday + 1 lands on Saturday and is pushed to Monday.
        assert_eq!(result.days[1].date, monday());
    }

    #[test]
    fn equal_credits_keep_submitted_order() {
        let subjects = vec![
            Subject::new("Alpha", Some(3)),
            Subject::new("Beta", Some(3)),
            Subject::new("Gamma", Some(3)),
        ];
        let result = generate_timetable(
            &subjects,
            monday(),
            monday() + Days::new(13),
            1,
            &mut morning_walk(),
        )
        .unwrap();

        let names: Vec<&str> = result
            .days
            .iter()
            .filter_map(|day| day.morning.as_ref())
            .map(|exam| exam.name.as_str())
            .collect();
        assert_eq!(names, ["Alpha", "Beta", "Gamma"]);
        let codes: Vec<&str> = result
            .days
            .iter()
            .filter_map(|day| day.morning.as_ref())
            .map(|exam| exam.code.as_str())
            .collect();
        assert_eq!(codes, ["ALP001", "BET002", "GAM003"]);
    }

    #[test]
    fn blank_names_are_dropped_before_sequencing() {
        let subjects = vec![
            Subject::new("", Some(9)),
            Subject::new("   ", Some(8)),
            Subject::new("Math", Some(1)),
        ];
        let result = generate_timetable(
            &subjects,
            monday(),
            monday() + Days::new(4),
            1,
            &mut morning_walk(),
        )
        .unwrap();

        assert_eq!(result.requested, 1);
        assert_eq!(result.placed, 1);
        assert_eq!(result.days[0].morning.as_ref().unwrap().code, "MAT001");
    }

    #[test]
    fn rejects_reversed_date_range() {
        let subjects = vec![Subject::new("Math", Some(5))];
        let err = generate_timetable(
            &subjects,
            monday(),
            monday() - Days::new(1),
            1,
            &mut morning_walk(),
        )
        .unwrap_err();
        assert_eq!(err, ScheduleError::EndBeforeStart);
    }

    #[test]
    fn rejects_all_blank_subjects() {
        let subjects = vec![Subject::new("  ", Some(5))];
        let err = generate_timetable(
            &subjects,
            monday(),
            monday() + Days::new(4),
            1,
            &mut morning_walk(),
        )
        .unwrap_err();
        assert_eq!(err, ScheduleError::NoValidSubjects);
    }

    #[test]
    fn rejects_zero_day_gap() {
        let subjects = vec![Subject::new("Math", Some(5))];
        let err = generate_timetable(
            &subjects,
            monday(),
            monday() + Days::new(4),
            0,
            &mut morning_walk(),
        )
        .unwrap_err();
        assert_eq!(err, ScheduleError::ZeroDayGap);
    }

    #[test]
    fn randomized_runs_hold_every_invariant() {
        let subjects: Vec<Subject> = (0..10)
            .map(|i| Subject::new(format!("Subject{i}"), Some(10 - i)))
            .collect();

        for _ in 0..50 {
            let result = generate_timetable(
                &subjects,
                monday(),
                monday() + Days::new(60),
                3,
                &mut super::rng::RandomSessionRng::new(),
            )
            .unwrap();

            assert_eq!(result.placed, 10);
            assert!(result.warning.is_none());

            let mut seen_names = std::collections::HashSet::new();
            let mut previous: Option<NaiveDate> = None;
            for day in &result.days {
                // Weekdays only, strictly ascending, no duplicate dates.
                assert!(!matches!(day.date.weekday(), Weekday::Sat | Weekday::Sun));
                if let Some(prev) = previous {
                    assert!(day.date > prev);
                }
                previous = Some(day.date);
                assert!(day.morning.is_some() || day.afternoon.is_some());
                for exam in day.morning.iter().chain(day.afternoon.iter()) {
                    assert!(seen_names.insert(exam.name.clone()), "{} placed twice", exam.name);
                }
            }
            assert_eq!(seen_names.len(), 10);
        }
    }

    #[test]
    fn falls_back_to_the_other_session() {
        let mut day = ScheduleDay::new(monday());
        let math = Subject::new("Math", Some(5));
        day.assign(
            Session::Morning,
            SessionAssignment::new(&math, Session::Morning, 1),
        );

        assert_eq!(open_session(&day, Session::Morning), Some(Session::Afternoon));
        assert_eq!(open_session(&day, Session::Afternoon), Some(Session::Afternoon));

        let art = Subject::new("Art", Some(2));
        day.assign(
            Session::Afternoon,
            SessionAssignment::new(&art, Session::Afternoon, 2),
        );
        assert_eq!(open_session(&day, Session::Morning), None);
    }

    #[test]
    fn booked_days_are_walked_past() {
        let math = Subject::new("Math", Some(5));
        let art = Subject::new("Art", Some(2));
        let mut full = ScheduleDay::new(monday() + Days::new(1));
        full.assign(
            Session::Morning,
            SessionAssignment::new(&math, Session::Morning, 1),
        );
        full.assign(
            Session::Afternoon,
            SessionAssignment::new(&art, Session::Afternoon, 2),
        );
        let days = vec![full];

        // Tuesday is full, so the walk lands on Wednesday.
        let cursor = advance_past_booked(
            &days,
            monday(),
            monday() + Days::new(11),
            1,
            &mut morning_walk(),
        );
        assert_eq!(cursor, monday() + Days::new(2));

        // With the window ending on the booked Tuesday the walk leaves it.
        let cursor = advance_past_booked(
            &days,
            monday(),
            monday() + Days::new(1),
            1,
            &mut morning_walk(),
        );
        assert!(cursor > monday() + Days::new(1));
    }
}
