//! Rebuilds same-day open intervals from an ascending open/closed stream.

use crate::error::AppError;
use crate::events::{Event, EventState};
use time::PrimitiveDateTime;
use time::macros::time;
use tracing::{debug, info};

/// A span of time within a single calendar day, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
}

impl Interval {
    pub fn new(start: PrimitiveDateTime, end: PrimitiveDateTime) -> Result<Self, AppError> {
        if start.date() != end.date() {
            return Err(AppError::CrossMidnight { start, end });
        }
        if start > end {
            return Err(AppError::InvertedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> PrimitiveDateTime {
        self.start
    }

    pub fn end(&self) -> PrimitiveDateTime {
        self.end
    }

    /// Inclusive on both ends.
    pub fn contains(&self, instant: PrimitiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Open,
    Close { since: PrimitiveDateTime },
}

/// Outcome of feeding one event to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub next: Expectation,
    pub intervals: Vec<Interval>,
}

impl Step {
    fn stay(state: Expectation) -> Self {
        Self {
            next: state,
            intervals: Vec::new(),
        }
    }
}

pub fn transition(state: Expectation, event: &Event) -> Result<Step, AppError> {
    match (state, event.state) {
        (Expectation::Open, EventState::Open) => Ok(Step {
            next: Expectation::Close {
                since: event.timestamp,
            },
            intervals: Vec::new(),
        }),
        (Expectation::Close { since }, EventState::Closed) => Ok(Step {
            next: Expectation::Open,
            intervals: split_at_midnight(since, event.timestamp)?,
        }),
        _ => {
            debug!(timestamp = %event.timestamp, state = ?event.state, "Skipping duplicate event");
            Ok(Step::stay(state))
        }
    }
}

/// Splits `[since, until]` into one interval per calendar day it touches.
fn split_at_midnight(
    mut since: PrimitiveDateTime,
    until: PrimitiveDateTime,
) -> Result<Vec<Interval>, AppError> {
    let mut intervals = Vec::new();
    while until.date() > since.date() {
        let day = since.date();
        intervals.push(Interval::new(since, day.with_time(time!(23:59:59)))?);
        since = day
            .next_day()
            .ok_or(AppError::DateOutOfRange(day))?
            .midnight();
    }
    intervals.push(Interval::new(since, until)?);
    Ok(intervals)
}

/// Walks an ascending event stream and returns its open intervals. A
/// trailing open event with no matching close contributes nothing.
pub fn reconstruct(events: &[Event]) -> Result<Vec<Interval>, AppError> {
    let mut state = Expectation::Open;
    let mut intervals = Vec::new();
    for event in events {
        let step = transition(state, event)?;
        state = step.next;
        intervals.extend(step.intervals);
    }

    if let Expectation::Close { since } = state {
        debug!(%since, "Dropping trailing open event");
    }
    if intervals.is_empty() {
        return Err(AppError::MalformedLog);
    }
    info!(
        events = events.len(),
        intervals = intervals.len(),
        "Open intervals reconstructed"
    );
    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn interval(start: PrimitiveDateTime, end: PrimitiveDateTime) -> Interval {
        Interval::new(start, end).expect("valid interval")
    }

    #[test]
    fn interval_rejects_cross_midnight() {
        let result = Interval::new(datetime!(2021-03-01 22:00), datetime!(2021-03-02 01:00));
        assert!(matches!(result, Err(AppError::CrossMidnight { .. })));
    }

    #[test]
    fn interval_rejects_inverted_bounds() {
        let result = Interval::new(datetime!(2021-03-01 12:00), datetime!(2021-03-01 08:00));
        assert!(matches!(result, Err(AppError::InvertedInterval { .. })));
    }

    #[test]
    fn open_while_expecting_open_starts_interval() -> Result<(), AppError> {
        let step = transition(Expectation::Open, &Event::open(datetime!(2021-03-01 08:00)))?;
        assert_eq!(
            step.next,
            Expectation::Close {
                since: datetime!(2021-03-01 08:00)
            }
        );
        assert!(step.intervals.is_empty());
        Ok(())
    }

    #[test]
    fn mismatched_events_leave_state_unchanged() -> Result<(), AppError> {
        let closed = transition(Expectation::Open, &Event::closed(datetime!(2021-03-01 07:00)))?;
        assert_eq!(closed, Step::stay(Expectation::Open));

        let waiting = Expectation::Close {
            since: datetime!(2021-03-01 08:00),
        };
        let open = transition(waiting, &Event::open(datetime!(2021-03-01 09:00)))?;
        assert_eq!(open, Step::stay(waiting));
        Ok(())
    }

    #[test]
    fn close_emits_same_day_interval() -> Result<(), AppError> {
        let waiting = Expectation::Close {
            since: datetime!(2021-03-01 08:00),
        };
        let step = transition(waiting, &Event::closed(datetime!(2021-03-01 12:00)))?;
        assert_eq!(step.next, Expectation::Open);
        assert_eq!(
            step.intervals,
            vec![interval(datetime!(2021-03-01 08:00), datetime!(2021-03-01 12:00))]
        );
        Ok(())
    }

    #[test]
    fn multi_day_span_is_split_at_each_midnight() -> Result<(), AppError> {
        let events = [
            Event::open(datetime!(2021-03-01 22:00)),
            Event::closed(datetime!(2021-03-03 02:00)),
        ];
        let intervals = reconstruct(&events)?;
        assert_eq!(
            intervals,
            vec![
                interval(datetime!(2021-03-01 22:00), datetime!(2021-03-01 23:59:59)),
                interval(datetime!(2021-03-02 00:00), datetime!(2021-03-02 23:59:59)),
                interval(datetime!(2021-03-03 00:00), datetime!(2021-03-03 02:00)),
            ]
        );
        Ok(())
    }

    #[test]
    fn duplicate_open_is_ignored() -> Result<(), AppError> {
        let events = [
            Event::open(datetime!(2021-03-01 08:00)),
            Event::open(datetime!(2021-03-01 09:00)),
            Event::closed(datetime!(2021-03-01 12:00)),
        ];
        assert_eq!(
            reconstruct(&events)?,
            vec![interval(datetime!(2021-03-01 08:00), datetime!(2021-03-01 12:00))]
        );
        Ok(())
    }

    #[test]
    fn leading_close_and_trailing_open_are_dropped() -> Result<(), AppError> {
        let events = [
            Event::closed(datetime!(2021-03-01 07:00)),
            Event::open(datetime!(2021-03-01 08:00)),
            Event::closed(datetime!(2021-03-01 12:00)),
            Event::closed(datetime!(2021-03-01 12:30)),
            Event::open(datetime!(2021-03-01 14:00)),
        ];
        assert_eq!(
            reconstruct(&events)?,
            vec![interval(datetime!(2021-03-01 08:00), datetime!(2021-03-01 12:00))]
        );
        Ok(())
    }

    #[test]
    fn stream_without_interval_is_malformed() {
        assert!(matches!(reconstruct(&[]), Err(AppError::MalformedLog)));
        let only_closed = [Event::closed(datetime!(2021-03-01 07:00))];
        assert!(matches!(reconstruct(&only_closed), Err(AppError::MalformedLog)));
        let only_open = [Event::open(datetime!(2021-03-01 07:00))];
        assert!(matches!(reconstruct(&only_open), Err(AppError::MalformedLog)));
    }

    #[test]
    fn reconstructed_intervals_are_well_formed() -> Result<(), AppError> {
        let events = [
            Event::open(datetime!(2021-03-05 18:30)),
            Event::closed(datetime!(2021-03-08 00:00)),
            Event::open(datetime!(2021-03-08 09:15:30)),
            Event::closed(datetime!(2021-03-08 09:15:30)),
            Event::open(datetime!(2021-03-09 23:59:59)),
            Event::closed(datetime!(2021-03-10 00:00:01)),
        ];
        let intervals = reconstruct(&events)?;
        assert_eq!(intervals.len(), 7);
        for interval in &intervals {
            assert_eq!(interval.start().date(), interval.end().date());
            assert!(interval.start() <= interval.end());
        }
        assert!(intervals.windows(2).all(|w| w[0].start() <= w[1].start()));
        Ok(())
    }
}
