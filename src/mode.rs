//! Settings mode state machine.
//!
//! `Display` shows the time. A long Select press enters the settings cycle, where
//! each mode edits one field of the clock with Up/Down, Select moves to the next
//! field and a long Select returns to `Display`.

use log::debug;

use crate::clock::TimeField;
use crate::input::{Button, ButtonEvents};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Display,
    ChangeHours,
    ChangeMinutes,
    ChangeSeconds,
    ChangeYear,
    ChangeMonth,
    ChangeDay,
}

/// A requested clock edit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Adjustment {
    pub field: TimeField,
    pub delta: i32,
}

/// What one round of button handling produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModeUpdate {
    pub mode: Mode,
    pub adjustment: Option<Adjustment>,
    /// Settings were just left, edits should be persisted.
    pub committed: bool,
}

impl Mode {
    // All possible modes
    pub const ALL: [Mode; 7] = [
        Mode::Display,
        Mode::ChangeHours,
        Mode::ChangeMinutes,
        Mode::ChangeSeconds,
        Mode::ChangeYear,
        Mode::ChangeMonth,
        Mode::ChangeDay,
    ];

    /// Next field in the settings cycle. `Display` stays put.
    pub fn next(self) -> Self {
        use Mode::*;
        match self {
            Display => Display,
            ChangeHours => ChangeMinutes,
            ChangeMinutes => ChangeSeconds,
            ChangeSeconds => ChangeYear,
            ChangeYear => ChangeMonth,
            ChangeMonth => ChangeDay,
            ChangeDay => ChangeHours,
        }
    }

    /// Clock field this mode edits.
    pub fn field(self) -> Option<TimeField> {
        match self {
            Mode::Display => None,
            Mode::ChangeHours => Some(TimeField::Hour),
            Mode::ChangeMinutes => Some(TimeField::Minute),
            Mode::ChangeSeconds => Some(TimeField::Second),
            Mode::ChangeYear => Some(TimeField::Year),
            Mode::ChangeMonth => Some(TimeField::Month),
            Mode::ChangeDay => Some(TimeField::Day),
        }
    }

    /// Year, month or day is being edited.
    #[inline]
    pub fn is_date_field(self) -> bool {
        matches!(self, Mode::ChangeYear | Mode::ChangeMonth | Mode::ChangeDay)
    }

    /// Text shown on the status line while this mode is active.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Display => "---",
            Mode::ChangeHours => ">-----HOURS",
            Mode::ChangeMinutes => ">---MINUTES",
            Mode::ChangeSeconds => ">---SECONDS",
            Mode::ChangeYear => ">------YEAR",
            Mode::ChangeMonth => ">-----MONTH",
            Mode::ChangeDay => ">-------DAY",
        }
    }

    /// React to the presses of one poll.
    pub fn handle(self, events: ButtonEvents) -> ModeUpdate {
        let mut update = ModeUpdate {
            mode: self,
            adjustment: None,
            committed: false,
        };

        match self.field() {
            None => {
                if events.long(Button::Select) {
                    update.mode = Mode::ChangeHours;
                }
            }
            Some(field) => {
                if events.long(Button::Select) {
                    update.mode = Mode::Display;
                    update.committed = true;
                } else if events.short(Button::Select) {
                    update.mode = self.next();
                }

                // Up wins if both are released in the same poll.
                let delta = if events.any(Button::Up) {
                    1
                } else if events.any(Button::Down) {
                    -1
                } else {
                    0
                };
                if delta != 0 {
                    update.adjustment = Some(Adjustment { field, delta });
                }
            }
        }

        if update.mode != self {
            debug!("mode {:?} -> {:?}", self, update.mode);
        }
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_select_enters_and_leaves_settings() {
        let enter = Mode::Display.handle(ButtonEvents::NONE.with_long(Button::Select));
        assert_eq!(enter.mode, Mode::ChangeHours);
        assert!(!enter.committed);

        let leave = Mode::ChangeMonth.handle(ButtonEvents::NONE.with_long(Button::Select));
        assert_eq!(leave.mode, Mode::Display);
        assert!(leave.committed);
    }

    #[test]
    fn display_ignores_everything_else() {
        let events = ButtonEvents::NONE
            .with_short(Button::Select)
            .with_short(Button::Up)
            .with_long(Button::Down);
        let update = Mode::Display.handle(events);
        assert_eq!(update.mode, Mode::Display);
        assert_eq!(update.adjustment, None);
    }

    #[test]
    fn short_select_walks_the_cycle() {
        let mut mode = Mode::ChangeHours;
        let mut seen = [Mode::Display; 6];
        for slot in seen.iter_mut() {
            *slot = mode;
            mode = mode.handle(ButtonEvents::NONE.with_short(Button::Select)).mode;
        }
        assert_eq!(
            seen,
            [
                Mode::ChangeHours,
                Mode::ChangeMinutes,
                Mode::ChangeSeconds,
                Mode::ChangeYear,
                Mode::ChangeMonth,
                Mode::ChangeDay,
            ]
        );
        assert_eq!(mode, Mode::ChangeHours);
    }

    #[test]
    fn up_and_down_adjust_the_current_field() {
        let up = Mode::ChangeYear.handle(ButtonEvents::NONE.with_short(Button::Up));
        assert_eq!(
            up.adjustment,
            Some(Adjustment { field: TimeField::Year, delta: 1 })
        );

        let down = Mode::ChangeSeconds.handle(ButtonEvents::NONE.with_long(Button::Down));
        assert_eq!(
            down.adjustment,
            Some(Adjustment { field: TimeField::Second, delta: -1 })
        );
        assert_eq!(down.mode, Mode::ChangeSeconds);
    }

    #[test]
    fn labels_and_date_fields() {
        assert_eq!(Mode::ChangeMinutes.label(), ">---MINUTES");
        let date_modes = Mode::ALL.iter().filter(|m| m.is_date_field()).count();
        assert_eq!(date_modes, 3);
        assert_eq!(Mode::Display.field(), None);
        assert!(Mode::ALL[1..].iter().all(|m| m.field().is_some()));
    }
}
