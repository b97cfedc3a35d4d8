//! Button handling for the three watch buttons.
//!
//! This module provides:
//! - `ButtonLevels`, the raw pressed/released level of each button for one poll
//! - `ButtonEvents`, the short/long presses completed during that poll
//! - `ButtonTracker`, debounced edge detection that reports a press when the button is
//!   released, as long if it was held for at least `LONG_PRESS_MS`
//!
//! Polled once per loop iteration from the main loop, no interrupts involved.

use crate::config::{DEBOUNCE_MS, LONG_PRESS_MS};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    Select,
    Up,
    Down,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::Select, Button::Up, Button::Down];

    #[inline]
    const fn index(self) -> usize {
        match self {
            Button::Select => 0,
            Button::Up => 1,
            Button::Down => 2,
        }
    }
}

/// Raw levels for one poll, `true` = held down.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ButtonLevels {
    pub select: bool,
    pub up: bool,
    pub down: bool,
}

impl ButtonLevels {
    #[inline]
    pub fn is_pressed(&self, button: Button) -> bool {
        match button {
            Button::Select => self.select,
            Button::Up => self.up,
            Button::Down => self.down,
        }
    }
}

/// Presses completed in one poll, as a bit set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ButtonEvents(u8);

impl ButtonEvents {
    pub const NONE: Self = Self(0);

    #[inline]
    const fn short_bit(button: Button) -> u8 {
        1 << button.index()
    }

    #[inline]
    const fn long_bit(button: Button) -> u8 {
        1 << (button.index() + 3)
    }

    pub const fn with_short(self, button: Button) -> Self {
        Self(self.0 | Self::short_bit(button))
    }

    pub const fn with_long(self, button: Button) -> Self {
        Self(self.0 | Self::long_bit(button))
    }

    /// Released after a short hold.
    #[inline]
    pub const fn short(&self, button: Button) -> bool {
        self.0 & Self::short_bit(button) != 0
    }

    /// Released after a long hold.
    #[inline]
    pub const fn long(&self, button: Button) -> bool {
        self.0 & Self::long_bit(button) != 0
    }

    /// Released at all, short or long.
    #[inline]
    pub const fn any(&self, button: Button) -> bool {
        self.short(button) || self.long(button)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

// Per-button debounce state
#[derive(Copy, Clone, Debug, Default)]
struct ButtonState {
    pressed: bool,
    pressed_at: u64,
    last_change: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct ButtonTracker {
    buttons: [ButtonState; 3],
}

impl ButtonTracker {
    pub const fn new() -> Self {
        const IDLE: ButtonState = ButtonState {
            pressed: false,
            pressed_at: 0,
            last_change: None,
        };
        Self { buttons: [IDLE; 3] }
    }

    /// Feed the levels read at `now_ms` and collect the presses that just ended.
    pub fn update(&mut self, now_ms: u64, levels: ButtonLevels) -> ButtonEvents {
        let mut events = ButtonEvents::NONE;

        for button in Button::ALL {
            let state = &mut self.buttons[button.index()];
            let level = levels.is_pressed(button);
            if level == state.pressed {
                continue;
            }

            // Debounce: ignore edges too close to the last accepted one
            if let Some(last) = state.last_change {
                if now_ms.saturating_sub(last) < DEBOUNCE_MS {
                    continue;
                }
            }
            state.last_change = Some(now_ms);
            state.pressed = level;

            if level {
                state.pressed_at = now_ms;
            } else if now_ms.saturating_sub(state.pressed_at) >= LONG_PRESS_MS {
                events = events.with_long(button);
            } else {
                events = events.with_short(button);
            }
        }

        events
    }
}
