//! Adaptive backlight controller.
//!
//! Decides from wrist orientation whether the face is being looked at:
//!
//! - `Viewing`: lit, brightness follows ambient light. Leaves for `NotViewing` when a
//!   trusted sample is outside the viewing cone, or for `Timeout` after being lit for
//!   too long regardless of angle.
//! - `NotViewing`: dark. Returns to `Viewing` when a sample lands inside the cone, or
//!   as soon as the sensor stops being trustworthy (fail open).
//! - `Timeout`: dark. Only an explicit wrist movement between consecutive samples
//!   turns the screen back on.
//!
//! The brightness reported by a step belongs to the state the step started in, the
//! transition takes visible effect on the following step.

use libm::fabsf;
use log::debug;

use crate::config::{BacklightConfig, LIGHT_FULL_BRIGHTNESS, LIGHT_PER_PERCENT};
use crate::orientation::OrientationSample;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ViewingState {
    Viewing,
    NotViewing,
    Timeout,
}

/// Session data carried between steps.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewingContext {
    /// When the current `Viewing` period began.
    pub viewing_started_ms: u64,
    /// y-angle of the previous sample while in `Timeout`.
    pub last_y_angle: f32,
}

/// Map an ambient light reading to a backlight percentage for the `Viewing` state.
pub fn brightness_for_light(light: u32) -> u8 {
    if light > LIGHT_FULL_BRIGHTNESS {
        return 100;
    }
    (light / LIGHT_PER_PERCENT).clamp(1, 100) as u8
}

/// Brightness a state shows.
pub fn brightness_for_state(state: ViewingState, ambient_light: u32) -> u8 {
    match state {
        ViewingState::Viewing => brightness_for_light(ambient_light),
        ViewingState::NotViewing | ViewingState::Timeout => 0,
    }
}

/// One transition. Depends only on its arguments.
pub fn advance(
    config: &BacklightConfig,
    state: ViewingState,
    ctx: ViewingContext,
    sample: &OrientationSample,
    now_ms: u64,
) -> (ViewingState, ViewingContext) {
    let reliable = sample.status >= config.reliable_threshold;

    match state {
        ViewingState::Viewing => {
            if now_ms.saturating_sub(ctx.viewing_started_ms) > config.view_timeout_ms() {
                // Lit for too long, remember where the wrist is now.
                let ctx = ViewingContext {
                    last_y_angle: sample.y,
                    ..ctx
                };
                (ViewingState::Timeout, ctx)
            } else if reliable && config.cone.excludes(sample.y, sample.z) {
                (ViewingState::NotViewing, ctx)
            } else {
                (ViewingState::Viewing, ctx)
            }
        }
        ViewingState::NotViewing => {
            if !reliable || config.cone.contains(sample.y, sample.z) {
                let ctx = ViewingContext {
                    viewing_started_ms: now_ms,
                    ..ctx
                };
                (ViewingState::Viewing, ctx)
            } else {
                (ViewingState::NotViewing, ctx)
            }
        }
        ViewingState::Timeout => {
            // Baseline is always the previous sample, so only movement between two
            // consecutive samples counts.
            let moved = fabsf(sample.y - ctx.last_y_angle) > config.movement_threshold;
            let mut ctx = ViewingContext {
                last_y_angle: sample.y,
                ..ctx
            };
            if moved {
                ctx.viewing_started_ms = now_ms;
                (ViewingState::Viewing, ctx)
            } else {
                (ViewingState::Timeout, ctx)
            }
        }
    }
}

/// Result of one controller step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// Backlight percentage to apply now.
    pub brightness: u8,
    /// State after the step.
    pub state: ViewingState,
}

/// Owns the viewing state machine. Feed it exactly one sample per tick that has one.
#[derive(Clone, Debug)]
pub struct BacklightController {
    config: BacklightConfig,
    state: ViewingState,
    ctx: ViewingContext,
}

impl BacklightController {
    /// Starts lit, with the viewing period beginning at `now_ms`.
    pub fn new(config: BacklightConfig, now_ms: u64) -> Self {
        Self {
            config,
            state: ViewingState::Viewing,
            ctx: ViewingContext {
                viewing_started_ms: now_ms,
                last_y_angle: 0.0,
            },
        }
    }

    #[inline]
    pub fn state(&self) -> ViewingState {
        self.state
    }

    #[inline]
    pub fn context(&self) -> ViewingContext {
        self.ctx
    }

    pub fn step(&mut self, sample: &OrientationSample, now_ms: u64, ambient_light: u32) -> StepOutcome {
        let brightness = brightness_for_state(self.state, ambient_light);
        let (next, ctx) = advance(&self.config, self.state, self.ctx, sample, now_ms);
        if next != self.state {
            debug!(
                "backlight {:?} -> {:?} (y={} z={} status={})",
                self.state, next, sample.y, sample.z, sample.status
            );
        }
        self.state = next;
        self.ctx = ctx;
        StepOutcome {
            brightness,
            state: next,
        }
    }
}
