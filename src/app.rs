//! The watch application: one `tick` per main-loop iteration.

use log::info;

use crate::backlight::{brightness_for_state, BacklightController, ViewingState};
use crate::battery::PowerStatus;
use crate::clock::{DateTime, WallClock};
use crate::config::BacklightConfig;
use crate::display::Panel;
use crate::input::{ButtonLevels, ButtonTracker};
use crate::mode::Mode;
use crate::orientation::SampleQueue;
use crate::ui::{draw_face, FaceState};

/// What the hardware reported for this iteration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TickInputs {
    pub now_ms: u64,
    pub buttons: ButtonLevels,
    pub ambient_light: u32,
    pub power: Option<PowerStatus>,
}

/// What a tick did.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TickReport {
    /// Backlight percentage currently applied.
    pub brightness: Option<u8>,
    pub viewing: ViewingState,
    pub mode: Mode,
    /// Settings mode was left this tick; `now` should be written to the RTC.
    pub committed: bool,
    pub now: DateTime,
}

pub struct WatchApp {
    mode: Mode,
    buttons: ButtonTracker,
    backlight: BacklightController,
    clock: WallClock,
    brightness: Option<u8>,
}

impl WatchApp {
    pub fn new(config: BacklightConfig, clock: WallClock, now_ms: u64) -> Self {
        Self {
            mode: Mode::Display,
            buttons: ButtonTracker::new(),
            backlight: BacklightController::new(config, now_ms),
            clock,
            brightness: None,
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn clock(&self) -> &WallClock {
        &self.clock
    }

    #[inline]
    pub fn backlight(&self) -> &BacklightController {
        &self.backlight
    }

    /// Buttons, settings edits, backlight, then one frame.
    pub fn tick<P>(
        &mut self,
        inputs: &TickInputs,
        samples: &mut SampleQueue,
        panel: &mut P,
    ) -> Result<TickReport, P::Error>
    where
        P: Panel,
    {
        let now_ms = inputs.now_ms;

        let events = self.buttons.update(now_ms, inputs.buttons);
        let update = self.mode.handle(events);
        if let Some(adj) = update.adjustment {
            self.clock.adjust(adj.field, adj.delta, now_ms);
        }
        self.mode = update.mode;

        let target = match samples.take_latest() {
            Some(sample) => Some(self.backlight.step(&sample, now_ms, inputs.ambient_light).brightness),
            // Nothing applied yet, light the panel for the starting state.
            None if self.brightness.is_none() => {
                Some(brightness_for_state(self.backlight.state(), inputs.ambient_light))
            }
            None => None,
        };
        if let Some(level) = target {
            if self.brightness != Some(level) {
                panel.set_backlight(level)?;
                self.brightness = Some(level);
            }
        }

        let now = self.clock.now(now_ms);
        if update.committed {
            info!(
                "settings saved {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                now.year, now.month, now.day, now.hour, now.minute, now.second
            );
        }

        draw_face(
            panel,
            &FaceState {
                mode: self.mode,
                now,
                power: inputs.power,
            },
        )?;
        panel.present()?;

        Ok(TickReport {
            brightness: self.brightness,
            viewing: self.backlight.state(),
            mode: self.mode,
            committed: update.committed,
            now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LONG_PRESS_MS;
    use crate::framebuffer::MemoryPanel;
    use crate::orientation::OrientationSample;

    type Canvas = MemoryPanel<160, 80>;

    fn app() -> WatchApp {
        let start = DateTime::new(2025, 5, 5, 12, 34, 0);
        WatchApp::new(BacklightConfig::DEFAULT, WallClock::new(start.to_unix(), 0), 0)
    }

    fn inputs(now_ms: u64, buttons: ButtonLevels) -> TickInputs {
        TickInputs {
            now_ms,
            buttons,
            ambient_light: 400,
            power: Some(PowerStatus::new(4000, 0)),
        }
    }

    fn idle(now_ms: u64) -> TickInputs {
        inputs(now_ms, ButtonLevels::default())
    }

    const SELECT: ButtonLevels = ButtonLevels { select: true, up: false, down: false };
    const UP: ButtonLevels = ButtonLevels { select: false, up: true, down: false };

    #[test]
    fn first_tick_lights_panel_without_samples() {
        let mut app = app();
        let mut panel = Canvas::new();
        panel.set_backlight(0).unwrap();
        let report = app.tick(&idle(10), &mut SampleQueue::new(), &mut panel).unwrap();

        assert_eq!(report.brightness, Some(100));
        assert_eq!(report.viewing, ViewingState::Viewing);
        assert_eq!(panel.backlight(), 100);
        assert_eq!(panel.presents(), 1);
        assert!(panel.lit_pixels() > 0);
    }

    #[test]
    fn panel_stays_lit_while_no_samples_arrive() {
        let mut app = app();
        let mut panel = Canvas::new();
        let mut queue = SampleQueue::new();
        for i in 0..200 {
            let report = app.tick(&idle(i * 100), &mut queue, &mut panel).unwrap();
            assert_eq!(report.brightness, Some(100));
        }
        // well past the view timeout, but the controller never stepped
        assert_eq!(app.backlight().state(), ViewingState::Viewing);
        assert_eq!(panel.backlight(), 100);
    }

    #[test]
    fn empty_queue_keeps_the_last_applied_level() {
        let mut app = app();
        let mut panel = Canvas::new();
        let mut queue = SampleQueue::new();
        let away = OrientationSample::new(0.0, 40.0, 0.0, 3);

        queue.push(away);
        app.tick(&idle(100), &mut queue, &mut panel).unwrap();
        queue.push(away);
        app.tick(&idle(150), &mut queue, &mut panel).unwrap();
        assert_eq!(panel.backlight(), 0);

        let report = app.tick(&idle(200), &mut queue, &mut panel).unwrap();
        assert_eq!(report.brightness, Some(0));
        assert_eq!(panel.backlight(), 0);
    }

    #[test]
    fn looking_away_darkens_on_the_following_tick() {
        let mut app = app();
        let mut panel = Canvas::new();
        let mut queue = SampleQueue::new();
        let away = OrientationSample::new(0.0, 40.0, 0.0, 3);

        // older sample in the queue is ignored
        queue.push(OrientationSample::new(0.0, -30.0, 0.0, 3));
        queue.push(away);
        let report = app.tick(&idle(100), &mut queue, &mut panel).unwrap();
        assert_eq!(report.brightness, Some(100));
        assert_eq!(report.viewing, ViewingState::NotViewing);
        assert!(queue.is_empty());

        queue.push(away);
        let report = app.tick(&idle(150), &mut queue, &mut panel).unwrap();
        assert_eq!(report.brightness, Some(0));
        assert_eq!(panel.backlight(), 0);
        assert_eq!(panel.presents(), 2);
    }

    #[test]
    fn settings_round_trip_edits_and_commits() {
        let mut app = app();
        let mut panel = Canvas::new();
        let mut queue = SampleQueue::new();

        // long Select enters settings
        app.tick(&inputs(0, SELECT), &mut queue, &mut panel).unwrap();
        let report = app.tick(&idle(LONG_PRESS_MS + 10), &mut queue, &mut panel).unwrap();
        assert_eq!(report.mode, Mode::ChangeHours);
        assert!(!report.committed);

        // Up bumps the hour
        app.tick(&inputs(2_000, UP), &mut queue, &mut panel).unwrap();
        let report = app.tick(&idle(2_100), &mut queue, &mut panel).unwrap();
        assert_eq!(report.now.hour, 13);
        assert_eq!(report.now.minute, 34);

        // long Select leaves and asks for the RTC write
        app.tick(&inputs(3_000, SELECT), &mut queue, &mut panel).unwrap();
        let report = app
            .tick(&idle(3_000 + LONG_PRESS_MS), &mut queue, &mut panel)
            .unwrap();
        assert_eq!(report.mode, Mode::Display);
        assert!(report.committed);
        assert_eq!((report.now.hour, report.now.minute), (13, 34));

        let report = app.tick(&idle(4_100), &mut queue, &mut panel).unwrap();
        assert!(!report.committed);
    }
}
