//! Session context and per-frame driver
//!
//! The session owns every piece of mutable state. The host calls
//! [`Session::frame`] once per display refresh and
//! [`Session::on_tracking_frame`] whenever the tracker produces a result;
//! both must run on the same logical thread.

use super::director::ParticleDirector;
use super::gesture::TrackingFrame;
use super::stage::{Millis, Stage, StageEvent, StageMachine};
use crate::consts::MAX_SUBSTEPS;
use crate::platform::{TrackingError, TrackingStatus};
use crate::settings::{Settings, SettingsError};
use crate::ui::{SceneRenderer, UiPanels};

#[derive(Debug, Clone)]
pub struct Session {
    settings: Settings,
    director: ParticleDirector,
    machine: StageMachine,
    tracking: TrackingStatus,
    /// Fixed-rate physics accumulator (seconds)
    accumulator: f32,
    last_frame: Option<Millis>,
    frames: u64,
    ticks: u64,
    events: Vec<StageEvent>,
}

impl Session {
    /// Build a session, rejecting tunables that would stall the machine
    pub fn new(settings: Settings) -> Result<Self, SettingsError> {
        settings.tunables.validate()?;
        log::info!(
            "Session starting: quality {}, seed {:#x}",
            settings.quality.as_str(),
            settings.tunables.seed
        );
        let director = ParticleDirector::new(&settings);
        let machine = StageMachine::new(&settings.tunables);
        Ok(Self {
            settings,
            director,
            machine,
            tracking: TrackingStatus::default(),
            accumulator: 0.0,
            last_frame: None,
            frames: 0,
            ticks: 0,
            events: Vec::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn director(&self) -> &ParticleDirector {
        &self.director
    }

    pub fn director_mut(&mut self) -> &mut ParticleDirector {
        &mut self.director
    }

    pub fn machine(&self) -> &StageMachine {
        &self.machine
    }

    pub fn stage(&self) -> Stage {
        self.machine.stage()
    }

    pub fn tracking(&self) -> &TrackingStatus {
        &self.tracking
    }

    /// Display frames driven so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Physics ticks stepped so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Handle one tracking result
    pub fn on_tracking_frame(&mut self, frame: &TrackingFrame, now: Millis, ui: &mut dyn UiPanels) {
        match self.tracking {
            TrackingStatus::Starting => {
                log::info!("Tracking started");
                self.tracking = TrackingStatus::Running;
                ui.hide_loading();
            }
            TrackingStatus::Running => {}
            TrackingStatus::Failed(_) => {
                log::warn!("Ignoring tracking frame after failure");
                return;
            }
        }

        let mut events = std::mem::take(&mut self.events);
        self.machine.on_frame(frame.primary(), now, &mut events);
        self.apply(&mut events, ui);
        self.events = events;
    }

    /// The tracker could not start; particles keep running without input
    pub fn tracking_failed(&mut self, error: TrackingError, ui: &mut dyn UiPanels) {
        if matches!(self.tracking, TrackingStatus::Failed(_)) {
            return;
        }
        log::error!("Tracking unavailable: {error}");
        ui.show_error(&error.to_string());
        self.tracking = TrackingStatus::Failed(error);
    }

    /// One display refresh: run due timers, step physics, render.
    ///
    /// Returns the number of physics ticks stepped.
    pub fn frame(
        &mut self,
        now: Millis,
        ui: &mut dyn UiPanels,
        renderer: &mut dyn SceneRenderer,
    ) -> u32 {
        let mut events = std::mem::take(&mut self.events);
        self.machine.advance(now, &mut events);
        self.apply(&mut events, ui);
        self.events = events;

        let ticks = self.physics_ticks(now);
        self.director.step(ticks);
        self.ticks += u64::from(ticks);
        self.frames += 1;

        renderer.render(&mut self.director);
        ticks
    }

    fn physics_ticks(&mut self, now: Millis) -> u32 {
        let last = self.last_frame.replace(now);
        let Some(hz) = self.settings.tunables.fixed_step_hz else {
            return 1;
        };
        let Some(last) = last else {
            return 1;
        };

        let step = 1.0 / hz;
        let dt = (now.saturating_sub(last) as f32 / 1000.0).min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= step && substeps < MAX_SUBSTEPS {
            self.accumulator -= step;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral
            self.accumulator = 0.0;
        }
        substeps
    }

    fn apply(&mut self, events: &mut Vec<StageEvent>, ui: &mut dyn UiPanels) {
        for event in events.drain(..) {
            match event {
                StageEvent::Celebrate { amount } => self.director.celebrate(amount),
                StageEvent::HidePanel(stage) => ui.hide_panel(stage),
                StageEvent::ShowPanel(stage) => ui.show_panel(stage),
                StageEvent::Confirmed { from } => {
                    log::info!("Transition out of stage {} locked", from.id())
                }
                StageEvent::Advanced { to } => log::info!("Now at stage {}", to.id()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Clock, VirtualClock};
    use crate::sim::gesture::synthetic::{pinching, raised, resting};
    use crate::ui::{HeadlessRenderer, RecordingUi, UiCall};

    /// Drive a session at 60 fps display / 30 fps tracking for `ms`
    fn run(
        session: &mut Session,
        clock: &VirtualClock,
        ui: &mut RecordingUi,
        renderer: &mut HeadlessRenderer,
        frame: &TrackingFrame,
        ms: Millis,
    ) {
        let end = clock.now_ms() + ms;
        let mut n = 0u64;
        while clock.now_ms() < end {
            let now = clock.advance(16);
            session.frame(now, ui, renderer);
            if n % 2 == 0 {
                session.on_tracking_frame(frame, now, ui);
            }
            n += 1;
        }
    }

    #[test]
    fn test_full_narrative() {
        let mut session = Session::new(Settings::default()).unwrap();
        let clock = VirtualClock::new(0);
        let mut ui = RecordingUi::new();
        let mut renderer = HeadlessRenderer::default();

        // Idle hand: nothing happens, loading screen goes away
        run(&mut session, &clock, &mut ui, &mut renderer, &TrackingFrame::with_hand(resting()), 1_000);
        assert!(!ui.loading_visible);
        assert_eq!(session.stage(), Stage::One);
        assert_eq!(session.director().alive_count(), 0);

        // Pinch ~1.1s: confirms, hides stage one, fireworks start
        let pinch = TrackingFrame::with_hand(pinching(0.03));
        run(&mut session, &clock, &mut ui, &mut renderer, &pinch, 1_100);
        assert!(session.machine().is_locked());
        assert!(!ui.is_visible(Stage::One));
        assert!(!ui.is_visible(Stage::Two));

        run(&mut session, &clock, &mut ui, &mut renderer, &pinch, 500);
        assert!(session.director().alive_count() > 0);

        // Stage two shows up only after the delay
        run(&mut session, &clock, &mut ui, &mut renderer, &pinch, 12_000);
        assert!(!ui.is_visible(Stage::Two));
        run(&mut session, &clock, &mut ui, &mut renderer, &pinch, 3_000);
        assert!(ui.is_visible(Stage::Two));
        assert_eq!(session.stage(), Stage::Two);
        assert!(!session.machine().is_locked());

        // Raise an open hand: finale
        let raise = TrackingFrame::with_hand(raised(0.25, 0.35));
        run(&mut session, &clock, &mut ui, &mut renderer, &raise, 1_200);
        assert_eq!(session.stage(), Stage::Three);
        assert!(ui.is_visible(Stage::Three));
        assert!(!ui.is_visible(Stage::Two));
        assert!(session.machine().finale_running());

        run(&mut session, &clock, &mut ui, &mut renderer, &TrackingFrame::empty(), 10_000);
        assert!(session.machine().finale_running());
        assert!(session.director().alive_count() > 0);

        let shows = ui.log.iter().filter(|c| matches!(c, UiCall::Show(_))).count();
        let hides = ui.log.iter().filter(|c| matches!(c, UiCall::Hide(_))).count();
        assert_eq!(shows, 2);
        assert_eq!(hides, 2);
        assert!(renderer.uploads > 0);
    }

    #[test]
    fn test_tracking_failure_keeps_animating() {
        let mut session = Session::new(Settings::default()).unwrap();
        let mut ui = RecordingUi::new();
        let mut renderer = HeadlessRenderer::default();

        session.tracking_failed(TrackingError::PermissionDenied, &mut ui);
        session.tracking_failed(TrackingError::NoDevice, &mut ui);
        assert_eq!(ui.error.as_deref(), Some("camera access was denied"));
        assert_eq!(ui.log.len(), 1);

        session.director_mut().celebrate(20);
        let mut now = 0;
        for _ in 0..10 {
            now += 16;
            session.frame(now, &mut ui, &mut renderer);
        }
        assert_eq!(session.ticks(), 10);
        assert!(session.director().alive_count() > 0);

        // Late frames are ignored
        session.on_tracking_frame(&TrackingFrame::with_hand(pinching(0.01)), now, &mut ui);
        assert_eq!(session.machine().hold_count(), 0);
        assert!(ui.loading_visible);
    }

    #[test]
    fn test_one_tick_per_frame_by_default() {
        let mut session = Session::new(Settings::default()).unwrap();
        let mut ui = RecordingUi::new();
        let mut renderer = HeadlessRenderer::default();
        assert_eq!(session.frame(0, &mut ui, &mut renderer), 1);
        assert_eq!(session.frame(100, &mut ui, &mut renderer), 1);
        assert_eq!(renderer.frames, 2);
    }

    #[test]
    fn test_fixed_rate_physics() {
        let mut settings = Settings::default();
        settings.tunables.fixed_step_hz = Some(60.0);
        let mut session = Session::new(settings).unwrap();
        let mut ui = RecordingUi::new();
        let mut renderer = HeadlessRenderer::default();

        session.frame(0, &mut ui, &mut renderer);
        // A 120 Hz display steps roughly every other frame
        let mut stepped = 0;
        for i in 1..=120u64 {
            stepped += session.frame(i * 1000 / 120, &mut ui, &mut renderer);
        }
        assert!((58..=61).contains(&stepped), "stepped {stepped}");

        // A long stall is capped
        assert!(session.frame(10_000, &mut ui, &mut renderer) <= MAX_SUBSTEPS);
    }

    #[test]
    fn test_rejects_unvalidated_tunables() {
        let mut settings = Settings::default();
        settings.tunables.micro_burst_every = 0;
        assert!(matches!(
            Session::new(settings),
            Err(SettingsError::Invalid { name: "micro_burst_every", .. })
        ));

        let mut settings = Settings::default();
        settings.tunables.finale_interval_ms = 0;
        assert!(matches!(
            Session::new(settings),
            Err(SettingsError::Invalid { name: "finale_interval_ms", .. })
        ));
    }
}
