//! Scroll-driven journey: a single progress value (0–100) that autoplays like a
//! video scrubber, can be grabbed and dragged by the visitor, and is split into
//! four narrative phases.
//!
//! The controller owns all mutable journey state. Presentation goes out through
//! a [`Renderer`], time comes in through a [`Scheduler`] plus
//! [`ProgressController::fire`]. Nothing here touches the DOM.

pub mod timer;

pub use timer::{ManualScheduler, Scheduler, TimerHandle};

use crate::config::JourneyConfig;

pub const MIN_PROGRESS: f64 = 0.0;
pub const MAX_PROGRESS: f64 = 100.0;
/// Width of one phase in progress units.
pub const PHASE_SPAN: f64 = 25.0;

// --- Phase ------------------------------------------------------------------

/// Discrete narrative stage derived from progress.
/// Boundaries belong to the phase they lead into: [0,25) → One, …, [75,100] → Four.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::One, Phase::Two, Phase::Three, Phase::Four];

    pub fn from_progress(progress: f64) -> Phase {
        let p = clamp_progress(progress);
        match (p / PHASE_SPAN).floor() as u8 {
            0 => Phase::One,
            1 => Phase::Two,
            2 => Phase::Three,
            _ => Phase::Four, // 3, and 4 for progress == 100
        }
    }

    pub fn from_number(n: u8) -> Option<Phase> {
        match n {
            1 => Some(Phase::One),
            2 => Some(Phase::Two),
            3 => Some(Phase::Three),
            4 => Some(Phase::Four),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    /// Progress a checkpoint click jumps to: the middle of the phase.
    pub fn center(self) -> f64 {
        (self.number() as f64 - 0.5) * PHASE_SPAN
    }

    /// Looping animation shown for this phase.
    pub fn asset_path(self) -> String {
        format!("assets/phase{}.gif", self.number())
    }
}

/// Clamp into [0,100]. NaN collapses to the start of the journey.
pub fn clamp_progress(value: f64) -> f64 {
    if value.is_nan() {
        MIN_PROGRESS
    } else {
        value.clamp(MIN_PROGRESS, MAX_PROGRESS)
    }
}

/// Map a pointer x coordinate on the journey track to a [0,1] fraction.
pub fn track_fraction(pointer_x: f64, track_left: f64, track_width: f64) -> f64 {
    if !(track_width > 0.0) || !pointer_x.is_finite() || !track_left.is_finite() {
        return 0.0;
    }
    ((pointer_x - track_left) / track_width).clamp(0.0, 1.0)
}

// --- Renderer contract --------------------------------------------------------

/// Snapshot handed to the renderer on every `set_progress`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub progress: f64,
    pub phase: Phase,
    /// Presentation hint only (e.g. CSS transition on/off).
    pub animate: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseChange {
    pub old_phase: Phase,
    pub new_phase: Phase,
}

pub trait Renderer {
    fn render(&mut self, frame: Frame);

    /// Called after `render` whenever the phase differs from the previous one.
    fn phase_changed(&mut self, _change: PhaseChange) {}
}

// --- Input ----------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResumeMode {
    /// Drag release: autoplay continues right away.
    Immediate,
    /// Checkpoint click: autoplay continues after the configured quiet period.
    Delayed,
}

/// Discrete events produced by the input layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JourneyInput {
    PointerDown { fraction: f64 },
    PointerMove { fraction: f64 },
    PointerUp,
    CheckpointClick(Phase),
    VisibilityChanged(bool),
}

// --- Controller --------------------------------------------------------------

/// Read-only view of the controller's state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressState {
    pub progress: f64,
    pub phase: Phase,
    pub is_user_interacting: bool,
    pub autoplay_active: bool,
    pub pending_resume: Option<TimerHandle>,
}

pub struct ProgressController<R, S> {
    config: JourneyConfig,
    progress: f64,
    phase: Phase,
    interacting: bool,
    /// Last visibility signal said the journey is off-screen.
    hidden: bool,
    tick_timer: Option<TimerHandle>,
    resume_timer: Option<TimerHandle>,
    renderer: R,
    scheduler: S,
}

impl<R: Renderer, S: Scheduler> ProgressController<R, S> {
    pub fn new(config: JourneyConfig, renderer: R, scheduler: S) -> Self {
        Self {
            config,
            progress: MIN_PROGRESS,
            phase: Phase::One,
            interacting: false,
            hidden: false,
            tick_timer: None,
            resume_timer: None,
            renderer,
            scheduler,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_user_interacting(&self) -> bool {
        self.interacting
    }

    pub fn is_autoplay_active(&self) -> bool {
        self.tick_timer.is_some()
    }

    pub fn has_pending_resume(&self) -> bool {
        self.resume_timer.is_some()
    }

    pub fn state(&self) -> ProgressState {
        ProgressState {
            progress: self.progress,
            phase: self.phase,
            is_user_interacting: self.interacting,
            autoplay_active: self.is_autoplay_active(),
            pending_resume: self.resume_timer,
        }
    }

    pub fn config(&self) -> &JourneyConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Push the current position to the renderer without changing anything.
    pub fn render_current(&mut self, animate: bool) {
        self.renderer.render(Frame {
            progress: self.progress,
            phase: self.phase,
            animate,
        });
    }

    /// Move to `value` (clamped). The renderer always receives the new frame;
    /// a `PhaseChange` is returned (and forwarded) only when the phase flips.
    pub fn set_progress(&mut self, value: f64, animate: bool) -> Option<PhaseChange> {
        let progress = clamp_progress(value);
        let phase = Phase::from_progress(progress);
        let old_phase = self.phase;
        self.progress = progress;
        self.phase = phase;
        self.renderer.render(Frame {
            progress,
            phase,
            animate,
        });
        if phase == old_phase {
            return None;
        }
        let change = PhaseChange {
            old_phase,
            new_phase: phase,
        };
        log::debug!(
            "journey: phase {} -> {} at {:.3}",
            old_phase.number(),
            phase.number(),
            progress
        );
        self.renderer.phase_changed(change);
        Some(change)
    }

    /// Advance by the autoplay rate for `dt_ms`. No-op unless autoplay is on and
    /// nobody is holding the journey. Reaching the end stops autoplay.
    pub fn tick(&mut self, dt_ms: f64) -> Option<PhaseChange> {
        if !self.is_autoplay_active() || self.interacting {
            return None;
        }
        let target = self.progress + self.config.advance_for(dt_ms);
        let change = self.set_progress(target, false);
        if self.progress >= MAX_PROGRESS {
            log::info!("journey: reached the end, autoplay stopped");
            self.pause_autoplay();
        }
        change
    }

    /// Start (or restart) the periodic tick. Never leaves two tick timers alive.
    /// At the end of the journey there is nothing left to play, so it stays off.
    pub fn start_autoplay(&mut self) {
        self.cancel_resume();
        if let Some(h) = self.tick_timer.take() {
            self.scheduler.cancel(h);
        }
        if self.progress >= MAX_PROGRESS {
            return;
        }
        self.tick_timer = Some(self.scheduler.set_interval(self.config.tick_period_ms));
        log::debug!("journey: autoplay started at {:.3}", self.progress);
    }

    pub fn pause_autoplay(&mut self) {
        self.cancel_resume();
        if let Some(h) = self.tick_timer.take() {
            self.scheduler.cancel(h);
            log::debug!("journey: autoplay paused at {:.3}", self.progress);
        }
    }

    pub fn on_user_interaction_start(&mut self) {
        self.interacting = true;
        self.pause_autoplay();
    }

    /// Release the journey. Nothing resumes while the section is off-screen;
    /// the next visibility signal restarts autoplay instead.
    pub fn on_user_interaction_end(&mut self, mode: ResumeMode) {
        self.interacting = false;
        if self.hidden {
            log::debug!("journey: released while hidden, autoplay stays off");
            return;
        }
        match mode {
            ResumeMode::Immediate => self.start_autoplay(),
            ResumeMode::Delayed => {
                self.cancel_resume();
                self.resume_timer = Some(self.scheduler.set_timeout(self.config.resume_delay_ms));
                log::debug!(
                    "journey: autoplay resumes in {} ms",
                    self.config.resume_delay_ms
                );
            }
        }
    }

    /// Journey section scrolled into / out of view.
    pub fn on_visibility_change(&mut self, visible: bool) {
        self.hidden = !visible;
        if visible {
            if !self.interacting {
                self.start_autoplay();
            }
        } else {
            self.pause_autoplay();
        }
    }

    /// Timer callback from the host. Handles that are no longer current are ignored.
    pub fn fire(&mut self, handle: TimerHandle) -> Option<PhaseChange> {
        if self.tick_timer == Some(handle) {
            return self.tick(self.config.tick_period_ms as f64);
        }
        if self.resume_timer == Some(handle) {
            self.resume_timer = None;
            self.scheduler.cancel(handle);
            if !self.interacting && !self.hidden {
                log::debug!("journey: quiet period over, resuming autoplay");
                self.start_autoplay();
            }
        }
        None
    }

    /// Translate an input-layer event into controller operations.
    pub fn handle(&mut self, input: JourneyInput) -> Option<PhaseChange> {
        match input {
            JourneyInput::PointerDown { fraction } => {
                self.on_user_interaction_start();
                self.set_progress(fraction * MAX_PROGRESS, false)
            }
            JourneyInput::PointerMove { fraction } => {
                if !self.interacting {
                    return None;
                }
                self.set_progress(fraction * MAX_PROGRESS, false)
            }
            JourneyInput::PointerUp => {
                if self.interacting {
                    self.on_user_interaction_end(ResumeMode::Immediate);
                }
                None
            }
            JourneyInput::CheckpointClick(phase) => {
                self.on_user_interaction_start();
                let change = self.set_progress(phase.center(), true);
                self.on_user_interaction_end(ResumeMode::Delayed);
                change
            }
            JourneyInput::VisibilityChanged(visible) => {
                self.on_visibility_change(visible);
                None
            }
        }
    }

    fn cancel_resume(&mut self) {
        if let Some(h) = self.resume_timer.take() {
            self.scheduler.cancel(h);
        }
    }
}

impl<R: Renderer> ProgressController<R, ManualScheduler> {
    /// Let `ms` of virtual time pass, firing every timer that falls due in order.
    pub fn run_for(&mut self, ms: u64) -> Vec<PhaseChange> {
        let until = self.scheduler.now_ms() + ms;
        let mut changes = Vec::new();
        while let Some(handle) = self.scheduler.pop_due(until) {
            if let Some(change) = self.fire(handle) {
                changes.push(change);
            }
        }
        self.scheduler.advance_clock_to(until);
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Frame>,
        changes: Vec<PhaseChange>,
    }

    impl Renderer for Recorder {
        fn render(&mut self, frame: Frame) {
            self.frames.push(frame);
        }
        fn phase_changed(&mut self, change: PhaseChange) {
            self.changes.push(change);
        }
    }

    fn controller() -> ProgressController<Recorder, ManualScheduler> {
        ProgressController::new(
            JourneyConfig::default(),
            Recorder::default(),
            ManualScheduler::new(),
        )
    }

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(Phase::from_progress(0.0), Phase::One);
        assert_eq!(Phase::from_progress(24.9), Phase::One);
        assert_eq!(Phase::from_progress(25.0), Phase::Two);
        assert_eq!(Phase::from_progress(50.0), Phase::Three);
        assert_eq!(Phase::from_progress(75.0), Phase::Four);
        assert_eq!(Phase::from_progress(100.0), Phase::Four);
        assert_eq!(Phase::from_progress(250.0), Phase::Four);
        assert_eq!(Phase::from_progress(-3.0), Phase::One);
        assert_eq!(Phase::from_progress(f64::NAN), Phase::One);
    }

    #[test]
    fn test_phase_centers_and_assets() {
        let centers: Vec<f64> = Phase::ALL.iter().map(|p| p.center()).collect();
        assert_eq!(centers, vec![12.5, 37.5, 62.5, 87.5]);
        for p in Phase::ALL {
            assert_eq!(Phase::from_progress(p.center()), p);
            assert_eq!(Phase::from_number(p.number()), Some(p));
        }
        assert_eq!(Phase::from_number(0), None);
        assert_eq!(Phase::Three.asset_path(), "assets/phase3.gif");
    }

    #[test]
    fn test_set_progress_clamps_and_reports_change() {
        let mut c = controller();
        assert_eq!(c.set_progress(24.9, true), None);
        assert_eq!(
            c.set_progress(25.0, true),
            Some(PhaseChange {
                old_phase: Phase::One,
                new_phase: Phase::Two
            })
        );
        c.set_progress(140.0, false);
        assert_eq!(c.progress(), 100.0);
        assert_eq!(c.phase(), Phase::Four);
        c.set_progress(-10.0, false);
        assert_eq!(c.progress(), 0.0);
        let r = c.renderer();
        assert_eq!(r.frames.len(), 4);
        assert!(r.frames[0].animate);
        assert!(!r.frames[2].animate);
        assert_eq!(r.changes.len(), 3);
    }

    #[test]
    fn test_tick_requires_autoplay() {
        let mut c = controller();
        assert_eq!(c.tick(100.0), None);
        assert_eq!(c.progress(), 0.0);
        c.start_autoplay();
        c.tick(100.0);
        assert!((c.progress() - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_start_autoplay_is_idempotent() {
        let mut c = controller();
        c.start_autoplay();
        c.start_autoplay();
        assert_eq!(c.scheduler().outstanding_intervals(), 1);
        c.run_for(1_000);
        assert!((c.progress() - 1.25).abs() < 1e-9);
        c.pause_autoplay();
        c.pause_autoplay();
        assert_eq!(c.scheduler().outstanding(), 0);
    }

    #[test]
    fn test_autoplay_stops_at_end() {
        let mut c = controller();
        c.set_progress(99.9, false);
        c.start_autoplay();
        c.run_for(100);
        assert_eq!(c.progress(), 100.0);
        assert_eq!(c.phase(), Phase::Four);
        assert!(!c.is_autoplay_active());
        assert_eq!(c.scheduler().outstanding(), 0);
        let frames = c.renderer().frames.len();
        c.run_for(1_000);
        assert_eq!(c.tick(100.0), None);
        assert_eq!(c.renderer().frames.len(), frames);
    }

    #[test]
    fn test_start_at_end_is_noop() {
        let mut c = controller();
        c.set_progress(100.0, false);
        c.start_autoplay();
        assert!(!c.is_autoplay_active());
        assert_eq!(c.scheduler().outstanding(), 0);
    }

    #[test]
    fn test_interaction_freezes_then_immediate_resume() {
        let mut c = controller();
        c.start_autoplay();
        c.run_for(500);
        let held = c.progress();
        c.on_user_interaction_start();
        assert!(!c.is_autoplay_active());
        c.run_for(2_000);
        assert_eq!(c.tick(100.0), None);
        assert_eq!(c.progress(), held);
        c.on_user_interaction_end(ResumeMode::Immediate);
        assert!(c.is_autoplay_active());
        c.run_for(100);
        assert!(c.progress() > held);
    }

    #[test]
    fn test_delayed_resume_waits_quiet_period() {
        let mut c = controller();
        c.start_autoplay();
        c.on_user_interaction_start();
        c.on_user_interaction_end(ResumeMode::Delayed);
        assert!(c.has_pending_resume());
        assert!(!c.is_autoplay_active());
        c.run_for(4_999);
        assert!(!c.is_autoplay_active());
        assert_eq!(c.progress(), 0.0);
        c.run_for(1);
        assert!(c.is_autoplay_active());
        assert!(!c.has_pending_resume());
        assert_eq!(c.scheduler().outstanding(), 1);
    }

    #[test]
    fn test_interaction_cancels_pending_resume() {
        let mut c = controller();
        c.on_user_interaction_end(ResumeMode::Delayed);
        c.run_for(3_000);
        c.on_user_interaction_start();
        assert!(!c.has_pending_resume());
        c.run_for(10_000);
        assert!(!c.is_autoplay_active());
        assert_eq!(c.scheduler().outstanding(), 0);
    }

    #[test]
    fn test_repeated_delayed_end_keeps_single_resume_timer() {
        let mut c = controller();
        c.on_user_interaction_end(ResumeMode::Delayed);
        c.run_for(2_000);
        c.on_user_interaction_end(ResumeMode::Delayed);
        assert_eq!(c.scheduler().outstanding_timeouts(), 1);
        c.run_for(3_500);
        assert!(!c.is_autoplay_active());
        c.run_for(1_500);
        assert!(c.is_autoplay_active());
    }

    #[test]
    fn test_visibility_toggles_autoplay() {
        let mut c = controller();
        c.on_visibility_change(true);
        assert!(c.is_autoplay_active());
        c.on_visibility_change(false);
        assert!(!c.is_autoplay_active());

        c.on_user_interaction_start();
        c.on_visibility_change(true);
        assert!(!c.is_autoplay_active());
    }

    #[test]
    fn test_hidden_cancels_pending_resume() {
        let mut c = controller();
        c.on_user_interaction_end(ResumeMode::Delayed);
        c.on_visibility_change(false);
        assert!(!c.has_pending_resume());
        c.run_for(6_000);
        assert!(!c.is_autoplay_active());
    }

    #[test]
    fn test_stale_handle_is_ignored() {
        let mut c = controller();
        c.start_autoplay();
        let old = c.state();
        c.pause_autoplay();
        c.start_autoplay();
        assert_eq!(c.fire(TimerHandle(1)), None);
        assert_eq!(c.progress(), old.progress);
    }

    #[test]
    fn test_drag_sequence() {
        let mut c = controller();
        c.start_autoplay();
        c.handle(JourneyInput::PointerDown { fraction: 0.3 });
        assert!(c.is_user_interacting());
        assert_eq!(c.phase(), Phase::Two);
        let change = c.handle(JourneyInput::PointerMove { fraction: 0.8 });
        assert_eq!(
            change,
            Some(PhaseChange {
                old_phase: Phase::Two,
                new_phase: Phase::Four
            })
        );
        c.handle(JourneyInput::PointerUp);
        assert!(!c.is_user_interacting());
        assert!(c.is_autoplay_active());
        // moves without a press are hover, not drags
        c.handle(JourneyInput::PointerMove { fraction: 0.1 });
        assert_eq!(c.progress(), 80.0);
    }

    #[test]
    fn test_stray_pointer_up_keeps_delayed_resume() {
        let mut c = controller();
        c.start_autoplay();
        c.handle(JourneyInput::CheckpointClick(Phase::Two));
        let pending = c.state().pending_resume;
        assert!(pending.is_some());
        c.handle(JourneyInput::PointerUp);
        assert!(!c.is_autoplay_active());
        assert_eq!(c.state().pending_resume, pending);
        assert!(c.scheduler().is_pending(pending.unwrap()));
        c.run_for(4_000);
        assert!(!c.is_autoplay_active());
        c.run_for(1_000);
        assert!(c.is_autoplay_active());
    }

    #[test]
    fn test_drag_released_while_hidden_stays_paused() {
        let mut c = controller();
        c.on_visibility_change(false);
        c.handle(JourneyInput::PointerDown { fraction: 0.4 });
        c.handle(JourneyInput::PointerUp);
        assert!(!c.is_user_interacting());
        assert!(!c.is_autoplay_active());
        assert_eq!(c.scheduler().outstanding(), 0);
        c.on_visibility_change(true);
        assert!(c.is_autoplay_active());
    }

    #[test]
    fn test_checkpoint_while_hidden_does_not_resume() {
        let mut c = controller();
        c.on_visibility_change(false);
        c.handle(JourneyInput::CheckpointClick(Phase::Four));
        assert_eq!(c.progress(), 87.5);
        assert!(!c.has_pending_resume());
        c.run_for(10_000);
        assert!(!c.is_autoplay_active());
    }

    #[test]
    fn test_renderer_and_config_accessors() {
        let mut c = controller();
        assert_eq!(c.config(), &JourneyConfig::default());
        c.renderer_mut().frames.clear();
        c.render_current(true);
        assert_eq!(
            c.renderer().frames,
            vec![Frame {
                progress: 0.0,
                phase: Phase::One,
                animate: true
            }]
        );
    }

    #[test]
    fn test_checkpoint_click_jumps_and_delays() {
        let mut c = controller();
        c.start_autoplay();
        c.handle(JourneyInput::CheckpointClick(Phase::Three));
        assert_eq!(c.progress(), 62.5);
        assert!(!c.is_user_interacting());
        assert!(!c.is_autoplay_active());
        assert!(c.has_pending_resume());
        assert!(c.renderer().frames.last().is_some_and(|f| f.animate));
        c.run_for(5_000);
        assert!(c.is_autoplay_active());
    }

    #[test]
    fn test_track_fraction() {
        assert_eq!(track_fraction(150.0, 100.0, 200.0), 0.25);
        assert_eq!(track_fraction(50.0, 100.0, 200.0), 0.0);
        assert_eq!(track_fraction(900.0, 100.0, 200.0), 1.0);
        assert_eq!(track_fraction(150.0, 100.0, 0.0), 0.0);
    }

    #[test]
    fn test_full_journey_takes_eighty_seconds() {
        let mut c = controller();
        c.start_autoplay();
        let changes = c.run_for(80_000);
        assert_eq!(c.progress(), 100.0);
        assert_eq!(changes.len(), 3);
        assert!(!c.is_autoplay_active());
    }
}
