use crate::config::RingConfig;
use crate::gui::ring::model::{
    CanvasSize, Command, Phase, RenderObjects, Shape, Signal, sweep_end,
};
use crate::gui::ring::{EPSILON, TAU};
use derive_more::Display;
use std::time::Instant;

/// Monotonic time source in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Identifies one frame chain. A frame whose token is older than the animator's
/// current generation belongs to a cancelled chain and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("frame#{_0}")]
pub struct FrameToken(u64);

pub trait Ticker {
    /// Arrange for exactly one future call to [`Animator::on_frame`] with `token`.
    fn request_frame(&mut self, token: FrameToken);
}

/// Everything the animator needs from the surrounding toolkit.
pub trait Host: Ticker {
    fn container_size(&self) -> CanvasSize;
    fn resize_surface(&mut self, size: CanvasSize);
    fn refresh(&mut self);
    fn emit(&mut self, signal: Signal);
}

pub struct Animator<C: Clock = MonotonicClock> {
    config: RingConfig,
    pending_config: Option<RingConfig>,
    clock: C,
    canvas: CanvasSize,
    objects: RenderObjects,
    progress: f64,
    forward: bool,
    last_frame_ms: f64,
    stopped: bool,
    finished_filled: bool,
    first_time_loaded: bool,
    generation: u64,
    attached: bool,
}

impl<C: Clock> Animator<C> {
    pub fn new(config: RingConfig, clock: C) -> Self {
        let canvas = CanvasSize::default();
        let objects = RenderObjects::build(&config, canvas);
        let last_frame_ms = clock.now_ms();

        Self {
            config,
            pending_config: None,
            clock,
            canvas,
            objects,
            progress: 0.0,
            forward: false,
            last_frame_ms,
            stopped: true,
            finished_filled: false,
            first_time_loaded: true,
            generation: 0,
            attached: true,
        }
    }

    /// Sizes the surface, builds the render objects and paints them once. Only
    /// acts before the first command; later re-maps keep the live geometry.
    pub fn mount(&mut self, host: &mut impl Host) {
        if self.phase() != Phase::Idle {
            log::trace!("Ignoring mount in {} phase", self.phase());
            return;
        }
        self.measure(host);
        host.refresh();
        self.last_frame_ms = self.clock.now_ms();
    }

    pub fn command(&mut self, command: Command, host: &mut impl Host) {
        if !self.attached {
            log::warn!("Ignoring {command} after teardown");
            return;
        }

        log::debug!("Ring command: {command} (progress {:.4})", self.progress);

        if let Some(config) = self.pending_config.take() {
            self.config = config;
            self.rebuild();
        }

        self.first_time_loaded = false;
        self.last_frame_ms = self.clock.now_ms();
        // Any chain still in flight belongs to the previous command.
        self.generation += 1;

        if !self.show_animation() {
            self.measure(host);
        }

        match command {
            Command::Forward => self.start(true, host),
            Command::Backward => self.start(false, host),
            Command::Stop => {
                self.stopped = true;
                host.emit(Signal::Halted);
            }
        }
    }

    pub fn on_frame(&mut self, token: FrameToken, host: &mut impl Host) {
        if !self.attached || token != self.token() {
            log::trace!("Dropping stale {token}");
            return;
        }
        self.step(host);
    }

    fn start(&mut self, forward: bool, host: &mut impl Host) {
        self.stopped = false;
        self.forward = forward;
        self.step(host);
    }

    fn step(&mut self, host: &mut impl Host) {
        let now = self.clock.now_ms();
        let delta = ((now - self.last_frame_ms) / 1000.0) * self.config.fill_rate;

        match sweep_end(self.progress, self.config.arc_angle_offset) {
            Ok(end) => self.objects.progress.end = end,
            Err(e) => {
                log::error!("Could not update progress arc: {e}");
                self.stopped = true;
                host.emit(Signal::Error);
                return;
            }
        }

        if self.stopped {
            return;
        }

        if self.forward {
            self.progress += delta;
            if self.progress <= 1.0 + EPSILON {
                host.request_frame(self.token());
            } else {
                self.stopped = true;
                self.finished_filled = true;
                self.progress = 1.0;
                host.emit(Signal::Filled);
            }
        } else {
            self.progress -= delta;
            if self.progress >= EPSILON {
                host.request_frame(self.token());
            } else {
                self.progress = 0.0;
                self.stopped = true;
                self.finished_filled = false;
                self.objects.progress.end = self.config.arc_angle_offset * TAU;
                host.emit(Signal::Emptied);
            }
        }

        self.last_frame_ms = now;
        host.refresh();
    }

    /// Whether the widget should currently be on screen.
    pub fn show_animation(&self) -> bool {
        if self.first_time_loaded {
            return false;
        }
        if self.stopped {
            self.config.show_after_finish && self.finished_filled
        } else {
            true
        }
    }

    pub fn phase(&self) -> Phase {
        if self.first_time_loaded {
            Phase::Idle
        } else if self.stopped {
            Phase::Settled
        } else {
            Phase::Running
        }
    }

    /// Applies `config` now, or holds it until the next command if a run is in
    /// progress. Returns whether it was applied immediately.
    pub fn set_config(&mut self, config: RingConfig) -> bool {
        if self.phase() == Phase::Running {
            log::debug!("Deferring configuration until the current run ends");
            self.pending_config = Some(config);
            return false;
        }

        self.config = config;
        self.pending_config = None;
        self.rebuild();
        true
    }

    /// Back to empty without emitting anything.
    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.finished_filled = false;
        self.objects.progress.end = self.objects.progress.start;
    }

    /// Detaches from the host. Frames already scheduled become no-ops.
    pub fn teardown(&mut self) {
        self.attached = false;
        self.generation += 1;
    }

    pub fn display_list(&self) -> [Shape; 4] {
        self.objects.display_list(self.progress)
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn objects(&self) -> &RenderObjects {
        &self.objects
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    pub fn finished_filled(&self) -> bool {
        self.finished_filled
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn token(&self) -> FrameToken {
        FrameToken(self.generation)
    }

    fn measure(&mut self, host: &mut impl Host) {
        let size = CanvasSize::square_within(host.container_size());
        host.resize_surface(size);
        self.canvas = size;
        self.rebuild();
    }

    /// Rebuilds the descriptors, keeping the arc at the current progress.
    fn rebuild(&mut self) {
        self.objects = RenderObjects::build(&self.config, self.canvas);
        if let Ok(end) = sweep_end(self.progress, self.config.arc_angle_offset) {
            self.objects.progress.end = end;
        }
    }
}
