//! Playback clock: virtual time that advances under play/pause/seek/speed control.
//!
//! [`ClockState`] is a plain value with pure transitions. [`PlaybackClock`] wraps it
//! with the two side effects a host needs: keeping exactly one tick scheduled while
//! playing, and notifying observers whenever the virtual instant changes.
//!
//! # Invariants
//!
//! 1. `bounds.start <= current_time <= bounds.end` after every transition.
//! 2. A tick is pending iff the status is `Playing`.
//! 3. A tick whose handle is not the pending one never advances time.
//! 4. The first tick after entering `Playing` only records the wall baseline.

use std::fmt;

use crate::graph::{Bounds, EpochMillis};

use super::scheduler::{TickHandle, TickScheduler};

/// Allowed playback speed multipliers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl SpeedRange {
    /// Normalizes so that `0 < min <= default <= max`.
    pub fn new(min: f64, max: f64, default: f64) -> Self {
        let fallback = Self::default();
        let min = if min.is_finite() && min > 0.0 {
            min
        } else {
            fallback.min
        };
        let max = if max.is_finite() && max >= min {
            max
        } else {
            min.max(fallback.max)
        };
        let default = if default.is_finite() {
            default.clamp(min, max)
        } else {
            fallback.default.clamp(min, max)
        };
        Self { min, max, default }
    }

    pub fn clamp(&self, speed: f64) -> f64 {
        speed.clamp(self.min, self.max)
    }

    /// Next faster preset (doubling)
    pub fn step_up(&self, speed: f64) -> f64 {
        self.clamp(speed * 2.0)
    }

    /// Next slower preset (halving)
    pub fn step_down(&self, speed: f64) -> f64 {
        self.clamp(speed / 2.0)
    }
}

impl Default for SpeedRange {
    fn default() -> Self {
        Self {
            min: 0.25,
            max: 256.0,
            default: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// At the start, not advancing
    Stopped,
    Playing,
    Paused,
    /// Reached the end; `play` rewinds
    Ended,
}

impl PlaybackStatus {
    pub fn glyph(&self) -> &'static str {
        match self {
            PlaybackStatus::Stopped => "■",
            PlaybackStatus::Playing => "▶",
            PlaybackStatus::Paused => "⏸",
            PlaybackStatus::Ended => "⏹",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlaybackStatus::Stopped => "stopped",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
            PlaybackStatus::Ended => "ended",
        }
    }
}

/// The clock as a value. Every transition returns the next value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockState {
    pub status: PlaybackStatus,
    pub current_time: EpochMillis,
    pub speed: f64,
    pub bounds: Bounds,
    pub speed_range: SpeedRange,
    /// Wall instant of the previous tick; `None` until the first tick after `play`
    last_tick_wall: Option<EpochMillis>,
}

impl ClockState {
    /// Stopped at the start, or already `Ended` when the timeline has zero length.
    pub fn new(bounds: Bounds, speed_range: SpeedRange) -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            current_time: bounds.start,
            speed: speed_range.default,
            bounds,
            speed_range,
            last_tick_wall: None,
        }
        .settle()
    }

    pub fn start_time(&self) -> EpochMillis {
        self.bounds.start
    }

    pub fn end_time(&self) -> EpochMillis {
        self.bounds.end
    }

    pub fn duration(&self) -> EpochMillis {
        self.bounds.duration()
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Fraction of the timeline elapsed, `0.0` for a zero-length timeline
    pub fn progress(&self) -> f64 {
        let duration = self.duration();
        if duration > 0.0 {
            ((self.current_time - self.bounds.start) / duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Enter `Playing`. Rewinds first when at the end; a zero-length timeline ends at once.
    #[must_use]
    pub fn play(self) -> Self {
        if self.is_playing() {
            return self;
        }
        let mut next = self;
        if next.status == PlaybackStatus::Ended || next.current_time >= next.bounds.end {
            next.current_time = next.bounds.start;
        }
        next.last_tick_wall = None;
        if next.duration() <= 0.0 {
            next.current_time = next.bounds.end;
            next.status = PlaybackStatus::Ended;
        } else {
            next.status = PlaybackStatus::Playing;
        }
        next
    }

    #[must_use]
    pub fn pause(self) -> Self {
        if !self.is_playing() {
            return self;
        }
        Self {
            status: PlaybackStatus::Paused,
            last_tick_wall: None,
            ..self
        }
    }

    #[must_use]
    pub fn toggle_play(self) -> Self {
        if self.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Move to `at`, clamped into the bounds. Status is kept, except that landing
    /// on the end while playing ends playback.
    #[must_use]
    pub fn seek_to(self, at: EpochMillis) -> Self {
        let mut next = self;
        next.current_time = next.bounds.clamp(at);
        if next.is_playing() && next.current_time >= next.bounds.end {
            next.status = PlaybackStatus::Ended;
            next.last_tick_wall = None;
        }
        next
    }

    /// Move to a fraction of the timeline, clamped into `[0, 1]`
    #[must_use]
    pub fn seek_to_progress(self, progress: f64) -> Self {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        // Exact endpoints so that 1.0 reliably reaches `end` despite rounding.
        let at = if progress <= 0.0 {
            self.bounds.start
        } else if progress >= 1.0 {
            self.bounds.end
        } else {
            self.bounds.start + progress * self.duration()
        };
        self.seek_to(at)
    }

    #[must_use]
    pub fn reset(self) -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            current_time: self.bounds.start,
            speed: self.speed_range.default,
            last_tick_wall: None,
            ..self
        }
        .settle()
    }

    /// Set the speed multiplier, clamped to the configured range. Non-finite input is ignored.
    #[must_use]
    pub fn with_speed(self, speed: f64) -> Self {
        if !speed.is_finite() {
            return self;
        }
        Self {
            speed: self.speed_range.clamp(speed),
            ..self
        }
    }

    /// Replace the bounds, keeping the current instant clamped into them.
    ///
    /// A clock stopped at the old start moves to the new start; an ended clock
    /// follows the new end. Playing into the new end ends playback.
    #[must_use]
    pub fn with_bounds(self, bounds: Bounds) -> Self {
        let current_time = match self.status {
            PlaybackStatus::Stopped if self.current_time == self.bounds.start => bounds.start,
            PlaybackStatus::Ended => bounds.end,
            _ => bounds.clamp(self.current_time),
        };
        Self {
            current_time,
            bounds,
            ..self
        }
        .settle()
    }

    /// Enforce the end-of-timeline rules: a zero-length timeline is always
    /// `Ended`, and playback that sits on the end has ended.
    fn settle(self) -> Self {
        let at_end = self.current_time >= self.bounds.end;
        if self.duration() <= 0.0 || (self.is_playing() && at_end) {
            Self {
                status: PlaybackStatus::Ended,
                current_time: self.bounds.end,
                last_tick_wall: None,
                ..self
            }
        } else {
            self
        }
    }

    /// Apply one tick delivered at `wall_now`. No-op unless playing.
    #[must_use]
    pub fn advance(self, wall_now: EpochMillis) -> Self {
        if !self.is_playing() {
            return self;
        }
        let Some(last) = self.last_tick_wall else {
            return Self {
                last_tick_wall: Some(wall_now),
                ..self
            };
        };

        let wall_delta = (wall_now - last).max(0.0);
        let next_time = self.current_time + wall_delta * self.speed;
        if next_time >= self.bounds.end {
            Self {
                status: PlaybackStatus::Ended,
                current_time: self.bounds.end,
                last_tick_wall: None,
                ..self
            }
        } else {
            Self {
                current_time: next_time,
                last_tick_wall: Some(wall_now),
                ..self
            }
        }
    }
}

/// What a delivered tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not the pending tick (cancelled or superseded); ignored
    Stale,
    /// First tick after entering `Playing`; baseline recorded, no advance
    Baseline,
    Advanced(EpochMillis),
    Ended(EpochMillis),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type TimeObserver = Box<dyn FnMut(EpochMillis)>;

/// Host-facing clock: [`ClockState`] plus scheduling and time-update notifications.
pub struct PlaybackClock<S: TickScheduler> {
    state: ClockState,
    scheduler: S,
    pending: Option<TickHandle>,
    observers: Vec<(SubscriptionId, TimeObserver)>,
    next_subscription: u64,
}

impl<S: TickScheduler> PlaybackClock<S> {
    pub fn new(bounds: Bounds, speed_range: SpeedRange, scheduler: S) -> Self {
        Self {
            state: ClockState::new(bounds, speed_range),
            scheduler,
            pending: None,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn current_time(&self) -> EpochMillis {
        self.state.current_time
    }

    pub fn speed(&self) -> f64 {
        self.state.speed
    }

    pub fn speed_range(&self) -> SpeedRange {
        self.state.speed_range
    }

    pub fn progress(&self) -> f64 {
        self.state.progress()
    }

    pub fn start_time(&self) -> EpochMillis {
        self.state.start_time()
    }

    pub fn end_time(&self) -> EpochMillis {
        self.state.end_time()
    }

    pub fn duration(&self) -> EpochMillis {
        self.state.duration()
    }

    /// The tick this clock is waiting for, if playing
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn play(&mut self) {
        self.apply(ClockState::play);
    }

    pub fn pause(&mut self) {
        self.apply(ClockState::pause);
    }

    pub fn toggle_play(&mut self) {
        self.apply(ClockState::toggle_play);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.apply(|s| s.with_speed(speed));
    }

    pub fn speed_up(&mut self) {
        let next = self.state.speed_range.step_up(self.state.speed);
        self.set_speed(next);
    }

    pub fn slow_down(&mut self) {
        let next = self.state.speed_range.step_down(self.state.speed);
        self.set_speed(next);
    }

    pub fn seek_to(&mut self, at: EpochMillis) {
        self.apply(|s| s.seek_to(at));
    }

    pub fn seek_to_progress(&mut self, progress: f64) {
        self.apply(|s| s.seek_to_progress(progress));
    }

    pub fn reset(&mut self) {
        self.apply(ClockState::reset);
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.apply(|s| s.with_bounds(bounds));
    }

    /// Deliver a tick fired by the host at wall instant `wall_now` (milliseconds).
    pub fn on_tick(&mut self, handle: TickHandle, wall_now: EpochMillis) -> TickOutcome {
        if self.pending != Some(handle) {
            tracing::trace!(tick = handle.raw(), "Ignoring stale playback tick");
            return TickOutcome::Stale;
        }
        self.pending = None;

        let had_baseline = self.state.last_tick_wall.is_some();
        self.apply(|s| s.advance(wall_now));

        match self.state.status {
            PlaybackStatus::Ended => TickOutcome::Ended(self.state.current_time),
            _ if !had_baseline => TickOutcome::Baseline,
            _ => TickOutcome::Advanced(self.state.current_time),
        }
    }

    /// Register a callback fired with the new virtual instant whenever it changes.
    pub fn subscribe(&mut self, observer: impl FnMut(EpochMillis) + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn apply(&mut self, transition: impl FnOnce(ClockState) -> ClockState) {
        let before = self.state;
        self.state = transition(before);
        self.sync_schedule();

        if before.status != self.state.status {
            tracing::debug!(
                from = before.status.label(),
                to = self.state.status.label(),
                at = self.state.current_time,
                "Playback status changed"
            );
        }
        if before.current_time != self.state.current_time {
            let at = self.state.current_time;
            for (_, observer) in self.observers.iter_mut() {
                observer(at);
            }
        }
    }

    /// Keep exactly one tick pending while playing, none otherwise.
    fn sync_schedule(&mut self) {
        match (self.state.is_playing(), self.pending) {
            (true, None) => self.pending = Some(self.scheduler.schedule()),
            (false, Some(handle)) => {
                self.scheduler.cancel(handle);
                self.pending = None;
            }
            _ => {}
        }
    }
}

impl<S: TickScheduler + fmt::Debug> fmt::Debug for PlaybackClock<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackClock")
            .field("state", &self.state)
            .field("pending", &self.pending)
            .field("scheduler", &self.scheduler)
            .field("observers", &self.observers.len())
            .finish()
    }
}
