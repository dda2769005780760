//! The beat clock.
//!
//! Beats are scheduled from the moment the clock starts and advance by exactly
//! one per [`Conductor::tick`] call, no matter how late the call arrives. Player
//! input is classified against the two beat boundaries surrounding "now", after
//! shifting "now" by a latency offset that never affects scheduling.

use bevy_ecs::{
    event::EventWriter,
    resource::Resource,
    system::{Res, ResMut},
};
use strum_macros::AsRefStr;
use tracing::debug;

use crate::config::Tuning;
use crate::events::GameEvent;
use crate::systems::GameTime;

/// How an instant relates to the nearest beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Timing {
    /// The clock is not running.
    #[default]
    None,
    /// Inside the window before the next beat.
    Early,
    /// Inside the window after the last beat.
    Late,
    Miss,
    /// Inside the perfect window; only produced when an action is registered.
    Perfect,
}

#[derive(Resource, Debug, Clone)]
pub struct Conductor {
    interval: u64,
    window: u64,
    perfect_window: u64,
    latency_offset: i64,
    flash_duration: u64,

    active: bool,
    last_beat: u64,
    next_beat: u64,
    beat_count: u32,
    flash: f32,

    last_action_beat: Option<u32>,
    last_hit_timing: Timing,
}

impl Conductor {
    /// Creates a stopped clock.
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            interval: tuning.beat_interval_ms,
            window: tuning.beat_window_ms,
            perfect_window: tuning.perfect_window_ms,
            latency_offset: tuning.latency_offset_ms,
            flash_duration: tuning.flash_duration_ms,
            active: false,
            last_beat: 0,
            next_beat: 0,
            beat_count: 0,
            flash: 0.0,
            last_action_beat: None,
            last_hit_timing: Timing::None,
        }
    }

    /// Starts the clock with beat 0 at `now`. Does nothing if already running.
    pub fn start(&mut self, now: u64) {
        if self.active {
            return;
        }
        self.active = true;
        self.last_beat = now;
        self.next_beat = now + self.interval;
        self.beat_count = 0;
        self.last_action_beat = None;
        debug!(now, interval = self.interval, "Conductor started");
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advances the clock. Returns true if a beat fired during this call.
    ///
    /// At most one beat fires per call; a caller that falls behind catches up
    /// one beat per frame.
    pub fn tick(&mut self, now: u64) -> bool {
        if !self.active {
            return false;
        }

        let since = now.saturating_sub(self.last_beat) as f32;
        self.flash = (1.0 - since / self.flash_duration.max(1) as f32).max(0.0);

        if now < self.next_beat {
            return false;
        }

        self.last_beat = self.next_beat;
        self.next_beat += self.interval;
        self.beat_count += 1;
        self.flash = 1.0;
        true
    }

    /// Signed distances from the latency-shifted `now` to the last and next beat.
    fn distances(&self, now: u64) -> (i64, i64) {
        let effective = now as i64 + self.latency_offset;
        (effective - self.last_beat as i64, self.next_beat as i64 - effective)
    }

    /// Classifies `now` against the surrounding beats. Never returns [`Timing::Perfect`].
    pub fn classify(&self, now: u64) -> Timing {
        if !self.active {
            return Timing::None;
        }
        let (since, until) = self.distances(now);
        let window = self.window as i64;
        if since <= window {
            Timing::Late
        } else if until <= window {
            Timing::Early
        } else {
            Timing::Miss
        }
    }

    pub fn is_on_beat(&self, now: u64) -> bool {
        matches!(self.classify(now), Timing::Early | Timing::Late)
    }

    pub fn is_perfect(&self, now: u64) -> bool {
        if !self.active {
            return false;
        }
        let (since, until) = self.distances(now);
        let window = self.perfect_window as i64;
        since <= window || until <= window
    }

    /// Records a player action taken at `now`.
    ///
    /// Returns false, and records a miss without touching the last action beat,
    /// when `now` is not on beat.
    pub fn register_action(&mut self, now: u64) -> bool {
        let timing = self.classify(now);
        if !matches!(timing, Timing::Early | Timing::Late) {
            self.last_hit_timing = Timing::Miss;
            return false;
        }

        self.last_hit_timing = if self.is_perfect(now) { Timing::Perfect } else { timing };
        self.last_action_beat = Some(self.beat_count);
        true
    }

    pub fn beat_count(&self) -> u32 {
        self.beat_count
    }

    pub fn last_beat_time(&self) -> u64 {
        self.last_beat
    }

    pub fn next_beat_time(&self) -> u64 {
        self.next_beat
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Beat flash intensity in `[0, 1]`, 1 on the frame a beat fires.
    pub fn flash(&self) -> f32 {
        self.flash
    }

    pub fn last_action_beat(&self) -> Option<u32> {
        self.last_action_beat
    }

    /// The classification of the most recent registered action.
    pub fn last_hit_timing(&self) -> Timing {
        self.last_hit_timing
    }
}

/// Advances the beat clock once per frame, before anything classifies input.
pub fn conductor_system(time: Res<GameTime>, mut conductor: ResMut<Conductor>, mut events: EventWriter<GameEvent>) {
    if conductor.tick(time.now) {
        let beat = conductor.beat_count();
        debug!(beat, at = conductor.last_beat_time(), "Beat");
        events.write(GameEvent::Beat(beat));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(now: u64) -> Conductor {
        let mut conductor = Conductor::new(&Tuning {
            latency_offset_ms: 0,
            ..Tuning::default()
        });
        conductor.start(now);
        conductor
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut conductor = started(100);
        conductor.start(5_000);
        assert_eq!(conductor.last_beat_time(), 100);
        assert_eq!(conductor.next_beat_time(), 700);
    }

    #[test]
    fn test_flash_decays() {
        let mut conductor = started(0);
        assert!(conductor.tick(600));
        assert_eq!(conductor.flash(), 1.0);
        conductor.tick(650);
        assert!((conductor.flash() - 0.5).abs() < f32::EPSILON);
        conductor.tick(800);
        assert_eq!(conductor.flash(), 0.0);
    }

    #[test]
    fn test_timing_as_ref() {
        assert_eq!(Timing::Perfect.as_ref(), "PERFECT");
        assert_eq!(Timing::Late.as_ref(), "LATE");
    }
}
