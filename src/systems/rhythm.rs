//! Streak bookkeeping for player actions judged against the beat.

use bevy_ecs::{
    event::EventWriter,
    resource::Resource,
    system::{Res, ResMut},
};
use tracing::debug;

use crate::events::GameEvent;
use crate::systems::Conductor;

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct RhythmState {
    pub streak: u32,
    pub max_streak: u32,
    /// Set when a streak above zero is lost, cleared when a new streak begins.
    pub streak_broken: bool,
    /// Most recent beat number the inaction sweep has looked at.
    pub last_checked_beat: u32,
}

impl RhythmState {
    fn extend(&mut self) {
        self.streak += 1;
        self.max_streak = self.max_streak.max(self.streak);
        if self.streak == 1 {
            self.streak_broken = false;
        }
    }

    /// Resets the streak. Returns the lost streak if there was one.
    fn reset(&mut self) -> Option<u32> {
        let lost = std::mem::take(&mut self.streak);
        if lost > 0 {
            self.streak_broken = true;
            debug!(streak = lost, "Streak broken");
            Some(lost)
        } else {
            None
        }
    }
}

/// How a successful player action landed relative to the beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRhythm {
    OnBeat,
    /// Off the beat; carries the streak that was lost, if any.
    OffBeat { broken: Option<u32> },
}

impl ActionRhythm {
    pub fn is_on_beat(self) -> bool {
        matches!(self, ActionRhythm::OnBeat)
    }
}

/// Judges an action that already succeeded at the state-machine level.
///
/// The action is always registered with the clock, which records a miss when
/// it is off beat. On beat extends the streak; off beat resets it.
pub fn judge_action(conductor: &mut Conductor, rhythm: &mut RhythmState, now: u64) -> ActionRhythm {
    if conductor.register_action(now) {
        rhythm.extend();
        ActionRhythm::OnBeat
    } else {
        ActionRhythm::OffBeat { broken: rhythm.reset() }
    }
}

/// Breaks the streak when a beat boundary passes with no registered action
/// since the boundary before it. Runs once per newly observed beat.
pub fn rhythm_sweep_system(
    conductor: Res<Conductor>,
    mut rhythm: ResMut<RhythmState>,
    mut events: EventWriter<GameEvent>,
) {
    let current = conductor.beat_count();
    if current <= rhythm.last_checked_beat {
        return;
    }

    let previous = rhythm.last_checked_beat;
    if conductor.last_action_beat().is_none_or(|beat| beat < previous) {
        if let Some(streak) = rhythm.reset() {
            events.write(GameEvent::StreakBroken { streak });
        }
    }
    rhythm.last_checked_beat = current;
}
