//! Fire-and-forget sound cues.  The core only names the event; whatever
//! plays it lives outside the crate and may well be a no-op.

use crate::entities::WeaponKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Shoot(WeaponKind),
    Explosion,
    PowerUpCollected,
    EnemyHit,
    PlayerHit,
    ButtonClick,
    GameOver,
    Victory,
}

impl SoundCue {
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Shoot(WeaponKind::Basic) => "shoot-basic",
            SoundCue::Shoot(WeaponKind::Spread) => "shoot-spread",
            SoundCue::Explosion => "explosion",
            SoundCue::PowerUpCollected => "power-up",
            SoundCue::EnemyHit => "enemy-hit",
            SoundCue::PlayerHit => "player-hit",
            SoundCue::ButtonClick => "button-click",
            SoundCue::GameOver => "game-over",
            SoundCue::Victory => "victory",
        }
    }
}

pub trait SoundSink {
    /// Trigger a cue.  Must return immediately.
    fn play(&mut self, cue: SoundCue);
}

/// Sink that drops every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSound;

impl SoundSink for NullSound {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Sink that records cues in order; handy for front-ends that batch audio
/// per frame and for asserting on cues.
#[derive(Debug, Default, Clone)]
pub struct CueLog {
    pub cues: Vec<SoundCue>,
}

impl SoundSink for CueLog {
    fn play(&mut self, cue: SoundCue) {
        self.cues.push(cue);
    }
}

impl<S: SoundSink + ?Sized> SoundSink for std::rc::Rc<std::cell::RefCell<S>> {
    fn play(&mut self, cue: SoundCue) {
        self.borrow_mut().play(cue);
    }
}
