use bevy::prelude::*;

use super::config::AudioConfig;
use super::rng::SessionRng;

/// Sound requests for the audio backend.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Looping music, requested once at session start.
    Soundtrack,
    Intro { variant: u8 },
    Tower { variant: u8 },
    Pilot { variant: u8 },
    /// A cow popped.
    Pop,
    /// The airplane scraped past a cow.
    Rubbing,
}

#[derive(Debug, Clone)]
struct VoiceLine {
    /// Seconds left until the line plays; `None` once played.
    remaining: Option<f64>,
    cue: AudioCue,
}

impl VoiceLine {
    fn new(after: f64, cue: AudioCue) -> Self {
        Self {
            remaining: Some(after),
            cue,
        }
    }

    fn advance(&mut self, dt: f64) -> Option<AudioCue> {
        let remaining = self.remaining.as_mut()?;
        *remaining -= dt;
        if *remaining < 0.0 {
            self.remaining = None;
            return Some(self.cue);
        }
        None
    }
}

/// Timed radio chatter and the rubbing throttle.
#[derive(Resource, Debug, Clone)]
pub struct AudioSchedule {
    lines: [VoiceLine; 3],
    rubbing_cooldown: f64,
    last_rubbing: Option<f64>,
}

impl AudioSchedule {
    /// Draws the voice-line variants for this session.
    pub fn new(config: &AudioConfig, rng: &mut SessionRng) -> Self {
        let intro = AudioCue::Intro {
            variant: rng.variant(config.intro_variants),
        };
        let pilot = AudioCue::Pilot {
            variant: rng.variant(config.pilot_variants),
        };
        let tower = AudioCue::Tower {
            variant: rng.variant(config.tower_variants),
        };
        Self {
            lines: [
                VoiceLine::new(config.intro_after_secs, intro),
                VoiceLine::new(config.tower_after_secs, tower),
                VoiceLine::new(config.pilot_after_secs, pilot),
            ],
            rubbing_cooldown: config.rubbing_cooldown_secs,
            last_rubbing: None,
        }
    }

    /// Counts every line down and returns those that became due.
    pub fn advance(&mut self, dt: f64) -> Vec<AudioCue> {
        self.lines
            .iter_mut()
            .filter_map(|line| line.advance(dt))
            .collect()
    }

    /// True when a rubbing sound may play at `game_time`.
    pub fn try_rub(&mut self, game_time: f64) -> bool {
        let ready = self
            .last_rubbing
            .map_or(true, |last| game_time - last > self.rubbing_cooldown);
        if ready {
            self.last_rubbing = Some(game_time);
        }
        ready
    }
}
