use std::f32::consts::TAU;

use crate::{
    buffer::AudioBuffer,
    error::ModuleError,
    synth::{
        message::{ExpressionKind, NoteEvent, NoteExpressionEvent},
        module::{Module, ProcessCtx, ProcessStatus},
    },
};

/// Per-voice gain parameter read through `VoiceParams`.
pub const GAIN_PARAM: usize = 0;

/// Convert MIDI note number (plus fractional semitones) to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
fn midi_note_to_freq(note: f32) -> f32 {
    440.0 * 2.0_f32.powf((note - 69.0) / 12.0)
}

/// Sine oscillator behind a linear attack/release gate.
///
/// Small enough to reason about in tests and benchmarks: `Continue` while the
/// key is held, `Tail` while releasing, `Sleep` once the gate has closed and
/// the level reached zero.
#[derive(Debug, Clone)]
pub struct SineVoice {
    attack: f32,  // seconds 0 → 1
    release: f32, // seconds 1 → 0
    sample_rate: f32,

    key: f32,
    tuning: f32, // semitones from note expression
    phase: f32,  // 0..1
    level: f32,
    gate: bool,
    velocity: f32,
    volume: f32,
}

impl SineVoice {
    pub fn new(attack: f32, release: f32) -> Self {
        Self {
            attack: attack.max(0.0),
            release: release.max(0.0),
            sample_rate: 0.0,
            key: 69.0,
            tuning: 0.0,
            phase: 0.0,
            level: 0.0,
            gate: false,
            velocity: 0.0,
            volume: 1.0,
        }
    }

    #[inline]
    fn step(&self, seconds: f32) -> f32 {
        if seconds <= 0.0 || self.sample_rate <= 0.0 {
            1.0
        } else {
            1.0 / (seconds * self.sample_rate)
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_gated(&self) -> bool {
        self.gate
    }
}

impl Default for SineVoice {
    fn default() -> Self {
        Self::new(0.005, 0.05)
    }
}

impl Module for SineVoice {
    fn activate(&mut self, sample_rate: f64, _max_frame_count: usize) -> Result<(), ModuleError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(ModuleError::UnsupportedSampleRate(sample_rate));
        }
        self.sample_rate = sample_rate as f32;
        Ok(())
    }

    fn deactivate(&mut self) {
        self.level = 0.0;
        self.gate = false;
        self.phase = 0.0;
    }

    fn process(&mut self, ctx: &ProcessCtx<'_>, out: &mut AudioBuffer<f32>, num_frames: usize) -> ProcessStatus {
        if !self.gate && self.level <= 0.0 {
            out.clear(0.0);
            return ProcessStatus::Sleep;
        }

        let gain = ctx.params.modulated_value(GAIN_PARAM).unwrap_or(1.0) as f32;
        let amplitude = self.velocity * self.volume * gain;
        let increment = midi_note_to_freq(self.key + self.tuning) / self.sample_rate;
        let attack_step = self.step(self.attack);
        let release_step = self.step(self.release);

        out.set_constant(false);
        for frame in 0..num_frames {
            self.level = if self.gate {
                (self.level + attack_step).min(1.0)
            } else {
                (self.level - release_step).max(0.0)
            };

            let sample = (self.phase * TAU).sin() * self.level * amplitude;
            out.frame_mut(frame).fill(sample);

            self.phase += increment;
            self.phase -= self.phase.floor();
        }

        if self.gate {
            ProcessStatus::Continue
        } else if self.level > 0.0 {
            ProcessStatus::Tail
        } else {
            ProcessStatus::Sleep
        }
    }

    fn note_on(&mut self, note: &NoteEvent) {
        self.key = note.key as f32;
        self.velocity = note.velocity.clamp(0.0, 1.0) as f32;
        self.gate = true;
        self.level = 0.0; // clean retrigger
        self.phase = 0.0;
        self.tuning = 0.0;
        self.volume = 1.0;
    }

    fn note_off(&mut self, _note: &NoteEvent) {
        self.gate = false;
    }

    fn note_choke(&mut self, _note: &NoteEvent) {
        self.gate = false;
        self.level = 0.0;
    }

    fn note_expression(&mut self, expression: &NoteExpressionEvent) {
        match expression.kind {
            ExpressionKind::Volume => self.volume = expression.value.clamp(0.0, 4.0) as f32,
            ExpressionKind::Tuning => self.tuning = expression.value as f32,
            _ => {}
        }
    }
}
