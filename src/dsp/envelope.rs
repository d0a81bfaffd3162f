/*
ADSR Envelope Implementation
============================

This module implements a linear ADSR envelope generator, the amplitude
contour every voice multiplies its oscillator by.

Vocabulary
----------

  level       The envelope's current output value. It runs from 0.0 up to the
              peak and back. This multiplies the audio signal to control its
              amplitude over time.

  peak        The level the attack ramps toward. Set per note from velocity,
              so a softer note has a lower peak and a proportionally lower
              sustain.

  stage       Which phase of the envelope we're in: Idle, Attack, Decay,
              Sustain, or Release. A state machine governs transitions.

  rate        Fraction of the full 0 → peak span covered per sample. Derived
              from the stage duration and the sample rate:

                  rate = 1 / (duration_ms / 1000 * sample_rate)


The Shape: Linear Ramps
-----------------------

  Level
   peak ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)

Attack and decay durations describe the time for a FULL-SCALE ramp (0 → peak
and peak → 0 respectively). Decaying to a sustain of 70% therefore takes 30%
of the decay time. Release is different: it always takes the release time,
starting from whatever level the note had when it was released.


The State Machine
-----------------

    ┌──────┐  start   ┌────────┐  level=peak  ┌───────┐  level=S  ┌─────────┐
    │ Idle │ ───────→ │ Attack │ ───────────→ │ Decay │ ────────→ │ Sustain │
    └──────┘          └────────┘              └───────┘           └─────────┘
        ↑                 │ release              │ release            │ release
        │                 ↓                      ↓                    ↓
        │  level≈0   ┌─────────┐ ←───────────────┴────────────────────┘
        └─────────── │ Release │
                     └─────────┘

`start` enters Attack from ANY stage, including Release and Sustain. The
attack ramp begins at the current level, so a retriggered note never jumps:
the first sample after a retrigger differs from the last one by at most one
attack step. If the current level is already above the new peak, the
envelope skips straight to Decay and ramps down from where it is.


Live Parameter Changes
----------------------

Rates are cached per stage and recomputed the moment a duration or the
sample rate changes, not when a stage is entered. Turning the release knob
while a note is already releasing changes its slope on the next sample.

The sustain level is not stored here at all. It is passed to every
`process` call, so the owning voice can broadcast sustain changes without
touching envelope state.


Numeric Guards
--------------

  - A duration shorter than one sample is treated as instant: the rate becomes
    1.0 and the stage completes in a single sample. No division by zero.
  - Every ramp clamps at its target. Levels never overshoot the peak, never
    undershoot the sustain level during decay, and never go negative.
  - Release ends once the level falls within LEVEL_EPSILON of zero, and the
    output is then exactly 0.0.
*/

/// Release finishes once the level is this close to zero.
pub const LEVEL_EPSILON: f32 = 1e-6;

pub const DEFAULT_ATTACK_MS: f32 = 10.0;
pub const DEFAULT_DECAY_MS: f32 = 100.0;
pub const DEFAULT_SUSTAIN: f32 = 0.7;
pub const DEFAULT_RELEASE_MS: f32 = 300.0;

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Inactive, level = 0
    Attack,  // Ramping up to peak
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level until released
    Release, // Ramping down to 0
}

pub struct Envelope {
    // Stage durations (milliseconds)
    attack_ms: f32,
    decay_ms: f32,
    release_ms: f32,
    sample_rate: f32,

    // Cached per-sample rates, recomputed whenever the inputs above change
    attack_rate: f32,
    decay_rate: f32,
    release_rate: f32,

    // Runtime state
    stage: EnvelopeState,
    level: f32,
    peak: f32,

    // Span the decay ramp is scaled by (peak, or higher after a soft retrigger)
    decay_span: f32,
    // Level when release began
    release_start_level: f32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self::adsr(
            sample_rate,
            DEFAULT_ATTACK_MS,
            DEFAULT_DECAY_MS,
            DEFAULT_RELEASE_MS,
        )
    }

    /// Build an envelope from stage durations in milliseconds.
    ///
    /// The sustain level is supplied per sample to [`Envelope::process`].
    pub fn adsr(sample_rate: f32, attack_ms: f32, decay_ms: f32, release_ms: f32) -> Self {
        let mut env = Self {
            attack_ms,
            decay_ms,
            release_ms,
            sample_rate,

            attack_rate: 1.0,
            decay_rate: 1.0,
            release_rate: 1.0,

            stage: EnvelopeState::Idle,
            level: 0.0,
            peak: 1.0,
            decay_span: 1.0,
            release_start_level: 0.0,
        };
        env.recompute_rates();
        env
    }

    /// Enter Attack and ramp from the current level toward `peak`.
    ///
    /// Works from every stage; retriggering a sounding note continues from
    /// its current level instead of dropping to zero.
    pub fn start(&mut self, peak: f32) {
        self.peak = peak;
        self.stage = EnvelopeState::Attack;
    }

    /// Enter Release from Attack, Decay or Sustain. No-op when Idle or
    /// already releasing.
    pub fn release(&mut self) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        // Snapshot current level - the release ramp is scaled from here to 0
        self.release_start_level = self.level;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample and return the new level.
    ///
    /// `sustain` is a fraction of the peak (0.0 - 1.0).
    #[inline]
    pub fn process(&mut self, sustain: f32) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                if self.level >= self.peak {
                    // Retriggered above the new peak: decay from here
                    self.enter_decay();
                } else {
                    self.level += self.attack_rate * self.peak;
                    if self.level >= self.peak {
                        self.level = self.peak;
                        self.enter_decay();
                    }
                }
            }

            EnvelopeState::Decay => {
                let target = sustain * self.peak;
                let step = self.decay_rate * self.decay_span;
                if self.level > target {
                    self.level = (self.level - step).max(target);
                } else if self.level < target {
                    // Sustain raised mid-decay: ramp up at the decay rate
                    self.level = (self.level + step).min(target);
                }

                if (self.level - target).abs() <= LEVEL_EPSILON {
                    self.level = target;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                // Hold at sustain level until released
                self.level = sustain * self.peak;
            }

            EnvelopeState::Release => {
                self.level -= self.release_rate * self.release_start_level;

                if self.level <= LEVEL_EPSILON {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!(self.level >= 0.0);
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], sustain: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.process(sustain);
        }
    }

    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        self.attack_ms = attack_ms;
        self.attack_rate = rate_for(attack_ms, self.sample_rate);
    }

    pub fn set_decay_ms(&mut self, decay_ms: f32) {
        self.decay_ms = decay_ms;
        self.decay_rate = rate_for(decay_ms, self.sample_rate);
    }

    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.release_ms = release_ms;
        self.release_rate = rate_for(release_ms, self.sample_rate);
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recompute_rates();
    }

    /// True unless the envelope is Idle.
    pub fn is_busy(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    /// True once the envelope is releasing or has finished.
    pub fn is_released(&self) -> bool {
        matches!(self.stage, EnvelopeState::Release | EnvelopeState::Idle)
    }

    /// Force the envelope to Idle at level 0.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.release_start_level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    /// Largest change a single attack sample can make at the current peak.
    pub fn attack_step(&self) -> f32 {
        self.attack_rate * self.peak
    }

    fn enter_decay(&mut self) {
        self.decay_span = self.peak.max(self.level);
        self.stage = EnvelopeState::Decay;
    }

    fn recompute_rates(&mut self) {
        self.attack_rate = rate_for(self.attack_ms, self.sample_rate);
        self.decay_rate = rate_for(self.decay_ms, self.sample_rate);
        self.release_rate = rate_for(self.release_ms, self.sample_rate);
    }
}

/// Per-sample rate for a full-scale ramp lasting `duration_ms`.
///
/// Anything shorter than one sample (including zero, negative and NaN
/// durations) completes in a single sample.
#[inline]
fn rate_for(duration_ms: f32, sample_rate: f32) -> f32 {
    let samples = duration_ms * 0.001 * sample_rate;
    if samples > 1.0 {
        1.0 / samples
    } else {
        1.0
    }
}
