//! Answer feedback tones
//!
//! Procedurally generated with the Web Audio API - no sound files. Tone
//! shapes are plain data so they can be checked without a browser.

/// Feedback tones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Correct answer - rising chirp
    Success,
    /// Wrong answer - falling buzz
    Error,
}

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
}

/// How a parameter moves between its start and end values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    Linear,
    Exponential,
}

/// A parameter sweep: `from` at t=0 to `to` at `duration` seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub from: f32,
    pub to: f32,
    pub duration: f64,
    pub ramp: Ramp,
}

/// Full description of one tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneEnvelope {
    pub waveform: Waveform,
    /// Frequency sweep (Hz)
    pub frequency: Sweep,
    /// Gain sweep
    pub gain: Sweep,
    /// Oscillator stop time (seconds)
    pub stop_at: f64,
}

impl Tone {
    pub fn envelope(self) -> ToneEnvelope {
        match self {
            Tone::Success => ToneEnvelope {
                waveform: Waveform::Sine,
                frequency: Sweep {
                    from: 500.0,
                    to: 1000.0,
                    duration: 0.1,
                    ramp: Ramp::Exponential,
                },
                gain: Sweep {
                    from: 0.2,
                    to: 0.01,
                    duration: 0.5,
                    ramp: Ramp::Exponential,
                },
                stop_at: 0.5,
            },
            Tone::Error => ToneEnvelope {
                waveform: Waveform::Sawtooth,
                frequency: Sweep {
                    from: 150.0,
                    to: 100.0,
                    duration: 0.3,
                    ramp: Ramp::Linear,
                },
                gain: Sweep {
                    from: 0.2,
                    to: 0.01,
                    duration: 0.3,
                    ramp: Ramp::Linear,
                },
                stop_at: 0.3,
            },
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioParam, GainNode, OscillatorNode, OscillatorType};

    use super::{Ramp, Sweep, Tone, ToneEnvelope, Waveform};

    /// Audio manager for feedback tones
    pub struct AudioManager {
        ctx: Option<AudioContext>,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx }
        }

        /// Play a tone. Every call gets its own oscillator, so overlapping
        /// tones simply mix.
        pub fn play(&self, tone: Tone) {
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            if self.render(ctx, &tone.envelope()).is_none() {
                log::warn!("Failed to play {:?} tone", tone);
            }
        }

        fn render(&self, ctx: &AudioContext, envelope: &ToneEnvelope) -> Option<()> {
            let (osc, gain) = self.create_osc(ctx, envelope.frequency.from, envelope.waveform)?;
            let t = ctx.current_time();

            apply_sweep(&osc.frequency(), &envelope.frequency, t)?;
            apply_sweep(&gain.gain(), &envelope.gain, t)?;

            osc.start_with_when(t).ok()?;
            osc.stop_with_when(t + envelope.stop_at).ok()
        }

        /// Create an oscillator routed through a gain node
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            waveform: Waveform,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(match waveform {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
            });
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }
    }

    fn apply_sweep(param: &AudioParam, sweep: &Sweep, t: f64) -> Option<()> {
        param.set_value_at_time(sweep.from, t).ok()?;
        let end = t + sweep.duration;
        match sweep.ramp {
            Ramp::Linear => param.linear_ramp_to_value_at_time(sweep.to, end).ok()?,
            Ramp::Exponential => param.exponential_ramp_to_value_at_time(sweep.to, end).ok()?,
        };
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rises() {
        let env = Tone::Success.envelope();
        assert_eq!(env.waveform, Waveform::Sine);
        assert!(env.frequency.to > env.frequency.from);
        assert!(env.gain.to < env.gain.from);
        assert_eq!(env.stop_at, 0.5);
    }

    #[test]
    fn test_error_falls_linearly() {
        let env = Tone::Error.envelope();
        assert_eq!(env.waveform, Waveform::Sawtooth);
        assert!(env.frequency.to < env.frequency.from);
        assert_eq!(env.frequency.ramp, Ramp::Linear);
        assert_eq!(env.gain.ramp, Ramp::Linear);
        assert_eq!(env.stop_at, 0.3);
    }

    #[test]
    fn test_tones_play_at_fixed_gain() {
        for tone in [Tone::Success, Tone::Error] {
            let env = tone.envelope();
            assert_eq!(env.gain.from, 0.2);
            assert_eq!(env.gain.to, 0.01);
        }
    }
}
