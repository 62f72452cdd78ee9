//! Periodic heartbeat signal driving particle displacement and shape scale

use pulse_core::{PulseError, Result};
use std::f32::consts::TAU;

/// Shape of one beat cycle, evaluated on the phase angle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Waveform {
    /// `sin φ`, in [-1, 1]
    #[default]
    Sine,
    /// `0.5 sin φ + 0.5`, in [0, 1]
    Raised,
    /// `sin² φ`, in [0, 1]; peaks twice per cycle
    Squared,
}

impl Waveform {
    pub fn eval(self, phase: f32) -> f32 {
        let s = phase.sin();
        match self {
            Waveform::Sine => s,
            Waveform::Raised => s * 0.5 + 0.5,
            Waveform::Squared => s * s,
        }
    }
}

/// Faster contraction, slower expansion.
///
/// The effective frequency switches to `contraction` when the sine crosses
/// zero going up and to `expansion` when it crosses going down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Asymmetry {
    pub contraction: f32,
    pub expansion: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatConfig {
    pub amplitude: f32,
    /// Beats per second
    pub frequency: f32,
    pub waveform: Waveform,
    pub tremor_amplitude: f32,
    pub tremor_frequency: f32,
    pub asymmetry: Option<Asymmetry>,
    /// Frequency change applied by `speed_up` / `slow_down`
    pub frequency_step: f32,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            frequency: 1.0,
            waveform: Waveform::Sine,
            tremor_amplitude: 0.0,
            tremor_frequency: 0.0,
            asymmetry: None,
            frequency_step: 0.05,
        }
    }
}

/// Heartbeat oscillator.
///
/// `intensity_at` is the pure sinusoidal baseline; `advance` is the stateful
/// form that honors asymmetric contraction/expansion.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    config: HeartbeatConfig,
    phase: f32,
    time: f32,
    rate: f32,
    intensity: f32,
}

impl Heartbeat {
    /// Lowest frequency reachable through `slow_down`
    pub const MIN_FREQUENCY: f32 = 0.05;

    pub fn new(config: HeartbeatConfig) -> Result<Self> {
        if !config.amplitude.is_finite() {
            return Err(PulseError::config("heartbeat amplitude must be finite"));
        }
        if !config.frequency.is_finite() || config.frequency <= 0.0 {
            return Err(PulseError::ValueOutOfRange {
                field: "heartbeat.frequency".into(),
                min: Self::MIN_FREQUENCY as f64,
                max: f64::INFINITY,
                value: config.frequency as f64,
            });
        }
        if let Some(asym) = config.asymmetry {
            if !(asym.contraction > 0.0 && asym.expansion > 0.0) {
                return Err(PulseError::config(
                    "heartbeat contraction and expansion frequencies must be positive",
                ));
            }
        }
        let rate = config.frequency;
        Ok(Self {
            config,
            phase: 0.0,
            time: 0.0,
            rate,
            intensity: 0.0,
        })
    }

    pub fn config(&self) -> &HeartbeatConfig {
        &self.config
    }

    /// Base frequency in beats per second
    pub fn frequency(&self) -> f32 {
        self.config.frequency
    }

    /// Frequency currently driving the phase
    pub fn current_rate(&self) -> f32 {
        self.rate
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Intensity computed by the last `advance`
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Intensity normalized by amplitude (0 when the amplitude is 0)
    pub fn normalized(&self) -> f32 {
        if self.config.amplitude == 0.0 {
            0.0
        } else {
            self.intensity / self.config.amplitude
        }
    }

    /// `amplitude · w(2π f t) + tremor · sin(2π f_tremor t)` at absolute time `t`
    pub fn intensity_at(&self, t: f32) -> f32 {
        self.config.amplitude * self.config.waveform.eval(TAU * self.config.frequency * t)
            + self.tremor(t)
    }

    fn tremor(&self, t: f32) -> f32 {
        self.config.tremor_amplitude * (TAU * self.config.tremor_frequency * t).sin()
    }

    /// Advance by `dt` seconds and return the new intensity
    pub fn advance(&mut self, dt: f32) -> f32 {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let before = self.phase.sin();
        self.phase = (self.phase + TAU * self.rate * dt).rem_euclid(TAU);
        self.time += dt;

        if let Some(asym) = self.config.asymmetry {
            let after = self.phase.sin();
            if after > 0.0 && before <= 0.0 {
                self.rate = asym.contraction;
            } else if after < 0.0 && before >= 0.0 {
                self.rate = asym.expansion;
            }
        }

        self.intensity =
            self.config.amplitude * self.config.waveform.eval(self.phase) + self.tremor(self.time);
        self.intensity
    }

    pub fn speed_up(&mut self) {
        self.set_frequency(self.config.frequency + self.config.frequency_step);
    }

    pub fn slow_down(&mut self) {
        self.set_frequency(self.config.frequency - self.config.frequency_step);
    }

    /// Change the base frequency; asymmetric rates keep their ratio to it
    pub fn set_frequency(&mut self, frequency: f32) {
        let frequency = frequency.max(Self::MIN_FREQUENCY);
        let ratio = frequency / self.config.frequency;
        self.config.frequency = frequency;
        match &mut self.config.asymmetry {
            Some(asym) => {
                asym.contraction *= ratio;
                asym.expansion *= ratio;
                self.rate *= ratio;
            }
            None => self.rate = frequency,
        }
        log::debug!("heartbeat frequency set to {frequency:.3} Hz");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(amplitude: f32, frequency: f32) -> Heartbeat {
        Heartbeat::new(HeartbeatConfig {
            amplitude,
            frequency,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn rejects_bad_config() {
        assert!(Heartbeat::new(HeartbeatConfig {
            frequency: 0.0,
            ..Default::default()
        })
        .is_err());
        assert!(Heartbeat::new(HeartbeatConfig {
            amplitude: f32::INFINITY,
            ..Default::default()
        })
        .is_err());
        assert!(Heartbeat::new(HeartbeatConfig {
            asymmetry: Some(Asymmetry {
                contraction: 1.0,
                expansion: 0.0
            }),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn sine_baseline_values() {
        let beat = sine(5.0, 1.0);
        assert!(beat.intensity_at(0.0).abs() < 1e-5);
        assert!((beat.intensity_at(0.25) - 5.0).abs() < 1e-4);
        assert!(beat.intensity_at(0.5).abs() < 1e-4);
        assert!((beat.intensity_at(0.75) + 5.0).abs() < 1e-4);
    }

    #[test]
    fn advance_tracks_baseline_for_plain_sine() {
        let mut beat = sine(2.0, 1.5);
        let dt = 1.0 / 60.0;
        for frame in 1..=240 {
            let got = beat.advance(dt);
            let want = beat.intensity_at(frame as f32 * dt);
            assert!((got - want).abs() < 1e-3, "frame {frame}: {got} vs {want}");
        }
    }

    #[test]
    fn waveforms_stay_in_range() {
        for i in 0..100 {
            let phase = i as f32 * 0.13;
            let raised = Waveform::Raised.eval(phase);
            let squared = Waveform::Squared.eval(phase);
            assert!((0.0..=1.0).contains(&raised));
            assert!((0.0..=1.0).contains(&squared));
        }
    }

    #[test]
    fn tremor_is_bounded() {
        let beat = Heartbeat::new(HeartbeatConfig {
            amplitude: 0.15,
            frequency: 0.75,
            tremor_amplitude: 0.01,
            tremor_frequency: 2.07,
            ..Default::default()
        })
        .unwrap();
        for i in 0..500 {
            let v = beat.intensity_at(i as f32 * 0.01);
            assert!(v.abs() <= 0.16 + 1e-5);
        }
    }

    #[test]
    fn asymmetric_beat_contracts_faster() {
        let mut beat = Heartbeat::new(HeartbeatConfig {
            amplitude: 1.0,
            frequency: 0.5,
            waveform: Waveform::Squared,
            asymmetry: Some(Asymmetry {
                contraction: 1.0,
                expansion: 0.3,
            }),
            ..Default::default()
        })
        .unwrap();

        let (mut positive, mut negative) = (0, 0);
        for _ in 0..(60 * 20) {
            beat.advance(1.0 / 60.0);
            if beat.phase().sin() > 0.0 {
                positive += 1;
            } else {
                negative += 1;
            }
        }
        assert!(positive * 2 < negative, "{positive} vs {negative}");
        assert!(beat.intensity() >= 0.0);
    }

    #[test]
    fn speed_controls_clamp() {
        let mut beat = sine(1.0, 0.1);
        for _ in 0..10 {
            beat.slow_down();
        }
        assert!((beat.frequency() - Heartbeat::MIN_FREQUENCY).abs() < 1e-6);
        beat.speed_up();
        assert!((beat.frequency() - 0.1).abs() < 1e-6);
        assert!((beat.current_rate() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn invalid_dt_does_not_move_phase() {
        let mut beat = sine(1.0, 1.0);
        beat.advance(0.1);
        let phase = beat.phase();
        beat.advance(f32::NAN);
        beat.advance(-3.0);
        assert_eq!(beat.phase(), phase);
    }
}
