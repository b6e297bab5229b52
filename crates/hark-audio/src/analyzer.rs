//! Per-channel power levels from raw interleaved samples.
//!
//! Average power is an exponentially weighted RMS: each buffer's mean square
//! is folded into the running mean square with
//! `alpha = 1 - exp(-dt / average_time_constant)`, `dt` being the buffer
//! duration. Peak hold follows the loudest absolute sample and otherwise
//! decays exponentially with the peak time constant. Both are reported in
//! dB, clamped to `[floor_db, 0]` and rounded to the configured resolution.

use std::time::Duration;

use hark_core::{ChannelLevels, Config, SampleBuffer};

/// Tuning of the analyzer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerParams {
    pub floor_db: f32,
    pub average_time_constant: Duration,
    pub peak_decay_time_constant: Duration,
    pub resolution_db: f32,
}

impl Default for AnalyzerParams {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AnalyzerParams {
    fn from(config: &Config) -> Self {
        Self {
            floor_db: config.floor_db,
            average_time_constant: config.average_time_constant(),
            peak_decay_time_constant: config.peak_decay_time_constant(),
            resolution_db: config.resolution_db,
        }
    }
}

/// State of one channel.
#[derive(Debug, Clone)]
pub struct ChannelMeter {
    mean_square: f32,
    peak: f32,
}

impl ChannelMeter {
    fn new() -> Self {
        Self {
            mean_square: 0.0,
            peak: 0.0,
        }
    }

    /// Fold one buffer of this channel's samples into the meter.
    /// `dt` is the duration those samples cover.
    fn update(&mut self, samples: impl Iterator<Item = f32>, dt: f32, params: &AnalyzerParams) {
        let mut count = 0usize;
        let mut sum_squares = 0.0f32;
        let mut max_abs = 0.0f32;
        for sample in samples {
            // A non-finite sample would poison the running state for good.
            let sample = if sample.is_finite() { sample } else { 0.0 };
            count += 1;
            sum_squares += sample * sample;
            max_abs = max_abs.max(sample.abs());
        }

        if count > 0 {
            let alpha = smoothing_alpha(dt, params.average_time_constant);
            let buffer_mean_square = sum_squares / count as f32;
            self.mean_square += alpha * (buffer_mean_square - self.mean_square);
        }

        self.peak *= decay_factor(dt, params.peak_decay_time_constant);
        if max_abs > self.peak {
            self.peak = max_abs;
        }
    }

    pub fn average_db(&self, params: &AnalyzerParams) -> f32 {
        // Mean square is a power quantity: 10 * log10.
        quantize(power_db(self.mean_square, 10.0, params.floor_db), params)
    }

    pub fn peak_db(&self, params: &AnalyzerParams) -> f32 {
        quantize(power_db(self.peak, 20.0, params.floor_db), params)
    }
}

/// Levels for every channel of a stream.
#[derive(Debug, Clone)]
pub struct LevelAnalyzer {
    channels: Vec<ChannelMeter>,
    sample_rate: u32,
    params: AnalyzerParams,
}

impl LevelAnalyzer {
    pub fn new(channels: u16, sample_rate: u32, params: AnalyzerParams) -> Self {
        Self {
            channels: (0..channels).map(|_| ChannelMeter::new()).collect(),
            sample_rate: sample_rate.max(1),
            params,
        }
    }

    /// Analyze one interleaved buffer. Always yields one descriptor per
    /// channel, in channel order. A trailing partial frame is ignored.
    pub fn analyze(&mut self, interleaved: &[f32]) -> SampleBuffer {
        let channel_count = self.channels.len();
        if channel_count == 0 {
            return SampleBuffer::default();
        }

        let frames = interleaved.len() / channel_count;
        let dt = frames as f32 / self.sample_rate as f32;
        let data = &interleaved[..frames * channel_count];

        let params = self.params;
        let levels = self
            .channels
            .iter_mut()
            .enumerate()
            .map(|(index, meter)| {
                let samples = data.iter().skip(index).step_by(channel_count).copied();
                meter.update(samples, dt, &params);
                ChannelLevels {
                    average_power_level: meter.average_db(&params),
                    peak_hold_level: meter.peak_db(&params),
                }
            })
            .collect();

        SampleBuffer::new(levels)
    }

    /// Back to silence on every channel.
    pub fn reset(&mut self) {
        for meter in &mut self.channels {
            *meter = ChannelMeter::new();
        }
    }
}

/// `alpha = 1 - e^(-dt/tau)`
fn smoothing_alpha(dt: f32, tau: Duration) -> f32 {
    let tau = tau.as_secs_f32();
    if tau <= 0.0 {
        return 1.0;
    }
    1.0 - (-dt / tau).exp()
}

fn decay_factor(dt: f32, tau: Duration) -> f32 {
    1.0 - smoothing_alpha(dt, tau)
}

fn power_db(value: f32, scale: f32, floor_db: f32) -> f32 {
    if !value.is_finite() || value <= 0.0 {
        return floor_db;
    }
    (scale * value.log10()).clamp(floor_db, 0.0)
}

fn quantize(db: f32, params: &AnalyzerParams) -> f32 {
    let step = params.resolution_db;
    let rounded = (db / step).round() * step;
    // Rounding must not escape the reported range, nor produce -0.0.
    rounded.clamp(params.floor_db, 0.0) + 0.0
}
