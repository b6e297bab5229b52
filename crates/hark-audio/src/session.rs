//! Capture session for the default input device. The stream is opened once
//! and then only played or paused, so there is at most one input per
//! session and nothing is ever recorded.
//!
//! A missing device or a stream that cannot be built is not an error for
//! the caller: the session is simply left without an input and never
//! reports any level.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SizedSample, StreamConfig};
use hark_core::{CaptureControl, Config, LevelSink, SampleBufferCallback};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::analyzer::{AnalyzerParams, LevelAnalyzer};

#[derive(Debug, Error)]
pub enum CaptureError {
    /// No recording device available
    #[error("no input device available")]
    NoInputDevice,
    /// Device has no usable input configuration
    #[error(transparent)]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    /// Sample format not supported
    #[error("sample format not supported: {0}")]
    SampleFormatNotSupported(String),
    /// Build stream error
    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error(transparent)]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error(transparent)]
    PauseStream(#[from] cpal::PauseStreamError),
}

type Result<T> = std::result::Result<T, CaptureError>;

/// The opened input: stream plus the state its callback shares with us.
struct Input {
    stream: cpal::Stream,
    delivering: Arc<AtomicBool>,
    analyzer: Arc<Mutex<LevelAnalyzer>>,
}

pub struct CaptureSession {
    input: Option<Input>,
    running: bool,
}

impl CaptureSession {
    /// Open the default input device of the default host.
    pub fn new<S: LevelSink + 'static>(config: &Config, sink: S) -> Self {
        let device = cpal::default_host().default_input_device();
        Self::from_device(device, config, sink)
    }

    /// Open `device`, or build an idle session if there is none.
    pub fn from_device<S: LevelSink + 'static>(
        device: Option<Device>,
        config: &Config,
        sink: S,
    ) -> Self {
        let input = match device.ok_or(CaptureError::NoInputDevice) {
            Ok(device) => match open_input(&device, AnalyzerParams::from(config), sink) {
                Ok(input) => Some(input),
                Err(e) => {
                    error!(error = %e, "Failed to open audio input, levels will not update");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "Levels will not update");
                None
            }
        };

        Self {
            input,
            running: false,
        }
    }

    /// Whether a device input was opened.
    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    /// Whether buffers are currently being delivered.
    pub fn is_running(&self) -> bool {
        self.running
    }

    fn try_start(input: &Input) -> Result<()> {
        input.analyzer.lock().reset();
        input.delivering.store(true, Ordering::Release);
        if let Err(e) = input.stream.play() {
            input.delivering.store(false, Ordering::Release);
            return Err(e.into());
        }
        Ok(())
    }

    fn try_stop(input: &Input) -> Result<()> {
        // Gate first so nothing more is published even if pausing fails.
        input.delivering.store(false, Ordering::Release);
        input.stream.pause()?;
        Ok(())
    }
}

impl CaptureControl for CaptureSession {
    fn start(&mut self) -> bool {
        let Some(input) = &self.input else {
            debug!("No audio input, start ignored");
            return true;
        };
        if self.running {
            return true;
        }
        match Self::try_start(input) {
            Ok(()) => {
                info!("Capture started");
                self.running = true;
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to start capture");
                false
            }
        }
    }

    fn stop(&mut self) {
        let Some(input) = &self.input else {
            return;
        };
        if !self.running {
            return;
        }
        if let Err(e) = Self::try_stop(input) {
            warn!(error = %e, "Failed to pause stream, delivery is gated instead");
        }
        info!("Capture stopped");
        self.running = false;
    }
}

fn open_input<S: LevelSink + 'static>(
    device: &Device,
    params: AnalyzerParams,
    sink: S,
) -> Result<Input> {
    let config = device.default_input_config()?;

    info!(
        device_name = %device.name().unwrap_or_else(|_| "unknown".to_owned()),
        config = ?config,
        "Metering from device"
    );

    let analyzer = Arc::new(Mutex::new(LevelAnalyzer::new(
        config.channels(),
        config.sample_rate().0,
        params,
    )));
    let delivering = Arc::new(AtomicBool::new(false));
    let delivery = Delivery {
        delivering: delivering.clone(),
        analyzer: analyzer.clone(),
        callback: SampleBufferCallback::new(sink),
        scratch: Vec::with_capacity(4 * 1024),
    };

    let stream_config: StreamConfig = config.config();
    let stream = match config.sample_format() {
        cpal::SampleFormat::I8 => build_stream::<i8, S>(device, &stream_config, delivery)?,
        cpal::SampleFormat::I16 => build_stream::<i16, S>(device, &stream_config, delivery)?,
        cpal::SampleFormat::I32 => build_stream::<i32, S>(device, &stream_config, delivery)?,
        cpal::SampleFormat::U8 => build_stream::<u8, S>(device, &stream_config, delivery)?,
        cpal::SampleFormat::U16 => build_stream::<u16, S>(device, &stream_config, delivery)?,
        cpal::SampleFormat::U32 => build_stream::<u32, S>(device, &stream_config, delivery)?,
        cpal::SampleFormat::F32 => build_stream::<f32, S>(device, &stream_config, delivery)?,
        cpal::SampleFormat::F64 => build_stream::<f64, S>(device, &stream_config, delivery)?,
        sample_format => {
            return Err(CaptureError::SampleFormatNotSupported(format!(
                "{:?}",
                sample_format
            )));
        }
    };

    // Some backends start delivering as soon as the stream is built.
    if let Err(e) = stream.pause() {
        debug!(error = %e, "Could not pause freshly built stream");
    }

    Ok(Input {
        stream,
        delivering,
        analyzer,
    })
}

fn build_stream<T, S>(
    device: &Device,
    config: &StreamConfig,
    mut delivery: Delivery<S>,
) -> Result<cpal::Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
    S: LevelSink + 'static,
{
    let err_fn = move |err| {
        error!("an error occurred on stream: {}", err);
    };

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| delivery.deliver(data),
        err_fn,
        None,
    )?;
    Ok(stream)
}

/// Everything the stream callback owns. Runs on the audio thread, one
/// buffer at a time.
struct Delivery<S> {
    delivering: Arc<AtomicBool>,
    analyzer: Arc<Mutex<LevelAnalyzer>>,
    callback: SampleBufferCallback<S>,
    scratch: Vec<f32>,
}

impl<S: LevelSink> Delivery<S> {
    fn deliver<T>(&mut self, data: &[T])
    where
        T: Sample,
        f32: FromSample<T>,
    {
        if !self.delivering.load(Ordering::Acquire) {
            return;
        }

        self.scratch.clear();
        self.scratch
            .extend(data.iter().map(|&sample| f32::from_sample(sample)));

        // Never block the audio thread; a buffer that races a reset is
        // simply skipped.
        let buffer = match self.analyzer.try_lock() {
            Some(mut analyzer) => analyzer.analyze(&self.scratch),
            None => return,
        };
        self.callback.on_buffer(&buffer);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::channel;

    use hark_core::{LevelDisplay, LevelEvent, PLACEHOLDER, RunningController, RunningState};

    use super::*;

    fn delivery(
        delivering: bool,
        channels: u16,
    ) -> (Delivery<std::sync::mpsc::Sender<LevelEvent>>, std::sync::mpsc::Receiver<LevelEvent>) {
        let (tx, rx) = channel();
        let delivery = Delivery {
            delivering: Arc::new(AtomicBool::new(delivering)),
            analyzer: Arc::new(Mutex::new(LevelAnalyzer::new(
                channels,
                48_000,
                AnalyzerParams::default(),
            ))),
            callback: SampleBufferCallback::new(tx),
            scratch: Vec::new(),
        };
        (delivery, rx)
    }

    #[test]
    fn test_session_without_device_is_idle() {
        let (tx, rx) = channel::<LevelEvent>();
        let mut session = CaptureSession::from_device(None, &Config::default(), tx);

        assert!(!session.has_input());
        assert!(session.start());
        assert!(!session.is_running());
        session.stop();
        session.stop();

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_no_device_leaves_display_at_placeholder() {
        let (tx, rx) = channel::<LevelEvent>();
        let session = CaptureSession::from_device(None, &Config::default(), tx);
        let mut controller = RunningController::new(session);
        let mut display = LevelDisplay::default();

        assert_eq!(controller.toggle(), RunningState::Running);
        for event in rx.try_iter() {
            display.apply(event);
        }

        assert_eq!(display.average_text(), PLACEHOLDER);
        assert_eq!(display.peak_text(), PLACEHOLDER);
    }

    #[test]
    fn test_delivery_publishes_converted_levels() {
        let (mut delivery, rx) = delivery(true, 1);

        delivery.deliver::<i16>(&[i16::MAX, i16::MIN, 0, 0]);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], LevelEvent::AveragePower(_)));
        match events[1] {
            LevelEvent::PeakHold(db) => assert!(db > -0.5, "{db}"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_delivery_gated_while_stopped() {
        let (mut delivery, rx) = delivery(false, 2);

        delivery.deliver::<f32>(&[0.5, 0.5, -0.5, -0.5]);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_delivery_emits_pair_per_channel() {
        let (mut delivery, rx) = delivery(true, 2);

        delivery.deliver::<f32>(&[0.5, 0.25, -0.5, -0.25]);

        let peaks: Vec<_> = rx
            .try_iter()
            .filter_map(|e| match e {
                LevelEvent::PeakHold(db) => Some(db),
                LevelEvent::AveragePower(_) => None,
            })
            .collect();
        // Left then right.
        assert_eq!(peaks.len(), 2);
        assert!(peaks[0] > peaks[1]);
    }

    #[test]
    fn test_silent_buffers_publish_once() {
        let (mut delivery, rx) = delivery(true, 1);

        for _ in 0..10 {
            delivery.deliver::<f32>(&[0.0; 64]);
        }

        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![LevelEvent::AveragePower(-120.0), LevelEvent::PeakHold(-120.0)]
        );
    }
}
