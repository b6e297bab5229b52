//! Sample buffers as seen by the meter, and the callback that forwards their
//! per-channel levels to the publisher.

use tracing::trace;

use crate::event::LevelSink;
use crate::publish::LevelPublisher;

/// A pair of power values in dB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLevel {
    pub average: f32,
    pub peak: f32,
}

impl PowerLevel {
    pub fn new(average: f32, peak: f32) -> Self {
        Self { average, peak }
    }
}

/// Levels of one channel of a delivered buffer, as computed by the audio
/// layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelLevels {
    pub average_power_level: f32,
    pub peak_hold_level: f32,
}

impl From<ChannelLevels> for PowerLevel {
    fn from(channel: ChannelLevels) -> Self {
        Self::new(channel.average_power_level, channel.peak_hold_level)
    }
}

/// One delivered chunk of audio, reduced to its channel descriptors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBuffer {
    pub channels: Vec<ChannelLevels>,
}

impl SampleBuffer {
    pub fn new(channels: Vec<ChannelLevels>) -> Self {
        Self { channels }
    }
}

/// Invoked once per delivered buffer. Reads the levels of every channel,
/// in channel order, and hands them to the publisher untouched.
pub struct SampleBufferCallback<S> {
    publisher: LevelPublisher<S>,
}

impl<S: LevelSink> SampleBufferCallback<S> {
    pub fn new(sink: S) -> Self {
        Self {
            publisher: LevelPublisher::new(sink),
        }
    }

    pub fn on_buffer(&mut self, buffer: &SampleBuffer) {
        for (channel, levels) in buffer.channels.iter().enumerate() {
            trace!(
                channel,
                average = levels.average_power_level,
                peak = levels.peak_hold_level,
                "channel levels"
            );
            self.publisher.publish((*levels).into());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::channel;

    use super::*;
    use crate::event::LevelEvent;

    fn levels(average: f32, peak: f32) -> ChannelLevels {
        ChannelLevels {
            average_power_level: average,
            peak_hold_level: peak,
        }
    }

    #[test]
    fn test_one_pair_per_channel_in_order() {
        let (tx, rx) = channel();
        let mut callback = SampleBufferCallback::new(tx);

        callback.on_buffer(&SampleBuffer::new(vec![
            levels(-30.0, -10.0),
            levels(-31.0, -11.0),
        ]));

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                LevelEvent::AveragePower(-30.0),
                LevelEvent::PeakHold(-10.0),
                LevelEvent::AveragePower(-31.0),
                LevelEvent::PeakHold(-11.0),
            ]
        );
    }

    #[test]
    fn test_empty_buffer_emits_nothing() {
        let (tx, rx) = channel();
        let mut callback = SampleBufferCallback::new(tx);

        callback.on_buffer(&SampleBuffer::default());

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_repeated_buffers_are_deduplicated() {
        let (tx, rx) = channel();
        let mut callback = SampleBufferCallback::new(tx);

        let buffer = SampleBuffer::new(vec![levels(-120.0, -120.0)]);
        callback.on_buffer(&buffer);
        callback.on_buffer(&buffer);
        callback.on_buffer(&buffer);

        assert_eq!(rx.try_iter().count(), 2);
    }
}
