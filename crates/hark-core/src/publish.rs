//! Level publishing. Two independent streams, average and peak, each with
//! consecutive duplicates removed before they reach the sink.

use crate::buffer::PowerLevel;
use crate::event::{LevelEvent, LevelSink};

/// Suppresses a value equal to the one immediately before it.
#[derive(Debug, Clone, Default)]
pub struct Dedup<T> {
    last: Option<T>,
}

impl<T: PartialEq + Copy> Dedup<T> {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Returns the value if it should be forwarded.
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.last == Some(value) {
            return None;
        }
        self.last = Some(value);
        Some(value)
    }

    /// Last value that was let through.
    pub fn last(&self) -> Option<T> {
        self.last
    }
}

/// Receives levels on the audio thread and forwards changes, in order, to
/// the sink.
pub struct LevelPublisher<S> {
    average: Dedup<f32>,
    peak: Dedup<f32>,
    sink: S,
}

impl<S: LevelSink> LevelPublisher<S> {
    pub fn new(sink: S) -> Self {
        Self {
            average: Dedup::new(),
            peak: Dedup::new(),
            sink,
        }
    }

    pub fn publish_average(&mut self, db: f32) {
        if let Some(db) = self.average.push(db) {
            self.sink.send(LevelEvent::AveragePower(db));
        }
    }

    pub fn publish_peak(&mut self, db: f32) {
        if let Some(db) = self.peak.push(db) {
            self.sink.send(LevelEvent::PeakHold(db));
        }
    }

    /// Publish both values of a level. The average stream is always
    /// offered first.
    pub fn publish(&mut self, level: PowerLevel) {
        self.publish_average(level.average);
        self.publish_peak(level.peak);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{Receiver, channel};

    use super::*;

    fn averages(rx: &Receiver<LevelEvent>) -> Vec<f32> {
        rx.try_iter()
            .filter_map(|e| match e {
                LevelEvent::AveragePower(db) => Some(db),
                LevelEvent::PeakHold(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_dedup_drops_repeats() {
        let mut dedup = Dedup::new();
        assert_eq!(dedup.push(1), Some(1));
        assert_eq!(dedup.push(1), None);
        assert_eq!(dedup.push(2), Some(2));
        assert_eq!(dedup.push(1), Some(1));
        assert_eq!(dedup.last(), Some(1));
    }

    #[test]
    fn test_average_sequence_is_deduplicated() {
        let (tx, rx) = channel();
        let mut publisher = LevelPublisher::new(tx);

        for db in [-40.0, -40.0, -35.2, -35.2, -35.2, -50.0] {
            publisher.publish_average(db);
        }

        assert_eq!(averages(&rx), vec![-40.0, -35.2, -50.0]);
    }

    #[test]
    fn test_streams_are_independent() {
        let (tx, rx) = channel();
        let mut publisher = LevelPublisher::new(tx);

        publisher.publish(PowerLevel::new(-20.0, -3.0));
        publisher.publish(PowerLevel::new(-20.0, -6.0));
        publisher.publish(PowerLevel::new(-18.0, -6.0));

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                LevelEvent::AveragePower(-20.0),
                LevelEvent::PeakHold(-3.0),
                LevelEvent::PeakHold(-6.0),
                LevelEvent::AveragePower(-18.0),
            ]
        );
    }

    #[test]
    fn test_no_consecutive_equal_values() {
        let (tx, rx) = channel();
        let mut publisher = LevelPublisher::new(tx);

        // A long pseudo-random walk over a handful of values.
        let mut x: u32 = 7;
        for _ in 0..500 {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let avg = -(((x >> 16) % 4) as f32);
            let peak = -(((x >> 8) % 3) as f32);
            publisher.publish(PowerLevel::new(avg, peak));
        }

        let mut last_avg = None;
        let mut last_peak = None;
        for event in rx.try_iter() {
            match event {
                LevelEvent::AveragePower(db) => {
                    assert_ne!(last_avg, Some(db));
                    last_avg = Some(db);
                }
                LevelEvent::PeakHold(db) => {
                    assert_ne!(last_peak, Some(db));
                    last_peak = Some(db);
                }
            }
        }
        assert!(last_avg.is_some());
        assert!(last_peak.is_some());
    }
}
