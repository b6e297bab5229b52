//! Text shown for the two level fields.

use crate::event::LevelEvent;

/// Shown before the first value of a stream arrives.
pub const PLACEHOLDER: &str = "-";

/// Latest published levels, kept by the UI side only.
#[derive(Debug, Clone)]
pub struct LevelDisplay {
    average: Option<f32>,
    peak: Option<f32>,
    precision: usize,
}

impl LevelDisplay {
    pub fn new(precision: usize) -> Self {
        Self {
            average: None,
            peak: None,
            precision,
        }
    }

    /// Record an event. Returns `true` if the rendered text changed.
    pub fn apply(&mut self, event: LevelEvent) -> bool {
        let precision = self.precision;
        let (slot, value) = match event {
            LevelEvent::AveragePower(db) => (&mut self.average, db),
            LevelEvent::PeakHold(db) => (&mut self.peak, db),
        };
        let before = slot.map(|db| format_db(db, precision));
        *slot = Some(value);
        before.as_deref() != Some(format_db(value, precision).as_str())
    }

    pub fn average_text(&self) -> String {
        self.text(self.average)
    }

    pub fn peak_text(&self) -> String {
        self.text(self.peak)
    }

    pub fn average(&self) -> Option<f32> {
        self.average
    }

    pub fn peak(&self) -> Option<f32> {
        self.peak
    }

    /// Back to the placeholder on both fields.
    pub fn clear(&mut self) {
        self.average = None;
        self.peak = None;
    }

    fn text(&self, value: Option<f32>) -> String {
        match value {
            Some(db) => format_db(db, self.precision),
            None => PLACEHOLDER.to_owned(),
        }
    }
}

impl Default for LevelDisplay {
    fn default() -> Self {
        Self::new(1)
    }
}

fn format_db(db: f32, precision: usize) -> String {
    format!("{:.*} dB", precision, db)
}
