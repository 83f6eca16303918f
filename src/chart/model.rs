use serde::{Deserialize, Serialize};

/// Kind of note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteKind {
    Short,
    Long,
}

/// A single note in the chart. Times are seconds from the start of the audio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RhythmNote {
    pub time: f64,
    /// Equal to `time` for short notes, strictly greater for long notes.
    pub end_time: f64,
    pub lane: usize,
    pub kind: NoteKind,
}

impl RhythmNote {
    pub fn short(time: f64, lane: usize) -> Self {
        Self {
            time,
            end_time: time,
            lane,
            kind: NoteKind::Short,
        }
    }

    pub fn long(time: f64, end_time: f64, lane: usize) -> Self {
        Self {
            time,
            end_time,
            lane,
            kind: NoteKind::Long,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.time
    }

    pub fn is_long(&self) -> bool {
        matches!(self.kind, NoteKind::Long)
    }
}

/// A BPM marker. Ordered ascending by time within a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingPoint {
    pub time: f64,
    pub bpm: f64,
    pub meter: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartMeta {
    pub title: String,
    pub artist: String,
    pub version: String,
    pub audio_file: String,
}

/// A parsed beatmap: ordered notes, timing points, metadata. Immutable once
/// produced by the loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub meta: ChartMeta,
    /// Number of lanes, at least 1.
    pub key_count: usize,
    /// Sorted ascending by `time`.
    pub notes: Vec<RhythmNote>,
    pub timing_points: Vec<TimingPoint>,
}

impl Chart {
    /// End time of the latest note, or 0 for an empty chart.
    pub fn total_duration(&self) -> f64 {
        self.notes.iter().map(|n| n.end_time).fold(0.0, f64::max)
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    /// BPM of the nearest timing point at or before `time`. Falls back to the
    /// first point for queries before it, and to 0 when the chart has none.
    pub fn bpm_at(&self, time: f64) -> f64 {
        let Some(first) = self.timing_points.first() else {
            return 0.0;
        };
        self.timing_points
            .iter()
            .take_while(|p| p.time <= time)
            .last()
            .unwrap_or(first)
            .bpm
    }
}
