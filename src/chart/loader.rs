use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use log::debug;

use super::{Chart, ChartError, ChartMeta, RhythmNote, TimingPoint};

/// Playfield width the lateral position of a hit object is expressed in.
const TRACK_WIDTH: f64 = 512.0;

/// Type bitmask flag marking a hold note.
const HOLD_BIT: u32 = 1 << 7;

pub struct OsuLoader;

impl OsuLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Chart> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ChartError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::parse(&source))
    }

    /// Parse beatmap text. Malformed records are skipped individually; a file
    /// with no valid notes yields an empty, zero-duration chart.
    pub fn parse(source: &str) -> Chart {
        let sections = split_sections(source);
        let key_count = Self::extract_key_count(&sections);
        let meta = Self::extract_meta(&sections);
        let timing_points = Self::extract_timing_points(&sections);
        let notes = Self::extract_notes(&sections, key_count);

        Chart {
            meta,
            key_count,
            notes,
            timing_points,
        }
    }

    fn extract_meta(sections: &HashMap<String, Vec<String>>) -> ChartMeta {
        let mut meta = ChartMeta::default();

        if let Some(lines) = sections.get("Metadata") {
            for line in lines {
                let Some((key, value)) = line.split_once(':') else {
                    continue;
                };
                match key.trim() {
                    "Title" => meta.title = value.trim().to_string(),
                    "Artist" => meta.artist = value.trim().to_string(),
                    "Version" => meta.version = value.trim().to_string(),
                    _ => {}
                }
            }
        }

        if let Some(lines) = sections.get("General") {
            for line in lines {
                if let Some((key, value)) = line.split_once(':') {
                    if key.trim() == "AudioFilename" {
                        meta.audio_file = value.trim().to_string();
                    }
                }
            }
        }

        meta
    }

    fn extract_key_count(sections: &HashMap<String, Vec<String>>) -> usize {
        let lanes = sections
            .get("Difficulty")
            .and_then(|lines| {
                lines.iter().find_map(|line| {
                    let (key, value) = line.split_once(':')?;
                    if key.trim() == "CircleSize" {
                        value.trim().parse::<f64>().ok()
                    } else {
                        None
                    }
                })
            })
            .unwrap_or(4.0);

        (lanes.round() as usize).max(1)
    }

    fn extract_timing_points(sections: &HashMap<String, Vec<String>>) -> Vec<TimingPoint> {
        let Some(lines) = sections.get("TimingPoints") else {
            return Vec::new();
        };

        let mut points = Vec::new();
        for line in lines {
            match parse_timing_point(line) {
                Some(point) => points.push(point),
                None => debug!("skipping timing point record: {line}"),
            }
        }

        points.sort_by(|a, b| a.time.total_cmp(&b.time));
        points
    }

    fn extract_notes(sections: &HashMap<String, Vec<String>>, key_count: usize) -> Vec<RhythmNote> {
        let Some(lines) = sections.get("HitObjects") else {
            return Vec::new();
        };

        let mut notes = Vec::with_capacity(lines.len());
        for line in lines {
            match parse_hit_object(line, key_count) {
                Some(note) => notes.push(note),
                None => debug!("skipping hit object record: {line}"),
            }
        }

        notes.sort_by(|a, b| a.time.total_cmp(&b.time));
        notes
    }
}

fn split_sections(source: &str) -> HashMap<String, Vec<String>> {
    let mut sections: HashMap<String, Vec<String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
        } else if let Some(section) = &current {
            if let Some(lines) = sections.get_mut(section) {
                lines.push(line.to_string());
            }
        }
    }

    sections
}

fn parse_timing_point(line: &str) -> Option<TimingPoint> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 2 {
        return None;
    }

    let time_ms: f64 = parts[0].trim().parse().ok()?;
    let beat_length: f64 = parts[1].trim().parse().ok()?;

    // Non-positive beat lengths are inherited velocity markers, not BPM.
    if beat_length <= 0.0 {
        return None;
    }

    let meter = parts
        .get(2)
        .and_then(|p| p.trim().parse().ok())
        .unwrap_or(4);

    Some(TimingPoint {
        time: time_ms / 1000.0,
        bpm: 60_000.0 / beat_length,
        meter,
    })
}

fn parse_hit_object(line: &str, key_count: usize) -> Option<RhythmNote> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 4 {
        return None;
    }

    let x: f64 = parts[0].trim().parse().ok()?;
    let time_ms: f64 = parts[2].trim().parse().ok()?;
    let kind_bits: u32 = parts[3].trim().parse().ok()?;

    let lane_width = TRACK_WIDTH / key_count as f64;
    let lane = ((x / lane_width).floor() as i64).clamp(0, key_count as i64 - 1) as usize;
    let time = time_ms / 1000.0;

    if kind_bits & HOLD_BIT != 0 {
        // Hold end timestamp leads the colon-delimited tail field.
        let tail = parts.get(5)?;
        let end_ms: f64 = tail.split(':').next()?.trim().parse().ok()?;
        let end_time = end_ms / 1000.0;
        if end_time > time {
            return Some(RhythmNote::long(time, end_time, lane));
        }
        // Degenerate hold, treat as a tap.
        return Some(RhythmNote::short(time, lane));
    }

    Some(RhythmNote::short(time, lane))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::chart::NoteKind;

    const SAMPLE: &str = "\
osu file format v14

[General]
AudioFilename: audio.mp3
Mode: 3

[Metadata]
Title:Test Song
Artist:Test Artist
Version:4K Normal

[Difficulty]
HPDrainRate:7
CircleSize:4
OverallDifficulty:8

[TimingPoints]
1000,500,4,2,0,100,1,0
5000,-100,4,2,0,100,0,0

[HitObjects]
64,192,1000,1,0,0:0:0:0:
192,192,2000,128,0,3000:0:0:0:0:
448,192,2500,1,0,0:0:0:0:
not,a,note
";

    #[test]
    fn parses_metadata_and_key_count() {
        let chart = OsuLoader::parse(SAMPLE);
        assert_eq!(chart.meta.title, "Test Song");
        assert_eq!(chart.meta.artist, "Test Artist");
        assert_eq!(chart.meta.version, "4K Normal");
        assert_eq!(chart.meta.audio_file, "audio.mp3");
        assert_eq!(chart.key_count, 4);
    }

    #[test]
    fn maps_lateral_position_to_lane() {
        let chart = OsuLoader::parse(SAMPLE);
        // 512 / 4 keys = 128 units per lane
        assert_eq!(chart.notes[0].lane, 0); // x = 64
        assert_eq!(chart.notes[1].lane, 1); // x = 192
        assert_eq!(chart.notes[2].lane, 3); // x = 448
    }

    #[test]
    fn parses_hold_notes_with_end_time() {
        let chart = OsuLoader::parse(SAMPLE);
        let hold = &chart.notes[1];
        assert_eq!(hold.kind, NoteKind::Long);
        assert_eq!(hold.time, 2.0);
        assert_eq!(hold.end_time, 3.0);
        assert_eq!(chart.total_duration(), 3.0);
    }

    #[test]
    fn skips_malformed_records() {
        let chart = OsuLoader::parse(SAMPLE);
        assert_eq!(chart.note_count(), 3);
    }

    #[test]
    fn ignores_inherited_timing_points() {
        let chart = OsuLoader::parse(SAMPLE);
        assert_eq!(chart.timing_points.len(), 1);
        assert_eq!(chart.timing_points[0].bpm, 120.0);
        assert_eq!(chart.timing_points[0].time, 1.0);
    }

    #[test]
    fn notes_are_sorted_by_time() {
        let source = "\
[HitObjects]
64,192,3000,1,0,0:0:0:0:
64,192,1000,1,0,0:0:0:0:
64,192,2000,1,0,0:0:0:0:
";
        let chart = OsuLoader::parse(source);
        let times: Vec<f64> = chart.notes.iter().map(|n| n.time).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn lane_is_clamped_to_key_range() {
        let source = "\
[Difficulty]
CircleSize:4

[HitObjects]
511,192,1000,1,0,0:0:0:0:
600,192,2000,1,0,0:0:0:0:
";
        let chart = OsuLoader::parse(source);
        assert_eq!(chart.notes[0].lane, 3);
        assert_eq!(chart.notes[1].lane, 3);
    }

    #[test]
    fn degenerate_hold_becomes_short_note() {
        let source = "\
[HitObjects]
64,192,1000,128,0,1000:0:0:0:0:
";
        let chart = OsuLoader::parse(source);
        assert_eq!(chart.notes[0].kind, NoteKind::Short);
        assert_eq!(chart.notes[0].end_time, chart.notes[0].time);
    }

    #[test]
    fn empty_input_parses_to_zero_duration_chart() {
        let chart = OsuLoader::parse("");
        assert_eq!(chart.note_count(), 0);
        assert_eq!(chart.total_duration(), 0.0);
        assert_eq!(chart.key_count, 4);
    }

    #[test]
    fn key_count_is_at_least_one() {
        let source = "\
[Difficulty]
CircleSize:0
";
        let chart = OsuLoader::parse(source);
        assert_eq!(chart.key_count, 1);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let chart = OsuLoader::load(file.path()).unwrap();
        assert_eq!(chart.note_count(), 3);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(OsuLoader::load("/nonexistent/file.osu").is_err());
    }
}
