use serde::{Deserialize, Serialize};

/// Course generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseMode {
    /// Continuous platforms; obstacles are jumped over or run across.
    Platform,
    /// One fixed track; notes become timed left/right actions.
    Rail,
}

/// Block names the builder resolves against the world registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockPalette {
    pub platform: String,
    pub jump_marker: String,
    pub rail_track: String,
    pub rail_left: String,
    pub rail_right: String,
}

impl Default for BlockPalette {
    fn default() -> Self {
        Self {
            platform: "Stone".to_string(),
            jump_marker: "Sand".to_string(),
            rail_track: "Oak Planks".to_string(),
            rail_left: "Oak Log".to_string(),
            rail_right: "Oak Leaves".to_string(),
        }
    }
}

/// Generation parameters. Every field has a documented default; the gap
/// threshold is an empirically tuned constant carried over as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseParams {
    /// Forward speed in world units per second. Default 6.0.
    pub move_speed: f32,
    /// Lateral offset of the rail lanes from the course center line.
    /// Default 2.0.
    pub lane_spacing: f32,
    /// Peak height of the jump arc over short platform notes. Default 1.2.
    pub jump_height: f32,
    /// Longitudinal gap above which filler blocks are emitted between
    /// platform placements. Default 1.2.
    pub gap_threshold: f32,
    /// Extra track length past the last note in rail mode. Default 8.0.
    pub rail_margin: f32,
    /// Seconds around a note's time within which it counts as active.
    /// Default 0.2.
    pub hit_window: f64,
    pub palette: BlockPalette,
}

impl Default for CourseParams {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            lane_spacing: 2.0,
            jump_height: 1.2,
            gap_threshold: 1.2,
            rail_margin: 8.0,
            hit_window: 0.2,
            palette: BlockPalette::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_documented_values() {
        let params = CourseParams::default();
        assert_eq!(params.move_speed, 6.0);
        assert_eq!(params.lane_spacing, 2.0);
        assert_eq!(params.jump_height, 1.2);
        assert_eq!(params.gap_threshold, 1.2);
        assert_eq!(params.rail_margin, 8.0);
        assert_eq!(params.hit_window, 0.2);
    }
}
