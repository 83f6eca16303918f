use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::chart::RhythmNote;

/// How the avatar interacts with a placed note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementBehavior {
    /// Short platform note, cleared with a jump arc.
    Jump,
    /// Long platform note, run across.
    Run,
    /// Rail note on the left lane.
    RailLeft,
    /// Rail note on the right lane.
    RailRight,
}

impl PlacementBehavior {
    pub fn is_rail(&self) -> bool {
        matches!(self, Self::RailLeft | Self::RailRight)
    }
}

/// Spatial and behavioral metadata derived from one note. Owned by the
/// course, immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotePlacement {
    /// Position of the source note in `Chart::notes`.
    pub index: usize,
    pub note: RhythmNote,
    pub lane: usize,
    /// Lateral world coordinate of the placement's lane.
    pub lane_x: f32,
    /// Longitudinal world coordinate where the placement begins.
    pub start_z: f32,
    /// Longitudinal world coordinate where the placement ends. Equal to
    /// `start_z` for short notes.
    pub end_z: f32,
    /// Vertical coordinate the avatar's feet align to when interacting.
    pub contact_y: f32,
    /// Peak jump-arc height; zero for everything but `Jump`.
    pub jump_height: f32,
    pub behavior: PlacementBehavior,
    /// Representative cell, cleared for feedback when the note resolves.
    pub marker_cell: IVec3,
}
