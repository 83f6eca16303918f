use std::collections::HashSet;

use glam::{IVec3, Vec3};
use log::debug;
use thiserror::Error;

use crate::chart::Chart;
use crate::traits::{BlockWrite, VoxelWorld};

use super::{CourseMode, CourseParams, NotePlacement, PlacementBehavior};

#[derive(Debug, Error)]
pub enum CourseError {
    #[error("block not present in world registry: {name}")]
    UnknownBlock { name: String },
}

/// Block ids resolved once at builder construction.
#[derive(Debug, Clone, Copy)]
struct BlockIds {
    platform: u32,
    jump_marker: u32,
    rail_track: u32,
    rail_left: u32,
    rail_right: u32,
}

/// A built, spatial realization of a chart for one generation mode.
/// Immutable; owned exclusively by the runner while staged.
#[derive(Debug, Clone)]
pub struct Course {
    pub mode: CourseMode,
    /// Continuous coordinate the course grows forward from; centered on the
    /// base cell laterally and longitudinally.
    pub origin: Vec3,
    pub base_cell: IVec3,
    /// Feet height the avatar rides at between notes.
    pub base_feet_y: f32,
    /// Forward speed in world units per second.
    pub move_speed: f32,
    pub lane_spacing: f32,
    /// Ascending by note time, one entry per chart note.
    pub placements: Vec<NotePlacement>,
    /// Deduplicated cell writes, exactly one entry per coordinate.
    pub writes: Vec<BlockWrite>,
    /// Chart duration in seconds.
    pub duration: f64,
}

/// Maps a chart onto voxel placements. Pure once constructed; construction
/// fails if any palette block is missing from the world registry.
pub struct CourseBuilder {
    params: CourseParams,
    blocks: BlockIds,
}

/// Grid cell centered under a continuous coordinate.
pub(crate) fn grid_coord(c: f32) -> i32 {
    (c - 0.5).round() as i32
}

impl CourseBuilder {
    pub fn new(world: &dyn VoxelWorld, params: CourseParams) -> Result<Self, CourseError> {
        let resolve = |name: &String| {
            world
                .resolve_block(name)
                .ok_or_else(|| CourseError::UnknownBlock { name: name.clone() })
        };

        let blocks = BlockIds {
            platform: resolve(&params.palette.platform)?,
            jump_marker: resolve(&params.palette.jump_marker)?,
            rail_track: resolve(&params.palette.rail_track)?,
            rail_left: resolve(&params.palette.rail_left)?,
            rail_right: resolve(&params.palette.rail_right)?,
        };

        Ok(Self { params, blocks })
    }

    pub fn params(&self) -> &CourseParams {
        &self.params
    }

    /// Build a course starting at the given base grid cell.
    pub fn build(&self, chart: &Chart, mode: CourseMode, base: IVec3) -> Course {
        let origin = Vec3::new(base.x as f32 + 0.5, base.y as f32, base.z as f32 + 0.5);

        let (placements, writes) = match mode {
            CourseMode::Platform => self.build_platform(chart, origin, base),
            CourseMode::Rail => self.build_rail(chart, origin, base),
        };

        let writes = dedup_writes(writes);

        debug!(
            "built {mode:?} course: {} placements, {} cell writes",
            placements.len(),
            writes.len()
        );

        let base_feet_y = match mode {
            CourseMode::Platform => base.y as f32 + 1.0,
            CourseMode::Rail => base.y as f32 + 2.0,
        };

        Course {
            mode,
            origin,
            base_cell: base,
            base_feet_y,
            move_speed: self.params.move_speed,
            lane_spacing: self.params.lane_spacing,
            placements,
            writes,
            duration: chart.total_duration(),
        }
    }

    fn build_platform(
        &self,
        chart: &Chart,
        origin: Vec3,
        base: IVec3,
    ) -> (Vec<NotePlacement>, Vec<BlockWrite>) {
        let speed = self.params.move_speed;
        let mut placements = Vec::with_capacity(chart.notes.len());
        let mut writes = Vec::new();
        let mut prev_end_z: Option<f32> = None;

        for (index, note) in chart.notes.iter().enumerate() {
            let start_z = origin.z + note.time as f32 * speed;
            let end_z = origin.z + note.end_time as f32 * speed;
            let start_cell_z = grid_coord(start_z);

            if let Some(prev) = prev_end_z {
                self.fill_gap(prev, start_z, base, &mut writes);
            }

            if note.is_long() {
                // Contiguous platform run the avatar crosses at track level.
                for z in start_cell_z..=grid_coord(end_z) {
                    writes.push(BlockWrite {
                        cell: IVec3::new(base.x, base.y, z),
                        block: self.blocks.platform,
                    });
                }
                placements.push(NotePlacement {
                    index,
                    note: *note,
                    lane: note.lane,
                    lane_x: origin.x,
                    start_z,
                    end_z,
                    contact_y: base.y as f32,
                    jump_height: 0.0,
                    behavior: PlacementBehavior::Run,
                    marker_cell: IVec3::new(base.x, base.y, start_cell_z),
                });
                prev_end_z = Some(end_z);
            } else {
                let platform = IVec3::new(base.x, base.y, start_cell_z);
                let marker = IVec3::new(base.x, base.y + 1, start_cell_z);
                writes.push(BlockWrite {
                    cell: platform,
                    block: self.blocks.platform,
                });
                writes.push(BlockWrite {
                    cell: marker,
                    block: self.blocks.jump_marker,
                });
                placements.push(NotePlacement {
                    index,
                    note: *note,
                    lane: note.lane,
                    lane_x: origin.x,
                    start_z,
                    end_z: start_z,
                    contact_y: base.y as f32 + 1.0,
                    jump_height: self.params.jump_height,
                    behavior: PlacementBehavior::Jump,
                    marker_cell: marker,
                });
                prev_end_z = Some(start_z);
            }
        }

        (placements, writes)
    }

    /// Bridge a longitudinal gap with evenly spaced filler blocks one level
    /// below the platforms, so the avatar never faces an unreachable void.
    fn fill_gap(&self, prev_end: f32, next_start: f32, base: IVec3, writes: &mut Vec<BlockWrite>) {
        let gap = next_start - prev_end;
        if gap <= self.params.gap_threshold {
            return;
        }

        // Tuned filler count, carried over as-is.
        let count = (gap - 0.5).floor() as i32;
        if count <= 0 {
            return;
        }

        let step = gap / (count + 1) as f32;
        for k in 1..=count {
            let z = grid_coord(prev_end + step * k as f32);
            writes.push(BlockWrite {
                cell: IVec3::new(base.x, base.y - 1, z),
                block: self.blocks.platform,
            });
        }
    }

    fn build_rail(
        &self,
        chart: &Chart,
        origin: Vec3,
        base: IVec3,
    ) -> (Vec<NotePlacement>, Vec<BlockWrite>) {
        let speed = self.params.move_speed;
        let length = chart.total_duration() as f32 * speed + self.params.rail_margin;

        let mut writes = Vec::new();
        for z in grid_coord(origin.z)..=grid_coord(origin.z + length) {
            writes.push(BlockWrite {
                cell: IVec3::new(base.x, base.y, z),
                block: self.blocks.rail_track,
            });
        }

        let mut placements = Vec::with_capacity(chart.notes.len());
        for (index, note) in chart.notes.iter().enumerate() {
            let left = (note.lane as f64) < chart.key_count as f64 / 2.0;
            let (lane_x, block, behavior) = if left {
                (
                    origin.x - self.params.lane_spacing,
                    self.blocks.rail_left,
                    PlacementBehavior::RailLeft,
                )
            } else {
                (
                    origin.x + self.params.lane_spacing,
                    self.blocks.rail_right,
                    PlacementBehavior::RailRight,
                )
            };

            let start_z = origin.z + note.time as f32 * speed;
            let marker = IVec3::new(grid_coord(lane_x), base.y + 1, grid_coord(start_z));
            writes.push(BlockWrite {
                cell: marker,
                block,
            });
            placements.push(NotePlacement {
                index,
                note: *note,
                lane: note.lane,
                lane_x,
                start_z,
                end_z: origin.z + note.end_time as f32 * speed,
                contact_y: base.y as f32 + 2.0,
                jump_height: 0.0,
                behavior,
                marker_cell: marker,
            });
        }

        (placements, writes)
    }
}

/// Keep the last write for each coordinate; later clearing assumes exactly
/// one entry per cell.
fn dedup_writes(writes: Vec<BlockWrite>) -> Vec<BlockWrite> {
    let mut seen: HashSet<IVec3> = HashSet::with_capacity(writes.len());
    let mut out = Vec::with_capacity(writes.len());
    for write in writes.into_iter().rev() {
        if seen.insert(write.cell) {
            out.push(write);
        }
    }
    out.reverse();
    out
}
