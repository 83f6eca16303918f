//! Fake collaborators for unit tests. Each fake is a cheap clonable handle
//! over shared state, so a test can keep one copy for inspection while the
//! runner owns another.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Result, anyhow};
use glam::{IVec3, Vec3};

use crate::traits::{AudioSource, AvatarBody, BlockWrite, VoxelWorld};

#[derive(Debug, Default)]
struct WorldState {
    registry: HashMap<String, u32>,
    cells: HashMap<IVec3, u32>,
}

#[derive(Clone, Default)]
pub struct FakeWorld(Rc<RefCell<WorldState>>);

impl FakeWorld {
    pub fn with_blocks(blocks: &[(&str, u32)]) -> Self {
        let world = Self::default();
        world.0.borrow_mut().registry = blocks
            .iter()
            .map(|(name, id)| (name.to_string(), *id))
            .collect();
        world
    }

    /// Last value written to a cell, if any write ever touched it.
    pub fn block_at(&self, cell: IVec3) -> Option<u32> {
        self.0.borrow().cells.get(&cell).copied()
    }

    /// Cells currently holding a non-clear block.
    pub fn solid_cells(&self) -> Vec<IVec3> {
        self.0
            .borrow()
            .cells
            .iter()
            .filter(|(_, id)| **id != 0)
            .map(|(cell, _)| *cell)
            .collect()
    }
}

impl VoxelWorld for FakeWorld {
    fn resolve_block(&self, name: &str) -> Option<u32> {
        self.0.borrow().registry.get(name).copied()
    }

    fn clear_block(&self) -> u32 {
        0
    }

    fn set_blocks(&mut self, writes: &[BlockWrite]) {
        let mut state = self.0.borrow_mut();
        for write in writes {
            state.cells.insert(write.cell, write.block);
        }
    }
}

/// World pre-loaded with the default palette names.
pub fn test_world() -> FakeWorld {
    FakeWorld::with_blocks(&[
        ("Stone", 1),
        ("Sand", 2),
        ("Oak Planks", 3),
        ("Oak Log", 4),
        ("Oak Leaves", 5),
    ])
}

#[derive(Debug)]
struct AvatarState {
    position: Vec3,
    look_target: Vec3,
    motion_zeroed: bool,
    body_height: f32,
}

#[derive(Clone)]
pub struct FakeAvatar(Rc<RefCell<AvatarState>>);

impl FakeAvatar {
    pub fn new(body_height: f32) -> Self {
        Self(Rc::new(RefCell::new(AvatarState {
            position: Vec3::ZERO,
            look_target: Vec3::ZERO,
            motion_zeroed: false,
            body_height,
        })))
    }

    pub fn position(&self) -> Vec3 {
        self.0.borrow().position
    }

    pub fn look_target(&self) -> Vec3 {
        self.0.borrow().look_target
    }

    pub fn motion_zeroed(&self) -> bool {
        self.0.borrow().motion_zeroed
    }
}

impl AvatarBody for FakeAvatar {
    fn set_position(&mut self, position: Vec3) {
        self.0.borrow_mut().position = position;
    }

    fn set_look_target(&mut self, target: Vec3) {
        self.0.borrow_mut().look_target = target;
    }

    fn zero_motion(&mut self) {
        self.0.borrow_mut().motion_zeroed = true;
    }

    fn body_height(&self) -> f32 {
        self.0.borrow().body_height
    }
}

#[derive(Debug, Default)]
struct AudioState {
    time: Option<f64>,
    playing: bool,
    fail_play: bool,
    fail_seek: bool,
    seeks: Vec<f64>,
}

#[derive(Clone, Default)]
pub struct FakeAudio(Rc<RefCell<AudioState>>);

impl FakeAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, time: Option<f64>) {
        self.0.borrow_mut().time = time;
    }

    pub fn fail_play(&self, fail: bool) {
        self.0.borrow_mut().fail_play = fail;
    }

    pub fn fail_seek(&self, fail: bool) {
        self.0.borrow_mut().fail_seek = fail;
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.0.borrow().seeks.clone()
    }
}

impl AudioSource for FakeAudio {
    fn current_time(&self) -> Option<f64> {
        self.0.borrow().time
    }

    fn play(&mut self) -> Result<()> {
        let mut state = self.0.borrow_mut();
        if state.fail_play {
            return Err(anyhow!("playback requires a user gesture"));
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.0.borrow_mut().playing = false;
    }

    fn seek(&mut self, seconds: f64) -> Result<()> {
        let mut state = self.0.borrow_mut();
        if state.fail_seek {
            return Err(anyhow!("source is not seekable"));
        }
        state.seeks.push(seconds);
        state.time = Some(seconds);
        Ok(())
    }

    fn is_paused(&self) -> bool {
        !self.0.borrow().playing
    }
}
