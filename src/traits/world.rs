use glam::IVec3;

/// One cell mutation in the voxel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockWrite {
    pub cell: IVec3,
    pub block: u32,
}

/// Abstraction over the voxel world a course is carved into.
/// Implementations: the host's chunked world; FakeWorld (testing).
pub trait VoxelWorld {
    /// Look up a block id by registry name.
    fn resolve_block(&self, name: &str) -> Option<u32>;

    /// Block id representing empty space.
    fn clear_block(&self) -> u32;

    /// Apply a batch of cell writes. Order within the batch carries no
    /// meaning; callers hand over at most one write per coordinate.
    fn set_blocks(&mut self, writes: &[BlockWrite]);
}
