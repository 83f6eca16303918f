use glam::Vec3;

/// Abstraction over the player's physics body.
/// The runner drives it kinematically: position is written directly and all
/// accumulated motion is discarded on every reposition, so the physics
/// integration never fights the scripted path.
pub trait AvatarBody {
    fn set_position(&mut self, position: Vec3);

    fn set_look_target(&mut self, target: Vec3);

    /// Zero velocity, forces and impulses.
    fn zero_motion(&mut self);

    /// Full body height; feet sit half of this below the body center.
    fn body_height(&self) -> f32;
}
