mod audio;
mod avatar;
mod time;
mod world;

pub use audio::AudioSource;
pub use avatar::AvatarBody;
pub use time::{MockTimeProvider, SystemTimeProvider, TimeProvider};
pub use world::{BlockWrite, VoxelWorld};
