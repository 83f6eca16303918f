use glam::{IVec3, Vec3};
use log::{debug, warn};

use crate::course::{Course, CourseMode, NotePlacement, PlacementBehavior};
use crate::traits::{
    AudioSource, AvatarBody, BlockWrite, SystemTimeProvider, TimeProvider, VoxelWorld,
};

/// Settle time in seconds appended past the last note before a run finishes.
pub const END_SETTLE_SECONDS: f64 = 2.5;

/// Backward audio-clock jumps beyond this many seconds re-anchor the wall
/// clock instead of rewinding the avatar.
pub const REBASELINE_EPSILON: f64 = 0.001;

/// Seconds around a jump note during which the avatar follows the arc.
pub const JUMP_SMOOTH_WINDOW: f64 = 0.35;

/// Default window in seconds for the active-placement query.
pub const DEFAULT_HIT_WINDOW: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// No course staged.
    Idle,
    /// Course staged, playback not running.
    Ready,
    Running,
    /// Run reached the padded end of the course.
    Finished,
}

/// Drives playback of a staged course: owns the course, keeps the avatar in
/// sync with the audio clock every tick, and fires a one-shot finish event.
pub struct CourseRunner {
    world: Box<dyn VoxelWorld>,
    avatar: Box<dyn AvatarBody>,
    audio: Option<Box<dyn AudioSource>>,
    clock: Box<dyn TimeProvider>,
    course: Option<Course>,
    state: RunnerState,
    /// Effective playback time; never rewinds within a run.
    audio_time: f64,
    /// Audio time at the last wall-clock anchor.
    baseline_audio: f64,
    /// Wall-clock reading at the last anchor.
    baseline_wall: f64,
    finish_listeners: Vec<Box<dyn FnMut()>>,
}

impl CourseRunner {
    pub fn new(world: Box<dyn VoxelWorld>, avatar: Box<dyn AvatarBody>) -> Self {
        Self {
            world,
            avatar,
            audio: None,
            clock: Box::new(SystemTimeProvider::new()),
            course: None,
            state: RunnerState::Idle,
            audio_time: 0.0,
            baseline_audio: 0.0,
            baseline_wall: 0.0,
            finish_listeners: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    pub fn attach_audio(&mut self, audio: Box<dyn AudioSource>) {
        self.audio = Some(audio);
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn course(&self) -> Option<&Course> {
        self.course.as_ref()
    }

    /// Effective playback time in seconds.
    pub fn current_time(&self) -> f64 {
        self.audio_time
    }

    /// Register a finish listener. Listeners fire exactly once per run, in
    /// registration order.
    pub fn on_finish(&mut self, listener: impl FnMut() + 'static) {
        self.finish_listeners.push(Box::new(listener));
    }

    /// Stage a course: revert any previous course's cells, write the new
    /// ones, and become ready. Does not start playback.
    pub fn apply_course(&mut self, course: Course) {
        self.remove_course_blocks();
        self.pause_audio();
        self.world.set_blocks(&course.writes);
        self.course = Some(course);
        self.audio_time = 0.0;
        self.state = RunnerState::Ready;
    }

    /// Revert the staged course and go idle. Safe to call at any time,
    /// including when already idle.
    pub fn clear_course(&mut self) {
        self.remove_course_blocks();
        self.course = None;
        self.pause_audio();
        self.audio_time = 0.0;
        self.state = RunnerState::Idle;
    }

    /// Begin a run. Returns false, with no state change, when no course is
    /// staged or no audio source is attached.
    pub fn start(&mut self) -> bool {
        if self.state != RunnerState::Ready {
            return false;
        }
        let Some(audio) = self.audio.as_mut() else {
            return false;
        };

        // Transient audio failures never abort the run; the wall clock
        // carries the timing if the device stays silent.
        if let Err(err) = audio.seek(0.0) {
            warn!("audio seek to start failed: {err:#}");
        }
        if let Err(err) = audio.play() {
            warn!("audio play failed, timing falls back to wall clock: {err:#}");
        }

        self.audio_time = 0.0;
        self.baseline_audio = 0.0;
        self.baseline_wall = self.clock.now_seconds();
        self.reposition(0.0);
        self.state = RunnerState::Running;
        true
    }

    /// Pause playback, keeping the staged course if any.
    pub fn stop(&mut self) {
        if self.state != RunnerState::Running {
            return;
        }
        self.pause_audio();
        self.state = if self.course.is_some() {
            RunnerState::Ready
        } else {
            RunnerState::Idle
        };
    }

    /// Per-tick advance. No-op unless running.
    pub fn update(&mut self) {
        if self.state != RunnerState::Running {
            return;
        }
        let Some(duration) = self.course.as_ref().map(|c| c.duration) else {
            return;
        };

        let now = self.clock.now_seconds();
        let reading = self
            .audio
            .as_ref()
            .and_then(|a| a.current_time())
            .filter(|t| t.is_finite());
        let raw = match reading {
            Some(t) => t,
            None => self.baseline_audio + (now - self.baseline_wall),
        };

        if raw < self.audio_time - REBASELINE_EPSILON {
            // The audio clock jumped backward (seek or driver jitter). Hold
            // the effective time and re-anchor the fallback instead of
            // rewinding the avatar.
            self.baseline_audio = self.audio_time;
            self.baseline_wall = now;
        } else {
            self.audio_time = raw;
            self.baseline_audio = raw;
            self.baseline_wall = now;
        }

        let end = duration + END_SETTLE_SECONDS;
        let clamped = self.audio_time.clamp(0.0, end);
        self.reposition(clamped);

        if clamped >= end {
            self.finish();
        }
    }

    /// Placements whose note time lies within `window` seconds of the
    /// current playback time.
    pub fn active_placements(&self, window: f64) -> Vec<&NotePlacement> {
        let Some(course) = &self.course else {
            return Vec::new();
        };
        course
            .placements
            .iter()
            .filter(|p| (p.note.time - self.audio_time).abs() <= window)
            .collect()
    }

    /// Erase a single course cell, used for resolved-note feedback.
    pub(crate) fn clear_cell(&mut self, cell: IVec3) {
        let clear = self.world.clear_block();
        self.world.set_blocks(&[BlockWrite { cell, block: clear }]);
    }

    fn finish(&mut self) {
        debug!("course run finished");
        self.state = RunnerState::Finished;
        for listener in &mut self.finish_listeners {
            listener();
        }
    }

    fn pause_audio(&mut self) {
        if let Some(audio) = self.audio.as_mut() {
            if !audio.is_paused() {
                audio.pause();
            }
        }
    }

    fn remove_course_blocks(&mut self) {
        if let Some(course) = &self.course {
            let clear = self.world.clear_block();
            let erases: Vec<BlockWrite> = course
                .writes
                .iter()
                .map(|w| BlockWrite {
                    cell: w.cell,
                    block: clear,
                })
                .collect();
            self.world.set_blocks(&erases);
        }
    }

    /// Kinematic avatar placement for a playback time. Jump placements near
    /// the time contribute a sinusoidal arc; everything else rides at the
    /// course's base feet height.
    fn reposition(&mut self, time: f64) {
        let Some(course) = &self.course else {
            return;
        };

        let z = course.origin.z + time as f32 * course.move_speed;
        let mut feet = course.base_feet_y;

        if course.mode == CourseMode::Platform {
            let mut arc = 0.0f32;
            for placement in &course.placements {
                if placement.behavior != PlacementBehavior::Jump {
                    continue;
                }
                let dt = (placement.note.time - time).abs();
                if dt > JUMP_SMOOTH_WINDOW {
                    continue;
                }
                let phase = 1.0 - dt / JUMP_SMOOTH_WINDOW;
                let offset = (std::f64::consts::PI * phase).sin() as f32 * placement.jump_height;
                arc = arc.max(offset);
            }
            feet += arc;
        }

        let center = feet + self.avatar.body_height() * 0.5;
        self.avatar
            .set_position(Vec3::new(course.origin.x, center, z));
        self.avatar
            .set_look_target(Vec3::new(course.origin.x, center, z + 1.0));
        self.avatar.zero_motion();
    }
}
