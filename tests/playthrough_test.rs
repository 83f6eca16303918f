//! End-to-end scenarios: chart -> course -> runner -> hit resolution,
//! against fake world/avatar/audio collaborators.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;
use glam::{IVec3, Vec3};

use beatrun::chart::{Chart, ChartMeta, OsuLoader, RhythmNote};
use beatrun::course::{CourseBuilder, CourseMode, CourseParams};
use beatrun::game::{CourseRunner, RailJudge, RailSide, RunnerState};
use beatrun::traits::{AudioSource, AvatarBody, BlockWrite, MockTimeProvider, VoxelWorld};

const BASE: IVec3 = IVec3::new(0, 10, 0);

#[derive(Clone, Default)]
struct SharedWorld(Rc<RefCell<HashMap<IVec3, u32>>>);

impl SharedWorld {
    fn block_at(&self, cell: IVec3) -> Option<u32> {
        self.0.borrow().get(&cell).copied()
    }

    fn solid_count(&self) -> usize {
        self.0.borrow().values().filter(|id| **id != 0).count()
    }
}

impl VoxelWorld for SharedWorld {
    fn resolve_block(&self, name: &str) -> Option<u32> {
        match name {
            "Stone" => Some(1),
            "Sand" => Some(2),
            "Oak Planks" => Some(3),
            "Oak Log" => Some(4),
            "Oak Leaves" => Some(5),
            _ => None,
        }
    }

    fn clear_block(&self) -> u32 {
        0
    }

    fn set_blocks(&mut self, writes: &[BlockWrite]) {
        let mut cells = self.0.borrow_mut();
        for write in writes {
            cells.insert(write.cell, write.block);
        }
    }
}

#[derive(Clone)]
struct SharedAvatar(Rc<RefCell<Vec3>>);

impl AvatarBody for SharedAvatar {
    fn set_position(&mut self, position: Vec3) {
        *self.0.borrow_mut() = position;
    }

    fn set_look_target(&mut self, _target: Vec3) {}

    fn zero_motion(&mut self) {}

    fn body_height(&self) -> f32 {
        1.8
    }
}

#[derive(Clone, Default)]
struct SharedAudio(Rc<RefCell<Option<f64>>>);

impl SharedAudio {
    fn set_time(&self, time: f64) {
        *self.0.borrow_mut() = Some(time);
    }
}

impl AudioSource for SharedAudio {
    fn current_time(&self) -> Option<f64> {
        *self.0.borrow()
    }

    fn play(&mut self) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn seek(&mut self, seconds: f64) -> Result<()> {
        *self.0.borrow_mut() = Some(seconds);
        Ok(())
    }

    fn is_paused(&self) -> bool {
        false
    }
}

struct Stage {
    world: SharedWorld,
    audio: SharedAudio,
    runner: CourseRunner,
}

fn stage(chart: &Chart, mode: CourseMode) -> Stage {
    let world = SharedWorld::default();
    let avatar = SharedAvatar(Rc::new(RefCell::new(Vec3::ZERO)));
    let audio = SharedAudio::default();

    let course = CourseBuilder::new(&world, CourseParams::default())
        .expect("default palette resolves")
        .build(chart, mode, BASE);

    let mut runner = CourseRunner::new(Box::new(world.clone()), Box::new(avatar))
        .with_clock(Box::new(MockTimeProvider::new()));
    runner.attach_audio(Box::new(audio.clone()));
    runner.apply_course(course);

    Stage {
        world,
        audio,
        runner,
    }
}

fn single_note_chart(note: RhythmNote) -> Chart {
    Chart {
        meta: ChartMeta::default(),
        key_count: 4,
        notes: vec![note],
        timing_points: vec![],
    }
}

/// A short note at 2.0 s in a 4-key chart becomes one jump marker above a
/// platform cell twelve cells down the course (speed 6).
#[test]
fn platform_course_places_jump_pair() {
    let chart = single_note_chart(RhythmNote::short(2.0, 0));
    let stage = stage(&chart, CourseMode::Platform);

    assert_eq!(stage.world.block_at(IVec3::new(0, 10, 12)), Some(1));
    assert_eq!(stage.world.block_at(IVec3::new(0, 11, 12)), Some(2));

    let course = stage.runner.course().unwrap();
    let placement = &course.placements[0];
    assert_eq!(placement.contact_y, 11.0);
    assert_eq!(placement.jump_height, 1.2);
}

/// A left-lane rail note tapped 50 ms late is hit: combo 1, marker cleared.
#[test]
fn rail_note_tap_hits_and_clears_marker() {
    let chart = single_note_chart(RhythmNote::short(1.0, 0));
    let mut stage = stage(&chart, CourseMode::Rail);
    let marker = stage.runner.course().unwrap().placements[0].marker_cell;

    let mut judge = RailJudge::default();
    assert!(judge.start(&mut stage.runner));

    stage.audio.set_time(1.05);
    stage.runner.update();
    judge.sweep_misses(&mut stage.runner);

    assert!(judge.tap(&mut stage.runner, RailSide::Left));
    assert!(judge.score().is_hit(0));
    assert_eq!(judge.score().combo, 1);
    assert_eq!(judge.score().best_combo, 1);
    assert_eq!(stage.world.block_at(marker), Some(0));
}

/// The same note left alone is swept into the missed set once its window
/// has fully elapsed.
#[test]
fn unanswered_rail_note_is_missed() {
    let chart = single_note_chart(RhythmNote::short(1.0, 0));
    let mut stage = stage(&chart, CourseMode::Rail);
    let marker = stage.runner.course().unwrap().placements[0].marker_cell;

    let mut judge = RailJudge::default();
    assert!(judge.start(&mut stage.runner));

    stage.audio.set_time(1.201);
    stage.runner.update();
    judge.sweep_misses(&mut stage.runner);

    assert!(judge.score().is_missed(0));
    assert!(!judge.score().is_hit(0));
    assert_eq!(judge.score().combo, 0);
    assert_eq!(stage.world.block_at(marker), Some(0));
}

/// Staging a second course fully reverts the first one's cells.
#[test]
fn applying_a_second_course_reverts_the_first() {
    let first = single_note_chart(RhythmNote::short(2.0, 0));
    let mut stage = stage(&first, CourseMode::Platform);

    let first_cells: Vec<IVec3> = stage
        .runner
        .course()
        .unwrap()
        .writes
        .iter()
        .map(|w| w.cell)
        .collect();
    assert!(!first_cells.is_empty());

    let second = single_note_chart(RhythmNote::short(4.0, 1));
    let course = CourseBuilder::new(&stage.world, CourseParams::default())
        .unwrap()
        .build(&second, CourseMode::Rail, IVec3::new(40, 10, 40));
    let second_count = course.writes.len();
    stage.runner.apply_course(course);

    for cell in first_cells {
        assert_eq!(stage.world.block_at(cell), Some(0));
    }
    assert_eq!(stage.world.solid_count(), second_count);
    assert_eq!(stage.runner.state(), RunnerState::Ready);
}

/// A full run over a parsed beatmap finishes exactly once.
#[test]
fn parsed_beatmap_runs_to_completion() {
    let source = "\
[Difficulty]
CircleSize:4

[HitObjects]
64,192,500,1,0,0:0:0:0:
192,192,1000,1,0,0:0:0:0:
320,192,1500,128,0,2500:0:0:0:0:
";
    let chart = OsuLoader::parse(source);
    assert_eq!(chart.key_count, 4);
    assert_eq!(chart.notes.len(), 3);
    assert_eq!(chart.total_duration(), 2.5);

    let mut stage = stage(&chart, CourseMode::Rail);
    let mut judge = RailJudge::default();
    assert!(judge.start(&mut stage.runner));

    let finished = Rc::new(RefCell::new(0u32));
    let observed = finished.clone();
    stage
        .runner
        .on_finish(move || *observed.borrow_mut() += 1);

    let mut t = 0.0;
    while stage.runner.state() == RunnerState::Running {
        t += 0.1;
        stage.audio.set_time(t);
        stage.runner.update();
        judge.sweep_misses(&mut stage.runner);
        assert!(t < 20.0, "run should finish within the padded duration");
    }

    assert_eq!(stage.runner.state(), RunnerState::Finished);
    assert_eq!(*finished.borrow(), 1);
    // Every rail note went unanswered.
    assert_eq!(judge.score().miss_count(), 3);
    assert_eq!(judge.score().combo, 0);
}
