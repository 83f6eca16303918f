use glam::IVec3;

use crate::course::{CourseMode, PlacementBehavior};

use super::runner::DEFAULT_HIT_WINDOW;
use super::{CourseRunner, RunnerState, ScoreBoard};

/// Side of a discrete rail action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RailSide {
    Left,
    Right,
}

impl RailSide {
    fn matches(self, behavior: PlacementBehavior) -> bool {
        match self {
            RailSide::Left => behavior == PlacementBehavior::RailLeft,
            RailSide::Right => behavior == PlacementBehavior::RailRight,
        }
    }
}

/// Real-time matching of left/right actions against rail placements, plus
/// the per-tick miss sweep. Owns the score state.
pub struct RailJudge {
    score: ScoreBoard,
    hit_window: f64,
}

impl Default for RailJudge {
    fn default() -> Self {
        Self::new(DEFAULT_HIT_WINDOW)
    }
}

impl RailJudge {
    pub fn new(hit_window: f64) -> Self {
        Self {
            score: ScoreBoard::new(),
            hit_window,
        }
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn reset(&mut self) {
        self.score.reset();
    }

    /// Start a run on the given runner, resetting per-run score state.
    pub fn start(&mut self, runner: &mut CourseRunner) -> bool {
        if runner.start() {
            self.score.reset();
            true
        } else {
            false
        }
    }

    /// Handle a discrete left/right action. No-op unless the runner is
    /// running a rail course. Returns true when a note was hit; an action
    /// with no eligible note is a whiff and breaks the combo.
    pub fn tap(&mut self, runner: &mut CourseRunner, side: RailSide) -> bool {
        if runner.state() != RunnerState::Running {
            return false;
        }
        let Some(course) = runner.course() else {
            return false;
        };
        if course.mode != CourseMode::Rail {
            return false;
        }

        let time = runner.current_time();
        let mut best: Option<(usize, f64, IVec3)> = None;
        for placement in &course.placements {
            if !side.matches(placement.behavior) {
                continue;
            }
            if self.score.is_resolved(placement.index) {
                continue;
            }
            let delta = (placement.note.time - time).abs();
            if delta > self.hit_window {
                continue;
            }
            // Strictly-closer wins; the earlier placement keeps ties.
            if best.is_none_or(|(_, d, _)| delta < d) {
                best = Some((placement.index, delta, placement.marker_cell));
            }
        }

        match best {
            Some((index, _, cell)) => {
                self.score.mark_hit(index);
                runner.clear_cell(cell);
                self.advance_past_resolved(runner);
                true
            }
            None => {
                self.score.break_combo();
                false
            }
        }
    }

    /// Sweep elapsed, unresolved rail notes into the missed set. Invoked
    /// once per tick; stops at the first note still inside its hit window,
    /// so the pointer never skips an actionable note.
    pub fn sweep_misses(&mut self, runner: &mut CourseRunner) {
        if runner.state() != RunnerState::Running {
            return;
        }
        let Some(course) = runner.course() else {
            return;
        };
        if course.mode != CourseMode::Rail {
            return;
        }

        let time = runner.current_time();
        let mut index = self.score.next_rail_index();
        let mut cleared: Vec<IVec3> = Vec::new();

        while let Some(placement) = course.placements.get(index) {
            if !placement.behavior.is_rail() || self.score.is_resolved(placement.index) {
                index += 1;
                continue;
            }
            if placement.note.time + self.hit_window < time {
                self.score.mark_missed(placement.index);
                cleared.push(placement.marker_cell);
                index += 1;
                continue;
            }
            // Still actionable; the sweep must not pass it.
            break;
        }

        self.score.advance_rail_index(index);
        for cell in cleared {
            runner.clear_cell(cell);
        }
    }

    fn advance_past_resolved(&mut self, runner: &CourseRunner) {
        let Some(course) = runner.course() else {
            return;
        };
        let mut index = self.score.next_rail_index();
        while let Some(placement) = course.placements.get(index) {
            if placement.behavior.is_rail() && !self.score.is_resolved(placement.index) {
                break;
            }
            index += 1;
        }
        self.score.advance_rail_index(index);
    }
}
