mod hit;
mod runner;
mod score;

pub use hit::{RailJudge, RailSide};
pub use runner::{
    CourseRunner, DEFAULT_HIT_WINDOW, END_SETTLE_SECONDS, JUMP_SMOOTH_WINDOW, REBASELINE_EPSILON,
    RunnerState,
};
pub use score::ScoreBoard;
