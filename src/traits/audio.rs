use anyhow::Result;

/// Abstraction over the music playback source.
/// Implementations: the host's audio device or media element; FakeAudio
/// (testing).
pub trait AudioSource {
    /// Current playback position in seconds, if the source can report one.
    /// A source that is still buffering may return `None` or a NaN value;
    /// callers must be prepared to fall back to a wall clock.
    fn current_time(&self) -> Option<f64>;

    /// Begin playback. Failure (e.g. a missing user-gesture permission) is
    /// tolerated by callers and never aborts a run.
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn seek(&mut self, seconds: f64) -> Result<()>;

    fn is_paused(&self) -> bool;
}
