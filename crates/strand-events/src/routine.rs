//! Resumable multi-frame work.
//!
//! A [`Routine`] is a task with an explicit resume point: the host
//! scheduler calls [`resume`](Routine::resume) once per frame until it
//! reports [`RoutineStep::Done`]. Abandoning a routine is dropping it
//! without resuming further; no unwinding is involved, which is
//! what lets an in-flight state transition be cancelled at its current
//! suspension point.
//!
//! Listeners hand routines back to the code that triggered them through
//! [`EventArgs::defer`](crate::args::EventArgs::defer).

/// Outcome of resuming a routine once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineStep {
    /// The routine has more work; resume it again on a later frame.
    Yielded,
    /// The routine is finished and must not be resumed again.
    Done,
}

/// A resumable unit of work driven by the per-frame scheduler.
pub trait Routine: Send {
    /// Advance the routine by one step.
    fn resume(&mut self) -> RoutineStep;
}

/// Adapt a closure into a [`Routine`].
///
/// The closure is invoked once per resume and reports its own progress.
pub fn routine_fn<F>(f: F) -> RoutineFn<F>
where
    F: FnMut() -> RoutineStep + Send,
{
    RoutineFn { f }
}

/// Closure-backed routine returned by [`routine_fn`].
pub struct RoutineFn<F> {
    f: F,
}

impl<F> Routine for RoutineFn<F>
where
    F: FnMut() -> RoutineStep + Send,
{
    fn resume(&mut self) -> RoutineStep {
        (self.f)()
    }
}

/// A routine that yields for a fixed number of frames, then completes.
#[derive(Debug, Clone, Copy)]
pub struct FrameDelay {
    remaining: u32,
}

impl FrameDelay {
    /// Delay for `frames` scheduler ticks. `FrameDelay::new(0)` completes
    /// on its first resume.
    #[must_use]
    pub fn new(frames: u32) -> Self {
        Self { remaining: frames }
    }
}

impl Routine for FrameDelay {
    fn resume(&mut self) -> RoutineStep {
        if self.remaining == 0 {
            RoutineStep::Done
        } else {
            self.remaining -= 1;
            RoutineStep::Yielded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_delay_zero_completes_immediately() {
        let mut delay = FrameDelay::new(0);
        assert_eq!(delay.resume(), RoutineStep::Done);
    }

    #[test]
    fn frame_delay_yields_then_completes() {
        let mut delay = FrameDelay::new(2);
        assert_eq!(delay.resume(), RoutineStep::Yielded);
        assert_eq!(delay.resume(), RoutineStep::Yielded);
        assert_eq!(delay.resume(), RoutineStep::Done);
    }

    #[test]
    fn routine_fn_counts_down() {
        let mut steps = 3;
        let mut routine = routine_fn(move || {
            steps -= 1;
            if steps == 0 {
                RoutineStep::Done
            } else {
                RoutineStep::Yielded
            }
        });
        assert_eq!(routine.resume(), RoutineStep::Yielded);
        assert_eq!(routine.resume(), RoutineStep::Yielded);
        assert_eq!(routine.resume(), RoutineStep::Done);
    }
}
