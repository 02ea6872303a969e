//! Incremental loader.
//!
//! Grows a dynamically loading page until the candidate count converges.
//! Every iteration scrolls to the bottom, presses a visible "load more"
//! affordance when there is one, settles and re-probes the count. Iterations
//! that do not grow the page extend a stall streak; a long enough streak, a
//! met target or the iteration cap ends the run.
//!
//! Failed growth triggers are no-ops folded into the stall accounting. The
//! loader never returns an error.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PageError, PageResult};
use crate::extractor::Aggregator;
use crate::options::Options;
use crate::page::Page;

/// Iterations between progress log lines.
const PROGRESS_EVERY: usize = 5;

/// Phase of the loader state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadPhase {
    /// The last iteration grew the page.
    Growing,
    /// The last iteration did not grow the page.
    Stalled,
    /// The target count was reached.
    Converged,
    /// Stall threshold or iteration cap reached.
    Exhausted,
}

impl LoadPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Converged | Self::Exhausted)
    }
}

/// Mutable loader state, reset for every harvest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderState {
    pub iterations_run: usize,
    pub last_observed_count: usize,
    /// Highest count seen; growth is measured against it.
    pub high_water_count: usize,
    pub stall_streak: usize,
}

impl LoaderState {
    /// Start from the count probed before the first iteration.
    #[must_use]
    pub fn new(initial_count: usize) -> Self {
        Self {
            last_observed_count: initial_count,
            high_water_count: initial_count,
            ..Self::default()
        }
    }

    /// Record one finished iteration and return the resulting phase.
    ///
    /// `extra_growth` is an auxiliary growth signal, such as a taller document.
    /// A count that drops and recovers, as in a virtualised thread, is not
    /// growth until it exceeds the highest count seen.
    pub fn observe(&mut self, count: usize, extra_growth: bool, options: &Options) -> LoadPhase {
        self.iterations_run += 1;

        let grew = count > self.high_water_count || extra_growth;
        self.high_water_count = self.high_water_count.max(count);
        self.last_observed_count = count;
        let phase = if grew {
            self.stall_streak = 0;
            LoadPhase::Growing
        } else {
            self.stall_streak += 1;
            LoadPhase::Stalled
        };

        if options.target_count.is_some_and(|target| count >= target) {
            LoadPhase::Converged
        } else if self.stall_streak >= options.stall_threshold || self.iterations_run >= options.max_iterations {
            LoadPhase::Exhausted
        } else {
            phase
        }
    }
}

/// Final report of a loader run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadOutcome {
    /// Candidate count last observed.
    pub final_count: usize,
    /// Terminal phase: `Converged` when the target was hit, else `Exhausted`.
    pub phase: LoadPhase,
    pub iterations: usize,
}

/// Drives page growth.
#[derive(Debug, Clone, Copy)]
pub struct Loader<'a> {
    options: &'a Options,
    aggregator: Aggregator<'a>,
}

impl<'a> Loader<'a> {
    #[must_use]
    pub fn new(options: &'a Options) -> Self {
        Self {
            options,
            aggregator: Aggregator::new(options),
        }
    }

    /// Grow the page until the count converges or the loader gives up.
    pub async fn run(&self, page: &dyn Page) -> LoadOutcome {
        let options = self.options;
        let initial = match self.aggregator.count_candidates(page).await {
            Ok(count) => count,
            Err(err) => {
                warn!(error = %err, "initial candidate probe failed");
                return LoadOutcome {
                    final_count: 0,
                    phase: LoadPhase::Exhausted,
                    iterations: 0,
                };
            }
        };
        let mut state = LoaderState::new(initial);
        info!(initial, max_iterations = options.max_iterations, target = ?options.target_count, "loading");

        if options.target_count.is_some_and(|target| initial >= target) {
            return finish(&state, LoadPhase::Converged);
        }

        let mut height = if options.use_height_signal {
            page.document_height().await.unwrap_or(0)
        } else {
            0
        };

        let mut phase = LoadPhase::Exhausted;
        while state.iterations_run < options.max_iterations {
            phase = match self.step(page, &mut state, &mut height).await {
                Ok(phase) => phase,
                Err(err) => {
                    warn!(error = %err, iteration = state.iterations_run, "page session lost while loading");
                    LoadPhase::Exhausted
                }
            };

            if state.iterations_run % PROGRESS_EVERY == 0 {
                info!(
                    iteration = state.iterations_run,
                    count = state.last_observed_count,
                    stall_streak = state.stall_streak,
                    "loading progress"
                );
            }
            if phase.is_terminal() {
                break;
            }
        }
        finish(&state, phase)
    }

    /// One iteration: grow, settle, re-probe.
    ///
    /// # Errors
    ///
    /// Only a session-fatal page error escapes; every other failure counts
    /// as an iteration without growth.
    pub async fn step(&self, page: &dyn Page, state: &mut LoaderState, height: &mut u64) -> PageResult<LoadPhase> {
        let options = self.options;

        if soften(page.trigger_scroll_to_bottom().await)?.is_some() {
            soften(page.wait(options.scroll_settle()).await)?;
        }

        let clicked = soften(page.click_if_visible(&options.load_more_labels).await)?.unwrap_or(false);
        if clicked {
            debug!("pressed load more");
            soften(page.wait(options.load_more_settle()).await)?;
        }

        if !clicked && state.stall_streak == options.alternate_tactic_after {
            let scrolled = soften(page.scroll_into_view(&options.anchor_selector).await)?.unwrap_or(false);
            if scrolled {
                debug!(anchor = %options.anchor_selector, "scrolled content anchor into view");
                soften(page.wait(options.scroll_settle()).await)?;
            }
        }

        let count = self.aggregator.count_candidates(page).await?;

        let mut taller = false;
        if options.use_height_signal {
            if let Some(now) = soften(page.document_height().await)? {
                taller = now > *height;
                *height = now;
            }
        }

        let phase = state.observe(count, taller, options);
        debug!(
            iteration = state.iterations_run,
            count,
            stall_streak = state.stall_streak,
            ?phase,
            "loader step"
        );
        Ok(phase)
    }
}

fn finish(state: &LoaderState, phase: LoadPhase) -> LoadOutcome {
    info!(
        final_count = state.last_observed_count,
        iterations = state.iterations_run,
        ?phase,
        "loading finished"
    );
    LoadOutcome {
        final_count: state.last_observed_count,
        phase,
        iterations: state.iterations_run,
    }
}

/// Swallow a non-fatal page error as `None`.
fn soften<T>(result: PageResult<T>) -> Result<Option<T>, PageError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => {
            debug!(error = %err, "growth trigger failed");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(max_iterations: usize, target_count: Option<usize>) -> Options {
        Options {
            max_iterations,
            target_count,
            ..Options::default()
        }
    }

    #[test]
    fn test_growth_resets_streak() {
        let opts = options(30, None);
        let mut state = LoaderState::new(10);

        assert_eq!(state.observe(10, false, &opts), LoadPhase::Stalled);
        assert_eq!(state.observe(10, false, &opts), LoadPhase::Stalled);
        assert_eq!(state.stall_streak, 2);
        assert_eq!(state.observe(14, false, &opts), LoadPhase::Growing);
        assert_eq!(state.stall_streak, 0);
        assert_eq!(state.last_observed_count, 14);
    }

    #[test]
    fn test_stall_threshold_exhausts() {
        let opts = options(10, None);
        let mut state = LoaderState::new(3);
        let phases: Vec<LoadPhase> = (0..5).map(|_| state.observe(3, false, &opts)).collect();

        assert_eq!(phases[..4], [LoadPhase::Stalled; 4]);
        assert_eq!(phases[4], LoadPhase::Exhausted);
        assert_eq!(state.iterations_run, 5);
    }

    #[test]
    fn test_iteration_cap_exhausts() {
        let opts = options(3, None);
        let mut state = LoaderState::new(0);

        assert_eq!(state.observe(1, false, &opts), LoadPhase::Growing);
        assert_eq!(state.observe(2, false, &opts), LoadPhase::Growing);
        assert_eq!(state.observe(3, false, &opts), LoadPhase::Exhausted);
    }

    #[test]
    fn test_target_converges() {
        let opts = options(30, Some(20));
        let mut state = LoaderState::new(5);

        assert_eq!(state.observe(12, false, &opts), LoadPhase::Growing);
        assert_eq!(state.observe(25, false, &opts), LoadPhase::Converged);
    }

    #[test]
    fn test_recovered_count_is_not_growth() {
        let opts = options(30, None);
        let mut state = LoaderState::new(4);

        assert_eq!(state.observe(2, false, &opts), LoadPhase::Stalled);
        assert_eq!(state.observe(4, false, &opts), LoadPhase::Stalled);
        assert_eq!(state.stall_streak, 2);
        assert_eq!(state.last_observed_count, 4);
        assert_eq!(state.observe(5, false, &opts), LoadPhase::Growing);
        assert_eq!(state.high_water_count, 5);
    }

    #[test]
    fn test_extra_growth_counts() {
        let opts = options(30, None);
        let mut state = LoaderState::new(5);

        assert_eq!(state.observe(5, true, &opts), LoadPhase::Growing);
        assert_eq!(state.stall_streak, 0);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(LoadPhase::Converged.is_terminal());
        assert!(LoadPhase::Exhausted.is_terminal());
        assert!(!LoadPhase::Growing.is_terminal());
        assert!(!LoadPhase::Stalled.is_terminal());
    }
}
