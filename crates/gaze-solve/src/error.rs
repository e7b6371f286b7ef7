use thiserror::Error;

/// Errors from the PnP and sphere-fit solvers.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("need at least {need} points, got {got}")]
    NotEnoughPoints { got: usize, need: usize },
    #[error("world/image correspondence lengths differ: {0} vs {1}")]
    MismatchedLengths(usize, usize),
    #[error("non-finite coordinate in solver input")]
    NonFiniteInput,
    #[error("degenerate point configuration: {0}")]
    DegenerateConfiguration(String),
    #[error("solver did not converge after {iterations} iterations (cost {final_cost:.3e})")]
    Convergence { iterations: usize, final_cost: f64 },
}
