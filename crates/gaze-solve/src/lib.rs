//! Non-linear solvers for `gaze-normalization-rs`.
//!
//! Two geometric problems live here:
//! - iterative Perspective-n-Point head-pose estimation
//!   ([`solve_pnp`]), seeded linearly and refined by
//!   Levenberg-Marquardt on pixel reprojection residuals;
//! - the eyeball-center sphere fit ([`fit_eyeball_center`]), a
//!   least-absolute-deviation fit solved by IRLS-reweighted LM.
//!
//! Both are bounded by [`SolveOptions::max_iters`] and report
//! convergence failures instead of returning unconverged estimates.

mod backend_lm;
/// Solver error taxonomy.
pub mod error;
/// Eyeball-center sphere fit.
pub mod eyeball;
/// Perspective-n-Point pose estimation.
pub mod pnp;
/// Generic NLLS problem and backend traits.
pub mod traits;

pub use backend_lm::LmBackend;
pub use error::SolveError;
pub use eyeball::fit_eyeball_center;
pub use pnp::{solve_pnp, FacePose};
pub use traits::{NllsProblem, NllsSolverBackend, SolveOptions, SolveReport};
