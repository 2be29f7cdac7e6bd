//! Render pipeline
//!
//! Ties the stages together for one batch render:
//!
//! ```text
//! SignalSource -> resample -> normalize_ir -> convolve   (per environment)
//!                                                 |
//!                     align -> crossfade -> blend -> normalize -> SignalSink
//! ```
//!
//! Per-environment work runs on one scoped thread per environment when
//! `RenderOptions::parallel` is set. Results are joined in schedule order, so
//! serial and parallel renders produce identical output.

mod job;
mod render;

pub use job::{RenderJob, RenderOptions};
pub use render::{
    plan_job, render, render_job, EnvironmentReport, JobPlan, RenderOutput, RenderReport,
};
