//! Jobs module - the invokable pipeline steps and their run guards.

mod job_guard;
mod job_runner;

pub use job_guard::{JobGuard, JobKind, JobLocks};
pub use job_runner::{DailySummary, JobRunner};
