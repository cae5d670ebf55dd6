use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Ingest,
    Risk,
    Performance,
    Daily,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Ingest => "ingest",
            JobKind::Risk => "risk",
            JobKind::Performance => "performance",
            JobKind::Daily => "daily",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of job kinds currently running in this process.
#[derive(Debug, Clone, Default)]
pub struct JobLocks {
    running: Arc<Mutex<HashSet<JobKind>>>,
}

impl JobLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `kind` as running, or fail with [`Error::JobInProgress`].
    pub fn try_acquire(&self, kind: JobKind) -> Result<JobGuard> {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if !running.insert(kind) {
            return Err(Error::JobInProgress(kind));
        }
        Ok(JobGuard {
            kind,
            running: Arc::clone(&self.running),
        })
    }

    pub fn is_running(&self, kind: JobKind) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&kind)
    }
}

/// RAII guard that releases the job lock when dropped.
#[derive(Debug)]
pub struct JobGuard {
    kind: JobKind,
    running: Arc<Mutex<HashSet<JobKind>>>,
}

impl JobGuard {
    pub fn kind(&self) -> JobKind {
        self.kind
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        running.remove(&self.kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let locks = JobLocks::new();
        let guard = locks.try_acquire(JobKind::Risk).unwrap();
        assert!(locks.is_running(JobKind::Risk));
        assert!(matches!(
            locks.try_acquire(JobKind::Risk),
            Err(Error::JobInProgress(JobKind::Risk))
        ));

        drop(guard);
        assert!(!locks.is_running(JobKind::Risk));
        assert!(locks.try_acquire(JobKind::Risk).is_ok());
    }

    #[test]
    fn test_kinds_are_independent() {
        let locks = JobLocks::new();
        let _risk = locks.try_acquire(JobKind::Risk).unwrap();
        assert!(locks.try_acquire(JobKind::Performance).is_ok());
    }

    #[test]
    fn test_clones_share_state() {
        let locks = JobLocks::new();
        let other = locks.clone();
        let _guard = locks.try_acquire(JobKind::Ingest).unwrap();
        assert!(other.try_acquire(JobKind::Ingest).is_err());
    }
}
