use std::time::Instant;

use crate::{
    foundation::alloc_track::MemoryProbe,
    foundation::core::SourceLocation,
    foundation::error::{ScopeError, ScopeResult},
    trace::log::EventLog,
};

/// Sentinel that disables a budget.
pub const DISABLED: i64 = -1;

/// Time and memory ceilings for one trace. Negative values disable a check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Budget {
    /// Maximum wall-clock time since trace start, in milliseconds.
    pub max_duration_ms: i64,
    /// Maximum memory growth since trace start, in bytes.
    pub max_memory_bytes: i64,
}

impl Budget {
    /// Both checks disabled.
    pub const UNLIMITED: Budget = Budget {
        max_duration_ms: DISABLED,
        max_memory_bytes: DISABLED,
    };

    /// Active duration ceiling, if any.
    pub fn duration_limit(&self) -> Option<i64> {
        (self.max_duration_ms >= 0).then_some(self.max_duration_ms)
    }

    /// Active memory ceiling, if any.
    pub fn memory_limit(&self) -> Option<i64> {
        (self.max_memory_bytes >= 0).then_some(self.max_memory_bytes)
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::UNLIMITED
    }
}

/// Readings captured once per trace lifecycle; every check is relative to them.
#[derive(Clone, Copy, Debug)]
pub struct ResourceBaseline {
    /// Trace start.
    pub started: Instant,
    /// Probe reading at trace start.
    pub memory: i64,
}

/// Enforces a [`Budget`] on every recorded event.
pub struct ResourceGuard {
    budget: Budget,
    baseline: ResourceBaseline,
    probe: Box<dyn MemoryProbe>,
}

impl ResourceGuard {
    /// Guard with a fresh baseline taken now.
    pub fn new(budget: Budget, probe: Box<dyn MemoryProbe>) -> Self {
        let baseline = ResourceBaseline {
            started: Instant::now(),
            memory: probe.current_bytes(),
        };
        Self {
            budget,
            baseline,
            probe,
        }
    }

    /// Configured budget.
    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Replace the budget without touching the baseline.
    pub fn set_budget(&mut self, budget: Budget) {
        self.budget = budget;
    }

    /// Replace the memory probe and re-read the memory baseline from it.
    pub fn set_probe(&mut self, probe: Box<dyn MemoryProbe>) {
        self.baseline.memory = probe.current_bytes();
        self.probe = probe;
    }

    /// Current baseline.
    pub fn baseline(&self) -> ResourceBaseline {
        self.baseline
    }

    /// Capture a new baseline (time and memory) from now.
    pub fn rebase(&mut self) {
        self.baseline = ResourceBaseline {
            started: Instant::now(),
            memory: self.probe.current_bytes(),
        };
    }

    /// Seconds since the baseline.
    pub fn elapsed(&self) -> f64 {
        self.baseline.started.elapsed().as_secs_f64()
    }

    /// Memory growth since the baseline, in bytes.
    pub fn memory_used(&self) -> i64 {
        self.probe.current_bytes() - self.baseline.memory
    }

    /// Check both budgets. On violation the log is locked before the error is returned.
    ///
    /// The error carries `location` when the triggering event had one.
    pub fn check(&self, log: &mut EventLog, location: Option<&SourceLocation>) -> ScopeResult<()> {
        if let Some(max_ms) = self.budget.duration_limit() {
            let elapsed_ms = self.elapsed() * 1_000.0;
            if elapsed_ms > max_ms as f64 {
                return Err(self.fail(
                    log,
                    format!("execution_max_time of {max_ms}ms exceeded."),
                    location,
                ));
            }
        }

        if let Some(max_bytes) = self.budget.memory_limit() {
            let used = self.memory_used();
            if used > max_bytes {
                return Err(self.fail(
                    log,
                    format!("memory_limit of {max_bytes}B exceeded."),
                    location,
                ));
            }
        }

        Ok(())
    }

    fn fail(
        &self,
        log: &mut EventLog,
        message: String,
        location: Option<&SourceLocation>,
    ) -> ScopeError {
        log.lock();
        tracing::warn!(%message, located = location.is_some(), "ResourceGuard: budget exceeded");
        ScopeError::budget(message, location.cloned())
    }
}

impl std::fmt::Debug for ResourceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceGuard")
            .field("budget", &self.budget)
            .field("baseline", &self.baseline)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trace/guard.rs"]
mod tests;
