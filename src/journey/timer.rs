//! Timer abstraction for the journey controller.
//!
//! The controller never touches `setInterval` / `setTimeout` directly; it asks a
//! [`Scheduler`] for handles and the host calls back into
//! [`ProgressController::fire`](super::ProgressController::fire) when one elapses.
//! [`ManualScheduler`] drives the same contract from a virtual clock so the state
//! machine can be exercised natively.

/// Opaque identifier for a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

pub trait Scheduler {
    /// Start a repeating timer firing every `period_ms`.
    fn set_interval(&mut self, period_ms: u32) -> TimerHandle;
    /// Start a one-shot timer firing once after `delay_ms`.
    fn set_timeout(&mut self, delay_ms: u32) -> TimerHandle;
    /// Cancel a timer. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Clone, Copy, Debug)]
struct PendingTimer {
    handle: TimerHandle,
    due_ms: u64,
    period_ms: Option<u32>,
}

/// Virtual-clock scheduler.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now_ms: u64,
    next_id: u64,
    pending: Vec<PendingTimer>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of timers currently scheduled (intervals and timeouts).
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    pub fn outstanding_intervals(&self) -> usize {
        self.pending.iter().filter(|t| t.period_ms.is_some()).count()
    }

    pub fn outstanding_timeouts(&self) -> usize {
        self.pending.iter().filter(|t| t.period_ms.is_none()).count()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|t| t.handle == handle)
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to its
    /// due time. Intervals are re-armed one period later; timeouts are dropped.
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerHandle> {
        let (idx, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.handle))?;
        let timer = self.pending[idx];
        self.now_ms = self.now_ms.max(timer.due_ms);
        match timer.period_ms {
            Some(period) => self.pending[idx].due_ms = timer.due_ms + period.max(1) as u64,
            None => {
                self.pending.remove(idx);
            }
        }
        Some(timer.handle)
    }

    /// Let `ms` pass and return every handle that fell due, in firing order.
    /// Intervals show up once per elapsed period.
    pub fn advance(&mut self, ms: u64) -> Vec<TimerHandle> {
        let until = self.now_ms + ms;
        let mut fired = Vec::new();
        while let Some(handle) = self.pop_due(until) {
            fired.push(handle);
        }
        self.advance_clock_to(until);
        fired
    }

    /// Move the clock forward without firing anything.
    pub fn advance_clock_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }

    fn allocate(&mut self, delay_ms: u32, period_ms: Option<u32>) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.push(PendingTimer {
            handle,
            due_ms: self.now_ms + delay_ms as u64,
            period_ms,
        });
        handle
    }
}

impl Scheduler for ManualScheduler {
    fn set_interval(&mut self, period_ms: u32) -> TimerHandle {
        let period = period_ms.max(1);
        self.allocate(period, Some(period))
    }

    fn set_timeout(&mut self, delay_ms: u32) -> TimerHandle {
        self.allocate(delay_ms, None)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|t| t.handle != handle);
    }
}
