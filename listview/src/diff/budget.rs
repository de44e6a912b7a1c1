#[cfg(feature = "std")]
use web_time::{Duration, Instant};

/// How long a diff may run before it hands control back to the executor.
///
/// The Myers search checks the budget once per edit-distance step. Every `check_every` steps
/// it looks at the clock, and yields once `slice` has elapsed since it last resumed. Without
/// the `std` feature there is no clock and the search yields every `check_every` steps.
///
/// Yielding never changes the result of a diff, only how it interleaves with other work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YieldBudget {
    pub check_every: usize,
    #[cfg(feature = "std")]
    pub slice: Duration,
}

impl YieldBudget {
    /// A budget that never yields.
    pub const UNLIMITED: YieldBudget = YieldBudget {
        check_every: usize::MAX,
        #[cfg(feature = "std")]
        slice: Duration::MAX,
    };

    pub fn with_check_every(mut self, steps: usize) -> Self {
        self.check_every = steps.max(1);
        self
    }

    #[cfg(feature = "std")]
    pub fn with_slice(mut self, slice: Duration) -> Self {
        self.slice = slice;
        self
    }
}

impl Default for YieldBudget {
    fn default() -> Self {
        Self {
            check_every: 100,
            #[cfg(feature = "std")]
            slice: Duration::from_millis(8),
        }
    }
}

/// Running state of a [`YieldBudget`] for one diff computation.
#[derive(Debug)]
pub(crate) struct BudgetMeter {
    budget: YieldBudget,
    steps: usize,
    #[cfg(feature = "std")]
    deadline: Option<Instant>,
}

impl BudgetMeter {
    pub(crate) fn new(budget: YieldBudget) -> Self {
        let mut meter = Self {
            budget,
            steps: 0,
            #[cfg(feature = "std")]
            deadline: None,
        };
        meter.resume();
        meter
    }

    /// Restarts the slice. Called whenever the computation is (re)entered.
    pub(crate) fn resume(&mut self) {
        self.steps = 0;
        #[cfg(feature = "std")]
        {
            self.deadline = Instant::now().checked_add(self.budget.slice);
        }
    }

    /// Counts one search step and reports whether the computation should suspend now.
    pub(crate) fn tick(&mut self) -> bool {
        self.steps = self.steps.saturating_add(1);
        if self.steps < self.budget.check_every {
            return false;
        }
        self.steps = 0;

        #[cfg(feature = "std")]
        {
            match self.deadline {
                Some(deadline) => Instant::now() >= deadline,
                None => false,
            }
        }

        #[cfg(not(feature = "std"))]
        {
            true
        }
    }
}
