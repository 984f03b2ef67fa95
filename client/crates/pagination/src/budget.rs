//! Upper bounds for pagination loops.

use std::time::Duration;

use thiserror::Error;

/// Raised when a pagination loop would exceed its budget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageBudgetExceeded {
    /// Another page was requested after `max_pages` pages were fetched.
    #[error("pagination stopped after {max_pages} pages; server kept returning continuation urls")]
    Pages {
        /// Configured page ceiling.
        max_pages: u32,
    },
    /// The loop ran longer than `max_elapsed`.
    #[error("pagination stopped after {elapsed:?} (limit {max_elapsed:?}) across {pages} pages")]
    Elapsed {
        /// Configured wall-clock ceiling.
        max_elapsed: Duration,
        /// Observed elapsed time when the limit tripped.
        elapsed: Duration,
        /// Pages fetched before the limit tripped.
        pages: u32,
    },
}

/// Limits applied to one pagination loop.
///
/// `max_pages` is clamped to at least one page so a loop can always make
/// progress. `max_elapsed` is optional; `None` disables the time limit.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use pagination::PageBudget;
///
/// let budget = PageBudget::new(2, Some(Duration::from_secs(60)));
/// let mut tracker = budget.tracker();
/// assert_eq!(tracker.admit(Duration::ZERO), Ok(1));
/// assert_eq!(tracker.admit(Duration::from_secs(1)), Ok(2));
/// assert!(tracker.admit(Duration::from_secs(2)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBudget {
    max_pages: u32,
    max_elapsed: Option<Duration>,
}

impl PageBudget {
    /// Build a budget from a page ceiling and an optional time ceiling.
    #[must_use]
    pub fn new(max_pages: u32, max_elapsed: Option<Duration>) -> Self {
        Self {
            max_pages: max_pages.max(1),
            max_elapsed,
        }
    }

    /// Page ceiling.
    #[must_use]
    pub const fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Optional wall-clock ceiling.
    #[must_use]
    pub const fn max_elapsed(&self) -> Option<Duration> {
        self.max_elapsed
    }

    /// Start tracking one pagination loop against this budget.
    #[must_use]
    pub const fn tracker(self) -> PageTracker {
        PageTracker {
            budget: self,
            pages: 0,
        }
    }
}

impl Default for PageBudget {
    fn default() -> Self {
        Self::new(1_000, Some(Duration::from_secs(300)))
    }
}

/// Per-loop page counter enforcing a [`PageBudget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTracker {
    budget: PageBudget,
    pages: u32,
}

impl PageTracker {
    /// Admit the next page request.
    ///
    /// `elapsed` is the time spent in the loop so far, measured by the caller
    /// so the clock stays injectable. Returns the one-based number of the page
    /// about to be requested.
    ///
    /// # Errors
    ///
    /// Returns [`PageBudgetExceeded`] when either limit has been reached.
    pub fn admit(&mut self, elapsed: Duration) -> Result<u32, PageBudgetExceeded> {
        if self.pages >= self.budget.max_pages {
            return Err(PageBudgetExceeded::Pages {
                max_pages: self.budget.max_pages,
            });
        }
        if let Some(max_elapsed) = self.budget.max_elapsed.filter(|max| elapsed > *max) {
            return Err(PageBudgetExceeded::Elapsed {
                max_elapsed,
                elapsed,
                pages: self.pages,
            });
        }
        self.pages += 1;
        Ok(self.pages)
    }

    /// Pages admitted so far.
    #[must_use]
    pub const fn pages(&self) -> u32 {
        self.pages
    }
}
