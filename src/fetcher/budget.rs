/// Largest page the statuses endpoint hands out.
pub const PAGE_SIZE: usize = 40;

/// How many more records a fetch may emit.
///
/// `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchBudget {
    remaining: Option<usize>,
}

impl FetchBudget {
    pub fn limited(limit: usize) -> Self {
        Self {
            remaining: Some(limit),
        }
    }

    pub fn unbounded() -> Self {
        Self { remaining: None }
    }

    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Page size for the next request.
    pub fn page_size(&self) -> usize {
        match self.remaining {
            Some(n) => n.min(PAGE_SIZE),
            None => PAGE_SIZE,
        }
    }

    /// Charge a page of records against the budget, dropping any records
    /// the budget cannot cover.
    pub fn take<T>(&mut self, mut records: Vec<T>) -> Vec<T> {
        if let Some(remaining) = self.remaining.as_mut() {
            records.truncate(*remaining);
            *remaining -= records.len();
        }
        records
    }
}
