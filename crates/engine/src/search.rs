//! First-fit search over grid cells, bounded by a per-search iteration limit
//! and an optional budget shared by the whole run.

use thiserror::Error;
use types::NoSlotCause;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("grid exhausted after {iterations} iterations")]
    GridExhausted { iterations: u64 },
    #[error("search budget of {limit} iterations spent")]
    IterationBudget { limit: u64 },
    #[error("run budget spent")]
    RunBudget,
}

impl From<PlacementError> for NoSlotCause {
    fn from(e: PlacementError) -> Self {
        match e {
            PlacementError::GridExhausted { iterations } => NoSlotCause::GridExhausted { iterations },
            PlacementError::IterationBudget { limit } => NoSlotCause::IterationBudget { limit },
            PlacementError::RunBudget => NoSlotCause::RunBudget,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RunBudget {
    remaining: Option<u64>,
    spent: u64,
}

impl RunBudget {
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            remaining: limit,
            spent: 0,
        }
    }

    pub fn charge(&mut self) -> Result<(), PlacementError> {
        if let Some(left) = self.remaining.as_mut() {
            if *left == 0 {
                return Err(PlacementError::RunBudget);
            }
            *left -= 1;
        }
        self.spent += 1;
        Ok(())
    }

    pub fn spent(&self) -> u64 {
        self.spent
    }

    pub fn is_spent(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// Returns the first cell accepted by `admissible`, visiting at most `limit`
/// cells.
pub fn first_fit<T, I, F>(
    cells: I,
    limit: u64,
    budget: &mut RunBudget,
    mut admissible: F,
) -> Result<T, PlacementError>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> bool,
{
    let mut iterations = 0u64;
    for cell in cells {
        if iterations >= limit {
            return Err(PlacementError::IterationBudget { limit });
        }
        budget.charge()?;
        iterations += 1;
        if admissible(&cell) {
            return Ok(cell);
        }
    }
    Err(PlacementError::GridExhausted { iterations })
}
