use crate::model::InvalidInput;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SKIP: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 100;

/// Offset/limit window applied to every list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: DEFAULT_SKIP,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Unbounded window, used by the aggregation walks.
    pub const ALL: Page = Page {
        skip: 0,
        limit: i64::MAX,
    };

    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Result<Self, InvalidInput> {
        let skip = skip.unwrap_or(DEFAULT_SKIP);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if skip < 0 {
            return Err(InvalidInput::new("skip must be >= 0"));
        }
        if limit < 0 {
            return Err(InvalidInput::new("limit must be >= 0"));
        }
        Ok(Self { skip, limit })
    }

    /// Apply the window to rows that are already in id order.
    pub fn slice<T>(&self, rows: impl IntoIterator<Item = T>) -> Vec<T> {
        rows.into_iter()
            .skip(usize::try_from(self.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .collect()
    }
}
