//! Query-string pagination.

use atelier_postgres::query::Pagination;
use serde::{Deserialize, Serialize};

/// `?limit=&offset=` for subscription listings.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    const DEFAULT_LIMIT: i64 = 50;

    pub fn into_pagination(self) -> Pagination {
        Pagination::new(
            self.limit.unwrap_or(Self::DEFAULT_LIMIT),
            self.offset.unwrap_or_default(),
        )
    }
}

/// `?limit=` for delivery and run logs, clamped to 1..=100, default 20.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct LogQuery {
    pub limit: Option<i64>,
}

impl LogQuery {
    #[inline]
    pub fn into_pagination(self) -> Pagination {
        Pagination::recent(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_limit_is_clamped() {
        assert_eq!(LogQuery::default().into_pagination().limit, 20);
        assert_eq!(LogQuery { limit: Some(0) }.into_pagination().limit, 1);
        assert_eq!(LogQuery { limit: Some(500) }.into_pagination().limit, 100);
    }

    #[test]
    fn page_defaults() {
        let pagination = PageQuery::default().into_pagination();
        assert_eq!(pagination.limit, 50);
        assert_eq!(pagination.offset, 0);
    }
}
