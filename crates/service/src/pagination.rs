//! Offset/limit pagination for list endpoints.

use configs::PaginationConfig;
use serde::Deserialize;

/// Raw `skip`/`limit` query values as sent by the client.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

/// Normalized window applied to a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl ListParams {
    pub fn new(skip: Option<u64>, limit: Option<u64>) -> Self {
        Self { skip, limit }
    }

    /// Default the missing values and clamp `limit` to `[1, max_limit]`.
    pub fn normalize(self, cfg: &PaginationConfig) -> Page {
        let limit = self.limit.unwrap_or(cfg.default_limit).clamp(1, cfg.max_limit.max(1));
        Page { offset: self.skip.unwrap_or(0), limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PaginationConfig {
        PaginationConfig { default_limit: 100, max_limit: 500 }
    }

    #[test]
    fn defaults_are_skip_zero_limit_hundred() {
        let p = ListParams::default().normalize(&cfg());
        assert_eq!(p, Page { offset: 0, limit: 100 });
    }

    #[test]
    fn limit_is_clamped_to_bounds() {
        assert_eq!(ListParams::new(Some(5), Some(10_000)).normalize(&cfg()), Page { offset: 5, limit: 500 });
        assert_eq!(ListParams::new(None, Some(0)).normalize(&cfg()).limit, 1);
    }
}
