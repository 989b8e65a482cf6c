use serde::Serialize;

use crate::config::{self, AppConfig};

/// Resolved limit/offset for a list query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn from_query(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self::with_config(config::config(), limit, offset)
    }

    fn with_config(config: &AppConfig, limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: config.page_size(limit),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamps() {
        let config = AppConfig::development();
        assert_eq!(Page::with_config(&config, None, None), Page { limit: 50, offset: 0 });
        assert_eq!(Page::with_config(&config, Some(5000), Some(-3)), Page { limit: 200, offset: 0 });
        assert_eq!(Page::with_config(&config, Some(10), Some(30)), Page { limit: 10, offset: 30 });
    }
}
