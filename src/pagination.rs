use serde::Deserialize;

/// Common `?limit=&offset=` query parameters for list endpoints.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    /// Clamp to sane bounds so a client cannot request the whole table.
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_query_is_empty() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.limit, 20);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let p = Pagination {
            limit: 10_000,
            offset: -5,
        };
        assert_eq!(p.clamped(), (100, 0));

        let p = Pagination {
            limit: 0,
            offset: 40,
        };
        assert_eq!(p.clamped(), (1, 40));
    }
}
