/// Normalized list parameters shared by the `GetList` calls.
///
/// Wire requests use proto3 scalars, so "unset" arrives as `0` or `""`. Those
/// and negative numbers become `None` here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListParams {
    pub fn new(search: &str, limit: i64, offset: i64) -> Self {
        Self {
            search: Some(search.to_string()).filter(|s| !s.is_empty()),
            limit: Some(limit).filter(|l| *l > 0),
            offset: Some(offset).filter(|o| *o > 0),
        }
    }
}

/// One page of a list query plus the total number of matching rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}
