use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid sort option: {0}")]
    InvalidSort(String),

    #[error("{0}")]
    InvalidDifficulty(String),

    #[error("Invalid date for {field}: {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Search query is required")]
    EmptySearch,
}

impl FilterError {
    /// Query parameter the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            FilterError::InvalidSort(_) => "sort",
            FilterError::InvalidDifficulty(_) => "difficulty",
            FilterError::InvalidDate { field, .. } => field,
            FilterError::InvalidPage(_) => "page",
            FilterError::InvalidLimit(_) => "limit",
            FilterError::EmptySearch => "q",
        }
    }
}
