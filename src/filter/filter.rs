use chrono::{DateTime, NaiveDate, Utc};

use crate::config::FilterConfig;
use crate::database::models::Question;
use crate::types::Difficulty;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, Pagination, QuestionFilter, SortOrder, SqlParam, SqlResult};

/// Complete query over the question collection: constraints, ordering and
/// an optional page window. Store adapters consume this.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    where_data: QuestionFilter,
    order: SortOrder,
    page: Option<Pagination>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from raw list parameters, validating each one
    pub fn assign(&mut self, data: FilterData, config: &FilterConfig) -> Result<&mut Self, FilterError> {
        self.where_data.company = non_blank(data.company);
        self.where_data.topic = non_blank(data.topic);
        self.where_data.role = non_blank(data.role);
        if let Some(difficulty) = non_blank(data.difficulty) {
            let parsed = difficulty.parse::<Difficulty>().map_err(FilterError::InvalidDifficulty)?;
            self.where_data.difficulty = Some(parsed);
        }
        if let Some(from) = non_blank(data.from_date) {
            self.where_data.created_from = Some(parse_date(&from, "fromDate", false)?);
        }
        if let Some(to) = non_blank(data.to_date) {
            self.where_data.created_to = Some(parse_date(&to, "toDate", true)?);
        }
        if let Some(sort) = non_blank(data.sort) {
            self.order(sort.parse()?);
        }
        let page = parse_positive(data.page, "page")?.unwrap_or(1);
        let limit = parse_positive(data.limit, "limit")?.unwrap_or(config.default_limit);
        self.paginate(page, limit, config)?;
        Ok(self)
    }

    pub fn search(&mut self, term: &str) -> Result<&mut Self, FilterError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(FilterError::EmptySearch);
        }
        self.where_data.search = Some(term.to_string());
        Ok(self)
    }

    pub fn order(&mut self, order: SortOrder) -> &mut Self {
        self.order = order;
        self
    }

    pub fn paginate(&mut self, page: u32, limit: u32, config: &FilterConfig) -> Result<&mut Self, FilterError> {
        if page == 0 {
            return Err(FilterError::InvalidPage("Page must be at least 1".to_string()));
        }
        if limit == 0 {
            return Err(FilterError::InvalidLimit("Limit must be at least 1".to_string()));
        }
        let applied_limit = if limit > config.max_limit {
            tracing::debug!("Limit {} exceeds max {}, capping to max", limit, config.max_limit);
            config.max_limit
        } else {
            limit
        };
        self.page = Some(Pagination { page, limit: applied_limit });
        Ok(self)
    }

    pub fn where_data(&self) -> &QuestionFilter {
        &self.where_data
    }

    pub fn sort_order(&self) -> SortOrder {
        self.order
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.page
    }

    pub fn matches(&self, question: &Question) -> bool {
        FilterWhere::matches(&self.where_data, question)
    }

    pub fn to_sql(&self, table_name: &str, select_clause: &str) -> SqlResult {
        let (where_clause, mut params) = FilterWhere::generate(&self.where_data, 0);
        let order_clause = FilterOrder::generate(self.order);
        let mut query = format!(
            "SELECT {} FROM \"{}\" WHERE {} {}",
            select_clause, table_name, where_clause, order_clause
        );
        if let Some(page) = self.page {
            let limit_index = params.len() + 1;
            query.push_str(&format!(" LIMIT ${} OFFSET ${}", limit_index, limit_index + 1));
            params.push(SqlParam::Int(i64::from(page.limit)));
            params.push(SqlParam::Int(page.offset() as i64));
        }
        SqlResult { query, params }
    }

    pub fn to_count_sql(&self, table_name: &str) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.where_data, 0);
        let query = format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", table_name, where_clause);
        SqlResult { query, params }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_positive(value: Option<String>, field: &'static str) -> Result<Option<u32>, FilterError> {
    let Some(raw) = non_blank(value) else { return Ok(None) };
    let parsed: u32 = raw.parse().map_err(|_| match field {
        "page" => FilterError::InvalidPage(format!("'{}' is not a positive integer", raw)),
        _ => FilterError::InvalidLimit(format!("'{}' is not a positive integer", raw)),
    })?;
    Ok(Some(parsed))
}

/// Accept RFC 3339 timestamps or bare dates. A bare `toDate` covers the whole day.
fn parse_date(raw: &str, field: &'static str, end_of_day: bool) -> Result<DateTime<Utc>, FilterError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| FilterError::InvalidDate { field, value: raw.to_string() })?;
    let time = if end_of_day {
        date.and_hms_micro_opt(23, 59, 59, 999_999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| FilterError::InvalidDate { field, value: raw.to_string() })
}
