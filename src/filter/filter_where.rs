use crate::database::models::Question;

use super::types::{QuestionFilter, SqlParam};

/// Translates a [`QuestionFilter`] into a parameterized WHERE clause, or
/// evaluates it directly against an in-memory document.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
    conditions: Vec<String>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    pub fn generate(filter: &QuestionFilter, starting_param_index: usize) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(filter)
    }

    fn build(&mut self, filter: &QuestionFilter) -> (String, Vec<SqlParam>) {
        let equalities = [
            ("company", filter.company.clone()),
            ("topic", filter.topic.clone()),
            ("role", filter.role.clone()),
            ("difficulty", filter.difficulty.map(|d| d.as_str().to_string())),
        ];
        for (column, value) in equalities {
            if let Some(value) = value {
                let placeholder = self.param(SqlParam::Text(value));
                self.conditions.push(format!("\"{}\" = {}", column, placeholder));
            }
        }

        if let Some(from) = filter.created_from {
            let placeholder = self.param(SqlParam::Timestamp(from));
            self.conditions.push(format!("\"created_at\" >= {}", placeholder));
        }
        if let Some(to) = filter.created_to {
            let placeholder = self.param(SqlParam::Timestamp(to));
            self.conditions.push(format!("\"created_at\" <= {}", placeholder));
        }

        if let Some(term) = &filter.search {
            // One bound pattern shared by all three columns
            let placeholder = self.param(SqlParam::Text(format!("%{}%", escape_like(term))));
            let ors: Vec<String> = ["question_text", "company", "topic"]
                .iter()
                .map(|column| format!("\"{}\" ILIKE {} ESCAPE '\\'", column, placeholder))
                .collect();
            self.conditions.push(format!("({})", ors.join(" OR ")));
        }

        let where_clause = if self.conditions.is_empty() {
            "1=1".to_string()
        } else {
            self.conditions.join(" AND ")
        };
        (where_clause, self.param_values.clone())
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    /// In-memory evaluation with the same semantics as the generated SQL
    pub fn matches(filter: &QuestionFilter, question: &Question) -> bool {
        if filter.company.as_ref().is_some_and(|c| *c != question.company) {
            return false;
        }
        if filter.topic.as_ref().is_some_and(|t| *t != question.topic) {
            return false;
        }
        if filter.role.as_ref().is_some_and(|r| *r != question.role) {
            return false;
        }
        if filter.difficulty.is_some_and(|d| d != question.difficulty) {
            return false;
        }
        if filter.created_from.is_some_and(|from| question.created_at < from) {
            return false;
        }
        if filter.created_to.is_some_and(|to| question.created_at > to) {
            return false;
        }
        if let Some(term) = &filter.search {
            let needle = term.to_lowercase();
            let hit = [&question.question_text, &question.company, &question.topic]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Escape LIKE wildcards so the search term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
