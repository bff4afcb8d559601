use std::cmp::Ordering;

use crate::database::models::Question;

use super::types::{FilterOrderInfo, SortDirection, SortOrder};

pub struct FilterOrder;

impl FilterOrder {
    /// Column ordering for a sort option. Every option ends on `created_at`
    /// then `id` so pages are stable.
    pub fn parse(order: SortOrder) -> Vec<FilterOrderInfo> {
        let primary = match order {
            SortOrder::Latest => vec![],
            SortOrder::Oldest => vec![FilterOrderInfo { column: "created_at", sort: SortDirection::Asc }],
            SortOrder::Upvotes => vec![FilterOrderInfo { column: "upvotes", sort: SortDirection::Desc }],
        };
        let mut infos = primary;
        if order != SortOrder::Oldest {
            infos.push(FilterOrderInfo { column: "created_at", sort: SortDirection::Desc });
        }
        infos.push(FilterOrderInfo { column: "id", sort: SortDirection::Asc });
        infos
    }

    pub fn generate(order: SortOrder) -> String {
        let parts: Vec<String> = Self::parse(order)
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }

    /// Comparator matching [`FilterOrder::generate`] for in-memory sorting
    pub fn compare(order: SortOrder, a: &Question, b: &Question) -> Ordering {
        let primary = match order {
            SortOrder::Latest => b.created_at.cmp(&a.created_at),
            SortOrder::Oldest => a.created_at.cmp(&b.created_at),
            SortOrder::Upvotes => b
                .upvotes
                .cmp(&a.upvotes)
                .then_with(|| b.created_at.cmp(&a.created_at)),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_order_by_clauses() {
        assert_eq!(FilterOrder::generate(SortOrder::Latest), "ORDER BY \"created_at\" DESC, \"id\" ASC");
        assert_eq!(FilterOrder::generate(SortOrder::Oldest), "ORDER BY \"created_at\" ASC, \"id\" ASC");
        assert_eq!(
            FilterOrder::generate(SortOrder::Upvotes),
            "ORDER BY \"upvotes\" DESC, \"created_at\" DESC, \"id\" ASC"
        );
    }
}
