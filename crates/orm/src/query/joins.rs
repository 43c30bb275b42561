//! Query Builder JOIN operations

use super::builder::QueryBuilder;
use super::types::*;

impl<M> QueryBuilder<M> {
    fn push_join(mut self, join_type: JoinType, table: &str, on: Option<(&str, &str)>) -> Self {
        self.spec.joins.push(JoinClause {
            join_type,
            table: table.to_string(),
            on: on.map(|(left, right)| (left.to_string(), right.to_string())),
        });
        self
    }

    /// Add INNER JOIN to the query
    pub fn join(self, table: &str, left_col: &str, right_col: &str) -> Self {
        self.push_join(JoinType::Inner, table, Some((left_col, right_col)))
    }

    /// Add LEFT JOIN to the query
    pub fn left_join(self, table: &str, left_col: &str, right_col: &str) -> Self {
        self.push_join(JoinType::Left, table, Some((left_col, right_col)))
    }

    /// Add RIGHT JOIN to the query
    pub fn right_join(self, table: &str, left_col: &str, right_col: &str) -> Self {
        self.push_join(JoinType::Right, table, Some((left_col, right_col)))
    }

    /// Add FULL JOIN to the query
    pub fn full_join(self, table: &str, left_col: &str, right_col: &str) -> Self {
        self.push_join(JoinType::Full, table, Some((left_col, right_col)))
    }

    /// Add CROSS JOIN to the query
    pub fn cross_join(self, table: &str) -> Self {
        self.push_join(JoinType::Cross, table, None)
    }
}
