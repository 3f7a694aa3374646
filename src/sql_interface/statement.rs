use indoc::formatdoc;
use rusqlite::Connection;

use super::sql_struct::{ReconstructResult, SqlStruct};

pub struct Select<'a> {
    pub conn: &'a mut Connection,

    /// How to order the results.
    pub order: Option<OrderBy>,
}

#[derive(Clone, Copy, Debug)]
pub enum OrderBy {
    /// Highest results are listed first.
    Descending(&'static str),
}

/// Lays out the `SELECT` statement needed to reconstruct `T`.
pub fn build_statement<T: SqlStruct>(order: Option<OrderBy>) -> String {
    // figure out which expressions are needed in order to reconstruct T
    let select_exprs = T::select_exprs().join(",\n    ");

    // deduplicate all tables, keeping the order they were declared in
    let joins = T::required_joins();
    let mut tables: Vec<&str> = Vec::new();
    for table in T::required_tables() {
        // table doesn't need to be in FROM if it's joined already
        if !tables.contains(&table) && !joins.iter().any(|join| join.table == table) {
            tables.push(table);
        }
    }
    let tables = tables.join(", ");

    let join_clauses = joins
        .iter()
        .map(|join| format!("LEFT OUTER JOIN {} ON ({})", join.table, join.on))
        .collect::<Vec<_>>()
        .join("\n");

    let order_by_clause = match order {
        Some(OrderBy::Descending(on)) => format!("ORDER BY {on} DESC"),
        None => String::new(),
    };

    formatdoc! {"
        SELECT
            {select_exprs}
        FROM {tables}
        {join_clauses}
        {order_by_clause}
    "}
}

impl Select<'_> {
    pub fn run<T: SqlStruct>(&mut self) -> ReconstructResult<Vec<T>> {
        let statement = build_statement::<T>(self.order);
        log::debug!("running query:\n{statement}");
        let mut statement = self.conn.prepare(&statement)?;

        // run it and convert each row to the target
        let iter = statement.query_map((), |row| {
            // build a proper iterator from the row
            let expr_count = T::select_exprs().len();
            let row = (0..expr_count).map(|idx| row.get_ref(idx));

            // collect into a result first, to catch any errors
            let row: Result<Vec<_>, _> = row.collect();
            let row = row?.into_iter();

            Ok(T::from_row(row))
        })?;

        // collapse all errors (they could be from rusqlite or reconstruction)
        let result: Result<Result<_, _>, _> = iter.collect();
        result?
    }
}
