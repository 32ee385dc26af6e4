//! The UPDATE statement model the planner works on.
//!
//! `sqlparser`'s `Statement::Update` carries no ORDER BY or LIMIT, both of
//! which MySQL accepts on single-table updates and which decide whether an
//! owned vindex may be rewritten. [`UpdateStatement`] keeps the parser's AST
//! pieces and adds those two clauses, along with the extra targets of MySQL's
//! comma-separated multi-table form.

use std::fmt;
use std::ops::ControlFlow;

use sqlparser::ast::{
    Assignment, Expr, OrderByExpr, Statement, TableWithJoins, UpdateTableFromKind,
    Value as SqlValue, visit_expressions_mut,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;
use vgate_result::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: TableWithJoins,
    /// Further targets of `update a, b set ...`.
    pub extra_tables: Vec<TableWithJoins>,
    pub assignments: Vec<Assignment>,
    /// Tables listed in `UPDATE ... FROM`.
    pub from: Vec<TableWithJoins>,
    pub selection: Option<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<Expr>,
}

impl UpdateStatement {
    pub fn new(table: TableWithJoins, assignments: Vec<Assignment>) -> Self {
        Self {
            table,
            extra_tables: Vec::new(),
            assignments,
            from: Vec::new(),
            selection: None,
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Parse a single MySQL UPDATE: one or more comma-separated targets, the
    /// SET list, and optional WHERE, ORDER BY and LIMIT.
    pub fn parse(sql: &str) -> Result<Self> {
        let dialect = MySqlDialect {};
        let mut parser = Parser::new(&dialect).try_with_sql(sql)?;
        if !parser.parse_keyword(Keyword::UPDATE) {
            let statement = parser.parse_statement()?;
            return Err(Error::InvalidArgumentError(format!(
                "expected an UPDATE statement, got: {statement}"
            )));
        }

        let mut tables = parser
            .parse_comma_separated(Parser::parse_table_and_joins)?
            .into_iter();
        let table = tables
            .next()
            .ok_or_else(|| Error::Internal("UPDATE without a target table".into()))?;
        let mut update = Self::new(table, Vec::new());
        update.extra_tables = tables.collect();

        parser.expect_keyword(Keyword::SET)?;
        update.assignments = parser.parse_comma_separated(Parser::parse_assignment)?;
        if parser.parse_keyword(Keyword::WHERE) {
            update.selection = Some(parser.parse_expr()?);
        }
        if parser.parse_keywords(&[Keyword::ORDER, Keyword::BY]) {
            update.order_by = parser.parse_comma_separated(Parser::parse_order_by_expr)?;
        }
        if parser.parse_keyword(Keyword::LIMIT) {
            update.limit = Some(parser.parse_expr()?);
        }
        while parser.consume_token(&Token::SemiColon) {}
        let next = parser.peek_token();
        if next.token != Token::EOF {
            return Err(Error::InvalidArgumentError(format!(
                "expected a single UPDATE statement, found trailing {}",
                next.token
            )));
        }
        Ok(update)
    }

    pub fn with_selection(mut self, selection: Expr) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_order_by(mut self, order_by: Vec<OrderByExpr>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_limit(mut self, limit: Expr) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Every table reference the statement writes or reads at top level.
    pub fn table_refs(&self) -> impl Iterator<Item = &TableWithJoins> {
        std::iter::once(&self.table)
            .chain(self.extra_tables.iter())
            .chain(self.from.iter())
    }

    /// A copy with every positional `?` renamed `:v1`, `:v2`, ... in the order
    /// they appear in the statement text, so each binds its own variable.
    pub fn with_numbered_placeholders(&self) -> Self {
        let mut numbered = self.clone();
        let mut count = 0usize;
        let mut rename = |expr: &mut Expr| {
            if let Expr::Value(value) = expr
                && let SqlValue::Placeholder(name) = &mut value.value
                && name.as_str() == "?"
            {
                count += 1;
                *name = format!(":v{count}");
            }
            ControlFlow::<()>::Continue(())
        };
        let _ = visit_expressions_mut(&mut numbered.table, &mut rename);
        let _ = visit_expressions_mut(&mut numbered.extra_tables, &mut rename);
        let _ = visit_expressions_mut(&mut numbered.assignments, &mut rename);
        let _ = visit_expressions_mut(&mut numbered.from, &mut rename);
        let _ = visit_expressions_mut(&mut numbered.selection, &mut rename);
        let _ = visit_expressions_mut(&mut numbered.order_by, &mut rename);
        let _ = visit_expressions_mut(&mut numbered.limit, &mut rename);
        numbered
    }
}

impl TryFrom<&Statement> for UpdateStatement {
    type Error = Error;

    fn try_from(statement: &Statement) -> Result<Self> {
        let Statement::Update {
            table,
            assignments,
            from,
            selection,
            returning,
            ..
        } = statement
        else {
            return Err(Error::InvalidArgumentError(format!(
                "expected an UPDATE statement, got: {statement}"
            )));
        };
        if returning.is_some() {
            return Err(Error::unsupported("UPDATE ... RETURNING"));
        }
        let from = match from {
            Some(UpdateTableFromKind::BeforeSet(tables))
            | Some(UpdateTableFromKind::AfterSet(tables)) => tables.clone(),
            None => Vec::new(),
        };
        Ok(Self {
            table: table.clone(),
            extra_tables: Vec::new(),
            assignments: assignments.clone(),
            from,
            selection: selection.clone(),
            order_by: Vec::new(),
            limit: None,
        })
    }
}

impl fmt::Display for UpdateStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "update {}", self.table)?;
        for table in &self.extra_tables {
            write!(f, ", {table}")?;
        }
        f.write_str(" set ")?;
        write_comma_separated(f, &self.assignments)?;
        if !self.from.is_empty() {
            f.write_str(" from ")?;
            write_comma_separated(f, &self.from)?;
        }
        write_tail(f, self.selection.as_ref(), &self.order_by, self.limit.as_ref())
    }
}

pub(crate) fn write_comma_separated<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// ` where ..`, ` order by ..` and ` limit ..`, each only when present.
pub(crate) fn write_tail(
    f: &mut fmt::Formatter<'_>,
    selection: Option<&Expr>,
    order_by: &[OrderByExpr],
    limit: Option<&Expr>,
) -> fmt::Result {
    if let Some(selection) = selection {
        write!(f, " where {selection}")?;
    }
    if !order_by.is_empty() {
        f.write_str(" order by ")?;
        write_comma_separated(f, order_by)?;
    }
    if let Some(limit) = limit {
        write!(f, " limit {limit}")?;
    }
    Ok(())
}
