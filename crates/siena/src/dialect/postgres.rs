//! PostgreSQL dialect.

use std::collections::HashMap;

use super::{ConcatStyle, Dialect, FunctionName, FunctionRenderer};
use crate::error::QueryResult;
use crate::expr::function::FunctionCall;
use crate::expr::SqlWriter;
use crate::scope::Scope;

/// PostgreSQL: `$n` placeholders, `limit`/`offset` row limiting, and
/// rewritten renderings for functions Postgres spells differently.
pub struct PostgresDialect {
    functions: HashMap<FunctionName, Box<dyn FunctionRenderer>>,
}

impl PostgresDialect {
    pub fn new() -> Self {
        let mut functions: HashMap<FunctionName, Box<dyn FunctionRenderer>> = HashMap::new();
        functions.insert(FunctionName("year"), Box::new(Extract { part: "year" }));
        functions.insert(FunctionName("month"), Box::new(Extract { part: "month" }));
        functions.insert(FunctionName("day"), Box::new(Extract { part: "day" }));
        functions.insert(FunctionName("count_big"), Box::new(CountBigAsCast));
        functions.insert(FunctionName("instr"), Box::new(Position));
        functions.insert(FunctionName("json_object"), Box::new(JsonBuildObject { name: "json_build_object" }));
        functions.insert(FunctionName("jsonb_object"), Box::new(JsonBuildObject { name: "jsonb_build_object" }));
        Self { functions }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn function(&self, name: FunctionName) -> Option<&dyn FunctionRenderer> {
        self.functions.get(&name).map(Box::as_ref)
    }

    fn concat_style(&self) -> ConcatStyle {
        ConcatStyle::Operator
    }

    fn fetch_clause(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        let mut clause = String::new();
        if let Some(limit) = limit {
            clause.push_str(&format!(" limit {limit}"));
        }
        if let Some(offset) = offset {
            clause.push_str(&format!(" offset {offset}"));
        }
        clause
    }
}

/// `year(x)` -> `extract(year from x)`.
struct Extract {
    part: &'static str,
}

impl FunctionRenderer for Extract {
    fn render(
        &self,
        call: &FunctionCall,
        scope: &Scope<'_>,
        w: &mut SqlWriter<'_>,
    ) -> QueryResult<()> {
        w.push("extract(");
        w.push(self.part);
        w.push(" from ");
        call.render_arg(0, scope, w)?;
        w.push(")");
        Ok(())
    }
}

/// Postgres has no `count_big`; widen an ordinary count instead.
struct CountBigAsCast;

impl FunctionRenderer for CountBigAsCast {
    fn render(
        &self,
        call: &FunctionCall,
        scope: &Scope<'_>,
        w: &mut SqlWriter<'_>,
    ) -> QueryResult<()> {
        w.push("cast(count(");
        call.render_arg_list(scope, w)?;
        w.push(") as bigint)");
        Ok(())
    }
}

/// `instr(string, substring)` -> `position(substring in string)`.
///
/// The arguments swap order, which also swaps bind order; rendering through
/// the writer keeps text and binds consistent.
struct Position;

impl FunctionRenderer for Position {
    fn render(
        &self,
        call: &FunctionCall,
        scope: &Scope<'_>,
        w: &mut SqlWriter<'_>,
    ) -> QueryResult<()> {
        w.push("position(");
        call.render_arg(1, scope, w)?;
        w.push(" in ");
        call.render_arg(0, scope, w)?;
        w.push(")");
        Ok(())
    }
}

/// ANSI `json_object(key k value v, ...)` -> `json_build_object(k, v, ...)`.
struct JsonBuildObject {
    name: &'static str,
}

impl FunctionRenderer for JsonBuildObject {
    fn render(
        &self,
        call: &FunctionCall,
        scope: &Scope<'_>,
        w: &mut SqlWriter<'_>,
    ) -> QueryResult<()> {
        w.push(self.name);
        w.push("(");
        call.render_arg_list(scope, w)?;
        w.push(")");
        Ok(())
    }
}
