//! Derive macros for siena
//!
//! Provides `#[derive(Table)]`, which turns a plain struct into a table
//! descriptor: the `Table`, `FromRow` and `ToRow` impls plus one typed
//! `Column` constant per field.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod table;

/// Derive the table descriptor for a row struct.
///
/// # Example
///
/// ```ignore
/// use siena::Table;
///
/// #[derive(Table)]
/// #[table(name = "WIDGET", schema = "STORE")]
/// struct Widget {
///     widget_id: i64,
///     name: String,
///     #[table(column = "DESCR")]
///     description: Option<String>,
/// }
/// ```
///
/// # Generated
///
/// - `impl siena::Table` - schema/table names, column list, aliased-row
///   mapping
/// - `impl siena::FromRow` - mapping from plain column labels
/// - `impl siena::ToRow` - column values for INSERT
/// - `Widget::WIDGET_ID`, `Widget::NAME`, ... - typed `Column` constants
///   (`Option<T>` fields produce `Column<T, _>`)
///
/// # Attributes
///
/// - `#[table(name = "T")]` - table name (defaults to the struct name in
///   upper snake case)
/// - `#[table(schema = "S")]` - schema name (defaults to none)
/// - `#[table(column = "C")]` - per-field column name override (defaults to
///   the field name in upper snake case)
#[proc_macro_derive(Table, attributes(table))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    table::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
