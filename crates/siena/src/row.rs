//! Result rows and row-mapping.

use crate::error::{QueryError, QueryResult};
use crate::value::{FromValue, SqlValue};

/// One decoded result row: projection labels paired with their values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    labels: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Create a row from parallel label/value lists.
    pub fn new(labels: Vec<String>, values: Vec<SqlValue>) -> QueryResult<Self> {
        if labels.len() != values.len() {
            return Err(QueryError::invalid_argument(format!(
                "row has {} labels but {} values",
                labels.len(),
                values.len()
            )));
        }
        Ok(Self { labels, values })
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The projection labels, in column order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn index_of(&self, label: &str) -> Option<usize> {
        self.labels
            .iter()
            .position(|l| l == label)
            .or_else(|| self.labels.iter().position(|l| l.eq_ignore_ascii_case(label)))
    }

    /// Get a raw value by label.
    pub fn value(&self, label: &str) -> QueryResult<&SqlValue> {
        self.index_of(label)
            .map(|i| &self.values[i])
            .ok_or_else(|| QueryError::decode(label, "no such column in row"))
    }

    /// Get a typed value by label.
    pub fn get<T: FromValue>(&self, label: &str) -> QueryResult<T> {
        T::from_value(self.value(label)?, label)
    }

    /// Get a typed value by zero-based position.
    pub fn get_at<T: FromValue>(&self, index: usize) -> QueryResult<T> {
        let value = self
            .values
            .get(index)
            .ok_or_else(|| QueryError::decode(index.to_string(), "no such column in row"))?;
        T::from_value(value, &self.labels[index])
    }
}

/// A function converting one result row into a typed value.
pub type RowMapper<T> = Box<dyn Fn(&Row) -> QueryResult<T> + Send + Sync>;

/// A factory producing a [`RowMapper`] for a given column label.
///
/// Expressions resolve a factory once per statement; the factory is then
/// asked for a mapper either under the expression's default label or under an
/// explicit projection label.
pub struct RowMapperFactory<T> {
    make: Box<dyn Fn(Option<&str>) -> RowMapper<T> + Send + Sync>,
}

impl<T> RowMapperFactory<T> {
    /// Create a factory from a closure.
    pub fn new(make: impl Fn(Option<&str>) -> RowMapper<T> + Send + Sync + 'static) -> Self {
        Self { make: Box::new(make) }
    }

    /// Produce a mapper, overriding the default label if one is given.
    pub fn row_mapper(&self, label: Option<&str>) -> RowMapper<T> {
        (self.make)(label)
    }
}

impl<T: FromValue + Send + Sync + 'static> RowMapperFactory<T> {
    /// Factory extracting a single column under `default_label`.
    pub fn for_label(default_label: String) -> Self {
        Self::new(move |label| {
            let label = label.unwrap_or(&default_label).to_string();
            Box::new(move |row| row.get::<T>(&label))
        })
    }
}

/// Mapping of a whole result row into a typed value.
pub trait FromRow: Sized {
    /// Map a row whose labels are plain column names.
    fn from_row(row: &Row) -> QueryResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> Row {
        Row::new(
            vec!["w_NAME".to_string(), "n".to_string()],
            vec![SqlValue::Text("Fred".to_string()), SqlValue::BigInt(3)],
        )
        .unwrap()
    }

    #[test]
    fn get_by_label() {
        let row = sample_row();
        assert_eq!(row.get::<String>("w_NAME").unwrap(), "Fred");
        assert_eq!(row.get::<i64>("n").unwrap(), 3);
    }

    #[test]
    fn label_lookup_is_case_insensitive_on_fallback() {
        let row = sample_row();
        assert_eq!(row.get::<String>("w_name").unwrap(), "Fred");
    }

    #[test]
    fn missing_column_is_a_decode_error() {
        let row = sample_row();
        assert!(matches!(
            row.get::<String>("absent"),
            Err(QueryError::Decode { .. })
        ));
    }

    #[test]
    fn mapper_factory_honours_label_override() {
        let factory = RowMapperFactory::<i64>::for_label("other".to_string());
        let mapper = factory.row_mapper(Some("n"));
        assert_eq!(mapper(&sample_row()).unwrap(), 3);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        assert!(Row::new(vec!["a".to_string()], vec![]).is_err());
    }
}
