//! Statement-level rendering tests.

use crate::prelude::*;
use crate::stmt::select::exists_where;
use crate::QueryError;

#[derive(Debug, Clone, PartialEq, Table)]
#[table(name = "WIDGET", schema = "STORE")]
struct Widget {
    widget_id: i64,
    name: String,
    description: Option<String>,
    manufacturer_id: i64,
}

#[derive(Debug, Clone, PartialEq, Table)]
#[table(name = "MANUFACTURER", schema = "STORE")]
struct Manufacturer {
    manufacturer_id: i64,
    name: String,
}

fn widget_row() -> Row {
    Row::new(
        vec![
            "w_WIDGET_ID".to_string(),
            "w_NAME".to_string(),
            "w_DESCRIPTION".to_string(),
            "w_MANUFACTURER_ID".to_string(),
        ],
        vec![
            SqlValue::BigInt(42),
            SqlValue::Text("Fred".to_string()),
            SqlValue::Null,
            SqlValue::BigInt(4002),
        ],
    )
    .unwrap()
}

#[test]
fn derive_generates_table_metadata() {
    assert_eq!(Widget::SCHEMA, "STORE");
    assert_eq!(Widget::NAME, "WIDGET");
    assert_eq!(
        Widget::COLUMNS,
        &["WIDGET_ID", "NAME", "DESCRIPTION", "MANUFACTURER_ID"]
    );
    assert_eq!(Widget::qualified_name(), "STORE.WIDGET");
    assert_eq!(Widget::MANUFACTURER_ID.name(), "MANUFACTURER_ID");
}

#[test]
fn derive_generates_aliased_row_mapping() {
    let widget = Widget::from_aliased_row(&widget_row(), "w").unwrap();
    assert_eq!(
        widget,
        Widget {
            widget_id: 42,
            name: "Fred".to_string(),
            description: None,
            manufacturer_id: 4002,
        }
    );
}

#[test]
fn count_with_where_clause() {
    let db = Database::new();
    let prepared = db
        .from::<Widget>("w")
        .select(count())
        .where_(Widget::MANUFACTURER_ID)
        .is_equal_to(4002i64)
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select count(*) as n from STORE.WIDGET w where w.MANUFACTURER_ID = ?"
    );
    assert_eq!(prepared.args, vec![SqlValue::BigInt(4002)]);
}

#[test]
fn count_distinct_with_where_clause() {
    let db = Database::new();
    let prepared = db
        .from::<Widget>("w")
        .select(count_distinct(Widget::NAME).as_("n"))
        .where_(Widget::MANUFACTURER_ID)
        .is_equal_to(4002i64)
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select count(distinct w.NAME) as n from STORE.WIDGET w where w.MANUFACTURER_ID = ?"
    );
    assert_eq!(prepared.args, vec![SqlValue::BigInt(4002)]);
}

#[test]
fn coalesce_renders_terms_with_trailing_bind() {
    let db = Database::new();
    let prepared = db
        .from::<Widget>("w")
        .select(coalesce(Widget::NAME).or_else(Widget::DESCRIPTION).or_else("Bob").as_("name"))
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select coalesce(w.NAME, w.DESCRIPTION, ?) as name from STORE.WIDGET w"
    );
    assert_eq!(prepared.args, vec![SqlValue::Text("Bob".to_string())]);
}

#[test]
fn whole_row_projection_lists_every_column() {
    let db = Database::new();
    let prepared = db.from::<Widget>("w").prepare().unwrap();
    assert_eq!(
        prepared.sql,
        "select w.WIDGET_ID as w_WIDGET_ID, w.NAME as w_NAME, \
         w.DESCRIPTION as w_DESCRIPTION, w.MANUFACTURER_ID as w_MANUFACTURER_ID \
         from STORE.WIDGET w"
    );
    let widget = (prepared.row_mapper)(&widget_row()).unwrap();
    assert_eq!(widget.name, "Fred");
    assert_eq!(widget.description, None);
}

#[test]
fn where_or_and_binds_and_to_last_or_operand() {
    let db = Database::new();
    let prepared = db
        .from::<Widget>("w")
        .select(count())
        .where_(Widget::NAME)
        .is_equal_to("a")
        .or(Widget::NAME)
        .is_equal_to("b")
        .and(Widget::MANUFACTURER_ID)
        .is_equal_to(1i64)
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select count(*) as n from STORE.WIDGET w \
         where w.NAME = ? or w.NAME = ? and w.MANUFACTURER_ID = ?"
    );
    assert_eq!(
        prepared.args,
        vec![
            SqlValue::Text("a".to_string()),
            SqlValue::Text("b".to_string()),
            SqlValue::BigInt(1)
        ]
    );
}

#[test]
fn two_or_chains_combined_with_and_get_parenthesised() {
    let db = Database::new();
    let first = cond(Widget::NAME)
        .is_equal_to("a")
        .unwrap()
        .or(cond(Widget::NAME).is_equal_to("b").unwrap())
        .or(cond(Widget::NAME).is_equal_to("c").unwrap());
    let second = cond(Widget::MANUFACTURER_ID)
        .is_equal_to(1i64)
        .unwrap()
        .or(cond(Widget::MANUFACTURER_ID).is_equal_to(2i64).unwrap());
    let prepared = db
        .from::<Widget>("w")
        .select(count())
        .where_expr(first)
        .and_expr(second)
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select count(*) as n from STORE.WIDGET w \
         where (w.NAME = ? or w.NAME = ? or w.NAME = ?) \
         and (w.MANUFACTURER_ID = ? or w.MANUFACTURER_ID = ?)"
    );
    assert_eq!(prepared.args.len(), 5);
}

#[test]
fn join_renders_on_condition() {
    let db = Database::new();
    let prepared = db
        .from::<Widget>("w")
        .join::<Manufacturer>("m")
        .on(Manufacturer::MANUFACTURER_ID)
        .is_equal_to(Widget::MANUFACTURER_ID)
        .select((Widget::NAME, Manufacturer::NAME))
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select w.NAME as w_NAME, m.NAME as m_NAME \
         from STORE.WIDGET w \
         join STORE.MANUFACTURER m on m.MANUFACTURER_ID = w.MANUFACTURER_ID"
    );
}

#[test]
fn left_join_keyword() {
    let db = Database::new();
    let sql = db
        .from::<Widget>("w")
        .left_join::<Manufacturer>("m")
        .on(Manufacturer::MANUFACTURER_ID)
        .is_equal_to(Widget::MANUFACTURER_ID)
        .select(count())
        .to_sql()
        .unwrap();
    assert!(sql.contains("left join STORE.MANUFACTURER m on"), "{sql}");
}

#[test]
fn self_join_requires_alias_qualification() {
    let db = Database::new();
    let ambiguous = db
        .from::<Widget>("w1")
        .join::<Widget>("w2")
        .on(Widget::WIDGET_ID.aliased("w2"))
        .is_equal_to(Widget::WIDGET_ID.aliased("w1"))
        .select(count())
        .where_(Widget::NAME)
        .is_equal_to("x")
        .prepare();
    assert!(matches!(ambiguous, Err(QueryError::AmbiguousAlias(_))));

    let qualified = db
        .from::<Widget>("w1")
        .join::<Widget>("w2")
        .on(Widget::WIDGET_ID.aliased("w2"))
        .is_equal_to(Widget::WIDGET_ID.aliased("w1"))
        .select(count())
        .where_(Widget::NAME.aliased("w2"))
        .is_equal_to("x")
        .prepare()
        .unwrap();
    assert_eq!(
        qualified.sql,
        "select count(*) as n from STORE.WIDGET w1 \
         join STORE.WIDGET w2 on w2.WIDGET_ID = w1.WIDGET_ID \
         where w2.NAME = ?"
    );
}

#[test]
fn missing_alias_is_a_render_time_error() {
    let db = Database::new();
    let result = db
        .from::<Widget>("w")
        .select(count())
        .where_(Manufacturer::NAME)
        .is_equal_to("Acme")
        .prepare();
    assert!(matches!(result, Err(QueryError::NoSuchAlias(_))));
}

#[test]
fn group_by_having_order_by_and_row_limits() {
    let db = Database::new();
    let prepared = db
        .from::<Widget>("w")
        .select((Widget::MANUFACTURER_ID, count()))
        .group_by(Widget::MANUFACTURER_ID)
        .having(count())
        .is_greater_than(5i32)
        .order_by(Widget::MANUFACTURER_ID, Order::Asc)
        .limit(10)
        .offset(20)
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select w.MANUFACTURER_ID as w_MANUFACTURER_ID, count(*) as n \
         from STORE.WIDGET w \
         group by w.MANUFACTURER_ID \
         having count(*) > ? \
         order by w.MANUFACTURER_ID asc \
         offset 20 rows fetch first 10 rows only"
    );
    assert_eq!(prepared.args, vec![SqlValue::Integer(5)]);
}

#[test]
fn empty_in_list_surfaces_before_sql_is_produced() {
    let db = Database::new();
    let statement = db
        .from::<Widget>("w")
        .select(count())
        .where_(Widget::WIDGET_ID)
        .is_in(Vec::<i64>::new());
    let result = statement.prepare();
    assert!(matches!(result, Err(QueryError::InvalidArgument(_))));
}

#[test]
fn between_renders_bounds_in_order() {
    let db = Database::new();
    let prepared = db
        .from::<Widget>("w")
        .select(count())
        .where_(Widget::WIDGET_ID)
        .is_between(10i64)
        .and(20i64)
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select count(*) as n from STORE.WIDGET w where w.WIDGET_ID between ? and ?"
    );
    assert_eq!(prepared.args, vec![SqlValue::BigInt(10), SqlValue::BigInt(20)]);
}

#[test]
fn rendering_is_deterministic_across_prepares() {
    let db = Database::new();
    let statement = db
        .from::<Widget>("w")
        .select((max(Widget::WIDGET_ID), cast(Widget::MANUFACTURER_ID).as_varchar(20)))
        .where_(Widget::NAME)
        .is_equal_to("x");
    let first = statement.prepare().unwrap();
    let second = statement.prepare().unwrap();
    assert_eq!(first.sql, second.sql);
    assert_eq!(first.args, second.args);
}

#[test]
fn placeholder_count_always_matches_arg_count() {
    let db = Database::new();
    let prepared = db
        .from::<Widget>("w")
        .select(count())
        .where_(Widget::NAME)
        .is_like("F%")
        .and(Widget::WIDGET_ID)
        .is_in([1i64, 2, 3])
        .or(Widget::DESCRIPTION)
        .is_not_null()
        .prepare()
        .unwrap();
    assert_eq!(prepared.sql.matches('?').count(), prepared.args.len());
}

#[test]
fn tuple_projection_maps_rows_positionally() {
    let db = Database::new();
    let prepared = db
        .from::<Widget>("w")
        .select((Widget::NAME, Widget::DESCRIPTION.optional(), Widget::WIDGET_ID))
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select w.NAME as w_NAME, w.DESCRIPTION as w_DESCRIPTION, \
         w.WIDGET_ID as w_WIDGET_ID from STORE.WIDGET w"
    );
    let row = Row::new(
        vec![
            "w_NAME".to_string(),
            "w_DESCRIPTION".to_string(),
            "w_WIDGET_ID".to_string(),
        ],
        vec![
            SqlValue::Text("Fred".to_string()),
            SqlValue::Null,
            SqlValue::BigInt(7),
        ],
    )
    .unwrap();
    let mapped = (prepared.row_mapper)(&row).unwrap();
    assert_eq!(mapped, ("Fred".to_string(), None, 7));
}

#[test]
fn in_select_renders_subquery() {
    let db = Database::new();
    let sub = db
        .from::<Manufacturer>("m")
        .select(Manufacturer::MANUFACTURER_ID)
        .where_(Manufacturer::NAME)
        .is_equal_to("Acme");
    let prepared = db
        .from::<Widget>("w")
        .select(count())
        .where_(Widget::MANUFACTURER_ID)
        .is_in_select(sub)
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select count(*) as n from STORE.WIDGET w \
         where w.MANUFACTURER_ID in \
         (select m.MANUFACTURER_ID as m_MANUFACTURER_ID from STORE.MANUFACTURER m \
         where m.NAME = ?)"
    );
    assert_eq!(prepared.args, vec![SqlValue::Text("Acme".to_string())]);
}

#[test]
fn exists_subquery_resolves_correlated_columns_outward() {
    let db = Database::new();
    let sub = db
        .from::<Manufacturer>("m")
        .select(count())
        .where_(Manufacturer::MANUFACTURER_ID)
        .is_equal_to(Widget::MANUFACTURER_ID);
    let prepared = db
        .from::<Widget>("w")
        .select(count())
        .where_expr(exists_where(sub))
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select count(*) as n from STORE.WIDGET w \
         where exists (select count(*) as n from STORE.MANUFACTURER m \
         where m.MANUFACTURER_ID = w.MANUFACTURER_ID)"
    );
}

#[test]
fn scalar_subquery_as_expression() {
    let db = Database::new();
    let sub = db
        .from::<Manufacturer>("m")
        .select(max(Manufacturer::MANUFACTURER_ID));
    let prepared = db
        .from::<Widget>("w")
        .select(count())
        .where_(Widget::MANUFACTURER_ID)
        .is_equal_to(sub.as_expr())
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select count(*) as n from STORE.WIDGET w \
         where w.MANUFACTURER_ID = \
         (select max(m.MANUFACTURER_ID) as max_m_MANUFACTURER_ID from STORE.MANUFACTURER m)"
    );
}

#[test]
fn postgres_dialect_numbers_placeholders_and_limits() {
    let db = Database::with_dialect(PostgresDialect::new());
    let prepared = db
        .from::<Widget>("w")
        .select(count())
        .where_(Widget::NAME)
        .is_equal_to("a")
        .and(Widget::MANUFACTURER_ID)
        .is_equal_to(1i64)
        .limit(10)
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select count(*) as n from STORE.WIDGET w \
         where w.NAME = $1 and w.MANUFACTURER_ID = $2 limit 10"
    );
    assert_eq!(
        prepared.args,
        vec![SqlValue::Text("a".to_string()), SqlValue::BigInt(1)]
    );
}

#[test]
fn update_renders_set_and_where() {
    let db = Database::new();
    let (sql, args) = db
        .update::<Widget>("w")
        .set(Widget::NAME, "Renamed")
        .set(
            Widget::MANUFACTURER_ID,
            Widget::MANUFACTURER_ID.into_expr().plus(1i64),
        )
        .where_(Widget::WIDGET_ID)
        .is_equal_to(42i64)
        .prepare()
        .unwrap();
    assert_eq!(
        sql,
        "update STORE.WIDGET as w \
         set NAME = ?, MANUFACTURER_ID = w.MANUFACTURER_ID + ? \
         where w.WIDGET_ID = ?"
    );
    assert_eq!(
        args,
        vec![
            SqlValue::Text("Renamed".to_string()),
            SqlValue::BigInt(1),
            SqlValue::BigInt(42)
        ]
    );
}

#[test]
fn update_without_set_is_refused() {
    let db = Database::new();
    let result = db.update::<Widget>("w").prepare();
    assert!(matches!(result, Err(QueryError::Validation(_))));
}

#[test]
fn delete_requires_where_or_explicit_all_rows() {
    let db = Database::new();
    let refused = db.delete_from::<Widget>("w").prepare();
    assert!(matches!(refused, Err(QueryError::Validation(_))));

    let (sql, args) = db.delete_from::<Widget>("w").all_rows().prepare().unwrap();
    assert_eq!(sql, "delete from STORE.WIDGET w");
    assert!(args.is_empty());

    let (sql, args) = db
        .delete_from::<Widget>("w")
        .where_(Widget::WIDGET_ID)
        .is_equal_to(42i64)
        .prepare()
        .unwrap();
    assert_eq!(sql, "delete from STORE.WIDGET w where w.WIDGET_ID = ?");
    assert_eq!(args, vec![SqlValue::BigInt(42)]);
}

#[test]
fn insert_from_set_pairs() {
    let db = Database::new();
    let (sql, args) = db
        .insert_into::<Widget>()
        .set(Widget::NAME, "Gizmo")
        .set(Widget::MANUFACTURER_ID, 4002i64)
        .prepare()
        .unwrap();
    assert_eq!(sql, "insert into STORE.WIDGET (NAME, MANUFACTURER_ID) values (?, ?)");
    assert_eq!(
        args,
        vec![SqlValue::Text("Gizmo".to_string()), SqlValue::BigInt(4002)]
    );
}

#[test]
fn insert_whole_rows() {
    let db = Database::new();
    let widget = Widget {
        widget_id: 1,
        name: "Gizmo".to_string(),
        description: None,
        manufacturer_id: 4002,
    };
    let other = Widget {
        widget_id: 2,
        name: "Sprocket".to_string(),
        description: Some("spare".to_string()),
        manufacturer_id: 4002,
    };
    let (sql, args) = db
        .insert_into::<Widget>()
        .row(&widget)
        .row(&other)
        .prepare()
        .unwrap();
    assert_eq!(
        sql,
        "insert into STORE.WIDGET (WIDGET_ID, NAME, DESCRIPTION, MANUFACTURER_ID) \
         values (?, ?, ?, ?), (?, ?, ?, ?)"
    );
    assert_eq!(args.len(), 8);
    assert_eq!(args[2], SqlValue::Null);
    assert_eq!(args[6], SqlValue::Text("spare".to_string()));
}

#[test]
fn case_expression_in_projection() {
    let db = Database::new();
    let status = case(cond(Widget::DESCRIPTION).is_null().unwrap())
        .then("bare")
        .or_else("described");
    let prepared = db
        .from::<Widget>("w")
        .select(status.as_("status"))
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select case when w.DESCRIPTION is null then ? else ? end as status \
         from STORE.WIDGET w"
    );
    assert_eq!(
        prepared.args,
        vec![
            SqlValue::Text("bare".to_string()),
            SqlValue::Text("described".to_string())
        ]
    );
}

#[test]
fn arithmetic_in_projection_keeps_arg_order() {
    let db = Database::new();
    // A chain renders its terms flat, in encounter order; grouping comes
    // from operand wrapping, not from re-parenthesising the chain itself.
    let prepared = db
        .from::<Widget>("w")
        .select(
            Widget::WIDGET_ID
                .into_expr()
                .plus(1i64)
                .times(Widget::MANUFACTURER_ID)
                .as_("calc"),
        )
        .prepare()
        .unwrap();
    assert_eq!(
        prepared.sql,
        "select w.WIDGET_ID + ? * w.MANUFACTURER_ID as calc from STORE.WIDGET w"
    );
    assert_eq!(prepared.args, vec![SqlValue::BigInt(1)]);
}
