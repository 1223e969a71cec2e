//! Typed attribute filters and their translation into SQL predicates.
//!
//! A filter is parsed from query parameters shaped like `<field>.<operator>=<value>`
//! (`title.contains=rust`, `id.in=1,2,3`, `dateOfPublication.greaterThan=2001-01-01`)
//! and turned into a list of [`Predicate`]s that are ANDed together and pushed onto a
//! [`sqlx::QueryBuilder`] with every value bound as a parameter.
//!
//! Branching follows one rule for every filter kind: `equals` wins over everything,
//! then `in`; otherwise every other clause that is present is ANDed.

use std::fmt::Debug;

use chrono::NaiveDate;
use sqlx::{Postgres, QueryBuilder};
use thiserror::Error;

/// Value bound into a query
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Text(String),
    Date(NaiveDate),
}

/// A type that can be filtered on
pub trait FilterValue: Clone + Debug + PartialEq + Sized {
    /// Parse a raw query value. `Ok(None)` means "no value given".
    fn parse_value(raw: &str) -> Result<Option<Self>, String>;

    fn to_param(&self) -> SqlParam;
}

macro_rules! parsed_filter_value {
    ($ty:ty, $variant:ident) => {
        impl FilterValue for $ty {
            fn parse_value(raw: &str) -> Result<Option<Self>, String> {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Ok(None);
                }
                raw.parse::<$ty>().map(Some).map_err(|e| e.to_string())
            }

            fn to_param(&self) -> SqlParam {
                SqlParam::$variant(*self)
            }
        }
    };
}

parsed_filter_value!(i32, Int);
parsed_filter_value!(i64, Long);
parsed_filter_value!(f32, Float);
parsed_filter_value!(f64, Double);
parsed_filter_value!(bool, Bool);

impl FilterValue for String {
    fn parse_value(raw: &str) -> Result<Option<Self>, String> {
        Ok(Some(raw.to_string()))
    }

    fn to_param(&self) -> SqlParam {
        SqlParam::Text(self.clone())
    }
}

impl FilterValue for NaiveDate {
    fn parse_value(raw: &str) -> Result<Option<Self>, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| e.to_string())
    }

    fn to_param(&self) -> SqlParam {
        SqlParam::Date(*self)
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("Invalid value '{value}' for {field}.{operator}: {reason}")]
pub struct FilterError {
    pub field: String,
    pub operator: String,
    pub value: String,
    pub reason: String,
}

/// Error raised by a filter before the field name is known
#[derive(Debug)]
pub struct InvalidValue {
    pub value: String,
    pub reason: String,
}

impl InvalidValue {
    pub fn on(self, field: &str, operator: &str) -> FilterError {
        FilterError {
            field: field.to_string(),
            operator: operator.to_string(),
            value: self.value,
            reason: self.reason,
        }
    }
}

fn parse_one<T: FilterValue>(raw: &str) -> Result<Option<T>, InvalidValue> {
    T::parse_value(raw).map_err(|reason| InvalidValue {
        value: raw.to_string(),
        reason,
    })
}

/// Comma separated values; repeated keys extend the list
fn parse_list<T: FilterValue>(raw: &str, into: &mut Option<Vec<T>>) -> Result<(), InvalidValue> {
    let list = into.get_or_insert_with(Vec::new);
    for part in raw.split(',') {
        if let Some(v) = parse_one::<T>(part)? {
            list.push(v);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => " = ",
            CompareOp::NotEq => " <> ",
            CompareOp::Gt => " > ",
            CompareOp::Gte => " >= ",
            CompareOp::Lt => " < ",
            CompareOp::Lte => " <= ",
        }
    }
}

/// Many-to-many link used by relation filters.
///
/// The filter is evaluated against `alias.target_key` for every link row of the
/// owner, or against NULL when the owner has no link (LEFT JOIN semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Join {
    pub table: &'static str,
    pub alias: &'static str,
    /// Link column pointing back at the owner row
    pub owner_key: &'static str,
    /// Qualified owner id column in the outer query
    pub owner_column: &'static str,
    /// Qualified link column the filter applies to
    pub target_column: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: &'static str,
        op: CompareOp,
        value: SqlParam,
    },
    In {
        column: &'static str,
        values: Vec<SqlParam>,
        negated: bool,
    },
    IsNull {
        column: &'static str,
        negated: bool,
    },
    /// Case-insensitive substring match
    Contains {
        column: &'static str,
        text: String,
        negated: bool,
    },
    Related {
        join: Join,
        predicates: Vec<Predicate>,
    },
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('%');
    for c in text.to_uppercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn push_param(qb: &mut QueryBuilder<'_, Postgres>, param: &SqlParam) {
    match param {
        SqlParam::Int(v) => {
            qb.push_bind(*v);
        }
        SqlParam::Long(v) => {
            qb.push_bind(*v);
        }
        SqlParam::Float(v) => {
            qb.push_bind(*v);
        }
        SqlParam::Double(v) => {
            qb.push_bind(*v);
        }
        SqlParam::Bool(v) => {
            qb.push_bind(*v);
        }
        SqlParam::Text(v) => {
            qb.push_bind(v.clone());
        }
        SqlParam::Date(v) => {
            qb.push_bind(*v);
        }
    }
}

impl Predicate {
    pub fn push_to(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Predicate::Compare { column, op, value } => {
                qb.push(*column).push(op.as_sql());
                push_param(qb, value);
            }
            Predicate::In {
                column,
                values,
                negated,
            } => {
                if values.is_empty() {
                    // IN () never matches, NOT IN () always does
                    qb.push(if *negated { "TRUE" } else { "FALSE" });
                    return;
                }
                if *negated {
                    qb.push("NOT (");
                }
                qb.push(*column).push(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        qb.push(", ");
                    }
                    push_param(qb, value);
                }
                qb.push(")");
                if *negated {
                    qb.push(")");
                }
            }
            Predicate::IsNull { column, negated } => {
                qb.push(*column);
                qb.push(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Predicate::Contains {
                column,
                text,
                negated,
            } => {
                if *negated {
                    qb.push("NOT (");
                }
                qb.push("UPPER(").push(*column).push(") LIKE ");
                qb.push_bind(escape_like(text));
                if *negated {
                    qb.push(")");
                }
            }
            Predicate::Related { join, predicates } => {
                qb.push("EXISTS (SELECT 1 FROM (SELECT 1) AS anchor LEFT JOIN ")
                    .push(join.table)
                    .push(" ")
                    .push(join.alias)
                    .push(" ON ")
                    .push(join.alias)
                    .push(".")
                    .push(join.owner_key)
                    .push(" = ")
                    .push(join.owner_column)
                    .push(" WHERE ");
                push_conjunction(qb, predicates);
                qb.push(")");
            }
        }
    }
}

fn push_conjunction(qb: &mut QueryBuilder<'_, Postgres>, predicates: &[Predicate]) {
    if predicates.is_empty() {
        qb.push("TRUE");
        return;
    }
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            qb.push(" AND ");
        }
        predicate.push_to(qb);
    }
}

/// Conjunction of predicates built from a criteria object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Specification {
    predicates: Vec<Predicate>,
}

impl Specification {
    pub fn new() -> Self {
        Self::default()
    }

    /// AND the predicates produced for `column` by `filter`, if present
    pub fn and<F: FieldFilter>(mut self, filter: &Option<F>, column: &'static str) -> Self {
        if let Some(filter) = filter {
            self.predicates.extend(filter.predicates(column));
        }
        self
    }

    /// AND a relation filter evaluated through `join`
    pub fn and_related<F: FieldFilter>(mut self, filter: &Option<F>, join: Join) -> Self {
        if let Some(filter) = filter {
            let predicates = filter.predicates(join.target_column);
            if !predicates.is_empty() {
                self.predicates.push(Predicate::Related { join, predicates });
            }
        }
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Push ` WHERE ...` (nothing when the specification is empty)
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if self.is_empty() {
            return;
        }
        qb.push(" WHERE ");
        push_conjunction(qb, &self.predicates);
    }
}

/// Filter on a single attribute
pub trait FieldFilter: Default + Clone + Debug + PartialEq {
    /// Apply `operator=raw`. Returns `Ok(false)` when the operator is unknown.
    fn apply(&mut self, operator: &str, raw: &str) -> Result<bool, InvalidValue>;

    fn predicates(&self, column: &'static str) -> Vec<Predicate>;
}

/// Basic filter: equality, set membership and presence
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<T> {
    pub equals: Option<T>,
    pub not_equals: Option<T>,
    pub specified: Option<bool>,
    pub in_list: Option<Vec<T>>,
    pub not_in_list: Option<Vec<T>>,
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self {
            equals: None,
            not_equals: None,
            specified: None,
            in_list: None,
            not_in_list: None,
        }
    }
}

impl<T: FilterValue> Filter<T> {
    fn apply_base(&mut self, operator: &str, raw: &str) -> Result<bool, InvalidValue> {
        match operator {
            "equals" => self.equals = parse_one(raw)?,
            "notEquals" => self.not_equals = parse_one(raw)?,
            "specified" => self.specified = parse_one(raw)?,
            "in" => parse_list(raw, &mut self.in_list)?,
            "notIn" => parse_list(raw, &mut self.not_in_list)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// `equals` and `in` replace every other clause
    fn exclusive(&self, column: &'static str) -> Option<Vec<Predicate>> {
        if let Some(ref v) = self.equals {
            return Some(vec![Predicate::Compare {
                column,
                op: CompareOp::Eq,
                value: v.to_param(),
            }]);
        }
        self.in_list.as_ref().map(|values| {
            vec![Predicate::In {
                column,
                values: values.iter().map(FilterValue::to_param).collect(),
                negated: false,
            }]
        })
    }

    fn push_common(&self, column: &'static str, out: &mut Vec<Predicate>) {
        if let Some(specified) = self.specified {
            out.push(Predicate::IsNull {
                column,
                negated: specified,
            });
        }
        if let Some(ref v) = self.not_equals {
            out.push(Predicate::Compare {
                column,
                op: CompareOp::NotEq,
                value: v.to_param(),
            });
        }
        if let Some(ref values) = self.not_in_list {
            out.push(Predicate::In {
                column,
                values: values.iter().map(FilterValue::to_param).collect(),
                negated: true,
            });
        }
    }
}

impl<T: FilterValue> FieldFilter for Filter<T> {
    fn apply(&mut self, operator: &str, raw: &str) -> Result<bool, InvalidValue> {
        self.apply_base(operator, raw)
    }

    fn predicates(&self, column: &'static str) -> Vec<Predicate> {
        if let Some(p) = self.exclusive(column) {
            return p;
        }
        let mut out = Vec::new();
        self.push_common(column, &mut out);
        out
    }
}

/// Filter for ordered attributes (numbers, dates)
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter<T> {
    pub filter: Filter<T>,
    pub greater_than: Option<T>,
    pub less_than: Option<T>,
    pub greater_than_or_equal: Option<T>,
    pub less_than_or_equal: Option<T>,
}

impl<T> Default for RangeFilter<T> {
    fn default() -> Self {
        Self {
            filter: Filter::default(),
            greater_than: None,
            less_than: None,
            greater_than_or_equal: None,
            less_than_or_equal: None,
        }
    }
}

impl<T: FilterValue + PartialOrd> FieldFilter for RangeFilter<T> {
    fn apply(&mut self, operator: &str, raw: &str) -> Result<bool, InvalidValue> {
        match operator {
            "greaterThan" => self.greater_than = parse_one(raw)?,
            "lessThan" => self.less_than = parse_one(raw)?,
            "greaterThanOrEqual" => self.greater_than_or_equal = parse_one(raw)?,
            "lessThanOrEqual" => self.less_than_or_equal = parse_one(raw)?,
            _ => return self.filter.apply_base(operator, raw),
        }
        Ok(true)
    }

    fn predicates(&self, column: &'static str) -> Vec<Predicate> {
        if let Some(p) = self.filter.exclusive(column) {
            return p;
        }
        let mut out = Vec::new();
        self.filter.push_common(column, &mut out);
        let bounds = [
            (&self.greater_than, CompareOp::Gt),
            (&self.greater_than_or_equal, CompareOp::Gte),
            (&self.less_than, CompareOp::Lt),
            (&self.less_than_or_equal, CompareOp::Lte),
        ];
        for (bound, op) in bounds {
            if let Some(v) = bound {
                out.push(Predicate::Compare {
                    column,
                    op,
                    value: v.to_param(),
                });
            }
        }
        out
    }
}

/// Filter for text attributes, adding case-insensitive substring matching
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringFilter {
    pub filter: Filter<String>,
    pub contains: Option<String>,
    pub does_not_contain: Option<String>,
}

impl FieldFilter for StringFilter {
    fn apply(&mut self, operator: &str, raw: &str) -> Result<bool, InvalidValue> {
        match operator {
            "contains" => self.contains = Some(raw.to_string()),
            "doesNotContain" => self.does_not_contain = Some(raw.to_string()),
            _ => return self.filter.apply_base(operator, raw),
        }
        Ok(true)
    }

    fn predicates(&self, column: &'static str) -> Vec<Predicate> {
        if let Some(p) = self.filter.exclusive(column) {
            return p;
        }
        let mut out = Vec::new();
        self.filter.push_common(column, &mut out);
        if let Some(ref text) = self.contains {
            out.push(Predicate::Contains {
                column,
                text: text.clone(),
                negated: false,
            });
        }
        if let Some(ref text) = self.does_not_contain {
            out.push(Predicate::Contains {
                column,
                text: text.clone(),
                negated: true,
            });
        }
        out
    }
}

pub type BooleanFilter = Filter<bool>;
pub type IntegerFilter = RangeFilter<i32>;
pub type LongFilter = RangeFilter<i64>;
pub type FloatFilter = RangeFilter<f32>;
pub type DoubleFilter = RangeFilter<f64>;
pub type LocalDateFilter = RangeFilter<NaiveDate>;

/// Apply `operator=raw` to an optional filter slot, creating the filter on demand.
///
/// The slot stays `None` when the operator is not one the filter knows.
pub fn apply_to_slot<F: FieldFilter>(
    slot: &mut Option<F>,
    field: &str,
    operator: &str,
    raw: &str,
) -> Result<bool, FilterError> {
    let mut filter = slot.take().unwrap_or_default();
    let applied = filter.apply(operator, raw).map_err(|e| e.on(field, operator));
    if filter != F::default() {
        *slot = Some(filter);
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(spec: &Specification) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM books b");
        spec.push_where(&mut qb);
        qb.sql().to_string()
    }

    fn long_filter(pairs: &[(&str, &str)]) -> LongFilter {
        let mut f = LongFilter::default();
        for (op, raw) in pairs {
            assert!(f.apply(op, raw).unwrap(), "unknown operator {op}");
        }
        f
    }

    #[test]
    fn test_equals_wins_over_other_clauses() {
        let f = long_filter(&[("greaterThan", "3"), ("equals", "7"), ("in", "1,2")]);
        assert_eq!(
            f.predicates("b.id"),
            vec![Predicate::Compare {
                column: "b.id",
                op: CompareOp::Eq,
                value: SqlParam::Long(7),
            }]
        );
    }

    #[test]
    fn test_in_wins_over_range_clauses() {
        let f = long_filter(&[("lessThan", "3"), ("in", "1,2"), ("in", "5")]);
        assert_eq!(
            f.predicates("b.id"),
            vec![Predicate::In {
                column: "b.id",
                values: vec![SqlParam::Long(1), SqlParam::Long(2), SqlParam::Long(5)],
                negated: false,
            }]
        );
    }

    #[test]
    fn test_range_clauses_are_anded() {
        let f = long_filter(&[
            ("specified", "true"),
            ("notEquals", "4"),
            ("greaterThan", "1"),
            ("lessThanOrEqual", "10"),
        ]);
        let spec = Specification::new().and(&Some(f), "b.id");
        assert_eq!(
            render(&spec),
            "SELECT * FROM books b WHERE b.id IS NOT NULL AND b.id <> $1 AND b.id > $2 AND b.id <= $3"
        );
    }

    #[test]
    fn test_specified_false_is_null_check() {
        let mut f = StringFilter::default();
        f.apply("specified", "false").unwrap();
        assert_eq!(
            f.predicates("b.publisher"),
            vec![Predicate::IsNull {
                column: "b.publisher",
                negated: false,
            }]
        );
    }

    #[test]
    fn test_string_contains_is_case_insensitive() {
        let mut f = StringFilter::default();
        f.apply("contains", "rust").unwrap();
        f.apply("doesNotContain", "go").unwrap();
        let spec = Specification::new().and(&Some(f), "b.title");
        assert_eq!(
            render(&spec),
            "SELECT * FROM books b WHERE UPPER(b.title) LIKE $1 AND NOT (UPPER(b.title) LIKE $2)"
        );
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(escape_like("50%_off"), "%50\\%\\_OFF%");
    }

    #[test]
    fn test_empty_in_lists() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        Predicate::In {
            column: "b.id",
            values: vec![],
            negated: false,
        }
        .push_to(&mut qb);
        qb.push(" | ");
        Predicate::In {
            column: "b.id",
            values: vec![],
            negated: true,
        }
        .push_to(&mut qb);
        assert_eq!(qb.sql(), "FALSE | TRUE");
    }

    #[test]
    fn test_not_in_renders_negated_list() {
        let f = long_filter(&[("notIn", "1,2")]);
        let spec = Specification::new().and(&Some(f), "b.id");
        assert_eq!(
            render(&spec),
            "SELECT * FROM books b WHERE NOT (b.id IN ($1, $2))"
        );
    }

    #[test]
    fn test_related_filter_uses_left_join_subquery() {
        let join = Join {
            table: "book_authors",
            alias: "ba",
            owner_key: "book_id",
            owner_column: "b.id",
            target_column: "ba.author_id",
        };
        let f = long_filter(&[("equals", "9")]);
        let spec = Specification::new().and_related(&Some(f), join);
        assert_eq!(
            render(&spec),
            "SELECT * FROM books b WHERE EXISTS (SELECT 1 FROM (SELECT 1) AS anchor \
             LEFT JOIN book_authors ba ON ba.book_id = b.id WHERE ba.author_id = $1)"
        );
    }

    #[test]
    fn test_empty_filter_contributes_nothing() {
        let spec = Specification::new()
            .and(&Some(StringFilter::default()), "b.title")
            .and::<LongFilter>(&None, "b.id");
        assert!(spec.is_empty());
        assert_eq!(render(&spec), "SELECT * FROM books b");
    }

    #[test]
    fn test_date_values_parse_iso_dates() {
        let mut f = LocalDateFilter::default();
        f.apply("greaterThanOrEqual", "1970-01-01").unwrap();
        assert_eq!(
            f.greater_than_or_equal,
            NaiveDate::from_ymd_opt(1970, 1, 1)
        );
        assert!(f.apply("lessThan", "01/02/1970").is_err());
    }

    #[test]
    fn test_other_value_types_parse() {
        let mut b = BooleanFilter::default();
        b.apply("equals", "true").unwrap();
        assert_eq!(b.equals, Some(true));

        let mut d = DoubleFilter::default();
        d.apply("lessThan", "2.5").unwrap();
        assert_eq!(d.less_than, Some(2.5));

        let mut i = IntegerFilter::default();
        i.apply("in", "1, 2,,3").unwrap();
        assert_eq!(i.filter.in_list, Some(vec![1, 2, 3]));

        let mut fl = FloatFilter::default();
        assert!(fl.apply("equals", "abc").is_err());
    }

    #[test]
    fn test_empty_value_is_ignored_for_non_text() {
        let mut slot: Option<LongFilter> = None;
        assert!(apply_to_slot(&mut slot, "id", "equals", "").unwrap());
        assert!(slot.is_none());
    }

    #[test]
    fn test_unknown_operator_is_not_applied() {
        let mut slot: Option<StringFilter> = None;
        assert!(!apply_to_slot(&mut slot, "title", "startsWith", "a").unwrap());
        assert!(slot.is_none());
    }

    #[test]
    fn test_invalid_value_reports_field() {
        let mut slot: Option<LongFilter> = None;
        let err = apply_to_slot(&mut slot, "id", "equals", "abc").unwrap_err();
        assert_eq!(err.field, "id");
        assert_eq!(err.operator, "equals");
        assert_eq!(err.value, "abc");
    }
}
