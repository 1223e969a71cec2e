//! Criteria objects: one optional filter per queryable attribute of an entity.
//!
//! Criteria are read from query strings (`?title.contains=rust&authorId.equals=3`)
//! and turned into a [`Specification`] over the aliased columns the repositories
//! select from (`authors a`, `categories c`, `books b`).

use crate::filter::{
    apply_to_slot, FilterError, Join, LocalDateFilter, LongFilter, Specification, StringFilter,
};

/// Criteria for one entity
pub trait Criteria: Default + Clone + std::fmt::Debug + PartialEq + Send + Sync {
    /// Apply `field.operator=raw`. Unknown fields and operators are ignored.
    fn apply(&mut self, field: &str, operator: &str, raw: &str) -> Result<bool, FilterError>;

    fn specification(&self) -> Specification;

    /// Build criteria from decoded query pairs; keys without a `.` are skipped
    fn from_pairs<'a, I>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut criteria = Self::default();
        for (key, value) in pairs {
            if let Some((field, operator)) = key.split_once('.') {
                criteria.apply(field, operator, value)?;
            }
        }
        Ok(criteria)
    }
}

const BOOK_AUTHORS_BY_AUTHOR: Join = Join {
    table: "book_authors",
    alias: "ba",
    owner_key: "author_id",
    owner_column: "a.id",
    target_column: "ba.book_id",
};

const BOOK_CATEGORIES_BY_CATEGORY: Join = Join {
    table: "book_categories",
    alias: "bc",
    owner_key: "category_id",
    owner_column: "c.id",
    target_column: "bc.book_id",
};

const BOOK_AUTHORS_BY_BOOK: Join = Join {
    table: "book_authors",
    alias: "ba",
    owner_key: "book_id",
    owner_column: "b.id",
    target_column: "ba.author_id",
};

const BOOK_CATEGORIES_BY_BOOK: Join = Join {
    table: "book_categories",
    alias: "bc",
    owner_key: "book_id",
    owner_column: "b.id",
    target_column: "bc.category_id",
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorCriteria {
    pub id: Option<LongFilter>,
    pub first_name: Option<StringFilter>,
    pub last_name: Option<StringFilter>,
    pub book_id: Option<LongFilter>,
}

impl Criteria for AuthorCriteria {
    fn apply(&mut self, field: &str, operator: &str, raw: &str) -> Result<bool, FilterError> {
        match field {
            "id" => apply_to_slot(&mut self.id, field, operator, raw),
            "firstName" => apply_to_slot(&mut self.first_name, field, operator, raw),
            "lastName" => apply_to_slot(&mut self.last_name, field, operator, raw),
            "bookId" => apply_to_slot(&mut self.book_id, field, operator, raw),
            _ => Ok(false),
        }
    }

    fn specification(&self) -> Specification {
        Specification::new()
            .and(&self.id, "a.id")
            .and(&self.first_name, "a.first_name")
            .and(&self.last_name, "a.last_name")
            .and_related(&self.book_id, BOOK_AUTHORS_BY_AUTHOR)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryCriteria {
    pub id: Option<LongFilter>,
    pub name: Option<StringFilter>,
    pub book_id: Option<LongFilter>,
}

impl Criteria for CategoryCriteria {
    fn apply(&mut self, field: &str, operator: &str, raw: &str) -> Result<bool, FilterError> {
        match field {
            "id" => apply_to_slot(&mut self.id, field, operator, raw),
            "name" => apply_to_slot(&mut self.name, field, operator, raw),
            "bookId" => apply_to_slot(&mut self.book_id, field, operator, raw),
            _ => Ok(false),
        }
    }

    fn specification(&self) -> Specification {
        Specification::new()
            .and(&self.id, "c.id")
            .and(&self.name, "c.name")
            .and_related(&self.book_id, BOOK_CATEGORIES_BY_CATEGORY)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookCriteria {
    pub id: Option<LongFilter>,
    pub title: Option<StringFilter>,
    pub isbn: Option<StringFilter>,
    pub image_path: Option<StringFilter>,
    pub publisher: Option<StringFilter>,
    pub date_of_publication: Option<LocalDateFilter>,
    pub author_id: Option<LongFilter>,
    pub category_id: Option<LongFilter>,
}

impl Criteria for BookCriteria {
    fn apply(&mut self, field: &str, operator: &str, raw: &str) -> Result<bool, FilterError> {
        match field {
            "id" => apply_to_slot(&mut self.id, field, operator, raw),
            "title" => apply_to_slot(&mut self.title, field, operator, raw),
            "isbn" => apply_to_slot(&mut self.isbn, field, operator, raw),
            "imagePath" => apply_to_slot(&mut self.image_path, field, operator, raw),
            "publisher" => apply_to_slot(&mut self.publisher, field, operator, raw),
            "dateOfPublication" => {
                apply_to_slot(&mut self.date_of_publication, field, operator, raw)
            }
            "authorId" => apply_to_slot(&mut self.author_id, field, operator, raw),
            "categoryId" => apply_to_slot(&mut self.category_id, field, operator, raw),
            _ => Ok(false),
        }
    }

    fn specification(&self) -> Specification {
        Specification::new()
            .and(&self.id, "b.id")
            .and(&self.title, "b.title")
            .and(&self.isbn, "b.isbn")
            .and(&self.image_path, "b.image_path")
            .and(&self.publisher, "b.publisher")
            .and(&self.date_of_publication, "b.date_of_publication")
            .and_related(&self.author_id, BOOK_AUTHORS_BY_BOOK)
            .and_related(&self.category_id, BOOK_CATEGORIES_BY_BOOK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Predicate, SqlParam};
    use chrono::NaiveDate;

    #[test]
    fn test_book_criteria_from_query_pairs() {
        let criteria = BookCriteria::from_pairs([
            ("sort", "id,desc"),
            ("title.contains", "rust"),
            ("dateOfPublication.greaterThan", "1969-12-31"),
            ("authorId.equals", "3"),
            ("eagerload", "true"),
        ])
        .unwrap();

        assert_eq!(
            criteria.title.as_ref().and_then(|f| f.contains.as_deref()),
            Some("rust")
        );
        assert_eq!(
            criteria
                .date_of_publication
                .as_ref()
                .and_then(|f| f.greater_than),
            NaiveDate::from_ymd_opt(1969, 12, 31)
        );
        assert_eq!(
            criteria.author_id.as_ref().and_then(|f| f.filter.equals),
            Some(3)
        );
        assert!(criteria.isbn.is_none());
        assert!(criteria.category_id.is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let criteria =
            AuthorCriteria::from_pairs([("nickname.equals", "x"), ("id.between", "1")]).unwrap();
        assert_eq!(criteria, AuthorCriteria::default());
        assert!(criteria.specification().is_empty());
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let err = CategoryCriteria::from_pairs([("bookId.equals", "one")]).unwrap_err();
        assert_eq!(err.field, "bookId");
    }

    #[test]
    fn test_author_specification_targets_author_columns() {
        let criteria = AuthorCriteria::from_pairs([
            ("lastName.equals", "Tolkien"),
            ("bookId.specified", "false"),
        ])
        .unwrap();
        let spec = criteria.specification();
        assert_eq!(
            spec.predicates(),
            &[
                Predicate::Compare {
                    column: "a.last_name",
                    op: crate::filter::CompareOp::Eq,
                    value: SqlParam::Text("Tolkien".into()),
                },
                Predicate::Related {
                    join: BOOK_AUTHORS_BY_AUTHOR,
                    predicates: vec![Predicate::IsNull {
                        column: "ba.book_id",
                        negated: false,
                    }],
                },
            ]
        );
    }

    #[test]
    fn test_book_relation_filters_use_their_own_link_tables() {
        let criteria =
            BookCriteria::from_pairs([("authorId.in", "1,2"), ("categoryId.notEquals", "4")])
                .unwrap();
        let spec = criteria.specification();
        let joins: Vec<&str> = spec
            .predicates()
            .iter()
            .filter_map(|p| match p {
                Predicate::Related { join, .. } => Some(join.table),
                _ => None,
            })
            .collect();
        assert_eq!(joins, vec!["book_authors", "book_categories"]);
    }
}
