//! Page requests (`page`, `size`, `sort`) and paged results.
//!
//! Pages are 0-based. A paged listing answers with the page content as body and
//! the `X-Total-Count` and `Link` headers describing the neighbouring pages.

use axum::http::{header::LINK, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use url::form_urlencoded;

use crate::{
    config::PaginationConfig,
    error::{AppError, AppResult},
};

pub const X_TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pageable {
    pub page: i64,
    pub size: i64,
    pub sort: Vec<SortOrder>,
}

impl Pageable {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }

    /// Parse `page`, `size` and `sort` from decoded query pairs.
    ///
    /// `sort` may repeat; each value is `prop[,prop...][,asc|desc]`.
    pub fn from_pairs<'a, I>(pairs: I, config: &PaginationConfig) -> AppResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut pageable = Pageable::new(0, config.default_size);

        for (key, value) in pairs {
            match key {
                "page" => {
                    let page: i64 = value
                        .trim()
                        .parse()
                        .map_err(|_| AppError::Validation(format!("Invalid page '{}'", value)))?;
                    pageable.page = page.max(0);
                }
                "size" => {
                    let size: i64 = value
                        .trim()
                        .parse()
                        .map_err(|_| AppError::Validation(format!("Invalid size '{}'", value)))?;
                    pageable.size = if size < 1 {
                        config.default_size
                    } else {
                        size.min(config.max_size)
                    };
                }
                "sort" => pageable.sort.extend(parse_sort(value)),
                _ => {}
            }
        }

        // OFFSET must stay representable
        pageable.page = pageable.page.min(i64::MAX / pageable.size.max(1));
        Ok(pageable)
    }
}

fn parse_sort(value: &str) -> Vec<SortOrder> {
    let mut tokens: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    let direction = match tokens.last().map(|t| t.to_ascii_lowercase()) {
        Some(ref t) if t == "desc" => {
            tokens.pop();
            Direction::Desc
        }
        Some(ref t) if t == "asc" => {
            tokens.pop();
            Direction::Asc
        }
        _ => Direction::Asc,
    };

    tokens
        .into_iter()
        .map(|property| SortOrder {
            property: property.to_string(),
            direction,
        })
        .collect()
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: i64,
    pub size: i64,
    pub total_elements: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: &Pageable, total_elements: i64) -> Self {
        Self {
            content,
            number: pageable.page,
            size: pageable.size,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.size <= 0 {
            return 1;
        }
        (self.total_elements + self.size - 1) / self.size
    }
}

/// Build `X-Total-Count` and `Link` headers for `page`, served at `path?query`
pub fn pagination_headers<T>(path: &str, query: Option<&str>, page: &Page<T>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_TOTAL_COUNT, HeaderValue::from(page.total_elements));

    let total_pages = page.total_pages();
    let mut links = Vec::with_capacity(4);
    if page.number < total_pages - 1 {
        links.push(page_link(path, query, page.number + 1, page.size, "next"));
    }
    if page.number > 0 {
        links.push(page_link(path, query, page.number - 1, page.size, "prev"));
    }
    let last_page = (total_pages - 1).max(0);
    links.push(page_link(path, query, last_page, page.size, "last"));
    links.push(page_link(path, query, 0, page.size, "first"));

    if let Ok(value) = HeaderValue::from_str(&links.join(",")) {
        headers.insert(LINK, value);
    }
    headers
}

fn page_link(path: &str, query: Option<&str>, page: i64, size: i64, rel: &str) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        if key != "page" && key != "size" {
            serializer.append_pair(&key, &value);
        }
    }
    serializer.append_pair("page", &page.to_string());
    serializer.append_pair("size", &size.to_string());

    let uri = format!("{}?{}", path, serializer.finish())
        .replace(',', "%2C")
        .replace(';', "%3B");
    format!("<{}>; rel=\"{}\"", uri, rel)
}
