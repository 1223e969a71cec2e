//! Request extractors: criteria, pagination and JSON bodies, all rejecting with `AppError`

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use serde::Deserialize;
use url::form_urlencoded;
use utoipa::IntoParams;

use crate::{
    criteria::Criteria,
    error::AppError,
    pagination::Pageable,
    AppState,
};

fn query_pairs(parts: &Parts) -> Vec<(String, String)> {
    form_urlencoded::parse(parts.uri.query().unwrap_or_default().as_bytes())
        .into_owned()
        .collect()
}

/// Criteria read from `field.operator=value` query pairs
#[derive(Debug)]
pub struct CriteriaQuery<C>(pub C);

#[async_trait]
impl<C: Criteria + 'static> FromRequestParts<AppState> for CriteriaQuery<C> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let pairs = query_pairs(parts);
        let criteria = C::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .map_err(|e| AppError::Validation(e.to_string()))?;
        Ok(CriteriaQuery(criteria))
    }
}

/// Page request read from `page`, `size` and `sort`, bounded by the configured sizes
#[derive(Debug)]
pub struct PageRequest(pub Pageable);

#[async_trait]
impl FromRequestParts<AppState> for PageRequest {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let pairs = query_pairs(parts);
        let pageable = Pageable::from_pairs(
            pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            &state.config.pagination,
        )?;
        Ok(PageRequest(pageable))
    }
}

/// Paging parameters, documented for OpenAPI
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[allow(dead_code)]
pub struct PageParams {
    /// Zero-based page index
    pub page: Option<i64>,
    /// Page size
    pub size: Option<i64>,
    /// Sorting criteria in the format `property(,asc|desc)`, repeatable
    pub sort: Option<Vec<String>>,
}

/// Whether book lists should carry their authors and categories (`eagerload=true|false`)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EagerLoad(pub Option<bool>);

impl EagerLoad {
    fn from_pairs<'a, I>(pairs: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut eager = EagerLoad(None);
        for (key, value) in pairs {
            if key == "eagerload" {
                let flag = value.trim().parse::<bool>().map_err(|_| {
                    AppError::BadRequest(format!("Invalid eagerload '{}'", value))
                })?;
                eager.0 = Some(flag);
            }
        }
        Ok(eager)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for EagerLoad {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let pairs = query_pairs(parts);
        EagerLoad::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

/// `eagerload` query parameter, documented for OpenAPI
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[allow(dead_code)]
pub struct EagerLoadParams {
    /// Include authors and categories of every book
    pub eagerload: Option<bool>,
}

/// JSON request body whose rejections answer with the usual error body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
