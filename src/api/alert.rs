//! Alert headers sent to the web client after a change or a rejected request

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use url::form_urlencoded;

use crate::{config::ApplicationConfig, error::FailureAlert, AppState};

fn header_name(app: &str, suffix: &str) -> Option<HeaderName> {
    HeaderName::try_from(format!("X-{}-{}", app, suffix)).ok()
}

fn insert(headers: &mut HeaderMap, app: &str, suffix: &str, value: &str) {
    if let (Some(name), Ok(value)) = (header_name(app, suffix), HeaderValue::from_str(value)) {
        headers.insert(name, value);
    }
}

/// `X-{app}-alert` with `message` and `X-{app}-params` with the url-encoded `param`
pub fn alert(app: &ApplicationConfig, message: &str, param: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let param: String = form_urlencoded::byte_serialize(param.as_bytes()).collect();
    insert(&mut headers, &app.name, "alert", message);
    insert(&mut headers, &app.name, "params", &param);
    headers
}

pub fn entity_creation_alert(app: &ApplicationConfig, entity: &str, id: i64) -> HeaderMap {
    let message = if app.enable_translation {
        format!("{}.{}.created", app.name, entity)
    } else {
        format!("A new {} is created with identifier {}", entity, id)
    };
    alert(app, &message, &id.to_string())
}

pub fn entity_update_alert(app: &ApplicationConfig, entity: &str, id: i64) -> HeaderMap {
    let message = if app.enable_translation {
        format!("{}.{}.updated", app.name, entity)
    } else {
        format!("A {} is updated with identifier {}", entity, id)
    };
    alert(app, &message, &id.to_string())
}

pub fn entity_deletion_alert(app: &ApplicationConfig, entity: &str, id: i64) -> HeaderMap {
    let message = if app.enable_translation {
        format!("{}.{}.deleted", app.name, entity)
    } else {
        format!("A {} is deleted with identifier {}", entity, id)
    };
    alert(app, &message, &id.to_string())
}

/// `X-{app}-error: error.{key}` and `X-{app}-params: {entity}`
pub fn failure_alert(app: &ApplicationConfig, entity: &str, key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, &app.name, "error", &format!("error.{}", key));
    insert(&mut headers, &app.name, "params", entity);
    headers
}

/// Turn a [`FailureAlert`] left in the response extensions into alert headers
pub async fn failure_alert_headers(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    if let Some(failure) = response.extensions_mut().remove::<FailureAlert>() {
        tracing::warn!("Request rejected: {}.{}", failure.entity, failure.key);
        let headers = failure_alert(&state.config.app, failure.entity, failure.key);
        response.headers_mut().extend(headers);
    }
    response
}
