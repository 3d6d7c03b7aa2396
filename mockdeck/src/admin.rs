//! Read-only view of the server state under `/__admin`.

use crate::{data::RequestData, error::Error, mock_server::ServerState, runner::plain_response};
use hyper::{
    header::{HeaderValue, CONTENT_TYPE},
    Body, Response, StatusCode,
};
use serde::Serialize;

pub const ADMIN_PREFIX: &str = "/__admin";

pub(crate) fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PREFIX || path.starts_with("/__admin/")
}

pub(crate) fn handle_request(
    state: &ServerState,
    request: &RequestData,
) -> Result<Response<Body>, Error> {
    let route = request.path.trim_end_matches('/');

    match (request.method.as_str(), route) {
        ("GET", "/__admin/mappings") => json_response(&state.mappings()?),
        ("GET", "/__admin/requests") => json_response(&state.request_log()?),
        ("DELETE", "/__admin/requests") => {
            state.clear_request_log()?;
            Ok(plain_response(StatusCode::OK, Body::empty()))
        }
        _ => Ok(plain_response(StatusCode::NOT_FOUND, Body::empty())),
    }
}

fn json_response<T: Serialize + ?Sized>(value: &T) -> Result<Response<Body>, Error> {
    let mut response = plain_response(StatusCode::OK, serde_json::to_string(value)?);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(response)
}
