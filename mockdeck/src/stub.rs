use crate::{
    data::{HttpMethod, MappingInfo, RequestData, ResponseData},
    error::Error,
    mutations::ResponseMutation,
};
use hyper::StatusCode;
use std::collections::BTreeMap;
use url::{form_urlencoded, Url};

// Only used to let `Url` split and normalize a relative mapping path. The
// mapping path is appended as text so that a first segment holding a colon
// is never read as a scheme.
const PATH_BASE: &str = "http://mockdeck.local/";

/// The matchable form of a mapping, as held by the running server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stub {
    method: HttpMethod,
    path: String,
    query_params: BTreeMap<String, String>,
    status_code: u16,
    body: Option<String>,
    headers: BTreeMap<String, String>,
}

impl Stub {
    pub fn from_mapping(mapping: &MappingInfo) -> Result<Self, Error> {
        let (path, query_params) = split_path_and_query(mapping.path.as_deref().unwrap_or(""))?;
        let status_code = StatusCode::from_u16(mapping.response_status_code)
            .map_err(|_| Error::InvalidStatusCode(mapping.response_status_code.to_string()))?
            .as_u16();

        Ok(Self {
            method: mapping.request_http_method,
            path,
            query_params,
            status_code,
            body: mapping.response_body.clone(),
            headers: mapping.response_headers.clone(),
        })
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query_params
    }

    pub fn matches(&self, request: &RequestData) -> bool {
        if request.method != self.method.as_str() || request.path != self.path {
            return false;
        }

        if self.query_params.is_empty() {
            return true;
        }

        let request_params = parse_query(request.query.as_deref().unwrap_or(""));
        self.query_params
            .iter()
            .all(|(name, value)| request_params.get(name) == Some(value))
    }

    pub fn respond(&self, mutations: &[ResponseMutation]) -> ResponseData {
        let mut response_data = ResponseData {
            status_code: self.status_code,
            headers: self.headers.clone(),
            body: self.body.clone().unwrap_or_default(),
        };

        for mutation in mutations {
            mutation.mutate(&mut response_data);
        }

        response_data
    }
}

/// Splits `a/path?x=1` into the absolute path `/a/path` and its query parameters.
pub fn split_path_and_query(path: &str) -> Result<(String, BTreeMap<String, String>), Error> {
    let url = Url::parse(&format!("{}{}", PATH_BASE, path.trim_start_matches('/')))
        .map_err(|e| Error::InvalidUrl(format!("{}: {}", path, e)))?;

    Ok((url.path().to_string(), parse_query(url.query().unwrap_or(""))))
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}
