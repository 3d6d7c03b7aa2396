use crate::{error::Error, util};
use chrono::{DateTime, Local};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// The request methods a mapping can answer to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Numeric codes found in mapping files written by older releases.
    fn from_legacy_code(code: u64) -> Result<Self, Error> {
        match code {
            0 => Ok(HttpMethod::Get),
            1 => Ok(HttpMethod::Put),
            2 => Ok(HttpMethod::Delete),
            3 => Ok(HttpMethod::Post),
            6 => Ok(HttpMethod::Patch),
            other => Err(Error::InvalidHttpMethod(other.to_string())),
        }
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(Error::InvalidHttpMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Code(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Name(name) => name.parse().map_err(de::Error::custom),
            Repr::Code(code) => HttpMethod::from_legacy_code(code).map_err(de::Error::custom),
        }
    }
}

/// A request-to-response rule as the user edits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingInfo {
    pub path: Option<String>,
    pub request_http_method: HttpMethod,
    pub response_status_code: u16,
    pub response_body: Option<String>,
    pub response_headers: BTreeMap<String, String>,
}

impl MappingInfo {
    pub fn new() -> Self {
        Self {
            path: None,
            request_http_method: HttpMethod::Get,
            response_status_code: 200,
            response_body: None,
            response_headers: BTreeMap::new(),
        }
    }

    /// The body as shown in the mapping list: compact when it is JSON.
    pub fn minified_response_body(&self) -> Option<String> {
        util::minify_json(self.response_body.as_deref())
    }
}

impl Default for MappingInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// The record stored in the mappings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersistableMappingInfo {
    #[serde(default)]
    pub path: Option<String>,
    pub request_http_method: HttpMethod,
    pub response_status_code: u16,
    #[serde(default)]
    pub response_body: Option<String>,
    #[serde(default, deserialize_with = "deserialize_headers")]
    pub headers: BTreeMap<String, String>,
}

// Older files may hold `null` for the whole map or for single values.
fn deserialize_headers<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    let headers: Option<BTreeMap<String, Option<String>>> = Option::deserialize(deserializer)?;

    Ok(headers
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}

impl From<&MappingInfo> for PersistableMappingInfo {
    fn from(mapping: &MappingInfo) -> Self {
        Self {
            path: mapping.path.clone(),
            request_http_method: mapping.request_http_method,
            response_status_code: mapping.response_status_code,
            response_body: mapping.response_body.clone(),
            headers: mapping.response_headers.clone(),
        }
    }
}

impl From<PersistableMappingInfo> for MappingInfo {
    fn from(mapping: PersistableMappingInfo) -> Self {
        Self {
            path: mapping.path,
            request_http_method: mapping.request_http_method,
            response_status_code: mapping.response_status_code,
            response_body: mapping.response_body,
            response_headers: mapping.headers,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestData {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct ResponseData {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// One request received by the mock server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestLogEntry {
    pub timestamp: DateTime<Local>,
    pub method: String,
    pub path: String,
    pub body: String,
}

impl RequestLogEntry {
    pub fn new<S1: Into<String>, S2: Into<String>, S3: Into<String>>(
        method: S1,
        path: S2,
        body: S3,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            method: method.into(),
            path: path.into(),
            body: body.into(),
        }
    }

    pub fn log_line(&self) -> String {
        format!(
            "{} [{}] Path: {{{}}} Request body: {{{}}}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.method,
            self.path,
            self.body
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    NewRequest(RequestLogEntry),
    StatusChanged { is_started: bool },
}
