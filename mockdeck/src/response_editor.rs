use crate::{data::MappingInfo, error::Error};
use std::collections::{BTreeMap, HashSet};

pub const EMPTY_HEADER_KEY_MESSAGE: &str = "Null or empty header keys are not allowed";
pub const DUPLICATE_HEADER_KEY_MESSAGE: &str = "The same key is specified multiple times";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRow {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl HeaderRow {
    pub fn new<S1: Into<String>, S2: Into<String>>(key: S1, value: S2) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }
}

/// Edits the body and headers of a mapping response. Header rows are
/// revalidated after every change.
#[derive(Debug, Clone)]
pub struct ResponseEditor {
    body: Option<String>,
    headers: Vec<HeaderRow>,
    is_input_valid: bool,
    input_error_message: Option<&'static str>,
}

impl ResponseEditor {
    pub fn new() -> Self {
        let mut editor = Self {
            body: None,
            headers: Vec::new(),
            is_input_valid: true,
            input_error_message: None,
        };
        editor.validate_headers();
        editor
    }

    pub fn from_mapping(mapping: &MappingInfo) -> Self {
        let mut editor = Self::new();
        editor.body = mapping.response_body.clone();
        for (key, value) in &mapping.response_headers {
            editor.add_header(Some(key.clone()), Some(value.clone()));
        }
        editor
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn set_body(&mut self, body: Option<String>) {
        self.body = body;
    }

    pub fn headers(&self) -> &[HeaderRow] {
        &self.headers
    }

    pub fn add_header(&mut self, key: Option<String>, value: Option<String>) {
        self.headers.push(HeaderRow { key, value });
        self.validate_headers();
    }

    pub fn add_empty_header(&mut self) {
        self.add_header(None, None);
    }

    pub fn remove_header(&mut self, index: usize) -> Option<HeaderRow> {
        if index >= self.headers.len() {
            return None;
        }

        let removed = self.headers.remove(index);
        self.validate_headers();
        Some(removed)
    }

    pub fn set_header_key(&mut self, index: usize, key: Option<String>) -> bool {
        match self.headers.get_mut(index) {
            Some(row) => {
                row.key = key;
                self.validate_headers();
                true
            }
            None => false,
        }
    }

    pub fn set_header_value(&mut self, index: usize, value: Option<String>) -> bool {
        match self.headers.get_mut(index) {
            Some(row) => {
                row.value = value;
                self.validate_headers();
                true
            }
            None => false,
        }
    }

    pub fn is_input_valid(&self) -> bool {
        self.is_input_valid
    }

    pub fn input_error_message(&self) -> Option<&'static str> {
        self.input_error_message
    }

    pub fn headers_map(&self) -> Result<BTreeMap<String, String>, Error> {
        if let Some(message) = self.input_error_message {
            return Err(Error::InvalidHeaders(message.to_string()));
        }

        Ok(self
            .headers
            .iter()
            .filter_map(|row| {
                row.key
                    .clone()
                    .map(|key| (key, row.value.clone().unwrap_or_default()))
            })
            .collect())
    }

    /// Writes body and headers back into `mapping`; nothing changes while the
    /// headers are invalid.
    pub fn apply_to(&self, mapping: &mut MappingInfo) -> Result<(), Error> {
        let headers = self.headers_map()?;
        mapping.response_body = self.body.clone();
        mapping.response_headers = headers;

        Ok(())
    }

    fn validate_headers(&mut self) {
        self.is_input_valid = true;
        self.input_error_message = None;

        let has_empty_key = self.headers.iter().any(|row| {
            row.key
                .as_deref()
                .map(|key| key.trim().is_empty())
                .unwrap_or(true)
        });

        if has_empty_key {
            self.is_input_valid = false;
            self.input_error_message = Some(EMPTY_HEADER_KEY_MESSAGE);
            return;
        }

        let mut seen = HashSet::new();
        let has_duplicate = self
            .headers
            .iter()
            .filter_map(|row| row.key.as_deref())
            .any(|key| !seen.insert(key));

        if has_duplicate {
            self.is_input_valid = false;
            self.input_error_message = Some(DUPLICATE_HEADER_KEY_MESSAGE);
        }
    }
}

impl Default for ResponseEditor {
    fn default() -> Self {
        Self::new()
    }
}
