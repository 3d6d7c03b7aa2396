use crate::error::Error;
use hyper::{
    header::{HeaderName, HeaderValue},
    HeaderMap,
};

pub fn put_headers<'a, I: IntoIterator<Item = (&'a String, &'a String)>>(
    header_map: &mut HeaderMap<HeaderValue>,
    headers: I,
) -> Result<(), Error> {
    for (key, value) in headers {
        let header_name = HeaderName::from_lowercase(key.trim().to_lowercase().as_bytes())?;
        let header_value = HeaderValue::from_str(value)?;
        header_map.insert(header_name, header_value);
    }

    Ok(())
}

/// Re-serializes JSON without insignificant whitespace. Text that is not JSON
/// is returned unchanged; an empty input has nothing to show.
pub fn minify_json(text: Option<&str>) -> Option<String> {
    let text = text.filter(|t| !t.is_empty())?;

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => Some(value.to_string()),
        Err(_) => Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn minify_strips_whitespace_from_json() {
        assert_eq!(
            minify_json(Some("{\n  \"a\": [1, 2],\n  \"b\": \"x y\"\n}")).unwrap(),
            r#"{"a":[1,2],"b":"x y"}"#
        );
    }

    #[test]
    fn minify_keeps_non_json_text() {
        assert_eq!(minify_json(Some("b0dy")).unwrap(), "b0dy");
        assert_eq!(minify_json(Some("{isBody: true}")).unwrap(), "{isBody: true}");
    }

    #[test]
    fn minify_empty_is_none() {
        assert_eq!(minify_json(None), None);
        assert_eq!(minify_json(Some("")), None);
    }

    #[test]
    fn put_headers_lowercases_names_and_replaces_values() {
        let mut map = HeaderMap::new();
        let headers: BTreeMap<String, String> = vec![
            ("Cache-Control".to_string(), "max-age=30".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]
        .into_iter()
        .collect();

        put_headers(&mut map, &headers).unwrap();
        put_headers(&mut map, &headers).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map["cache-control"], "max-age=30");
        assert_eq!(map["content-type"], "application/json");
    }

    #[test]
    fn put_headers_rejects_bad_names() {
        let mut map = HeaderMap::new();
        let key = "bad header".to_string();
        let value = "x".to_string();

        let result = put_headers(&mut map, vec![(&key, &value)]);
        assert!(matches!(result, Err(Error::InvalidHeaderName)));
    }
}
