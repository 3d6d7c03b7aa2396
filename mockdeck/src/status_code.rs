use crate::error::Error;
use hyper::StatusCode;

/// Formats a status code the way the mapping list shows it: `200 - OK`.
pub fn describe_status_code(code: u16) -> String {
    match StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
    {
        Some(reason) => format!("{} - {}", code, reason),
        None => code.to_string(),
    }
}

/// Accepts either a bare number or the `200 - OK` display form.
pub fn parse_status_code(text: &str) -> Result<u16, Error> {
    let number = text.split(" - ").next().unwrap_or_default().trim();
    let code = number
        .parse::<u16>()
        .map_err(|_| Error::InvalidStatusCode(text.to_string()))?;

    StatusCode::from_u16(code)
        .map(|status| status.as_u16())
        .map_err(|_| Error::InvalidStatusCode(text.to_string()))
}

pub fn known_status_codes() -> Vec<u16> {
    (100..600)
        .filter(|code| {
            StatusCode::from_u16(*code)
                .ok()
                .and_then(|status| status.canonical_reason())
                .is_some()
        })
        .collect()
}
