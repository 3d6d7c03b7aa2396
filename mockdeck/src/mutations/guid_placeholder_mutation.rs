use super::BodyMutation;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use uuid::Uuid;

lazy_static! {
    static ref GUID_TAG_REGEX: Regex = Regex::new("<guid>").unwrap();
}

#[derive(Debug, Default)]
pub struct GuidPlaceholderMutation;

impl GuidPlaceholderMutation {
    pub fn new() -> Self {
        Self
    }
}

impl BodyMutation for GuidPlaceholderMutation {
    fn mutate(&self, body: &mut String) {
        if !GUID_TAG_REGEX.is_match(body) {
            return;
        }

        *body = GUID_TAG_REGEX
            .replace_all(body, |_: &Captures| format!("\"{}\"", Uuid::new_v4()))
            .into();
    }
}
