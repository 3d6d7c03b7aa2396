mod body_replace_mutation;
mod guid_placeholder_mutation;

use crate::ResponseData;
use body_replace_mutation::{BodyReplaceMutation, BodyReplaceRegexMutation};
use guid_placeholder_mutation::GuidPlaceholderMutation;
use regex::Regex;
use std::fmt::Debug;

pub trait BodyMutation: Debug {
    fn mutate(&self, body: &mut String);
}

/// A body rewrite applied to every stub response before it is sent.
#[derive(Debug)]
pub struct ResponseMutation {
    mutation: Box<dyn BodyMutation + Send + Sync>,
}

impl ResponseMutation {
    pub fn mutate(&self, response_data: &mut ResponseData) {
        self.mutation.mutate(&mut response_data.body);
    }
}

pub struct MutationsBuilder {
    mutations: Vec<ResponseMutation>,
}

impl MutationsBuilder {
    pub(crate) fn new() -> Self {
        Self {
            mutations: Vec::new(),
        }
    }

    /// Replaces every `<guid>` tag with a freshly generated, quoted UUID.
    pub fn guid_placeholder(&mut self) -> &mut Self {
        self.add_body_mutation(GuidPlaceholderMutation::new())
    }

    pub fn body_replace<S1: Into<String>, S2: Into<String>>(
        &mut self,
        text: S1,
        replacement: S2,
    ) -> &mut Self {
        self.add_body_mutation(BodyReplaceMutation::new(text, replacement))
    }

    pub fn body_replace_regex<S: Into<String>>(
        &mut self,
        pattern: Regex,
        replacement: S,
    ) -> &mut Self {
        self.add_body_mutation(BodyReplaceRegexMutation::new(pattern, replacement))
    }

    pub fn add_body_mutation<BM: BodyMutation + Send + Sync + 'static>(
        &mut self,
        mutation: BM,
    ) -> &mut Self {
        self.mutations.push(ResponseMutation {
            mutation: Box::new(mutation),
        });
        self
    }

    pub fn into_response_mutations(self) -> Vec<ResponseMutation> {
        self.mutations
    }
}

impl Default for MutationsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
