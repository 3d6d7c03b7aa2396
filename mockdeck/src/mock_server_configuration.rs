use crate::mutations::{MutationsBuilder, ResponseMutation};

pub const DEFAULT_URL: &str = "http://localhost:12345/";

#[derive(Debug)]
pub struct MockServerConfiguration {
    url: String,
    admin_interface: bool,
    response_mutations: Vec<ResponseMutation>,
}

impl MockServerConfiguration {
    /// Default url, admin interface on, `<guid>` tags expanded in bodies.
    pub fn new() -> Self {
        let mut configuration = Self {
            url: String::from(DEFAULT_URL),
            admin_interface: true,
            response_mutations: Vec::new(),
        };
        configuration.add_response_mutations(|m| m.guid_placeholder());
        configuration
    }

    pub fn set_url<S: Into<String>>(&mut self, url: S) {
        self.url = url.into();
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_admin_interface(&mut self, value: bool) {
        self.admin_interface = value;
    }

    pub fn admin_interface(&self) -> bool {
        self.admin_interface
    }

    pub fn add_response_mutations<F: FnOnce(&mut MutationsBuilder) -> &mut MutationsBuilder>(
        &mut self,
        func: F,
    ) {
        let mut mutations = MutationsBuilder::new();
        let _ = func(&mut mutations);
        self.response_mutations
            .extend(mutations.into_response_mutations());
    }

    pub fn clear_response_mutations(&mut self) {
        self.response_mutations.clear();
    }

    pub fn response_mutations(&self) -> &[ResponseMutation] {
        &self.response_mutations
    }

    pub fn into_response_mutations(self) -> Vec<ResponseMutation> {
        self.response_mutations
    }
}

impl Default for MockServerConfiguration {
    fn default() -> Self {
        Self::new()
    }
}
