mod admin;
mod data;
mod error;
pub mod mappings_file;
mod mappings_provider;
mod mock_server;
mod mock_server_configuration;
pub mod mutations;
mod response_editor;
mod runner;
mod status_code;
mod stub;
mod util;
mod workspace;

pub use admin::ADMIN_PREFIX;
pub use data::{
    HttpMethod, MappingInfo, PersistableMappingInfo, RequestData, RequestLogEntry, ResponseData,
    ServerEvent,
};
pub use error::Error;
pub use mappings_file::JsonFileMappingsProvider;
pub use mappings_provider::{InMemoryMappingsProvider, MappingsProvider};
pub use mock_server::MockServer;
pub use mock_server_configuration::{MockServerConfiguration, DEFAULT_URL};
pub use response_editor::{
    HeaderRow, ResponseEditor, DUPLICATE_HEADER_KEY_MESSAGE, EMPTY_HEADER_KEY_MESSAGE,
};
pub use status_code::{describe_status_code, known_status_codes, parse_status_code};
pub use stub::Stub;
pub use util::minify_json;
pub use workspace::Workspace;
