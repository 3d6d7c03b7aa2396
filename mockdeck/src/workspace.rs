use crate::{
    data::{MappingInfo, PersistableMappingInfo, ServerEvent},
    error::Error,
    mappings_provider::MappingsProvider,
    mock_server::MockServer,
    response_editor::ResponseEditor,
};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

/// The editable mapping list together with the server it configures, the
/// accumulated request log and the server status.
#[derive(Debug)]
pub struct Workspace<P: MappingsProvider> {
    server: MockServer,
    provider: P,
    events: broadcast::Receiver<ServerEvent>,
    mappings: Vec<MappingInfo>,
    server_url: String,
    is_server_started: bool,
    logs: String,
}

impl<P: MappingsProvider> Workspace<P> {
    /// Loads the persisted mappings. They reach the server on the next `apply`.
    pub fn open(server: MockServer, provider: P) -> Result<Self, Error> {
        let mappings = provider
            .load_mappings()?
            .into_iter()
            .map(MappingInfo::from)
            .collect();

        Ok(Self {
            events: server.subscribe(),
            server_url: server.url().to_string(),
            is_server_started: server.is_started(),
            server,
            provider,
            mappings,
            logs: String::new(),
        })
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub fn mappings(&self) -> &[MappingInfo] {
        &self.mappings
    }

    pub fn mapping(&self, index: usize) -> Result<&MappingInfo, Error> {
        self.mappings.get(index).ok_or(Error::MappingNotFound(index))
    }

    pub fn mapping_mut(&mut self, index: usize) -> Result<&mut MappingInfo, Error> {
        self.mappings
            .get_mut(index)
            .ok_or(Error::MappingNotFound(index))
    }

    /// Appends a `GET` mapping answering `200`; returns its index.
    pub fn add_mapping(&mut self) -> usize {
        self.mappings.push(MappingInfo::new());
        self.mappings.len() - 1
    }

    pub fn remove_mapping(&mut self, index: usize) -> Result<MappingInfo, Error> {
        if index >= self.mappings.len() {
            return Err(Error::MappingNotFound(index));
        }

        Ok(self.mappings.remove(index))
    }

    pub fn clear(&mut self) {
        self.mappings.clear();
    }

    pub fn edit_response(&self, index: usize) -> Result<ResponseEditor, Error> {
        Ok(ResponseEditor::from_mapping(self.mapping(index)?))
    }

    pub fn commit_response(&mut self, index: usize, editor: &ResponseEditor) -> Result<(), Error> {
        editor.apply_to(self.mapping_mut(index)?)
    }

    /// Pushes the mappings to the server, then persists them.
    pub fn apply(&mut self) -> Result<(), Error> {
        self.server.update_mappings(&self.mappings)?;

        let records: Vec<PersistableMappingInfo> =
            self.mappings.iter().map(PersistableMappingInfo::from).collect();
        self.provider.save_mappings(&records)?;

        info!(count = records.len(), "mappings applied");
        Ok(())
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Takes effect on the next `start_server`.
    pub fn set_server_url<S: Into<String>>(&mut self, url: S) {
        self.server_url = url.into();
    }

    pub fn start_server(&mut self) -> Result<(), Error> {
        self.server.set_url(self.server_url.clone())?;
        self.server.start()?;
        self.pump_events();
        Ok(())
    }

    pub fn stop_server(&mut self) -> Result<(), Error> {
        self.server.stop()?;
        self.pump_events();
        Ok(())
    }

    pub fn is_server_started(&self) -> bool {
        self.is_server_started
    }

    pub fn logs(&self) -> &str {
        &self.logs
    }

    /// Hands over the log text accumulated so far and starts a fresh one.
    pub fn take_logs(&mut self) -> String {
        std::mem::take(&mut self.logs)
    }

    /// Drains the server events received so far; returns how many were handled.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;

        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "request log fell behind, events were dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        handled
    }

    fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::NewRequest(entry) => {
                debug!(method = %entry.method, path = %entry.path, "request logged");
                self.logs.push_str(&entry.log_line());
                self.logs.push('\n');
            }
            ServerEvent::StatusChanged { is_started } => {
                self.is_server_started = is_started;
            }
        }
    }
}
