use crate::{
    data::{
        MappingInfo, PersistableMappingInfo, RequestData, RequestLogEntry, ResponseData,
        ServerEvent,
    },
    error::Error,
    mock_server_configuration::MockServerConfiguration,
    mutations::ResponseMutation,
    runner::{self, RunningServer},
    stub::Stub,
};
use std::{
    collections::VecDeque,
    net::SocketAddr,
    sync::{Arc, Mutex, RwLock},
};
use tokio::sync::broadcast;
use tracing::{debug, info};

const EVENT_CHANNEL_CAPACITY: usize = 1024;
/// The oldest entries are dropped once the request log holds this many.
pub(crate) const REQUEST_LOG_CAPACITY: usize = 10_000;

/// State shared between the `MockServer` handle and the listener thread.
#[derive(Debug)]
pub(crate) struct ServerState {
    stubs: RwLock<Vec<Stub>>,
    mappings: RwLock<Vec<PersistableMappingInfo>>,
    request_log: Mutex<VecDeque<RequestLogEntry>>,
    events: broadcast::Sender<ServerEvent>,
    response_mutations: Vec<ResponseMutation>,
    admin_interface: bool,
}

impl ServerState {
    pub(crate) fn admin_interface(&self) -> bool {
        self.admin_interface
    }

    pub(crate) fn mappings(&self) -> Result<Vec<PersistableMappingInfo>, Error> {
        Ok(self.mappings.read()?.clone())
    }

    pub(crate) fn request_log(&self) -> Result<Vec<RequestLogEntry>, Error> {
        Ok(self.request_log.lock()?.iter().cloned().collect())
    }

    pub(crate) fn clear_request_log(&self) -> Result<(), Error> {
        self.request_log.lock()?.clear();
        Ok(())
    }

    pub(crate) fn record_request(&self, entry: RequestLogEntry) -> Result<(), Error> {
        {
            let mut request_log = self.request_log.lock()?;
            if request_log.len() >= REQUEST_LOG_CAPACITY {
                request_log.pop_front();
            }
            request_log.push_back(entry.clone());
        }
        self.notify(ServerEvent::NewRequest(entry));
        Ok(())
    }

    /// Answers with the first stub, in mapping order, that matches.
    pub(crate) fn find_response(
        &self,
        request: &RequestData,
    ) -> Result<Option<ResponseData>, Error> {
        let stubs = self.stubs.read()?;

        match stubs.iter().position(|stub| stub.matches(request)) {
            Some(index) => {
                debug!(index, method = %request.method, path = %request.path, "stub matched");
                Ok(Some(stubs[index].respond(&self.response_mutations)))
            }
            None => Ok(None),
        }
    }

    fn notify(&self, event: ServerEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

/// An HTTP mock server answering requests from a list of mappings.
#[derive(Debug)]
pub struct MockServer {
    url: String,
    state: Arc<ServerState>,
    running: Option<RunningServer>,
}

impl MockServer {
    pub fn new(configuration: MockServerConfiguration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let url = configuration.url().to_string();
        let admin_interface = configuration.admin_interface();
        let response_mutations = configuration.into_response_mutations();

        Self {
            url,
            state: Arc::new(ServerState {
                stubs: RwLock::new(Vec::new()),
                mappings: RwLock::new(Vec::new()),
                request_log: Mutex::new(VecDeque::new()),
                events,
                response_mutations,
                admin_interface,
            }),
            running: None,
        }
    }

    /// Creates the server and starts listening right away.
    pub fn start_new(configuration: MockServerConfiguration) -> Result<Self, Error> {
        let mut server = Self::new(configuration);
        server.start()?;
        Ok(server)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url<S: Into<String>>(&mut self, url: S) -> Result<(), Error> {
        if self.is_started() {
            return Err(Error::ServerRunning);
        }

        self.url = url.into();
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.running.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.local_addr())
    }

    /// The address actually bound, as a url. Differs from `url()` when the
    /// configured port is 0.
    pub fn base_url(&self) -> Option<String> {
        self.local_addr().map(|addr| format!("http://{}/", addr))
    }

    pub fn start(&mut self) -> Result<(), Error> {
        if self.is_started() {
            return Err(Error::ServerRunning);
        }

        let running = runner::start(&self.url, self.state.clone())?;
        info!(url = %self.url, addr = %running.local_addr(), "mock server started");

        self.running = Some(running);
        self.state.notify(ServerEvent::StatusChanged { is_started: true });
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), Error> {
        let running = match self.running.take() {
            Some(running) => running,
            None => return Ok(()),
        };

        running.shutdown()?;
        info!(url = %self.url, "mock server stopped");

        self.state.notify(ServerEvent::StatusChanged { is_started: false });
        Ok(())
    }

    /// Replaces every configured stub. Nothing changes if any mapping is invalid.
    pub fn update_mappings(&self, mappings: &[MappingInfo]) -> Result<(), Error> {
        let stubs = mappings
            .iter()
            .map(Stub::from_mapping)
            .collect::<Result<Vec<_>, _>>()?;

        *self.state.stubs.write()? = stubs;
        *self.state.mappings.write()? =
            mappings.iter().map(PersistableMappingInfo::from).collect();

        info!(count = mappings.len(), "mappings updated");
        Ok(())
    }

    pub fn stubs(&self) -> Result<Vec<Stub>, Error> {
        Ok(self.state.stubs.read()?.clone())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.state.events.subscribe()
    }

    pub fn request_log(&self) -> Result<Vec<RequestLogEntry>, Error> {
        self.state.request_log()
    }

    pub fn clear_request_log(&self) -> Result<(), Error> {
        self.state.clear_request_log()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!("Couldn't gracefully shut down the mock server: {}", e);
        }
    }
}
