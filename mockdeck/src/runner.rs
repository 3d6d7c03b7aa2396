use crate::{
    admin,
    data::{RequestData, RequestLogEntry},
    error::Error,
    mock_server::ServerState,
    util,
};
use hyper::{
    body,
    header::{HeaderValue, CONTENT_TYPE},
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use std::{
    convert::Infallible,
    io,
    net::{SocketAddr, ToSocketAddrs},
    sync::{mpsc, Arc},
    thread::{self, JoinHandle},
};
use tokio::{runtime::Runtime, sync::oneshot};
use tracing::{error, info, warn};
use url::Url;

const NO_MATCH_BODY: &str = r#"{"Status":"No matching mapping found"}"#;

/// A listener running on its own thread and tokio runtime.
#[derive(Debug)]
pub(crate) struct RunningServer {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    join_handle: JoinHandle<()>,
}

impl RunningServer {
    pub(crate) fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections, lets in-flight requests finish and waits
    /// for the listener thread to exit.
    pub(crate) fn shutdown(self) -> Result<(), Error> {
        // the receiver is gone only if the server already exited
        let _ = self.shutdown.send(());

        self.join_handle.join().map_err(|_| {
            Error::IoError(io::Error::new(
                io::ErrorKind::Other,
                "mock server thread panicked",
            ))
        })
    }
}

pub(crate) fn start(url: &str, state: Arc<ServerState>) -> Result<RunningServer, Error> {
    let addr = resolve_addr(url)?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let (bound_tx, bound_rx) = mpsc::channel::<Result<SocketAddr, Error>>();

    let join_handle = thread::Builder::new()
        .name(String::from("mockdeck-server"))
        .spawn(move || {
            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    let _ = bound_tx.send(Err(e.into()));
                    return;
                }
            };

            runtime.block_on(async move {
                let builder = match Server::try_bind(&addr) {
                    Ok(builder) => builder,
                    Err(e) => {
                        let _ = bound_tx.send(Err(e.into()));
                        return;
                    }
                };

                let server = builder.serve(make_service_fn(move |_| {
                    let state = state.clone();
                    async move {
                        Ok::<_, Infallible>(service_fn(move |req| {
                            serve_request(state.clone(), req)
                        }))
                    }
                }));

                let _ = bound_tx.send(Ok(server.local_addr()));

                let server = server.with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                });

                if let Err(e) = server.await {
                    error!("Mock server error: {}", e);
                }
            });
        })?;

    let bound = bound_rx.recv().unwrap_or_else(|_| {
        Err(Error::IoError(io::Error::new(
            io::ErrorKind::Other,
            "mock server thread exited before binding",
        )))
    });

    match bound {
        Ok(local_addr) => Ok(RunningServer {
            local_addr,
            shutdown: shutdown_tx,
            join_handle,
        }),
        Err(e) => {
            let _ = join_handle.join();
            Err(e)
        }
    }
}

/// Resolves the host and port of an `http://host:port/` url. IPv4 addresses
/// are preferred when a name resolves to both families.
pub(crate) fn resolve_addr(url: &str) -> Result<SocketAddr, Error> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;

    if parsed.scheme() != "http" {
        return Err(Error::InvalidUrl(format!(
            "{}: only http urls are supported",
            url
        )));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| Error::InvalidUrl(format!("{}: missing host", url)))?;
    // IPv6 literals come back bracketed
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let port = parsed
        .port_or_known_default()
        .ok_or_else(|| Error::InvalidUrl(format!("{}: missing port", url)))?;

    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| Error::InvalidUrl(format!("{}: host did not resolve", url)))
}

async fn serve_request(
    state: Arc<ServerState>,
    request: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    match handle_request(&state, request).await {
        Ok(response) => Ok(response),
        Err(err) => {
            error!("Failed to answer request: {}", err);
            Ok(plain_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
            ))
        }
    }
}

async fn handle_request(
    state: &ServerState,
    mut request: Request<Body>,
) -> Result<Response<Body>, Error> {
    let request_data = read_request_data(&mut request).await?;

    if state.admin_interface() && admin::is_admin_path(&request_data.path) {
        return admin::handle_request(state, &request_data);
    }

    let entry = RequestLogEntry::new(
        request_data.method.as_str(),
        request_data.path.as_str(),
        request_data.body.as_str(),
    );
    info!("{}", entry.log_line());
    state.record_request(entry)?;

    let response_data = match state.find_response(&request_data)? {
        Some(response_data) => response_data,
        None => {
            warn!(
                method = %request_data.method,
                path = %request_data.path,
                "no matching mapping"
            );
            let mut response = plain_response(StatusCode::NOT_FOUND, NO_MATCH_BODY);
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            return Ok(response);
        }
    };

    let mut response_builder = Response::builder().status(response_data.status_code);

    util::put_headers(
        response_builder.headers_mut().ok_or(Error::InvalidBody)?,
        &response_data.headers,
    )?;

    Ok(response_builder.body(response_data.body.into())?)
}

async fn read_request_data(request: &mut Request<Body>) -> Result<RequestData, Error> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(String::from);

    let body = body::to_bytes(request.body_mut())
        .await
        .map_err(|_| Error::InvalidBody)?;

    Ok(RequestData {
        method,
        path,
        query,
        body: String::from_utf8_lossy(&body).into(),
    })
}

pub(crate) fn plain_response<B: Into<Body>>(status: StatusCode, body: B) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
}
