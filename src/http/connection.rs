use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::http::date::is_modified_since;
use crate::http::line::LineReader;
use crate::http::parser::{parse_header_line, parse_request_line, RequestLine};
use crate::http::request::{Method, Request};
use crate::http::response::{ResponseBuilder, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::resource::{self, Resource};

/// Returned when the peer sends nothing for a whole idle timeout.
#[derive(Debug)]
pub struct IdleTimeout {
    pub secs: u64,
}

impl fmt::Display for IdleTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nothing received in {} secs", self.secs)
    }
}

impl std::error::Error for IdleTimeout {}

/// One accepted client. Owns its stream; dropping the connection closes it.
pub struct Connection<S> {
    stream: S,
    peer: SocketAddr,
    reader: LineReader,
    config: Arc<Config>,
    state: ConnectionState,
}

pub enum ConnectionState {
    AwaitRequestLine,
    ReadHeaders(RequestLine),
    Dispatch(Request),
    Sending(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, config: Arc<Config>) -> Self {
        Self {
            stream,
            peer,
            reader: LineReader::new(),
            config,
            state: ConnectionState::AwaitRequestLine,
        }
    }

    /// Drives the connection through a single request/response exchange.
    ///
    /// Any error leaves the remaining states unvisited; the stream is still
    /// closed when the connection is dropped.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::AwaitRequestLine => match self.next_line().await? {
                    Some(line) => {
                        info!(peer = %self.peer, request = %line, "Received request line");
                        match parse_request_line(&line) {
                            Ok(request_line) => ConnectionState::ReadHeaders(request_line),
                            Err(e) => {
                                warn!(peer = %self.peer, error = %e, "No request to answer");
                                ConnectionState::Closed
                            }
                        }
                    }
                    None => {
                        debug!(peer = %self.peer, "Client closed before sending a request");
                        ConnectionState::Closed
                    }
                },

                ConnectionState::ReadHeaders(request_line) => {
                    let request = self.read_headers(request_line).await?;
                    ConnectionState::Dispatch(request)
                }

                ConnectionState::Dispatch(request) => {
                    ConnectionState::Sending(self.dispatch(&request).await?)
                }

                ConnectionState::Sending(mut writer) => {
                    debug!(peer = %self.peer, head = %writer.head().header_block(), "Sending header block");
                    let sent = writer.write_to_stream(&mut self.stream).await?;
                    info!(
                        peer = %self.peer,
                        status = writer.head().status.as_u16(),
                        body_bytes = sent,
                        "Response sent"
                    );
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        if let Err(e) = self.stream.shutdown().await {
            debug!(peer = %self.peer, error = %e, "Shutdown after response failed");
        }

        Ok(())
    }

    async fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        let idle = self.config.server.idle_timeout();
        match timeout(idle, self.reader.read_line(&mut self.stream)).await {
            Ok(line) => line,
            Err(_) => Err(IdleTimeout { secs: idle.as_secs() }.into()),
        }
    }

    /// Consumes header lines up to the blank line. End of stream also ends
    /// the block.
    async fn read_headers(&mut self, request_line: RequestLine) -> anyhow::Result<Request> {
        let mut headers = HashMap::new();

        while let Some(line) = self.next_line().await? {
            if line.is_empty() {
                break;
            }
            debug!(peer = %self.peer, header = %line, "Received header");
            if let Some((name, value)) = parse_header_line(&line) {
                headers.insert(name.to_string(), value.to_string());
            }
        }

        Ok(Request {
            method: request_line.method,
            target: request_line.target,
            version: request_line.version,
            headers,
        })
    }

    async fn dispatch(&self, request: &Request) -> anyhow::Result<ResponseWriter> {
        let cfg = &self.config;

        if !request.method.is_supported() {
            let page = resource::error_document(cfg.bad_request_path()).await?;
            return self.with_body(StatusCode::BadRequest, &page).await;
        }

        let found = resource::resolve(&cfg.static_files.root, &request.target).await;

        match (&request.method, found.exists) {
            (Method::GET, true) => {
                if is_modified_since(found.modified, request.if_modified_since()) {
                    self.with_body(StatusCode::Ok, &found).await
                } else {
                    let head = ResponseBuilder::new(StatusCode::NotModified, cfg.server.name.as_str()).build();
                    Ok(ResponseWriter::new(head, None))
                }
            }
            (Method::GET, false) => {
                let page = resource::error_document(cfg.not_found_path()).await?;
                self.with_body(StatusCode::NotFound, &page).await
            }
            (_, true) => Ok(self.head_only(StatusCode::Ok, &found)),
            (_, false) => {
                let page = resource::error_document(cfg.not_found_path()).await?;
                Ok(self.head_only(StatusCode::NotFound, &page))
            }
        }
    }

    async fn with_body(&self, status: StatusCode, resource: &Resource) -> anyhow::Result<ResponseWriter> {
        let body = File::open(&resource.path).await?;
        let head = ResponseBuilder::new(status, self.config.server.name.as_str())
            .resource(resource)
            .build();
        Ok(ResponseWriter::new(head, Some(body)))
    }

    fn head_only(&self, status: StatusCode, resource: &Resource) -> ResponseWriter {
        let head = ResponseBuilder::new(status, self.config.server.name.as_str())
            .resource(resource)
            .build();
        ResponseWriter::new(head, None)
    }
}
