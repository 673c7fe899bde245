// File: src/render.rs
// Purpose: Render results and their conversion into HTTP responses

use std::io::{self, Write};
use std::mem;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, warn};
use vista_parser::{ExecError, Namespace};

use crate::error::{Error, Result};

pub const CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Bytes collected before a streamed page sends a chunk
const CHUNK_SIZE: usize = 8 * 1024;
/// Chunks a streamed page may run ahead of the client
const CHUNKS_IN_FLIGHT: usize = 4;

/// A view bound to its data, or the reason it could not be compiled
#[derive(Debug)]
pub enum Rendered {
    Ok {
        name: String,
        view: Arc<Namespace>,
        data: Value,
        stream: bool,
    },
    Failed {
        name: String,
        error: Error,
    },
}

impl Rendered {
    /// Executes the view into `out`
    ///
    /// Buffered views write nothing when execution fails. Streamed views
    /// write straight into `out`, which may already hold part of the page
    /// when an error is returned.
    pub fn render(self, out: &mut dyn Write) -> Result<()> {
        let (name, view, data, stream) = match self {
            Rendered::Ok {
                name,
                view,
                data,
                stream,
            } => (name, view, data, stream),
            Rendered::Failed { name, error } => {
                return Err(Error::Render {
                    name,
                    source: Box::new(error),
                })
            }
        };

        let exec_error = |source| Error::Exec {
            name: name.clone(),
            source,
        };

        if stream {
            return view.execute(&data, out).map_err(exec_error);
        }

        let mut buffer = Vec::new();
        view.execute(&data, &mut buffer).map_err(exec_error)?;
        out.write_all(&buffer)
            .map_err(|err| exec_error(ExecError::Io(err)))
    }

    /// `None` when there is nothing to render
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Rendered::Ok { .. } => Some(CONTENT_TYPE),
            Rendered::Failed { .. } => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Rendered::Ok { name, .. } | Rendered::Failed { name, .. } => name,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Rendered::Ok { .. })
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Rendered::Ok { stream: true, .. })
    }
}

impl IntoResponse for Rendered {
    /// Buffered views become a 500 when execution fails. Streamed views are
    /// executed on the blocking pool and sent in chunks as they are produced;
    /// a failure ends the body early and the status stays 200.
    fn into_response(self) -> Response {
        let Some(content_type) = self.content_type() else {
            if let Rendered::Failed { name, error } = &self {
                error!(template = %name, "render {}: {}", name, error);
            }
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        };

        if self.is_stream() {
            if let Ok(runtime) = Handle::try_current() {
                let body = self.into_body(&runtime);
                return ([(header::CONTENT_TYPE, content_type)], body).into_response();
            }
        }

        let name = self.name().to_string();
        let stream = self.is_stream();
        let mut body = Vec::new();

        match self.render(&mut body) {
            Ok(()) => {}
            Err(err) if stream => {
                warn!(template = %name, bytes = body.len(), "truncated response: {}", err);
            }
            Err(err) => {
                error!(template = %name, "render {}: {}", name, err);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }

        ([(header::CONTENT_TYPE, content_type)], body).into_response()
    }
}

impl Rendered {
    fn into_body(self, runtime: &Handle) -> Body {
        let (tx, rx) = mpsc::channel(CHUNKS_IN_FLIGHT);
        let name = self.name().to_string();

        runtime.spawn_blocking(move || {
            let mut out = ChunkWriter::new(tx);
            let result = self.render(&mut out);
            let flushed = out.flush();

            if let Err(err) = result {
                warn!(template = %name, bytes = out.sent, "truncated response: {}", err);
            } else if let Err(err) = flushed {
                debug!(template = %name, "response dropped: {}", err);
            }
        });

        Body::from_stream(ReceiverStream::new(rx))
    }
}

/// Sends written bytes to a response body in chunks
struct ChunkWriter {
    tx: mpsc::Sender<io::Result<Bytes>>,
    buf: Vec<u8>,
    sent: usize,
}

impl ChunkWriter {
    fn new(tx: mpsc::Sender<io::Result<Bytes>>) -> Self {
        Self {
            tx,
            buf: Vec::with_capacity(CHUNK_SIZE),
            sent: 0,
        }
    }

    fn send(&mut self) -> io::Result<()> {
        let chunk = Bytes::from(mem::take(&mut self.buf));
        self.sent += chunk.len();
        self.tx
            .blocking_send(Ok(chunk))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response body dropped"))
    }
}

impl Write for ChunkWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= CHUNK_SIZE {
            self.send()?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        self.send()
    }
}
