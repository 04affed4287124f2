//! Captive configuration portal.
//!
//! A single-use HTTP server: it handles one connection at a time, in
//! arrival order, and shuts down after the first valid credential
//! submission. Any I/O failure closes the connection and the listening
//! socket and ends the server with a [`PortalError`].

pub mod assets;

use alloc::vec;

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{ErrorKind, Read, Write};
use log::{debug, info, warn};
use thiserror_no_std::Error;

use crate::config::{PORTAL_GRACE_MS, REQUEST_BUFFER_SIZE, STREAM_CHUNK_SIZE};
use crate::http::{self, Body, FormError, HttpRequest, HttpResponse, Method};
use crate::storage::{CredentialStore, Credentials, StorageError};

/// An accepted client connection.
pub trait Connection: Read + Write {
    /// Flushes pending output and closes the connection.
    fn close(&mut self) -> impl Future<Output = ()>;
}

impl<T: Connection + ?Sized> Connection for &mut T {
    fn close(&mut self) -> impl Future<Output = ()> {
        (**self).close()
    }
}

/// The listening socket of the portal.
pub trait Listener {
    type Error: core::fmt::Debug;
    type Connection<'a>: Connection
    where
        Self: 'a;

    /// Waits for the next client.
    fn accept(&mut self) -> impl Future<Output = Result<Self::Connection<'_>, Self::Error>>;

    /// Stops listening. The next [`accept`](Self::accept) listens again.
    fn close(&mut self);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortalError {
    #[error("accepting a connection failed")]
    Accept,
    #[error("connection I/O failed: {0:?}")]
    Io(ErrorKind),
    #[error("could not persist credentials: {0}")]
    Storage(#[from] StorageError),
}

fn io_error<E: embedded_io_async::Error>(e: E) -> PortalError {
    PortalError::Io(e.kind())
}

/// What a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Test,
    Stylesheet,
    Connect,
    NotFound,
}

impl Route {
    /// Exact match on path and sniffed method.
    pub fn of(request: &HttpRequest<'_>) -> Self {
        match (request.sniffed_method(), request.path) {
            (Method::Get, "/") => Route::Index,
            (Method::Get, "/test") => Route::Test,
            (Method::Get, assets::STYLESHEET_PATH) => Route::Stylesheet,
            (Method::Post, "/connect") => Route::Connect,
            _ => Route::NotFound,
        }
    }
}

enum Outcome {
    Served,
    Submitted(Credentials),
}

/// Portal server borrowing the listening socket for one session.
pub struct PortalServer<'a, L> {
    listener: &'a mut L,
}

impl<'a, L: Listener> PortalServer<'a, L> {
    pub fn new(listener: &'a mut L) -> Self {
        Self { listener }
    }

    /// Serves until credentials are submitted.
    ///
    /// The credentials are persisted through `store` before the
    /// confirmation page is sent and are returned once the listening
    /// socket is closed.
    pub async fn run<S, D>(self, store: &mut S, delay: &mut D) -> Result<Credentials, PortalError>
    where
        S: CredentialStore,
        D: DelayNs,
    {
        info!("Configuration portal is up");
        let mut buf = vec![0u8; REQUEST_BUFFER_SIZE.max(STREAM_CHUNK_SIZE)];

        let result = loop {
            let mut conn = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Portal accept failed: {:?}", e);
                    break Err(PortalError::Accept);
                }
            };

            let outcome = serve_connection(&mut conn, &mut buf, store, delay).await;
            conn.close().await;
            match outcome {
                Ok(Outcome::Served) => {}
                Ok(Outcome::Submitted(credentials)) => break Ok(credentials),
                Err(e) => {
                    warn!("Portal shutting down: {}", e);
                    break Err(e);
                }
            }
        };

        self.listener.close();
        info!("Configuration portal closed");
        result
    }
}

async fn serve_connection<C, S, D>(
    conn: &mut C,
    buf: &mut [u8],
    store: &mut S,
    delay: &mut D,
) -> Result<Outcome, PortalError>
where
    C: Connection,
    S: CredentialStore,
    D: DelayNs,
{
    let len = conn
        .read(&mut buf[..REQUEST_BUFFER_SIZE])
        .await
        .map_err(io_error)?;

    let (route, form) = {
        let request = match HttpRequest::parse(&buf[..len]) {
            Ok(request) => request,
            Err(e) => {
                debug!("Dropping request: {}", e);
                return Ok(Outcome::Served);
            }
        };
        let route = Route::of(&request);
        info!("Portal {} {} -> {:?}", request.method, request.path, route);
        let form = (route == Route::Connect).then(|| http::parse_credentials(request.body));
        (route, form)
    };

    match route {
        Route::Index => send(conn, &HttpResponse::ok_html("/", assets::INDEX_HTML)).await?,
        Route::Test => send(conn, &HttpResponse::ok_text("OK")).await?,
        Route::NotFound => send(conn, &HttpResponse::not_found()).await?,
        Route::Stylesheet => {
            let head = HttpResponse::ok_stream(
                assets::STYLESHEET_PATH,
                http::TEXT_CSS,
                assets::STYLESHEET.len(),
            );
            stream(conn, &head, assets::STYLESHEET, buf).await?;
        }
        Route::Connect => match form.unwrap_or(Err(FormError::InvalidFormBody)) {
            Ok(credentials) => {
                store.store(&credentials)?;
                info!("Received credentials for SSID {:?}", credentials.ssid);
                send(conn, &HttpResponse::ok_html("/", assets::CONNECT_HTML)).await?;
                delay.delay_ms(PORTAL_GRACE_MS).await;
                return Ok(Outcome::Submitted(credentials));
            }
            Err(e) => {
                warn!("Rejected submission: {}", e);
                send(conn, &HttpResponse::bad_request()).await?;
            }
        },
    }
    Ok(Outcome::Served)
}

async fn send<C: Connection>(conn: &mut C, response: &HttpResponse<'_>) -> Result<(), PortalError> {
    conn.write_all(response.head().as_bytes())
        .await
        .map_err(io_error)?;
    if let Body::Bytes(bytes) = response.body {
        conn.write_all(bytes).await.map_err(io_error)?;
    }
    conn.flush().await.map_err(io_error)
}

/// Writes the head, then forwards `source` in chunks of at most
/// [`STREAM_CHUNK_SIZE`] bytes through `buf`.
async fn stream<C, R>(
    conn: &mut C,
    head: &HttpResponse<'_>,
    mut source: R,
    buf: &mut [u8],
) -> Result<(), PortalError>
where
    C: Connection,
    R: embedded_io::Read,
{
    conn.write_all(head.head().as_bytes())
        .await
        .map_err(io_error)?;
    let chunk = &mut buf[..STREAM_CHUNK_SIZE];
    loop {
        let n = source.read(chunk).map_err(io_error)?;
        if n == 0 {
            break;
        }
        conn.write_all(&chunk[..n]).await.map_err(io_error)?;
    }
    conn.flush().await.map_err(io_error)
}
