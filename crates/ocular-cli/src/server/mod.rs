//! HTTP server startup and shutdown.

mod error;
mod http_server;
mod shutdown;

pub use error::{Result, ServerError};
pub use http_server::serve_http as serve;
use shutdown::{shutdown_signal, with_deadline};
