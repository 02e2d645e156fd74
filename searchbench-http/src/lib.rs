#![forbid(unsafe_code)]

mod client;
mod error;
mod pool;
mod types;
mod util;

pub use client::HttpClient;
pub use error::{Error, HttpTransportErrorKind, Result};
pub use pool::{BufferPool, PooledBuf};
pub use types::{ClientOptions, HttpResponse};

pub use hyper::Uri;
