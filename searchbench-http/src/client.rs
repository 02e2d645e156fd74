use bytes::Bytes;
use http_body_util::{BodyExt as _, Empty};
use hyper::{Request, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;
use std::time::Duration;

use super::pool::BufferPool;
use super::util::{join_path, normalize_base_url};
use super::{ClientOptions, Error, HttpResponse, Result};

/// Pooled HTTP/1 client bound to one target base URL.
///
/// Cloning is cheap; clones share the connection pool and the body buffer pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    base_url: Arc<str>,
    buffers: BufferPool,
}

impl HttpClient {
    pub fn new(target: &str, opts: ClientOptions) -> Result<Self> {
        let base_url = normalize_base_url(target)?;

        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false);
        http_connector.set_connect_timeout(opts.connect_timeout);
        http_connector.set_nodelay(true);

        let https_connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector);

        let inner = Client::builder(TokioExecutor::new()).build(https_connector);

        Ok(Self {
            inner,
            base_url: Arc::from(base_url),
            buffers: BufferPool::new(opts.max_idle_buffers),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URI for `path` (path plus optional query) on the bound target.
    ///
    /// Parse once per endpoint and reuse the result for every request against it.
    pub fn uri_for(&self, path: &str) -> Result<Uri> {
        let url = join_path(&self.base_url, path);
        url.parse::<Uri>().map_err(|_| Error::InvalidUrl(url))
    }

    #[must_use]
    pub fn buffers(&self) -> &BufferPool {
        &self.buffers
    }

    /// Single GET with an overall `timeout` covering connect, response head and body.
    ///
    /// Expiry is reported as [`Error::Timeout`]. Nothing is retried.
    pub async fn get(&self, uri: &Uri, timeout: Duration) -> Result<HttpResponse> {
        match tokio::time::timeout(timeout, self.get_inner(uri)).await {
            Ok(res) => res,
            Err(_) => Err(Error::Timeout(timeout)),
        }
    }

    async fn get_inner(&self, uri: &Uri) -> Result<HttpResponse> {
        let req = Request::builder()
            .method(http::Method::GET)
            .uri(uri.clone())
            .body(Empty::<Bytes>::new())?;

        let res = self.inner.request(req).await?;
        let (parts, mut body) = res.into_parts();

        let mut buf = self.buffers.acquire();
        while let Some(frame) = body.frame().await {
            if let Ok(data) = frame?.into_data() {
                buf.extend_from_slice(&data);
            }
        }

        Ok(HttpResponse {
            status: parts.status.as_u16(),
            body: buf,
        })
    }
}
