use std::time::Duration;

use super::pool::PooledBuf;

#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    /// Response body. The buffer goes back to the client's pool when the response is dropped.
    pub body: PooledBuf,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// TCP connect timeout. The OS-level default can be tens of seconds, which makes an
    /// unreachable target look hung.
    pub connect_timeout: Option<Duration>,

    /// Maximum number of idle body buffers kept for reuse.
    pub max_idle_buffers: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(3)),
            max_idle_buffers: 256,
        }
    }
}
