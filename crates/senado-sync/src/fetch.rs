//! The fetcher seam between query functions and the network.

use async_trait::async_trait;
use serde_json::Value;

/// Fetches one endpoint of the service and decodes it into a nested mapping.
///
/// Implementations never fail outward: any transport or decoding problem is
/// reported through their own channel and surfaces here as `None`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `path` (relative to the service base URL) with flat query `params`.
    async fn fetch(&self, path: &str, params: &[(&str, String)]) -> Option<Value>;
}

/// Receives user-visible failure messages from a fetcher.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Notifier that only relies on the fetcher's own `tracing` output.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, _message: &str) {}
}
