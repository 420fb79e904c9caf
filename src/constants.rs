//! # System Constants
//!
//! Wire paths shared between the outbound clients and the inbound router.

use reqwest::Url;

/// HTTP paths on processors and on peer replicas
pub mod paths {
    // Outbound, on each payment processor
    pub const PROCESSOR_PAYMENTS: &str = "/payments";
    pub const PROCESSOR_SERVICE_HEALTH: &str = "/payments/service-health";

    // Inbound, served by this gateway
    pub const PAYMENTS: &str = "/payments";
    pub const PAYMENTS_SUMMARY: &str = "/payments-summary";
    pub const PURGE_PAYMENTS: &str = "/purge-payments";
    pub const HEALTH: &str = "/health";

    /// Peer surface; followers append `/default` or `/fallback`
    pub const INTERNAL_HEALTH: &str = "/internal/health";
}

/// Build the peer path for one backend, e.g. `/internal/health/default`
pub fn internal_health_path(processor: crate::models::ProcessorRole) -> String {
    format!("{}/{}", paths::INTERNAL_HEALTH, processor.as_str())
}

/// Resolve `path` beneath `base`, keeping any path prefix `base` carries.
///
/// `http://proxy/processor-default` + `/payments` gives
/// `http://proxy/processor-default/payments`, where a plain [`Url::join`]
/// would drop the prefix.
pub fn resolve_under(base: &Url, path: &str) -> Option<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let directory = format!("{}/", base.path());
        base.set_path(&directory);
    }
    base.join(path.trim_start_matches('/')).ok()
}
