//! Ingress address lookup

use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Outcome of reading an ingress' load balancer address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngressLookup {
    /// The load balancer has been assigned this IP
    Ready(String),
    /// The object exists but the cloud provider has not published an address yet
    NotYetAvailable,
}

/// Parse `kubectl get ingress -o json` output.
///
/// A missing or empty `status.loadBalancer.ingress` is not an error, it just
/// means provisioning is still in progress. Output that is not JSON is.
pub fn parse_ingress_ip(json: &str) -> AppResult<IngressLookup> {
    let doc: Value =
        serde_json::from_str(json).map_err(|e| AppError::parse("ingress JSON", e))?;

    let ip = doc
        .pointer("/status/loadBalancer/ingress")
        .and_then(|v| v.as_array())
        .and_then(|entries| entries.first())
        .and_then(|entry| entry.get("ip"))
        .and_then(|ip| ip.as_str())
        .filter(|ip| !ip.is_empty());

    Ok(match ip {
        Some(ip) => IngressLookup::Ready(ip.to_string()),
        None => IngressLookup::NotYetAvailable,
    })
}
