//! Cache key generation using SHA-256 hashes

use sha2::{Digest, Sha256};

/// Generate a deterministic cache key from endpoint and parameters.
///
/// The key is a SHA-256 hash of the endpoint and sorted parameters.
/// This ensures consistent keys regardless of parameter order.
pub fn cache_key(endpoint: &str, params: &[(&str, &str)]) -> String {
    let mut hasher = Sha256::new();

    hasher.update(endpoint.as_bytes());
    hasher.update(b"|");

    // Sort params for deterministic key
    let mut sorted_params: Vec<_> = params.iter().collect();
    sorted_params.sort_by_key(|(k, _)| *k);

    for (k, v) in sorted_params {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }

    // Return hex-encoded hash, prefixed so clear-patterns can target an endpoint
    format!("{}:{:x}", endpoint, hasher.finalize())
}
