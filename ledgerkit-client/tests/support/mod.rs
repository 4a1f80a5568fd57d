//! Shared setup for integration tests against a mocked account service.

use ledgerkit_client::ClientConfig;
use tempfile::TempDir;

/// Config pointing at a mock server, with credential storage in a fresh
/// temporary directory. The directory guard must outlive the test.
pub fn test_config(server_uri: &str) -> (ClientConfig, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = ClientConfig {
        api_base_url: server_uri.to_string(),
        request_timeout_ms: 5_000,
        credential_path: dir.path().join("credential.json"),
    };
    (config, dir)
}
