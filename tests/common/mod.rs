//! Helpers shared by the tests that run against a mock backend.

#![allow(dead_code)]

use std::net::TcpListener;
use std::time::Duration;

use httpmock::MockServer;
use transinia::api::ApiClient;

pub const JSON: &str = "application/json";

/// Client pointed at the mock server.
pub fn client(server: &MockServer) -> ApiClient {
    client_for(&server.base_url(), Duration::from_secs(10))
}

/// Client that ignores proxy settings from the environment.
pub fn client_for(base_url: &str, timeout: Duration) -> ApiClient {
    let http = reqwest::blocking::Client::builder()
        .no_proxy()
        .timeout(timeout)
        .build()
        .unwrap();
    ApiClient::from_parts(base_url, http).unwrap()
}

/// A base URL nothing is listening on.
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
