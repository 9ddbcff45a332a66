use crate::{option::NoteServiceOptions, NoteService};
use serde_json::{json, Value};
use std::net::{SocketAddr, TcpListener};
use wiremock::MockServer;

/// Binds an ephemeral local port and releases it, so connecting to it is refused
/// until something listens there again.
pub(crate) fn reserve_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr")
}

pub(crate) fn base_url_for(addr: SocketAddr) -> String {
    format!("http://{addr}/api")
}

pub(crate) fn unreachable_base_url() -> String {
    base_url_for(reserve_addr())
}

/// Starts a mock server on an address previously handed out by [`reserve_addr`].
pub(crate) async fn start_server_on(addr: SocketAddr) -> MockServer {
    let listener = TcpListener::bind(addr).expect("rebind reserved port");
    MockServer::builder().listener(listener).start().await
}

pub(crate) fn api_url(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

pub(crate) fn service_for(server: &MockServer) -> NoteService {
    NoteService::new_with_options(
        NoteServiceOptions::builder()
            .api_base_url(api_url(server))
            .build(),
    )
    .expect("valid mock server url")
}

/// A note as the reference backend returns it.
pub(crate) fn note_json(id: &str, title: &str, content: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "content": content,
        "createdAt": "2024-01-15T10:30:00.000Z",
        "updatedAt": "2024-01-15T10:30:00.000Z",
        "__v": 0
    })
}
