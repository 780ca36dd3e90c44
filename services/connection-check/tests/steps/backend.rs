use cucumber::{given, then};
use std::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::state::TestWorld;

#[given(expr = "the backend answers {int} with body {string}")]
async fn backend_answers(world: &mut TestWorld, status: u16, body: String) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/test"))
        .respond_with(
            ResponseTemplate::new(status).set_body_raw(body.into_bytes(), "application/json"),
        )
        .mount(&server)
        .await;
    world.api_url = format!("{}/api", server.uri());
    world.backend = Some(server);
}

#[given("the backend is unreachable")]
async fn backend_unreachable(world: &mut TestWorld) {
    // Nobody listens on a port we just released.
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    world.api_url = format!("http://127.0.0.1:{port}/api");
    world.backend = None;
}

#[then(expr = "the backend received {int} request(s)")]
async fn backend_received(world: &mut TestWorld, count: usize) {
    let server = world.backend.as_ref().expect("no backend");
    let requests = server.received_requests().await.expect("request recording");
    assert_eq!(requests.len(), count);
}
