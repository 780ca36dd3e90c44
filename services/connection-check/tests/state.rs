use connection_check::application::Rendered;
use cucumber::World;
use std::fmt;
use wiremock::MockServer;

/// The TestWorld carries what a scenario needs between its steps: the fake
/// backend, the URL the front end is pointed at, and what was rendered.
#[derive(World)]
#[world(init = Self::new)]
pub struct TestWorld {
    // A Mock Server, so we don't need the real backend.
    pub backend: Option<MockServer>,
    pub api_url: String,
    pub rendered: Option<Rendered>,
}

impl TestWorld {
    pub fn new() -> Self {
        TestWorld {
            backend: None,
            api_url: String::new(),
            rendered: None,
        }
    }

    pub fn rendered(&self) -> &Rendered {
        self.rendered
            .as_ref()
            .expect("the connection check was not opened")
    }
}

impl fmt::Debug for TestWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestWorld")
            .field("backend", &self.backend.as_ref().map(MockServer::uri))
            .field("api_url", &self.api_url)
            .field("rendered", &self.rendered)
            .finish()
    }
}
