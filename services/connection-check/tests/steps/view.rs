use common::settings::BackendSettings;
use connection_check::application::Application;
use connection_check::html::Html;
use cucumber::{then, when};

use crate::state::TestWorld;

#[when("the user opens the connection check")]
async fn open_connection_check(world: &mut TestWorld) {
    let app = Application::builder()
        .backend(BackendSettings {
            api_url: world.api_url.clone(),
            timeout: Some(2),
        })
        .expect("backend client")
        .build()
        .expect("application");
    world.rendered = Some(app.run().await);
}

#[then(expr = "the page first shows {string}")]
async fn first_shows(world: &mut TestWorld, text: String) {
    let initial = world.rendered().initial.find("p").map(Html::text_content);
    assert_eq!(initial, Some(text));
}

#[then(expr = "the page finally shows {string}")]
async fn finally_shows(world: &mut TestWorld, text: String) {
    assert_eq!(world.rendered().message(), text);
}

#[then(expr = "the page has the heading {string}")]
async fn has_heading(world: &mut TestWorld, text: String) {
    let heading = world.rendered().settled.find("h1").map(Html::text_content);
    assert_eq!(heading, Some(text));
}
