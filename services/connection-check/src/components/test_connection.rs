use std::fmt;
use std::sync::Arc;

use crate::api::{FetchOutcome, TestApi, FALLBACK_MESSAGE};
use crate::component::{Component, Context};
use crate::html::Html;

pub const HEADING: &str = "Test Backend Connection";
pub const LOADING_MESSAGE: &str = "Loading...";

/// The text shown below the heading: the placeholder until the fetch
/// settles, then the backend's message or the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage(String);

impl DisplayMessage {
    pub fn loading() -> Self {
        DisplayMessage(LOADING_MESSAGE.to_string())
    }

    pub fn from_outcome(outcome: &FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Success(resp) => DisplayMessage(resp.message.clone()),
            FetchOutcome::Failed(_) => DisplayMessage(FALLBACK_MESSAGE.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayMessage {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

pub struct Props {
    pub api: Arc<dyn TestApi + Send + Sync>,
}

pub enum Msg {
    SetOutcome(FetchOutcome),
}

/// Checks the backend once when mounted, and shows what it answered.
pub struct TestConnection {
    message: DisplayMessage,
}

impl TestConnection {
    pub fn message(&self) -> &DisplayMessage {
        &self.message
    }
}

impl Component for TestConnection {
    type Message = Msg;
    type Properties = Props;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            message: DisplayMessage::loading(),
        }
    }

    fn mounted(&mut self, ctx: &Context<Self>) {
        let api = Arc::clone(&ctx.props().api);
        ctx.link()
            .send_future(async move { Msg::SetOutcome(api.fetch_test().await) });
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SetOutcome(outcome) => {
                self.message = DisplayMessage::from_outcome(&outcome);
                true
            }
        }
    }

    fn view(&self) -> Html {
        Html::element("div")
            .attr("style", "text-align: center; margin-top: 50px")
            .child(Html::element("h1").child(Html::text(HEADING)))
            .child(Html::element("p").child(Html::text(self.message.as_str())))
    }
}
