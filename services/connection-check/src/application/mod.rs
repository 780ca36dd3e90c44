mod error;
pub mod opts;

pub use self::error::Error;

use common::err_context::ErrorContextExt;
use common::settings::{BackendSettings, Settings};
use std::sync::Arc;
use tracing::info;

use crate::api::{BackendClient, TestApi};
use crate::component::Mounted;
use crate::components::test_connection::{Props, TestConnection};
use crate::html::Html;

pub struct Application {
    api: Arc<dyn TestApi + Send + Sync>,
}

/// The view as first rendered, and once the backend check settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub initial: Html,
    pub settled: Html,
}

impl Rendered {
    /// The message shown once the check settled.
    pub fn message(&self) -> String {
        self.settled
            .find("p")
            .map(Html::text_content)
            .unwrap_or_default()
    }
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::default()
    }

    /// Mounts the connection check, waits for it to settle, and unmounts it.
    pub async fn run(&self) -> Rendered {
        let mut mounted = Mounted::<TestConnection>::mount(Props {
            api: Arc::clone(&self.api),
        });
        let initial = mounted.html().clone();
        mounted.next().await;
        let settled = mounted.html().clone();
        mounted.unmount();
        info!(text = %mounted.component().message(), "Connection check settled");
        Rendered { initial, settled }
    }
}

#[derive(Default)]
pub struct ApplicationBuilder {
    pub api: Option<Arc<dyn TestApi + Send + Sync>>,
}

impl ApplicationBuilder {
    pub fn new(settings: Settings) -> Result<Self, Error> {
        let Settings {
            backend,
            tracing: _,
            mode: _,
        } = settings;
        Self::default().backend(backend)
    }

    pub fn backend(mut self, settings: BackendSettings) -> Result<Self, Error> {
        let api_url = settings.api_url.clone();
        let client = BackendClient::new(settings)
            .context(format!("Could not create client for backend at {api_url}"))?;
        self.api = Some(Arc::new(client));
        Ok(self)
    }

    /// Uses the given implementation instead of a backend client.
    pub fn api(mut self, api: Arc<dyn TestApi + Send + Sync>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn build(self) -> Result<Application, Error> {
        let api = self.api.ok_or_else(|| Error::Incomplete {
            context: "No backend configured".to_string(),
        })?;
        Ok(Application { api })
    }
}
