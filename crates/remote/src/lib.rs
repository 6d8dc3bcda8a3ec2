//! HTTP access to the story API and the background loader that feeds the UI.

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use storydeck_application::{BoxFuture, FetchError, LoadEvent, RequestToken, StorySource};
use storydeck_core::{Settings, Story};

pub struct HttpStorySource {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpStorySource {
    pub fn new(settings: &Settings) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }

    pub fn catalog_url(&self) -> &str {
        &self.base_url
    }

    pub fn story_url(&self, id: &str) -> Result<String, FetchError> {
        story_url(&self.base_url, id)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl StorySource for HttpStorySource {
    fn load_catalog(&self) -> BoxFuture<'_, Result<Vec<Story>, FetchError>> {
        Box::pin(async move {
            tracing::debug!(url = %self.base_url, "fetching catalog");
            let body = self.get_bytes(&self.base_url).await?;
            parse_catalog(&body)
        })
    }

    fn load_story<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Story, FetchError>> {
        Box::pin(async move {
            let url = self.story_url(id)?;
            tracing::debug!(%url, "fetching story");
            let body = self.get_bytes(&url).await.map_err(|err| match err {
                FetchError::NotFound(_) => FetchError::NotFound(format!("story {id}")),
                other => other,
            })?;
            parse_story(&body, id)
        })
    }

    fn load_image<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>> {
        Box::pin(async move {
            tracing::trace!(%url, "fetching image");
            self.get_bytes(url).await
        })
    }
}

fn story_url(base: &str, id: &str) -> Result<String, FetchError> {
    let mut url = reqwest::Url::parse(base).map_err(|e| FetchError::Transport(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::Transport(format!("{base} cannot take a path")))?
        .pop_if_empty()
        .push(id);
    Ok(url.to_string())
}

/// A `null` body decodes to an empty catalog.
pub fn parse_catalog(body: &[u8]) -> Result<Vec<Story>, FetchError> {
    let stories: Option<Vec<Story>> =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(stories.unwrap_or_default())
}

/// The API answers an unknown id with `null` rather than 404.
pub fn parse_story(body: &[u8], id: &str) -> Result<Story, FetchError> {
    let story: Option<Story> =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    story.ok_or_else(|| FetchError::NotFound(format!("story {id}")))
}

/// Runs fetches on a tokio runtime and posts the outcomes to a channel the
/// UI drains between frames. Requests are never cancelled; the views discard
/// superseded responses by token.
#[derive(Clone)]
pub struct Loader {
    source: Arc<dyn StorySource>,
    handle: tokio::runtime::Handle,
    tx: mpsc::Sender<LoadEvent>,
}

impl Loader {
    pub fn new(
        source: Arc<dyn StorySource>,
        handle: tokio::runtime::Handle,
    ) -> (Self, mpsc::Receiver<LoadEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { source, handle, tx }, rx)
    }

    pub fn catalog(&self, token: RequestToken) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let result = source.load_catalog().await;
            let _ = tx.send(LoadEvent::Catalog { token, result });
        });
    }

    pub fn story(&self, token: RequestToken, id: String) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let result = source.load_story(&id).await;
            let _ = tx.send(LoadEvent::Story { token, id, result });
        });
    }

    pub fn image(&self, url: String) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let result = source.load_image(&url).await;
            let _ = tx.send(LoadEvent::Image { url, result });
        });
    }
}
