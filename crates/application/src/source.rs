use std::future::Future;
use std::pin::Pin;

use storydeck_core::Story;
use thiserror::Error;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {status}")]
    Http { status: u16 },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("{0} not found")]
    NotFound(String),
}

/// Read-only access to the story catalog.
///
/// The views never call the network directly; they ask for a load and receive
/// the outcome later as a [`LoadEvent`]. Tests plug in an in-memory source.
pub trait StorySource: Send + Sync {
    fn load_catalog(&self) -> BoxFuture<'_, Result<Vec<Story>, FetchError>>;

    fn load_story<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Story, FetchError>>;

    /// Raw bytes of an already resolved image URL.
    fn load_image<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>>;
}

/// Tags a request so that only the most recent response is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(pub u64);

impl RequestToken {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug)]
pub enum LoadEvent {
    Catalog {
        token: RequestToken,
        result: Result<Vec<Story>, FetchError>,
    },
    Story {
        token: RequestToken,
        id: String,
        result: Result<Story, FetchError>,
    },
    Image {
        url: String,
        result: Result<Vec<u8>, FetchError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase() {
        let token = RequestToken::default();
        assert!(token.next() > token);
        assert_eq!(token.next().next(), RequestToken(2));
    }

    #[test]
    fn fetch_errors_render_readably() {
        assert_eq!(FetchError::Http { status: 503 }.to_string(), "HTTP 503");
        assert_eq!(
            FetchError::NotFound("story abc".to_string()).to_string(),
            "story abc not found"
        );
    }
}
