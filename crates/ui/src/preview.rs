use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use ratatui::layout::Rect;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::Protocol as ImageProtocol;
use ratatui_image::Resize;
use storydeck_application::FetchError;

const MAX_CACHED_IMAGES: usize = 24;

#[derive(Debug, Clone)]
pub(crate) enum Preview {
    Pending,
    Ready(Arc<image::DynamicImage>),
    Failed(String),
}

struct Rendered {
    url: String,
    area: Rect,
    protocol: ImageProtocol,
}

/// Decoded story images keyed by resolved URL, plus the last encoded frame.
#[derive(Default)]
pub(crate) struct PreviewCache {
    entries: HashMap<String, Preview>,
    order: VecDeque<String>,
    rendered: Option<Rendered>,
}

impl PreviewCache {
    /// Marks `url` as in flight. Returns `true` when the caller should fetch it.
    pub(crate) fn request(&mut self, url: &str) -> bool {
        if self.entries.contains_key(url) {
            return false;
        }
        self.remember(url.to_string(), Preview::Pending);
        true
    }

    pub(crate) fn get(&self, url: &str) -> Option<&Preview> {
        self.entries.get(url)
    }

    pub(crate) fn insert(&mut self, url: String, result: Result<Vec<u8>, FetchError>) {
        let preview = match result.map_err(|e| e.to_string()).and_then(|bytes| {
            image::load_from_memory(&bytes).map_err(|e| format!("decode failed: {e}"))
        }) {
            Ok(img) => Preview::Ready(Arc::new(img)),
            Err(err) => {
                tracing::debug!(%url, error = %err, "image unavailable");
                Preview::Failed(err)
            }
        };
        if self.rendered.as_ref().is_some_and(|r| r.url == url) {
            self.rendered = None;
        }
        self.remember(url, preview);
    }

    fn remember(&mut self, url: String, preview: Preview) {
        if self.entries.insert(url.clone(), preview).is_none() {
            self.order.push_back(url);
        }
        while self.order.len() > MAX_CACHED_IMAGES {
            if let Some(old) = self.order.pop_front() {
                self.entries.remove(&old);
            }
        }
    }

    /// Encoded protocol for `url` fitted into `area`; reused while both match.
    pub(crate) fn protocol(
        &mut self,
        picker: &Picker,
        url: &str,
        area: Rect,
    ) -> Option<&ImageProtocol> {
        let fresh = self
            .rendered
            .as_ref()
            .is_some_and(|r| r.url == url && r.area == area);
        if !fresh {
            let Some(Preview::Ready(img)) = self.entries.get(url) else {
                return None;
            };
            match picker.new_protocol((**img).clone(), area, Resize::Fit(None)) {
                Ok(protocol) => {
                    self.rendered = Some(Rendered {
                        url: url.to_string(),
                        area,
                        protocol,
                    });
                }
                Err(err) => {
                    tracing::debug!(%url, error = ?err, "image protocol failed");
                    self.rendered = None;
                    return None;
                }
            }
        }
        self.rendered.as_ref().map(|r| &r.protocol)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
