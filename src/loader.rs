//! Asynchronous image loading interface.
//!
//! A loader receives a [`DecodeRequest`] and a [`LoadCallbacks`] pair: a style
//! transform to run on the decoded bitmap and a delivery to hand the result
//! back. Loaders must run both even when decoding fails (with `None`), and
//! must skip delivery once the request's [`LoadHandle`] is cancelled.
//!
//! Fetching bytes is the host's business and sits behind [`BitmapSource`];
//! this module decodes and down-samples with the `image` crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbaImage;
use image::imageops::FilterType;
use url::Url;

use crate::error::LoadError;

/// Transform applied to the decoded bitmap, possibly off-thread.
pub type StyleFn = Box<dyn FnOnce(Option<RgbaImage>) -> Option<RgbaImage> + Send>;
/// Hands the styled bitmap back to the view owner.
pub type DeliverFn = Box<dyn FnOnce(Option<RgbaImage>) + Send>;

/// What to load and how large it needs to be.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DecodeRequest {
    /// Source URL as written in the card.
    pub url: String,
    /// Host base for relative URLs.
    pub base_url: Option<String>,
    /// Decode no wider than this many pixels.
    pub size_hint: u32,
}

impl DecodeRequest {
    /// The URL to fetch after joining onto the base.
    pub fn resolved_url(&self) -> String {
        resolve_url(self.base_url.as_deref(), &self.url)
    }
}

/// The style/delivery capability pair for one request.
pub struct LoadCallbacks {
    style: StyleFn,
    deliver: DeliverFn,
}

impl core::fmt::Debug for LoadCallbacks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoadCallbacks").finish_non_exhaustive()
    }
}

impl LoadCallbacks {
    pub fn new(
        style: impl FnOnce(Option<RgbaImage>) -> Option<RgbaImage> + Send + 'static,
        deliver: impl FnOnce(Option<RgbaImage>) + Send + 'static,
    ) -> Self {
        Self {
            style: Box::new(style),
            deliver: Box::new(deliver),
        }
    }

    /// Style `decoded`, then deliver it unless `handle` was cancelled.
    /// Returns whether delivery ran.
    pub fn complete(self, handle: &LoadHandle, decoded: Option<RgbaImage>) -> bool {
        if handle.is_cancelled() {
            return false;
        }
        let styled = (self.style)(decoded);
        if handle.is_cancelled() {
            return false;
        }
        (self.deliver)(styled);
        true
    }
}

/// Cancellation token for an in-flight load. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct LoadHandle {
    cancelled: Arc<AtomicBool>,
}

impl LoadHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the load from delivering. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Something that turns a request into a delivered bitmap.
pub trait ImageLoader: Send + Sync {
    fn submit(&self, request: DecodeRequest, callbacks: LoadCallbacks) -> LoadHandle;
}

/// Host-provided byte source (network, disk, asset bundle).
pub trait BitmapSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError>;
}

impl<F> BitmapSource for F
where
    F: Fn(&str) -> Result<Vec<u8>, LoadError> + Send + Sync,
{
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        self(url)
    }
}

/// Resolve `url` against `base` the way a browser resolves an `<img src>`.
///
/// Absolute, protocol-relative and `data:` URLs are handled by the URL
/// parser. Without a usable base, or when joining fails, `url` comes back
/// unchanged.
pub fn resolve_url(base: Option<&str>, url: &str) -> String {
    let Some(base) = base.filter(|b| !b.is_empty()) else {
        return url.to_owned();
    };
    match Url::parse(base).and_then(|b| b.join(url)) {
        Ok(joined) => joined.into(),
        Err(e) => {
            log::debug!("cannot resolve {url:?} against {base:?}: {e}");
            url.to_owned()
        }
    }
}

/// Decode `bytes` and down-sample so the width is at most `size_hint`,
/// keeping the aspect ratio.
pub fn decode_bitmap(bytes: &[u8], size_hint: u32) -> Result<RgbaImage, LoadError> {
    let decoded = image::load_from_memory(bytes)?;
    let (w, h) = (decoded.width(), decoded.height());
    if size_hint == 0 || w <= size_hint {
        return Ok(decoded.into_rgba8());
    }
    let (w64, h64) = (u64::from(w), u64::from(h));
    let scaled_h = ((h64 * u64::from(size_hint) + w64 / 2) / w64).max(1);
    let scaled_h = u32::try_from(scaled_h).unwrap_or(u32::MAX);
    log::debug!("down-sampling {w}x{h} to {size_hint}x{scaled_h}");
    Ok(decoded
        .resize_exact(size_hint, scaled_h, FilterType::Triangle)
        .into_rgba8())
}

/// Fetch and decode, logging failures and yielding `None`.
fn load_blocking<S>(source: &S, request: &DecodeRequest) -> Option<RgbaImage>
where
    S: BitmapSource + ?Sized,
{
    let url = request.resolved_url();
    let result = source
        .fetch(&url)
        .and_then(|bytes| decode_bitmap(&bytes, request.size_hint));
    match result {
        Ok(bitmap) => Some(bitmap),
        Err(e) => {
            log::warn!("image load failed for {url}: {e}");
            None
        }
    }
}

/// Loads on the calling thread before `submit` returns.
#[derive(Debug)]
pub struct InlineLoader<S> {
    source: S,
}

impl<S: BitmapSource> InlineLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: BitmapSource> ImageLoader for InlineLoader<S> {
    fn submit(&self, request: DecodeRequest, callbacks: LoadCallbacks) -> LoadHandle {
        let handle = LoadHandle::new();
        let bitmap = load_blocking(&self.source, &request);
        callbacks.complete(&handle, bitmap);
        handle
    }
}

/// Loads on the tokio blocking pool.
#[cfg(feature = "tokio")]
#[derive(Debug)]
pub struct TaskLoader<S> {
    runtime: tokio::runtime::Handle,
    source: Arc<S>,
}

#[cfg(feature = "tokio")]
impl<S: BitmapSource + 'static> TaskLoader<S> {
    pub fn new(runtime: tokio::runtime::Handle, source: S) -> Self {
        Self {
            runtime,
            source: Arc::new(source),
        }
    }
}

#[cfg(feature = "tokio")]
impl<S: BitmapSource + 'static> ImageLoader for TaskLoader<S> {
    fn submit(&self, request: DecodeRequest, callbacks: LoadCallbacks) -> LoadHandle {
        let handle = LoadHandle::new();
        let task_handle = handle.clone();
        let source = Arc::clone(&self.source);
        self.runtime.spawn_blocking(move || {
            if task_handle.is_cancelled() {
                log::trace!("skipping cancelled load of {}", request.url);
                return;
            }
            let bitmap = load_blocking(source.as_ref(), &request);
            callbacks.complete(&task_handle, bitmap);
        });
        handle
    }
}
