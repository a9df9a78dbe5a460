//! Image layout and style resolution for card-based document renderers.
//!
//! Given an image element from a card payload, the host's size buckets and
//! the display metrics, this crate decides how the image is measured, laid
//! out, colored and styled, then builds it into a retained [`ViewTree`] and
//! hands decoding to a pluggable [`ImageLoader`].
//!
//! # Modules
//!
//! - [`color`]: `#AARRGGBB` background parsing
//! - [`constraint`]: size buckets, dp conversion, measurement constraints
//! - [`style`]: the circular `Person` avatar transform
//! - [`layout`]: layout params and the stretch-wrapper decision
//! - [`plan`]: everything resolved before touching the tree
//! - [`card`]: the JSON element model
//! - [`loader`]: asynchronous decode interface and built-in loaders
//! - [`view`]: the view arena and bitmap delivery queue
//! - [`render`]: the coordinator tying it together
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cardimage::{
//!     CardElement, DeliveryQueue, DisplayMetrics, HostConfig, ImageRenderer, InlineLoader,
//!     LoadError, RenderContext, RendererRegistry, ViewTree,
//! };
//!
//! let element = CardElement::from_json(r#"{"type": "Image", "url": "a.png", "size": "small"}"#)?;
//!
//! let loader = InlineLoader::new(|url: &str| -> Result<Vec<u8>, LoadError> {
//!     Err(LoadError::Fetch { url: url.into(), reason: "offline".into() })
//! });
//! let registry = RendererRegistry::new();
//! let queue = DeliveryQueue::new();
//! let mut tree = ViewTree::new();
//! let root = tree.root();
//!
//! let mut ctx = RenderContext {
//!     tree: &mut tree,
//!     parent: root,
//!     metrics: DisplayMetrics::default(),
//!     loader: &loader,
//!     deliveries: queue.sender(),
//!     actions: None,
//! };
//! let out = ImageRenderer::new(&registry)
//!     .render_element(&mut ctx, &element, &HostConfig::default())
//!     .unwrap();
//!
//! // A failed fetch still delivers, with no bitmap.
//! assert_eq!(tree.apply_deliveries(&queue), 1);
//! assert!(tree.node(out.image).unwrap().bitmap().is_none());
//! # Ok::<(), cardimage::CardError>(())
//! ```

#![forbid(unsafe_code)]

pub mod card;
pub mod color;
pub mod config;
pub mod constraint;
pub mod error;
pub mod layout;
pub mod loader;
pub mod plan;
pub mod registry;
pub mod render;
pub mod style;
pub mod view;

pub use card::{CardElement, ImageSetSpec, ImageSpec, SelectAction, Spacing, parse_body};
pub use color::{Argb, parse_background_color};
pub use config::{DisplayMetrics, HostConfig, ImageSizesConfig};
pub use constraint::{ImageSize, ScaleType, Size, SizeConstraints, dp_to_pixels, size_limit};
pub use error::{CardError, ConfigError, LoadError, RenderError};
pub use layout::{
    Dimension, HeightMode, HorizontalAlignment, HorizontalGravity, ImageLayout, LayoutParams,
    build_layout,
};
#[cfg(feature = "tokio")]
pub use loader::TaskLoader;
pub use loader::{
    BitmapSource, DecodeRequest, ImageLoader, InlineLoader, LoadCallbacks, LoadHandle,
    decode_bitmap, resolve_url,
};
pub use plan::ImagePlan;
pub use registry::RendererRegistry;
pub use render::{ActionDispatcher, ImageRenderer, RenderContext, RenderOutput};
pub use style::{ImageStyle, apply_style};
pub use view::{ContainerKind, Delivery, DeliveryQueue, Node, Tag, ViewId, ViewKind, ViewTree};
