//! Render coordination: turns an [`ImageSpec`] into nodes in a [`ViewTree`].
//!
//! ```text
//!   ImageSpec ──► ImagePlan (color, decode hint, constraints, layout)
//!                    │
//!                    ├─► loader.submit(request, style ⨯ deliver)
//!                    │        └─ off-thread ─► DeliveryQueue ─► ViewTree::apply_deliveries
//!                    │
//!                    └─► separator, image view, optional stretch wrapper, Tag
//! ```

use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::card::{CardElement, ImageSetSpec, ImageSpec, SelectAction};
use crate::config::{DisplayMetrics, HostConfig};
use crate::error::RenderError;
use crate::loader::{ImageLoader, LoadCallbacks, LoadHandle};
use crate::plan::ImagePlan;
use crate::registry::RendererRegistry;
use crate::style::apply_style;
use crate::view::{ContainerKind, Delivery, Tag, ViewId, ViewKind, ViewTree};

/// Binds a tappable view to the host's action handling.
pub trait ActionDispatcher {
    fn bind(&self, view: ViewId, action: &SelectAction);
}

/// Everything a render call needs from its caller.
pub struct RenderContext<'a> {
    pub tree: &'a mut ViewTree,
    /// Container the element is appended to.
    pub parent: ViewId,
    pub metrics: DisplayMetrics,
    /// Used when the registry holds no custom loader.
    pub loader: &'a dyn ImageLoader,
    /// Sending end of the tree owner's delivery queue.
    pub deliveries: Sender<Delivery>,
    pub actions: Option<&'a dyn ActionDispatcher>,
}

/// Handles produced by one image render.
#[derive(Debug)]
pub struct RenderOutput {
    /// The image view. Carries the [`Tag`].
    pub image: ViewId,
    /// Stretch wrapper attached in place of the image, if one was needed.
    pub wrapper: Option<ViewId>,
    pub separator: Option<ViewId>,
    /// Cancels the in-flight decode.
    pub load: LoadHandle,
}

impl RenderOutput {
    /// The node attached directly to the parent.
    pub fn root(&self) -> ViewId {
        self.wrapper.unwrap_or(self.image)
    }
}

/// Renders image elements. Holds only a reference to the registry, so one
/// renderer can be created per card or shared.
#[derive(Debug, Clone, Copy)]
pub struct ImageRenderer<'r> {
    registry: &'r RendererRegistry,
}

impl<'r> ImageRenderer<'r> {
    pub fn new(registry: &'r RendererRegistry) -> Self {
        Self { registry }
    }

    /// Render `spec` into `ctx.parent`.
    ///
    /// `in_collection` is true when the parent is a horizontal image
    /// collection; it turns off the stretch wrapper.
    pub fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        spec: Arc<ImageSpec>,
        host: &HostConfig,
        in_collection: bool,
    ) -> Result<RenderOutput, RenderError> {
        self.render_at(ctx, spec, host, in_collection, usize::MAX)
    }

    /// [`render`](Self::render) with the separator and root placed at
    /// `index` among the parent's children instead of at the end.
    fn render_at(
        &self,
        ctx: &mut RenderContext<'_>,
        spec: Arc<ImageSpec>,
        host: &HostConfig,
        in_collection: bool,
        index: usize,
    ) -> Result<RenderOutput, RenderError> {
        let parent = ctx.parent;
        let Some(node) = ctx.tree.node(parent) else {
            return Err(RenderError::UnknownView(parent));
        };
        let index = index.min(node.children.len());
        let separator = ctx.tree.insert_separator(
            parent,
            index,
            spec.spacing,
            spec.separator,
            !in_collection,
        )?;
        let index = index + usize::from(separator.is_some());

        let plan = ImagePlan::new(&spec, host, &ctx.metrics, in_collection);
        log::debug!(
            "rendering image {} size={:?} height={:?} wrapper={}",
            spec.url,
            spec.size,
            spec.height,
            plan.layout.wrapper
        );

        let image = ctx.tree.create(ViewKind::Image {
            constraints: plan.constraints,
            bitmap: None,
        });
        let generation = ctx.tree.next_generation();
        if let Some(node) = ctx.tree.node_mut(image) {
            node.layout = Some(plan.image_params);
            if let Some(bg) = plan.view_background {
                node.background = bg;
            }
        }

        let load = self.submit(ctx, &spec, &plan, image, generation);

        let wrapper = match plan.wrapper_params {
            Some(params) => {
                let wrapper = ctx.tree.create(ViewKind::Container(ContainerKind::Stretch));
                if let Some(node) = ctx.tree.node_mut(wrapper) {
                    node.layout = Some(params);
                }
                ctx.tree.attach(wrapper, image)?;
                ctx.tree.insert(parent, index, wrapper)?;
                Some(wrapper)
            }
            None => {
                ctx.tree.insert(parent, index, image)?;
                None
            }
        };

        if let Some(node) = ctx.tree.node_mut(image) {
            node.tag = Some(Tag {
                spec: Arc::clone(&spec),
                separator,
                parent,
                stretch_container: wrapper,
                generation,
            });
        }
        ctx.tree.set_visibility(image, spec.is_visible)?;

        if let Some(action) = &spec.select_action {
            if let Some(node) = ctx.tree.node_mut(image) {
                node.clickable = true;
            }
            if let Some(dispatcher) = ctx.actions {
                dispatcher.bind(image, action);
            }
        }

        Ok(RenderOutput {
            image,
            wrapper,
            separator,
            load,
        })
    }

    /// Render a card element that must be an image.
    pub fn render_element(
        &self,
        ctx: &mut RenderContext<'_>,
        element: &CardElement,
        host: &HostConfig,
    ) -> Result<RenderOutput, RenderError> {
        let CardElement::Image(spec) = element else {
            return Err(RenderError::NotAnImage(element.kind()));
        };
        let in_collection =
            ctx.tree.container_kind(ctx.parent) == Some(ContainerKind::HorizontalFlow);
        self.render(ctx, Arc::new(spec.clone()), host, in_collection)
    }

    /// Render an image set as a horizontal collection. Every image takes the
    /// set's size bucket. Returns the collection container and the outputs.
    pub fn render_image_set(
        &self,
        ctx: &mut RenderContext<'_>,
        set: &ImageSetSpec,
        host: &HostConfig,
    ) -> Result<(ViewId, Vec<RenderOutput>), RenderError> {
        let outer = ctx.parent;
        let separator = ctx
            .tree
            .add_separator(outer, set.spacing, set.separator, true)?;
        let collection = ctx.tree.add_container(outer, ContainerKind::HorizontalFlow)?;
        if let Some(node) = ctx.tree.node_mut(collection) {
            node.visible = set.is_visible;
        }
        if let Some(sep) = separator.and_then(|id| ctx.tree.node_mut(id)) {
            sep.visible = set.is_visible;
        }

        ctx.parent = collection;
        let outputs = set
            .images
            .iter()
            .map(|image| {
                let spec = ImageSpec {
                    size: set.image_size,
                    ..image.clone()
                };
                self.render(ctx, Arc::new(spec), host, true)
            })
            .collect::<Result<Vec<_>, _>>();
        ctx.parent = outer;
        Ok((collection, outputs?))
    }

    /// Render into the slot held by `previous`.
    ///
    /// Cancels its load and frees its nodes, then renders `spec` at the same
    /// position in `ctx.parent`. The separator is recomputed for that
    /// position. When `previous` no longer sits in `ctx.parent`, the new
    /// view is appended instead. Late bitmaps for the old view are dropped.
    pub fn rerender(
        &self,
        ctx: &mut RenderContext<'_>,
        previous: RenderOutput,
        spec: Arc<ImageSpec>,
        host: &HostConfig,
        in_collection: bool,
    ) -> Result<RenderOutput, RenderError> {
        previous.load.cancel();
        let parent = ctx.parent;
        let in_parent = |tree: &ViewTree, id: ViewId| {
            tree.node(id).is_some_and(|n| n.parent == Some(parent))
        };
        let leading = previous
            .separator
            .filter(|sep| in_parent(&*ctx.tree, *sep))
            .unwrap_or(previous.root());
        let index = if in_parent(&*ctx.tree, leading) {
            ctx.tree.index_in_parent(leading).unwrap_or(usize::MAX)
        } else {
            usize::MAX
        };

        for id in [previous.separator, Some(previous.root())].into_iter().flatten() {
            if ctx.tree.node(id).is_some() {
                ctx.tree.remove(id)?;
            }
        }
        self.render_at(ctx, spec, host, in_collection, index)
    }

    fn submit(
        &self,
        ctx: &RenderContext<'_>,
        spec: &ImageSpec,
        plan: &ImagePlan,
        view: ViewId,
        generation: u64,
    ) -> LoadHandle {
        let style = spec.style;
        let background = plan.background;
        let tx = ctx.deliveries.clone();
        let callbacks = LoadCallbacks::new(
            move |bitmap| apply_style(bitmap, style, background),
            move |bitmap| {
                // The tree may already be gone; nothing to deliver to then.
                let _ = tx.send(Delivery {
                    view,
                    generation,
                    bitmap,
                });
            },
        );
        let request = plan.decode.clone();
        match self.registry.online_loader() {
            Some(custom) => custom.submit(request, callbacks),
            None => ctx.loader.submit(request, callbacks),
        }
    }
}
