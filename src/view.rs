//! Retained view arena standing in for the host widget tree.
//!
//! Nodes hold what a host needs to build its native widgets: layout params,
//! size constraints, background fill, bitmap, visibility, clickability and
//! the [`Tag`] stamped by the renderer. Separator nodes record spacing and
//! line visibility only; drawing them is the host's job.
//!
//! Bitmaps decoded off-thread arrive through a [`DeliveryQueue`]; the thread
//! that owns the tree drains it with [`ViewTree::apply_deliveries`].
//!
//! Removed nodes give their slot back to the arena. A [`ViewId`] carries the
//! slot's epoch, so an id held past removal resolves to nothing instead of to
//! whichever node reuses the slot.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use image::RgbaImage;

use crate::card::{ImageSpec, Spacing};
use crate::color::Argb;
use crate::constraint::SizeConstraints;
use crate::error::RenderError;
use crate::layout::LayoutParams;

/// Handle to a node in a [`ViewTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId {
    slot: u32,
    epoch: u32,
}

/// Layout behavior of a container.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Children stacked top to bottom.
    Vertical,
    /// Children flowed left to right, wrapping; hosts image collections.
    HorizontalFlow,
    /// Single-child container that owns a stretch weight.
    Stretch,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewKind {
    Container(ContainerKind),
    Image {
        constraints: SizeConstraints,
        bitmap: Option<RgbaImage>,
    },
    Separator {
        spacing: Spacing,
        /// Draw a line, not just a gap.
        line: bool,
        /// Line runs horizontally (between stacked elements).
        horizontal: bool,
    },
}

/// Metadata bound to a rendered image view for later mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    pub spec: Arc<ImageSpec>,
    pub separator: Option<ViewId>,
    pub parent: ViewId,
    /// Wrapper inserted for stretch height, if any.
    pub stretch_container: Option<ViewId>,
    /// Identifies the render that produced this view.
    pub generation: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: ViewKind,
    pub layout: Option<LayoutParams>,
    pub background: Argb,
    pub visible: bool,
    pub clickable: bool,
    pub parent: Option<ViewId>,
    pub children: Vec<ViewId>,
    pub tag: Option<Tag>,
}

impl Node {
    fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            layout: None,
            background: Argb::TRANSPARENT,
            visible: true,
            clickable: false,
            parent: None,
            children: Vec::new(),
            tag: None,
        }
    }

    /// The decoded bitmap, for image nodes that have received one.
    pub fn bitmap(&self) -> Option<&RgbaImage> {
        match &self.kind {
            ViewKind::Image { bitmap, .. } => bitmap.as_ref(),
            _ => None,
        }
    }

    pub fn constraints(&self) -> Option<&SizeConstraints> {
        match &self.kind {
            ViewKind::Image { constraints, .. } => Some(constraints),
            _ => None,
        }
    }
}

/// A styled bitmap on its way back to the tree owner.
#[derive(Debug)]
pub struct Delivery {
    pub view: ViewId,
    pub generation: u64,
    pub bitmap: Option<RgbaImage>,
}

/// Multi-producer queue carrying decoded bitmaps to the tree's thread.
#[derive(Debug)]
pub struct DeliveryQueue {
    tx: Sender<Delivery>,
    rx: Receiver<Delivery>,
}

impl Default for DeliveryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// A cloneable sending end for loader callbacks.
    pub fn sender(&self) -> Sender<Delivery> {
        self.tx.clone()
    }
}

#[derive(Debug)]
struct Slot {
    epoch: u32,
    node: Option<Node>,
}

/// Arena of view nodes rooted at a vertical container.
#[derive(Debug)]
pub struct ViewTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_generation: u64,
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTree {
    /// A tree holding only a vertical root container.
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                epoch: 0,
                node: Some(Node::new(ViewKind::Container(ContainerKind::Vertical))),
            }],
            free: Vec::new(),
            next_generation: 1,
        }
    }

    pub fn root(&self) -> ViewId {
        ViewId { slot: 0, epoch: 0 }
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node(&self, id: ViewId) -> Option<&Node> {
        self.slots
            .get(id.slot as usize)
            .filter(|s| s.epoch == id.epoch)?
            .node
            .as_ref()
    }

    pub fn node_mut(&mut self, id: ViewId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|s| s.epoch == id.epoch)?
            .node
            .as_mut()
    }

    fn get_mut(&mut self, id: ViewId) -> Result<&mut Node, RenderError> {
        self.node_mut(id).ok_or(RenderError::UnknownView(id))
    }

    /// Create a detached node, reusing a freed slot when there is one.
    pub fn create(&mut self, kind: ViewKind) -> ViewId {
        let node = Some(Node::new(kind));
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.node = node;
            return ViewId {
                slot,
                epoch: entry.epoch,
            };
        }
        let slot = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot { epoch: 0, node });
        ViewId { slot, epoch: 0 }
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    pub fn attach(&mut self, parent: ViewId, child: ViewId) -> Result<(), RenderError> {
        self.insert(parent, usize::MAX, child)
    }

    /// Place `child` at `index` among `parent`'s children (clamped to the
    /// end), detaching it from any previous parent first.
    pub fn insert(
        &mut self,
        parent: ViewId,
        index: usize,
        child: ViewId,
    ) -> Result<(), RenderError> {
        self.get_mut(parent)?;
        self.detach(child)?;
        self.get_mut(child)?.parent = Some(parent);
        let children = &mut self.get_mut(parent)?.children;
        let at = index.min(children.len());
        children.insert(at, child);
        Ok(())
    }

    /// Remove `child` from its parent, if attached.
    pub fn detach(&mut self, child: ViewId) -> Result<(), RenderError> {
        if let Some(old) = self.get_mut(child)?.parent.take() {
            self.get_mut(old)?.children.retain(|c| *c != child);
        }
        Ok(())
    }

    /// Detach `id` and free it with its whole subtree, dropping any bitmaps.
    /// Ids into the subtree stop resolving. The root cannot be removed.
    pub fn remove(&mut self, id: ViewId) -> Result<(), RenderError> {
        if id == self.root() {
            return Ok(());
        }
        self.detach(id)?;
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let Some(entry) = self
                .slots
                .get_mut(next.slot as usize)
                .filter(|e| e.epoch == next.epoch)
            else {
                continue;
            };
            if let Some(node) = entry.node.take() {
                pending.extend(node.children);
                entry.epoch = entry.epoch.wrapping_add(1);
                self.free.push(next.slot);
            }
        }
        Ok(())
    }

    /// Position of `child` among its parent's children.
    pub fn index_in_parent(&self, child: ViewId) -> Option<usize> {
        let parent = self.node(child)?.parent?;
        self.node(parent)?.children.iter().position(|c| *c == child)
    }

    /// Create a container and append it to `parent`.
    pub fn add_container(
        &mut self,
        parent: ViewId,
        kind: ContainerKind,
    ) -> Result<ViewId, RenderError> {
        let id = self.create(ViewKind::Container(kind));
        self.attach(parent, id)?;
        Ok(id)
    }

    /// Append the gap/line that precedes a new last element.
    ///
    /// Returns `None` when there is nothing to draw: the element is the
    /// parent's first child, or it asks for no spacing and no line.
    pub fn add_separator(
        &mut self,
        parent: ViewId,
        spacing: Spacing,
        line: bool,
        horizontal: bool,
    ) -> Result<Option<ViewId>, RenderError> {
        self.insert_separator(parent, usize::MAX, spacing, line, horizontal)
    }

    /// Like [`add_separator`](Self::add_separator), for an element that will
    /// sit at `index`. Nothing is inserted at index 0.
    pub fn insert_separator(
        &mut self,
        parent: ViewId,
        index: usize,
        spacing: Spacing,
        line: bool,
        horizontal: bool,
    ) -> Result<Option<ViewId>, RenderError> {
        let len = self
            .node(parent)
            .ok_or(RenderError::UnknownView(parent))?
            .children
            .len();
        let first = index.min(len) == 0;
        if first || (spacing == Spacing::None && !line) {
            return Ok(None);
        }
        let id = self.create(ViewKind::Separator {
            spacing,
            line,
            horizontal,
        });
        self.insert(parent, index, id)?;
        Ok(Some(id))
    }

    /// Kind of container `id` is, if it is one.
    pub fn container_kind(&self, id: ViewId) -> Option<ContainerKind> {
        match self.node(id)?.kind {
            ViewKind::Container(kind) => Some(kind),
            _ => None,
        }
    }

    /// Reserve a generation number for a new render.
    pub fn next_generation(&mut self) -> u64 {
        let g = self.next_generation;
        self.next_generation += 1;
        g
    }

    /// Show or hide a view. A tagged image also hides its separator and
    /// stretch container.
    pub fn set_visibility(&mut self, id: ViewId, visible: bool) -> Result<(), RenderError> {
        let node = self.get_mut(id)?;
        node.visible = visible;
        let linked = node
            .tag
            .as_ref()
            .map(|t| [t.separator, t.stretch_container])
            .unwrap_or_default();
        for other in linked.into_iter().flatten() {
            self.get_mut(other)?.visible = visible;
        }
        Ok(())
    }

    /// Assign a delivered bitmap if the view still carries the render that
    /// requested it. Returns whether it was applied.
    pub fn deliver(&mut self, delivery: Delivery) -> bool {
        let Some(node) = self.node_mut(delivery.view) else {
            log::trace!("dropping bitmap for removed view {:?}", delivery.view);
            return false;
        };
        let current = node.tag.as_ref().map(|t| t.generation);
        if current != Some(delivery.generation) {
            log::trace!(
                "dropping stale bitmap for {:?} (generation {} != {:?})",
                delivery.view,
                delivery.generation,
                current
            );
            return false;
        }
        match &mut node.kind {
            ViewKind::Image { bitmap, .. } => {
                *bitmap = delivery.bitmap;
                true
            }
            _ => false,
        }
    }

    /// Apply every delivery queued so far. Returns how many landed.
    pub fn apply_deliveries(&mut self, queue: &DeliveryQueue) -> usize {
        queue
            .rx
            .try_iter()
            .map(|d| self.deliver(d))
            .filter(|applied| *applied)
            .count()
    }
}
