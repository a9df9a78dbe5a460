//! Renderer-wide registrations.
//!
//! Build one [`RendererRegistry`] when the host application starts, share it
//! by reference (or `Arc`) with every render call, and call
//! [`shutdown`](RendererRegistry::shutdown) when the host tears down. The
//! custom loader slot is written rarely and read on every render, possibly
//! from different threads, so it sits behind an `RwLock`.

use std::sync::{Arc, PoisonError, RwLock};

use crate::loader::ImageLoader;

#[derive(Default)]
pub struct RendererRegistry {
    online_loader: RwLock<Option<Arc<dyn ImageLoader>>>,
}

impl core::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("online_loader", &self.online_loader().is_some())
            .finish()
    }
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route all subsequent image loads through `loader`. Returns the loader
    /// it replaces.
    pub fn install_online_loader(
        &self,
        loader: Arc<dyn ImageLoader>,
    ) -> Option<Arc<dyn ImageLoader>> {
        log::debug!("installing custom online image loader");
        self.write().replace(loader)
    }

    /// Go back to each render context's default loader.
    pub fn remove_online_loader(&self) -> Option<Arc<dyn ImageLoader>> {
        self.write().take()
    }

    /// The custom loader, if one is installed.
    pub fn online_loader(&self) -> Option<Arc<dyn ImageLoader>> {
        self.online_loader
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop every registration.
    pub fn shutdown(&self) {
        if self.remove_online_loader().is_some() {
            log::debug!("custom online image loader released");
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Arc<dyn ImageLoader>>> {
        // A panicking writer cannot leave the Option half-written.
        self.online_loader
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::loader::{DecodeRequest, LoadCallbacks, LoadHandle};

    struct NullLoader;

    impl ImageLoader for NullLoader {
        fn submit(&self, _: DecodeRequest, callbacks: LoadCallbacks) -> LoadHandle {
            let handle = LoadHandle::new();
            callbacks.complete(&handle, None);
            handle
        }
    }

    #[test]
    fn install_replace_remove() {
        let registry = RendererRegistry::new();
        assert!(registry.online_loader().is_none());
        assert!(registry.install_online_loader(Arc::new(NullLoader)).is_none());
        assert!(registry.install_online_loader(Arc::new(NullLoader)).is_some());
        assert!(registry.online_loader().is_some());
        assert!(registry.remove_online_loader().is_some());
        assert!(registry.online_loader().is_none());
    }

    #[test]
    fn registration_visible_across_threads() {
        let registry = Arc::new(RendererRegistry::new());
        let writer = Arc::clone(&registry);
        thread::spawn(move || {
            writer.install_online_loader(Arc::new(NullLoader));
        })
        .join()
        .unwrap();
        assert!(registry.online_loader().is_some());

        registry.shutdown();
        let reader = Arc::clone(&registry);
        let seen = thread::spawn(move || reader.online_loader().is_some())
            .join()
            .unwrap();
        assert!(!seen);
    }
}
