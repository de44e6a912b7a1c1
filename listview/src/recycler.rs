use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

use crate::{UnknownViewType, View, ViewRegistry, ViewType};

#[cfg(feature = "std")]
type PoolMap<P> = HashMap<ViewType, Vec<View<P>>>;
#[cfg(not(feature = "std"))]
type PoolMap<P> = BTreeMap<ViewType, Vec<View<P>>>;

/// Keeps detached views around so they can be reused for items of the same view type.
///
/// Every view type gets its own pool of at most `per_view_type_cache_size` views. A view
/// handed back to a full pool is destroyed on the spot. Views in a pool are always detached.
#[derive(Debug)]
pub struct ViewRecycler<P> {
    registry: ViewRegistry<P>,
    pools: PoolMap<P>,
    per_view_type_cache_size: usize,
}

impl<P> ViewRecycler<P> {
    pub fn new(registry: ViewRegistry<P>, per_view_type_cache_size: usize) -> Self {
        Self {
            registry,
            pools: PoolMap::new(),
            per_view_type_cache_size,
        }
    }

    pub fn registry(&self) -> &ViewRegistry<P> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ViewRegistry<P> {
        &mut self.registry
    }

    pub fn per_view_type_cache_size(&self) -> usize {
        self.per_view_type_cache_size
    }

    /// Changes the pool capacity. Pools that are now over capacity shrink on the spot.
    pub fn set_per_view_type_cache_size(&mut self, size: usize) {
        self.per_view_type_cache_size = size;
        for pool in self.pools.values_mut() {
            while pool.len() > size {
                if let Some(mut view) = pool.pop() {
                    view.destroy();
                }
            }
        }
    }

    /// Returns a pooled view of `view_type`, or creates one if the pool is empty.
    pub fn get(&mut self, view_type: &ViewType) -> Result<View<P>, UnknownViewType> {
        if let Some(view) = self.pools.get_mut(view_type).and_then(Vec::pop) {
            return Ok(view);
        }
        ltrace!(view_type = %view_type, "ViewRecycler::create");
        self.registry.create(view_type)
    }

    /// Takes back a detached view.
    pub fn cache(&mut self, mut view: View<P>) {
        let pool = self.pools.entry(view.view_type().clone()).or_default();
        if pool.len() >= self.per_view_type_cache_size {
            ltrace!(view_type = %view.view_type(), "ViewRecycler::evict");
            view.destroy();
            return;
        }
        pool.push(view);
    }

    /// Number of pooled views of `view_type`.
    pub fn cached(&self, view_type: &ViewType) -> usize {
        self.pools.get(view_type).map_or(0, Vec::len)
    }

    /// Number of pooled views across all types.
    pub fn len(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn destroy_all(&mut self) {
        for (_, pool) in self.pools.iter_mut() {
            for view in pool.iter_mut() {
                view.destroy();
            }
        }
        self.pools.clear();
    }
}
