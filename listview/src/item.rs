use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use crate::ItemKey;
use crate::diff::ItemComparator;

/// Selects which render object is used to display an item.
///
/// Components are addressed by their type name, templates by the name they were registered
/// under. Both live in the same [`crate::ViewRegistry`] and each gets its own recycler pool.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViewType {
    Component(Cow<'static, str>),
    Template(Cow<'static, str>),
}

impl ViewType {
    pub fn component(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Component(name.into())
    }

    pub fn template(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Template(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Component(name) | Self::Template(name) => name,
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(name) => write!(f, "component '{name}'"),
            Self::Template(name) => write!(f, "template '{name}'"),
        }
    }
}

/// An event handler wired to a component output.
pub type OutputHandler = Arc<dyn Fn(&dyn Any)>;

/// Named event handlers for a component, keyed by output name.
pub type Outputs = BTreeMap<Cow<'static, str>, OutputHandler>;

/// The data a view is bound to.
#[derive(Clone)]
pub enum Binding<P> {
    /// Inputs for a component plus its (optional) output handlers.
    Component { inputs: P, outputs: Option<Outputs> },
    /// The single context value of a template.
    Template { context: P },
}

impl<P> Binding<P> {
    pub fn payload(&self) -> &P {
        match self {
            Self::Component { inputs, .. } => inputs,
            Self::Template { context } => context,
        }
    }

    fn same_outputs(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Component { outputs: a, .. }, Self::Component { outputs: b, .. }) => {
                match (a, b) {
                    (None, None) => true,
                    (Some(a), Some(b)) => {
                        a.len() == b.len()
                            && a.iter()
                                .zip(b.iter())
                                .all(|((ka, ha), (kb, hb))| ka == kb && Arc::ptr_eq(ha, hb))
                    }
                    _ => false,
                }
            }
            (Self::Template { .. }, Self::Template { .. }) => true,
            _ => false,
        }
    }
}

impl<P: fmt::Debug> fmt::Debug for Binding<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component { inputs, outputs } => f
                .debug_struct("Component")
                .field("inputs", inputs)
                .field(
                    "outputs",
                    &outputs.as_ref().map(|o| o.keys().collect::<alloc::vec::Vec<_>>()),
                )
                .finish(),
            Self::Template { context } => {
                f.debug_struct("Template").field("context", context).finish()
            }
        }
    }
}

/// One entry of the list shown by a [`crate::ListView`].
#[derive(Clone, Debug)]
pub struct ListItem<P> {
    pub view_type: ViewType,
    pub key: ItemKey,
    pub binding: Binding<P>,
}

impl<P> ListItem<P> {
    /// An item rendered by the component registered under `name`.
    ///
    /// The item starts out keyed as `Index(0)`. Give it an id with [`Self::with_id`], or
    /// run the whole list through [`index_keys`] (which
    /// [`crate::ArrayDataSource::set_list_items`] does), otherwise every item of the same view
    /// type counts as the same item when diffing.
    pub fn component(name: impl Into<Cow<'static, str>>, inputs: P) -> Self {
        Self {
            view_type: ViewType::component(name),
            key: ItemKey::default(),
            binding: Binding::Component {
                inputs,
                outputs: None,
            },
        }
    }

    /// An item rendered by the template registered under `name`.
    ///
    /// The item starts out keyed as `Index(0)`. Give it an id with [`Self::with_id`], or
    /// run the whole list through [`index_keys`] (which
    /// [`crate::ArrayDataSource::set_list_items`] does), otherwise every item of the same view
    /// type counts as the same item when diffing.
    pub fn template(name: impl Into<Cow<'static, str>>, context: P) -> Self {
        Self {
            view_type: ViewType::template(name),
            key: ItemKey::default(),
            binding: Binding::Template { context },
        }
    }

    /// Gives the item an explicit identity.
    pub fn with_id(mut self, id: u64) -> Self {
        self.key = ItemKey::Id(id);
        self
    }

    /// Gives the item positional identity at `index`.
    pub fn at_index(mut self, index: usize) -> Self {
        self.key = ItemKey::Index(index);
        self
    }

    /// Adds an output handler. Has no effect on template items.
    pub fn with_output(
        mut self,
        name: impl Into<Cow<'static, str>>,
        handler: impl Fn(&dyn Any) + 'static,
    ) -> Self {
        if let Binding::Component { outputs, .. } = &mut self.binding {
            outputs
                .get_or_insert_with(BTreeMap::new)
                .insert(name.into(), Arc::new(handler));
        }
        self
    }
}

/// Assigns positional identity to every item that does not carry an explicit id.
pub fn index_keys<P>(items: &mut [ListItem<P>]) {
    for (index, item) in items.iter_mut().enumerate() {
        if !matches!(item.key, ItemKey::Id(_)) {
            item.key = ItemKey::Index(index);
        }
    }
}

/// Compares [`ListItem`]s by key and view type, and their contents by payload equality.
///
/// Output handlers are compared by identity, so rebuilding a closure counts as a change.
#[derive(Clone, Copy, Debug, Default)]
pub struct ListItemComparator;

impl<P: PartialEq> ItemComparator<ListItem<P>> for ListItemComparator {
    fn same_item(&self, old: &ListItem<P>, new: &ListItem<P>) -> bool {
        old.key == new.key && old.view_type == new.view_type
    }

    fn same_contents(&self, old: &ListItem<P>, new: &ListItem<P>) -> bool {
        old.binding.payload() == new.binding.payload() && old.binding.same_outputs(&new.binding)
    }
}
