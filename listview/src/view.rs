use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use core::fmt;

use crate::{Binding, ListItem, Outputs, Size, UnknownViewType, ViewType};

/// The host-side object that actually draws an item.
///
/// The list view never owns the host's render tree. It only tells the render object when to
/// join or leave it, asks it for its size and tells it where to go.
pub trait RenderObject {
    /// Appends the object to the list's container and hooks it into the host's lifecycle.
    fn attach(&mut self);

    /// Removes the object from the container. It may be attached again later.
    fn detach(&mut self);

    /// Returns the object's current size. `width` is a width constraint requested by the
    /// layout strategy, if any.
    fn measure(&mut self, width: Option<f32>) -> Size;

    /// Moves the object to `left`/`top` inside the list's canvas.
    fn place(&mut self, left: f32, top: f32) {
        let _ = (left, top);
    }

    /// Releases the object for good. Called once, on a detached object.
    fn destroy(&mut self) {}
}

/// A render object with named inputs and outputs.
pub trait Component<P>: RenderObject {
    fn set_inputs(&mut self, inputs: &P);

    /// Replaces every output subscription. `None` drops all of them.
    fn connect_outputs(&mut self, outputs: Option<&Outputs>) {
        let _ = outputs;
    }
}

/// A render object instantiated from a named template, driven by one context value.
pub trait Template<P>: RenderObject {
    fn set_context(&mut self, context: &P);
}

pub struct ComponentView<P> {
    view_type: ViewType,
    inner: Box<dyn Component<P>>,
}

impl<P> ComponentView<P> {
    pub fn new(view_type: ViewType, inner: Box<dyn Component<P>>) -> Self {
        Self { view_type, inner }
    }

    fn bind_values(&mut self, binding: &Binding<P>) {
        if let Binding::Component { inputs, outputs } = binding {
            self.inner.set_inputs(inputs);
            self.inner.connect_outputs(outputs.as_ref());
        }
    }
}

pub struct TemplateView<P> {
    view_type: ViewType,
    inner: Box<dyn Template<P>>,
}

impl<P> TemplateView<P> {
    pub fn new(view_type: ViewType, inner: Box<dyn Template<P>>) -> Self {
        Self { view_type, inner }
    }

    fn bind_values(&mut self, binding: &Binding<P>) {
        if let Binding::Template { context } = binding {
            self.inner.set_context(context);
        }
    }
}

/// One instantiated render object together with the view type it was created for.
pub enum View<P> {
    Component(ComponentView<P>),
    Template(TemplateView<P>),
}

impl<P> View<P> {
    pub fn view_type(&self) -> &ViewType {
        match self {
            Self::Component(view) => &view.view_type,
            Self::Template(view) => &view.view_type,
        }
    }

    /// Pushes the item's payload into the render object.
    ///
    /// A component view ignores template bindings and vice versa.
    pub fn bind_values(&mut self, item: &ListItem<P>) {
        match self {
            Self::Component(view) => view.bind_values(&item.binding),
            Self::Template(view) => view.bind_values(&item.binding),
        }
    }

    pub fn attach(&mut self) {
        match self {
            Self::Component(view) => view.inner.attach(),
            Self::Template(view) => view.inner.attach(),
        }
    }

    pub fn detach(&mut self) {
        match self {
            Self::Component(view) => view.inner.detach(),
            Self::Template(view) => view.inner.detach(),
        }
    }

    pub fn measure(&mut self, width: Option<f32>) -> Size {
        match self {
            Self::Component(view) => view.inner.measure(width),
            Self::Template(view) => view.inner.measure(width),
        }
    }

    pub fn place(&mut self, left: f32, top: f32) {
        match self {
            Self::Component(view) => view.inner.place(left, top),
            Self::Template(view) => view.inner.place(left, top),
        }
    }

    pub fn destroy(&mut self) {
        match self {
            Self::Component(view) => view.inner.destroy(),
            Self::Template(view) => view.inner.destroy(),
        }
    }
}

impl<P> fmt::Debug for View<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("View").field(self.view_type()).finish()
    }
}

type ComponentFactory<P> = Box<dyn Fn() -> Box<dyn Component<P>>>;
type TemplateFactory<P> = Box<dyn Fn() -> Box<dyn Template<P>>>;

/// Factories for every view type a list may display.
///
/// Components are registered under their type name, templates under the name items refer to
/// them by.
pub struct ViewRegistry<P> {
    components: BTreeMap<Cow<'static, str>, ComponentFactory<P>>,
    templates: BTreeMap<Cow<'static, str>, TemplateFactory<P>>,
}

impl<P> Default for ViewRegistry<P> {
    fn default() -> Self {
        Self {
            components: BTreeMap::new(),
            templates: BTreeMap::new(),
        }
    }
}

impl<P> ViewRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_component<C, F>(&mut self, name: impl Into<Cow<'static, str>>, factory: F)
    where
        C: Component<P> + 'static,
        F: Fn() -> C + 'static,
    {
        self.components
            .insert(name.into(), Box::new(move || Box::new(factory()) as Box<dyn Component<P>>));
    }

    pub fn register_template<T, F>(&mut self, name: impl Into<Cow<'static, str>>, factory: F)
    where
        T: Template<P> + 'static,
        F: Fn() -> T + 'static,
    {
        self.templates
            .insert(name.into(), Box::new(move || Box::new(factory()) as Box<dyn Template<P>>));
    }

    /// Builder-style [`Self::register_component`].
    pub fn with_component<C, F>(mut self, name: impl Into<Cow<'static, str>>, factory: F) -> Self
    where
        C: Component<P> + 'static,
        F: Fn() -> C + 'static,
    {
        self.register_component(name, factory);
        self
    }

    /// Builder-style [`Self::register_template`].
    pub fn with_template<T, F>(mut self, name: impl Into<Cow<'static, str>>, factory: F) -> Self
    where
        T: Template<P> + 'static,
        F: Fn() -> T + 'static,
    {
        self.register_template(name, factory);
        self
    }

    pub fn contains(&self, view_type: &ViewType) -> bool {
        match view_type {
            ViewType::Component(name) => self.components.contains_key(name),
            ViewType::Template(name) => self.templates.contains_key(name),
        }
    }

    /// Instantiates a fresh, detached view.
    pub fn create(&self, view_type: &ViewType) -> Result<View<P>, UnknownViewType> {
        let unknown = || UnknownViewType(view_type.clone());
        match view_type {
            ViewType::Component(name) => {
                let factory = self.components.get(name).ok_or_else(unknown)?;
                Ok(View::Component(ComponentView::new(
                    view_type.clone(),
                    factory(),
                )))
            }
            ViewType::Template(name) => {
                let factory = self.templates.get(name).ok_or_else(unknown)?;
                Ok(View::Template(TemplateView::new(
                    view_type.clone(),
                    factory(),
                )))
            }
        }
    }
}

impl<P> fmt::Debug for ViewRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("components", &self.components.keys().collect::<alloc::vec::Vec<_>>())
            .field("templates", &self.templates.keys().collect::<alloc::vec::Vec<_>>())
            .finish()
    }
}
