//! Custom element instancing.
//!
//! A factory is registered per tag. When the document engine creates an
//! element with that tag the host calls `instance_element`, which builds the
//! instance, wraps the native element and writes the wrapper id into the
//! element's app-data slot. The bridge then drives setup, update and draw.

use log::{debug, warn};
use std::collections::HashMap;

use crate::document::DocumentRegistry;
use crate::element::{Element, ElementEvent, WrapperId};
use crate::error::BridgeError;
use crate::native::{NativeDocumentRef, NativeElementRef};
use crate::renderer::RenderInterface;

/// Passed to `CustomElement::draw`. Geometry issued through `renderer` goes
/// into the same frame as the document's own draws.
pub struct DrawContext<'a> {
    pub element: Element<'a>,
    pub renderer: &'a mut dyn RenderInterface,
}

#[allow(unused_variables)]
pub trait CustomElement {
    /// Runs once, on the first update tick after instancing.
    fn setup(&mut self, element: &Element<'_>) {}
    fn update(&mut self, element: &Element<'_>) {}
    fn draw(&mut self, context: &mut DrawContext<'_>) {}
    fn on_attribute_change(&mut self, element: &Element<'_>, changed: &[(String, String)]) {}
    fn on_event(&mut self, element: &Element<'_>, event: &ElementEvent) {}
    /// Last call before the instance is dropped.
    fn release(&mut self) {}
}

pub type CustomElementFactory = Box<dyn Fn() -> Box<dyn CustomElement>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    SetUp,
    Updating,
    Released,
}

impl LifecycleState {
    fn is_drawable(self) -> bool {
        matches!(self, LifecycleState::SetUp | LifecycleState::Updating)
    }
}

struct Instance {
    native: NativeElementRef,
    document: NativeDocumentRef,
    wrapper: WrapperId,
    tag: String,
    state: LifecycleState,
    element: Box<dyn CustomElement>,
}

#[derive(Default)]
pub struct CustomElementRegistry {
    factories: HashMap<String, CustomElementFactory>,
    // instancing order, which is also update and draw order
    instances: Vec<Instance>,
}

impl CustomElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` for `tag`. A tag can only be registered once.
    pub fn register<F>(&mut self, tag: impl Into<String>, factory: F) -> Result<(), BridgeError>
    where
        F: Fn() -> Box<dyn CustomElement> + 'static,
    {
        let tag = tag.into();
        if self.factories.contains_key(&tag) {
            return Err(BridgeError::DuplicateRegistration(tag));
        }
        debug!("registered custom element <{}>", tag);
        self.factories.insert(tag, Box::new(factory));
        Ok(())
    }

    /// Registers `factory` for `tag`, returning whether an earlier factory was
    /// replaced. Existing instances are unaffected.
    pub fn register_or_replace<F>(&mut self, tag: impl Into<String>, factory: F) -> bool
    where
        F: Fn() -> Box<dyn CustomElement> + 'static,
    {
        self.factories.insert(tag.into(), Box::new(factory)).is_some()
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    pub fn instance_element(
        &mut self,
        documents: &mut DocumentRegistry,
        native: NativeElementRef,
        tag: &str,
    ) -> Option<WrapperId> {
        let Some(factory) = self.factories.get(tag) else {
            warn!("no custom element registered for <{}>", tag);
            return None;
        };
        if let Some(existing) = self.instances.iter().find(|i| i.native == native) {
            return Some(existing.wrapper);
        }

        let engine = documents.engine().clone();
        let document = documents.document_for_element(native)?;
        let wrapper = document.get_or_create_wrapper(native)?;
        let document = document.native();

        engine.set_app_data(native, Some(wrapper.to_bits()));
        self.instances.push(Instance {
            native,
            document,
            wrapper,
            tag: tag.to_string(),
            state: LifecycleState::Created,
            element: factory(),
        });
        debug!("instanced <{}> for {:?}", tag, native);
        Some(wrapper)
    }

    /// One lifecycle tick: `setup` for new instances, `update` for the rest.
    pub fn update_all(&mut self, documents: &DocumentRegistry) {
        for instance in self.instances.iter_mut() {
            let Some(element) = documents
                .get(instance.document)
                .and_then(|document| document.element(instance.wrapper))
            else {
                continue;
            };
            match instance.state {
                LifecycleState::Created => {
                    instance.element.setup(&element);
                    instance.state = LifecycleState::SetUp;
                }
                LifecycleState::SetUp | LifecycleState::Updating => {
                    instance.element.update(&element);
                    instance.state = LifecycleState::Updating;
                }
                LifecycleState::Released => {}
            }
        }
    }

    /// Draws every instance that has been set up.
    pub fn render_all(&mut self, documents: &DocumentRegistry, renderer: &mut dyn RenderInterface) {
        for instance in self.instances.iter_mut() {
            if !instance.state.is_drawable() {
                continue;
            }
            let Some(element) = documents
                .get(instance.document)
                .and_then(|document| document.element(instance.wrapper))
            else {
                continue;
            };
            let mut context = DrawContext {
                element,
                renderer: &mut *renderer,
            };
            instance.element.draw(&mut context);
        }
    }

    /// Routes an element event to the instance owning `native`. Returns
    /// whether an instance received it.
    pub fn dispatch_event(
        &mut self,
        documents: &DocumentRegistry,
        native: NativeElementRef,
        event: &ElementEvent,
    ) -> bool {
        let Some(instance) = self.instances.iter_mut().find(|i| i.native == native) else {
            return false;
        };
        let Some(element) = documents
            .get(instance.document)
            .and_then(|document| document.element(instance.wrapper))
        else {
            return false;
        };
        match event {
            ElementEvent::AttributeChange(changed) => {
                instance.element.on_attribute_change(&element, changed)
            }
            other => instance.element.on_event(&element, other),
        }
        true
    }

    /// Tears down the instance for `native`. The wrapper leaves the identity
    /// registry and the app-data slot is cleared before the instance drops.
    pub fn release_element(
        &mut self,
        documents: &mut DocumentRegistry,
        native: NativeElementRef,
    ) -> bool {
        let Some(position) = self.instances.iter().position(|i| i.native == native) else {
            return false;
        };
        let mut instance = self.instances.remove(position);
        if let Some(document) = documents.get_mut(instance.document) {
            document.release_element(native);
        }
        documents.engine().set_app_data(native, None);

        instance.state = LifecycleState::Released;
        instance.element.release();
        debug!("released <{}> for {:?}", instance.tag, native);
        true
    }

    pub fn release_all(&mut self, documents: &mut DocumentRegistry) {
        let natives: Vec<NativeElementRef> = self.instances.iter().map(|i| i.native).collect();
        for native in natives {
            self.release_element(documents, native);
        }
    }

    /// Lifecycle state of the instance for `native`; `None` once released.
    pub fn state(&self, native: NativeElementRef) -> Option<LifecycleState> {
        self.instances
            .iter()
            .find(|i| i.native == native)
            .map(|i| i.state)
    }

    pub fn tag_of(&self, native: NativeElementRef) -> Option<&str> {
        self.instances
            .iter()
            .find(|i| i.native == native)
            .map(|i| i.tag.as_str())
    }

    /// Drops instances belonging to `document` without touching the native
    /// side, which is already gone.
    pub fn forget_document(&mut self, document: NativeDocumentRef) {
        for instance in self.instances.iter_mut().filter(|i| i.document == document) {
            instance.state = LifecycleState::Released;
            instance.element.release();
        }
        self.instances.retain(|i| i.document != document);
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
