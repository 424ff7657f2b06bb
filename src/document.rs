//! Identity registry: one wrapper per native element per document.

use crate::element::{Element, ElementEvent, ElementWrapper, WrapperId};
use crate::native::{DocumentEngine, NativeDocumentRef, NativeElementRef};
use log::{debug, trace};
use std::collections::HashMap;
use std::rc::Rc;

struct Slot {
    generation: u32,
    wrapper: Option<ElementWrapper>,
}

pub struct Document {
    native: NativeDocumentRef,
    engine: Rc<dyn DocumentEngine>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    index: HashMap<NativeElementRef, WrapperId>,
}

impl Document {
    pub fn new(native: NativeDocumentRef, engine: Rc<dyn DocumentEngine>) -> Self {
        Self {
            native,
            engine,
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn native(&self) -> NativeDocumentRef {
        self.native
    }

    /// Number of live wrappers.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn get_or_create_wrapper(&mut self, native: NativeElementRef) -> Option<WrapperId> {
        if native.is_null() {
            return None;
        }
        if let Some(id) = self.index.get(&native) {
            return Some(*id);
        }

        let id = match self.free.pop() {
            Some(index) => WrapperId {
                index,
                generation: self.slots[index as usize].generation,
            },
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    wrapper: None,
                });
                WrapperId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        self.slots[id.index as usize].wrapper = Some(ElementWrapper::new(id, native));
        self.index.insert(native, id);
        trace!("wrapped element {:?} as {:?}", native, id);
        Some(id)
    }

    /// Looks up an existing wrapper without creating one.
    pub fn wrapper_for(&self, native: NativeElementRef) -> Option<WrapperId> {
        self.index.get(&native).copied()
    }

    pub fn wrapper(&self, id: WrapperId) -> Option<&ElementWrapper> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.wrapper.as_ref()
    }

    pub fn wrapper_mut(&mut self, id: WrapperId) -> Option<&mut ElementWrapper> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.wrapper.as_mut()
    }

    pub fn element(&self, id: WrapperId) -> Option<Element<'_>> {
        let wrapper = self.wrapper(id)?;
        Some(Element::new(wrapper, self.engine.as_ref()))
    }

    pub fn element_by_id(&mut self, id: &str) -> Option<WrapperId> {
        let native = self.engine.element_by_id(self.native, id);
        self.get_or_create_wrapper(native)
    }

    pub fn elements_by_tag(&mut self, tag: &str) -> Vec<WrapperId> {
        let natives = self.engine.elements_by_tag(self.native, tag);
        natives
            .into_iter()
            .filter_map(|native| self.get_or_create_wrapper(native))
            .collect()
    }

    pub fn create_element(
        &mut self,
        parent: WrapperId,
        tag: &str,
        attributes: &[(String, String)],
    ) -> Option<WrapperId> {
        let parent = self.wrapper(parent)?.native();
        let native = self.engine.create_element(parent, tag, attributes);
        self.get_or_create_wrapper(native)
    }

    /// Evicts the wrapper of a destroyed native element. The slot's
    /// generation is bumped so stale ids stop resolving. Custom element
    /// instances must be released alongside, so callers outside the crate go
    /// through `UiBridge::release_element`.
    pub(crate) fn release_element(&mut self, native: NativeElementRef) -> Option<ElementWrapper> {
        let id = self.index.remove(&native)?;
        let slot = &mut self.slots[id.index as usize];
        let wrapper = slot.wrapper.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        debug!("released wrapper {:?} for element {:?}", id, native);
        wrapper
    }

    /// Live wrappers in arena order.
    pub fn wrappers(&self) -> impl Iterator<Item = &ElementWrapper> {
        self.slots.iter().filter_map(|slot| slot.wrapper.as_ref())
    }

    pub fn hide(&self) {
        self.engine.hide_document(self.native);
    }

    pub fn show(&self) {
        self.engine.show_document(self.native);
    }

    pub fn is_visible(&self) -> bool {
        self.engine.is_document_visible(self.native)
    }

    pub fn toggle_visibility(&self) {
        if self.is_visible() {
            self.hide();
        } else {
            self.show();
        }
    }

    /// Delivers `event` to the listeners of `native`'s wrapper. Elements that
    /// were never wrapped have no listeners, so nothing is created here.
    pub(crate) fn dispatch(&mut self, native: NativeElementRef, event: &ElementEvent) -> bool {
        let Some(id) = self.wrapper_for(native) else {
            return false;
        };
        match self.wrapper_mut(id) {
            Some(wrapper) => {
                wrapper.dispatch(event);
                true
            }
            None => false,
        }
    }
}

/// Native document → `Document`, created on first access and dropped, with
/// all of its wrappers, when the document goes away.
pub struct DocumentRegistry {
    engine: Rc<dyn DocumentEngine>,
    documents: HashMap<NativeDocumentRef, Document>,
}

impl DocumentRegistry {
    pub fn new(engine: Rc<dyn DocumentEngine>) -> Self {
        Self {
            engine,
            documents: HashMap::new(),
        }
    }

    pub fn get_or_create(&mut self, native: NativeDocumentRef) -> Option<&mut Document> {
        if native.is_null() {
            return None;
        }
        let engine = &self.engine;
        Some(
            self.documents
                .entry(native)
                .or_insert_with(|| Document::new(native, Rc::clone(engine))),
        )
    }

    pub fn get(&self, native: NativeDocumentRef) -> Option<&Document> {
        self.documents.get(&native)
    }

    pub fn get_mut(&mut self, native: NativeDocumentRef) -> Option<&mut Document> {
        self.documents.get_mut(&native)
    }

    /// The wrapper document owning `element`, created on demand.
    pub fn document_for_element(&mut self, element: NativeElementRef) -> Option<&mut Document> {
        if element.is_null() {
            return None;
        }
        let owner = self.engine.owner_document(element);
        self.get_or_create(owner)
    }

    pub fn natives(&self) -> impl Iterator<Item = NativeDocumentRef> + '_ {
        self.documents.keys().copied()
    }

    pub fn remove(&mut self, native: NativeDocumentRef) -> Option<Document> {
        self.documents.remove(&native)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    pub fn engine(&self) -> &Rc<dyn DocumentEngine> {
        &self.engine
    }
}
