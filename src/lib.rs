extern crate image;

pub mod canvas;
pub mod config;
pub mod custom_element;
pub mod document;
pub mod element;
pub mod error;
pub mod file;
pub mod font;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod native;
pub mod renderer;
pub mod system;
pub mod texture;
pub mod utils;
#[cfg(feature = "backend-wgpu")]
pub mod wgpu_canvas;

use config::BridgeConfig;
use custom_element::{CustomElement, CustomElementRegistry};
use document::{Document, DocumentRegistry};
use element::{ElementEvent, WrapperId};
use error::BridgeError;
use file::{FileInterface, FsFileInterface};
use font::{FontEngine, FontWeight, NullFontEngine};
use gesture::Gesture;
use input::{EventTranslator, HostInputEvent};
use log::{debug, info, warn};
use native::{DocumentContext, DocumentEngine, NativeDocumentRef, NativeElementRef};
use renderer::{BridgeRenderer, HostCanvas};
use std::rc::Rc;
use system::SystemInterface;
use texture::ResourceLoader;
use utils::{Rectangle, Size};

/// Installs `env_logger` as the `log` backend, defaulting to `info` unless
/// `RUST_LOG` says otherwise. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Root object tying one document context to the host. Owns the identity
/// registry, custom element instances, input translation and the render
/// resource caches. Create with `new`, tear down with `shutdown`.
pub struct UiBridge {
    config: BridgeConfig,
    context: Box<dyn DocumentContext>,
    documents: DocumentRegistry,
    custom_elements: CustomElementRegistry,
    translator: EventTranslator,
    renderer: BridgeRenderer,
    system: Box<dyn SystemInterface>,
    files: FsFileInterface,
    fonts: Box<dyn FontEngine>,
    viewport_size: Size,
    debugger_available: bool,
    hovered: NativeElementRef,
    // element a held button was pressed on; drags and the release go there
    captured: NativeElementRef,
    shut_down: bool,
}

impl UiBridge {
    pub fn new(
        config: BridgeConfig,
        engine: Rc<dyn DocumentEngine>,
        mut context: Box<dyn DocumentContext>,
        canvas: Box<dyn HostCanvas>,
        loader: Box<dyn ResourceLoader>,
        system: Box<dyn SystemInterface>,
    ) -> Self {
        let debugger_available = context.initialise_debugger();
        if !debugger_available {
            debug!("document engine has no debugger");
        }
        let translator = EventTranslator::new(config.gestures);
        let files = FsFileInterface::new(config.resource_root.clone());
        info!("ui bridge initialised (resource root {:?})", config.resource_root);
        Self {
            config,
            context,
            documents: DocumentRegistry::new(engine),
            custom_elements: CustomElementRegistry::new(),
            translator,
            renderer: BridgeRenderer::new(canvas, loader),
            system,
            files,
            fonts: Box::new(NullFontEngine),
            viewport_size: Size::default(),
            debugger_available,
            hovered: NativeElementRef::NULL,
            captured: NativeElementRef::NULL,
            shut_down: false,
        }
    }

    pub fn with_font_engine(mut self, fonts: Box<dyn FontEngine>) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /* DOCUMENTS */
    pub fn load_document(&mut self, path: &str) -> Result<NativeDocumentRef, BridgeError> {
        let native = self.context.load_document(path);
        if native.is_null() {
            return Err(BridgeError::ResourceNotFound(path.to_string()));
        }
        self.documents.get_or_create(native);
        self.documents.engine().show_document(native);
        info!("Document loaded from {}.", path);
        Ok(native)
    }

    pub fn document(&self, native: NativeDocumentRef) -> Option<&Document> {
        self.documents.get(native)
    }

    pub fn document_mut(&mut self, native: NativeDocumentRef) -> Option<&mut Document> {
        self.documents.get_mut(native)
    }

    pub fn documents(&self) -> &DocumentRegistry {
        &self.documents
    }

    /// Drops the document's wrappers and custom element instances, then
    /// unloads it from the context.
    pub fn close_document(&mut self, native: NativeDocumentRef) -> bool {
        let Some(document) = self.documents.remove(native) else {
            return false;
        };
        self.custom_elements.forget_document(native);
        // hover and capture may point at elements that were never wrapped
        let engine = self.documents.engine();
        if !self.hovered.is_null() && engine.owner_document(self.hovered) == native {
            self.hovered = NativeElementRef::NULL;
        }
        if !self.captured.is_null() && engine.owner_document(self.captured) == native {
            self.captured = NativeElementRef::NULL;
        }
        self.context.unload_document(native);
        debug!("closed document {:?} ({} wrappers)", native, document.len());
        true
    }

    pub fn resize(&mut self, size: Size) {
        self.viewport_size = size;
        self.context.set_dimensions(size);
        self.translator
            .classifier_mut()
            .set_region(Some(Rectangle::from_pos_size(Default::default(), size)));
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    /* INPUT */
    /// Forwards one host event to the document context and delivers the
    /// resulting gestures to element listeners and custom elements.
    pub fn inject_event(&mut self, event: &HostInputEvent) {
        let now = self.system.elapsed_time();
        let gestures = self
            .translator
            .translate(event, now, self.context.as_mut());

        let hovered = self.context.hover_element();
        if hovered != self.hovered {
            let position = self.translator.classifier().state().position;
            let previous = std::mem::replace(&mut self.hovered, hovered);
            self.process_element_event(previous, &ElementEvent::MouseOut { position });
            self.process_element_event(hovered, &ElementEvent::MouseOver { position });
        }

        for gesture in gestures {
            self.deliver_gesture(gesture);
        }
        if !self.translator.classifier().is_down() {
            self.captured = NativeElementRef::NULL;
        }
    }

    fn deliver_gesture(&mut self, gesture: Gesture) {
        let captured_or_hovered = if self.captured.is_null() {
            self.hovered
        } else {
            self.captured
        };
        let (target, event) = match gesture {
            Gesture::Press { button, position } => {
                self.captured = self.hovered;
                (self.hovered, ElementEvent::MousePress { position, button })
            }
            Gesture::Release { button, position } => {
                // clicks that follow still go to the captured element
                (captured_or_hovered, ElementEvent::MouseUp { position, button })
            }
            Gesture::Click { button, position } => {
                (captured_or_hovered, ElementEvent::MouseClick { position, button })
            }
            Gesture::DoubleClick { button, position } => (
                captured_or_hovered,
                ElementEvent::MouseDoubleClick { position, button },
            ),
            Gesture::Drag {
                button, position, ..
            } => (captured_or_hovered, ElementEvent::MouseDrag { position, button }),
            Gesture::Move { position } => (self.hovered, ElementEvent::MouseMove { position }),
            Gesture::Enter { position } => (self.hovered, ElementEvent::MouseEnter { position }),
            Gesture::Leave { position } => (self.hovered, ElementEvent::MouseOut { position }),
        };
        self.process_element_event(target, &event);
    }

    /// Delivers an element event to the wrapper listeners and, for custom
    /// elements, the instance. Host glue uses this for events the document
    /// engine raises itself (show, hide, resize, focus, attribute changes).
    pub fn process_element_event(&mut self, native: NativeElementRef, event: &ElementEvent) {
        if native.is_null() {
            return;
        }
        let owner = self.documents.engine().owner_document(native);
        if let Some(document) = self.documents.get_mut(owner) {
            document.dispatch(native, event);
        }
        self.custom_elements
            .dispatch_event(&self.documents, native, event);
    }

    pub fn hovered_element(&self) -> NativeElementRef {
        self.hovered
    }

    pub fn translator(&self) -> &EventTranslator {
        &self.translator
    }

    /* FRAME */
    pub fn update(&mut self) {
        self.context.update();
        self.custom_elements.update_all(&self.documents);
    }

    pub fn render(&mut self) {
        self.renderer.begin_frame();
        self.context.render(&mut self.renderer);
        self.custom_elements
            .render_all(&self.documents, &mut self.renderer);
    }

    pub fn renderer(&self) -> &BridgeRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut BridgeRenderer {
        &mut self.renderer
    }

    /* CUSTOM ELEMENTS */
    pub fn register_custom_element<F>(
        &mut self,
        tag: impl Into<String>,
        factory: F,
    ) -> Result<(), BridgeError>
    where
        F: Fn() -> Box<dyn CustomElement> + 'static,
    {
        self.custom_elements.register(tag, factory)
    }

    pub fn custom_elements(&self) -> &CustomElementRegistry {
        &self.custom_elements
    }

    pub fn custom_elements_mut(&mut self) -> &mut CustomElementRegistry {
        &mut self.custom_elements
    }

    /// Called by the host glue when the document engine creates an element
    /// whose tag may have a custom factory.
    pub fn instance_element(&mut self, native: NativeElementRef, tag: &str) -> Option<WrapperId> {
        self.custom_elements
            .instance_element(&mut self.documents, native, tag)
    }

    /// Called when the document engine destroys `native`. Evicts its wrapper
    /// and releases any custom element instance.
    pub fn release_element(&mut self, native: NativeElementRef) {
        if native == self.hovered {
            self.hovered = NativeElementRef::NULL;
        }
        if native == self.captured {
            self.captured = NativeElementRef::NULL;
        }
        if self
            .custom_elements
            .release_element(&mut self.documents, native)
        {
            return;
        }
        let owner = self.documents.engine().owner_document(native);
        if let Some(document) = self.documents.get_mut(owner) {
            document.release_element(native);
        }
    }

    /* DEBUGGER */
    pub fn show_debugger(&mut self) -> Result<(), BridgeError> {
        self.set_debugger_visible(true)
    }

    pub fn hide_debugger(&mut self) -> Result<(), BridgeError> {
        self.set_debugger_visible(false)
    }

    pub fn toggle_debugger(&mut self) -> Result<(), BridgeError> {
        let visible = self.context.is_debugger_visible();
        self.set_debugger_visible(!visible)
    }

    pub fn is_debugger_visible(&self) -> bool {
        self.debugger_available && self.context.is_debugger_visible()
    }

    fn set_debugger_visible(&mut self, visible: bool) -> Result<(), BridgeError> {
        if !self.debugger_available {
            warn!("Debugger is not available in this build.");
            return Err(BridgeError::UnsupportedOperation("debugger"));
        }
        self.context.set_debugger_visible(visible);
        Ok(())
    }

    /* PERIPHERALS */
    pub fn load_font(&mut self, path: &str, fallback: bool) -> bool {
        let resolved = self.config.resolve(path);
        let loaded = self
            .fonts
            .load_font_face(&resolved, fallback, FontWeight::NORMAL);
        if !loaded {
            warn!("font face {} was not loaded", resolved);
        }
        loaded
    }

    pub fn fonts(&self) -> &dyn FontEngine {
        self.fonts.as_ref()
    }

    pub fn files(&mut self) -> &mut dyn FileInterface {
        &mut self.files
    }

    pub fn system(&self) -> &dyn SystemInterface {
        self.system.as_ref()
    }

    pub fn system_mut(&mut self) -> &mut dyn SystemInterface {
        self.system.as_mut()
    }

    /// Releases every custom element, document and render resource. Further
    /// calls are no-ops.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.custom_elements.release_all(&mut self.documents);

        let natives: Vec<NativeDocumentRef> = self.documents.natives().collect();
        for native in natives {
            self.context.unload_document(native);
        }
        self.documents.clear();
        self.renderer.release_all();
        self.hovered = NativeElementRef::NULL;
        self.captured = NativeElementRef::NULL;
        info!("ui bridge shut down");
    }
}

impl Drop for UiBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}
