#![allow(dead_code)]

use plutonium_ui_bridge::native::{
    BoxArea, DocumentContext, DocumentEngine, KeyIdentifier, KeyModifier, NativeDocumentRef,
    NativeElementRef,
};
use plutonium_ui_bridge::renderer::RenderInterface;
use plutonium_ui_bridge::system::SystemInterface;
use plutonium_ui_bridge::utils::{Position, Rectangle, Size};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum ContextCall {
    KeyDown(KeyIdentifier, KeyModifier),
    KeyUp(KeyIdentifier, KeyModifier),
    Text(char),
    MouseMove(i32, i32, KeyModifier),
    ButtonDown(i32, KeyModifier),
    ButtonUp(i32, KeyModifier),
    Wheel(f32, KeyModifier),
    Dimensions(Size),
    Load(String),
    Unload(NativeDocumentRef),
    Update,
    Render,
}

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub id: String,
    pub tag: String,
    pub document: NativeDocumentRef,
    pub parent: NativeElementRef,
    pub attributes: HashMap<String, String>,
    pub properties: HashMap<String, String>,
    pub text: String,
    pub border: Rectangle,
    pub content: Rectangle,
    pub app_data: Option<u64>,
}

#[derive(Default)]
pub struct Tree {
    next_ref: u64,
    pub elements: BTreeMap<NativeElementRef, FakeElement>,
    pub documents: HashMap<NativeDocumentRef, (NativeElementRef, bool)>,
    pub hover: NativeElementRef,
    pub calls: Vec<ContextCall>,
    pub documents_start_hidden: bool,
    pub without_debugger: bool,
    pub debugger_visible: bool,
}

pub type RenderScript = Box<dyn FnMut(&mut dyn RenderInterface)>;

/// In-memory document engine and context sharing one element tree.
/// Clones share state, so one copy can go to the bridge and one stay with
/// the test.
#[derive(Clone, Default)]
pub struct FakeEngine {
    pub tree: Rc<RefCell<Tree>>,
    script: Rc<RefCell<Option<RenderScript>>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_ref(&self) -> u64 {
        let mut tree = self.tree.borrow_mut();
        tree.next_ref += 1;
        tree.next_ref
    }

    pub fn create_document(&self) -> NativeDocumentRef {
        let document = NativeDocumentRef(self.next_ref());
        let root = NativeElementRef(self.next_ref());
        let mut tree = self.tree.borrow_mut();
        tree.elements.insert(
            root,
            FakeElement {
                tag: "body".to_string(),
                document,
                ..Default::default()
            },
        );
        let visible = !tree.documents_start_hidden;
        tree.documents.insert(document, (root, visible));
        document
    }

    pub fn root(&self, document: NativeDocumentRef) -> NativeElementRef {
        self.tree
            .borrow()
            .documents
            .get(&document)
            .map(|(root, _)| *root)
            .unwrap_or(NativeElementRef::NULL)
    }

    pub fn add_element(
        &self,
        document: NativeDocumentRef,
        tag: &str,
        id: &str,
        border: Rectangle,
    ) -> NativeElementRef {
        let parent = self.root(document);
        let native = NativeElementRef(self.next_ref());
        self.tree.borrow_mut().elements.insert(
            native,
            FakeElement {
                id: id.to_string(),
                tag: tag.to_string(),
                document,
                parent,
                border,
                content: Rectangle::new(
                    border.x + 2.0,
                    border.y + 2.0,
                    border.width - 4.0,
                    border.height - 4.0,
                ),
                ..Default::default()
            },
        );
        native
    }

    pub fn element(&self, native: NativeElementRef) -> FakeElement {
        self.tree
            .borrow()
            .elements
            .get(&native)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_property_raw(&self, native: NativeElementRef, name: &str, value: &str) {
        if let Some(element) = self.tree.borrow_mut().elements.get_mut(&native) {
            element.properties.insert(name.to_string(), value.to_string());
        }
    }

    pub fn calls(&self) -> Vec<ContextCall> {
        self.tree.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.tree.borrow_mut().calls.clear();
    }

    pub fn set_render_script(&self, script: impl FnMut(&mut dyn RenderInterface) + 'static) {
        *self.script.borrow_mut() = Some(Box::new(script));
    }

    fn record(&self, call: ContextCall) {
        self.tree.borrow_mut().calls.push(call);
    }
}

impl DocumentEngine for FakeEngine {
    fn element_by_id(&self, document: NativeDocumentRef, id: &str) -> NativeElementRef {
        self.tree
            .borrow()
            .elements
            .iter()
            .find(|(_, e)| e.document == document && e.id == id)
            .map(|(native, _)| *native)
            .unwrap_or(NativeElementRef::NULL)
    }

    fn elements_by_tag(&self, document: NativeDocumentRef, tag: &str) -> Vec<NativeElementRef> {
        self.tree
            .borrow()
            .elements
            .iter()
            .filter(|(_, e)| e.document == document && e.tag == tag)
            .map(|(native, _)| *native)
            .collect()
    }

    fn owner_document(&self, element: NativeElementRef) -> NativeDocumentRef {
        self.tree
            .borrow()
            .elements
            .get(&element)
            .map(|e| e.document)
            .unwrap_or(NativeDocumentRef::NULL)
    }

    fn element_id(&self, element: NativeElementRef) -> String {
        self.element(element).id
    }

    fn tag_name(&self, element: NativeElementRef) -> String {
        self.element(element).tag
    }

    fn box_geometry(&self, element: NativeElementRef, area: BoxArea) -> Rectangle {
        let element = self.element(element);
        match area {
            BoxArea::Border => element.border,
            BoxArea::Content => element.content,
        }
    }

    fn set_offset(&self, element: NativeElementRef, offset: Position) {
        if let Some(e) = self.tree.borrow_mut().elements.get_mut(&element) {
            e.border.set_pos(offset);
        }
    }

    fn set_box_size(&self, element: NativeElementRef, size: Size) {
        if let Some(e) = self.tree.borrow_mut().elements.get_mut(&element) {
            e.border.width = size.width;
            e.border.height = size.height;
        }
    }

    fn property(&self, element: NativeElementRef, name: &str) -> Option<String> {
        self.element(element).properties.get(name).cloned()
    }

    fn set_property(&self, element: NativeElementRef, name: &str, value: &str) {
        self.set_property_raw(element, name, value);
    }

    fn attribute(&self, element: NativeElementRef, name: &str) -> Option<String> {
        self.element(element).attributes.get(name).cloned()
    }

    fn set_attribute(&self, element: NativeElementRef, name: &str, value: &str) {
        if let Some(e) = self.tree.borrow_mut().elements.get_mut(&element) {
            e.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn set_inner_text(&self, element: NativeElementRef, text: &str) {
        if let Some(e) = self.tree.borrow_mut().elements.get_mut(&element) {
            e.text = text.to_string();
        }
    }

    fn create_element(
        &self,
        parent: NativeElementRef,
        tag: &str,
        attributes: &[(String, String)],
    ) -> NativeElementRef {
        let document = self.owner_document(parent);
        if document.is_null() {
            return NativeElementRef::NULL;
        }
        let native = NativeElementRef(self.next_ref());
        self.tree.borrow_mut().elements.insert(
            native,
            FakeElement {
                tag: tag.to_string(),
                document,
                parent,
                attributes: attributes.iter().cloned().collect(),
                ..Default::default()
            },
        );
        native
    }

    fn app_data(&self, element: NativeElementRef) -> Option<u64> {
        self.element(element).app_data
    }

    fn set_app_data(&self, element: NativeElementRef, data: Option<u64>) {
        if let Some(e) = self.tree.borrow_mut().elements.get_mut(&element) {
            e.app_data = data;
        }
    }

    fn show_document(&self, document: NativeDocumentRef) {
        if let Some(entry) = self.tree.borrow_mut().documents.get_mut(&document) {
            entry.1 = true;
        }
    }

    fn hide_document(&self, document: NativeDocumentRef) {
        if let Some(entry) = self.tree.borrow_mut().documents.get_mut(&document) {
            entry.1 = false;
        }
    }

    fn is_document_visible(&self, document: NativeDocumentRef) -> bool {
        self.tree
            .borrow()
            .documents
            .get(&document)
            .is_some_and(|(_, visible)| *visible)
    }
}

impl DocumentContext for FakeEngine {
    fn process_key_down(&mut self, key: KeyIdentifier, modifiers: KeyModifier) -> bool {
        self.record(ContextCall::KeyDown(key, modifiers));
        true
    }

    fn process_key_up(&mut self, key: KeyIdentifier, modifiers: KeyModifier) -> bool {
        self.record(ContextCall::KeyUp(key, modifiers));
        true
    }

    fn process_text_input(&mut self, character: char) -> bool {
        self.record(ContextCall::Text(character));
        true
    }

    fn process_mouse_move(&mut self, x: i32, y: i32, modifiers: KeyModifier) -> bool {
        self.record(ContextCall::MouseMove(x, y, modifiers));
        // topmost = most recently created element under the pointer
        let point = Position::new(x as f32, y as f32);
        let hover = self
            .tree
            .borrow()
            .elements
            .iter()
            .rev()
            .find(|(_, e)| e.border.width > 0.0 && e.border.contains(point))
            .map(|(native, _)| *native)
            .unwrap_or(NativeElementRef::NULL);
        self.tree.borrow_mut().hover = hover;
        true
    }

    fn process_mouse_button_down(&mut self, button: i32, modifiers: KeyModifier) -> bool {
        self.record(ContextCall::ButtonDown(button, modifiers));
        true
    }

    fn process_mouse_button_up(&mut self, button: i32, modifiers: KeyModifier) -> bool {
        self.record(ContextCall::ButtonUp(button, modifiers));
        true
    }

    fn process_mouse_wheel(&mut self, delta: f32, modifiers: KeyModifier) -> bool {
        self.record(ContextCall::Wheel(delta, modifiers));
        true
    }

    fn hover_element(&self) -> NativeElementRef {
        self.tree.borrow().hover
    }

    fn set_dimensions(&mut self, size: Size) {
        self.record(ContextCall::Dimensions(size));
    }

    fn load_document(&mut self, path: &str) -> NativeDocumentRef {
        self.record(ContextCall::Load(path.to_string()));
        if path.starts_with("missing") {
            return NativeDocumentRef::NULL;
        }
        self.create_document()
    }

    fn unload_document(&mut self, document: NativeDocumentRef) {
        self.record(ContextCall::Unload(document));
        let mut tree = self.tree.borrow_mut();
        tree.documents.remove(&document);
        tree.elements.retain(|_, e| e.document != document);
    }

    fn update(&mut self) {
        self.record(ContextCall::Update);
    }

    fn render(&mut self, renderer: &mut dyn RenderInterface) {
        self.record(ContextCall::Render);
        let mut script = self.script.borrow_mut();
        if let Some(script) = script.as_mut() {
            script(renderer);
        }
    }

    fn initialise_debugger(&mut self) -> bool {
        !self.tree.borrow().without_debugger
    }

    fn set_debugger_visible(&mut self, visible: bool) {
        self.tree.borrow_mut().debugger_visible = visible;
    }

    fn is_debugger_visible(&self) -> bool {
        self.tree.borrow().debugger_visible
    }
}

/// System interface whose clock only moves when the test says so.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
    clipboard: Rc<RefCell<String>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl SystemInterface for ManualClock {
    fn elapsed_time(&self) -> f64 {
        self.now.get()
    }

    fn set_clipboard_text(&mut self, text: &str) {
        *self.clipboard.borrow_mut() = text.to_string();
    }

    fn clipboard_text(&mut self) -> String {
        self.clipboard.borrow().clone()
    }
}

pub fn quad(x: f32, y: f32, size: f32) -> Vec<plutonium_ui_bridge::utils::Vertex> {
    use plutonium_ui_bridge::utils::{Colour, Vertex};
    vec![
        Vertex::new([x, y], [0.0, 0.0], Colour::WHITE),
        Vertex::new([x + size, y], [1.0, 0.0], Colour::WHITE),
        Vertex::new([x + size, y + size], [1.0, 1.0], Colour::WHITE),
        Vertex::new([x, y + size], [0.0, 1.0], Colour::WHITE),
    ]
}

pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Harness {
    pub fake: FakeEngine,
    pub canvas: plutonium_ui_bridge::canvas::RecordingCanvas,
    pub clock: ManualClock,
    pub bridge: plutonium_ui_bridge::UiBridge,
    pub document: NativeDocumentRef,
}

pub fn harness() -> Harness {
    harness_with(plutonium_ui_bridge::config::BridgeConfig::default())
}

pub fn harness_with(config: plutonium_ui_bridge::config::BridgeConfig) -> Harness {
    harness_around(FakeEngine::new(), config)
}

/// Builds the bridge around a fake the test has already configured.
pub fn harness_around(
    fake: FakeEngine,
    config: plutonium_ui_bridge::config::BridgeConfig,
) -> Harness {
    use plutonium_ui_bridge::canvas::RecordingCanvas;
    use plutonium_ui_bridge::texture::FsResourceLoader;
    use plutonium_ui_bridge::UiBridge;

    init();
    let canvas = RecordingCanvas::new();
    let clock = ManualClock::new();
    let root = config.resource_root.clone();
    let mut bridge = UiBridge::new(
        config,
        Rc::new(fake.clone()),
        Box::new(fake.clone()),
        Box::new(canvas.clone()),
        Box::new(FsResourceLoader::new(root)),
        Box::new(clock.clone()),
    );
    bridge.resize(Size::new(800.0, 600.0));
    let document = bridge
        .load_document("main.rml")
        .expect("fake engine loads any non-missing path");
    fake.clear_calls();
    Harness {
        fake,
        canvas,
        clock,
        bridge,
        document,
    }
}
