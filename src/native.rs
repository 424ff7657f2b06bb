//! The document engine as seen from the bridge.
//!
//! Native elements and documents are opaque references owned by the engine.
//! The bridge stores them and hands them back, it never dereferences them.

use crate::renderer::RenderInterface;
use crate::utils::{Position, Rectangle, Size};
use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NativeElementRef(pub u64);

impl NativeElementRef {
    pub const NULL: NativeElementRef = NativeElementRef(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NativeDocumentRef(pub u64);

impl NativeDocumentRef {
    pub const NULL: NativeDocumentRef = NativeDocumentRef(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Which box of an element a geometry query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxArea {
    Border,
    Content,
}

bitflags! {
    /// Modifier mask in the document engine's bit layout.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifier: u32 {
        const CTRL = 1 << 0;
        const SHIFT = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
        const CAPSLOCK = 1 << 4;
        const NUMLOCK = 1 << 5;
        const SCROLLLOCK = 1 << 6;
    }
}

/// Semantic key identifiers understood by the document engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyIdentifier {
    Unknown,
    Space,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    /// `;:`
    Oem1,
    OemPlus,
    OemComma,
    OemMinus,
    OemPeriod,
    /// `/?`
    Oem2,
    /// `` `~ ``
    Oem3,
    /// `[{`
    Oem4,
    /// `\|`
    Oem5,
    /// `]}`
    Oem6,
    /// `'"`
    Oem7,
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadEnter,
    Multiply,
    Add,
    Subtract,
    Decimal,
    Divide,
    Back,
    Tab,
    Clear,
    Return,
    Pause,
    Capital,
    Escape,
    Prior,
    Next,
    End,
    Home,
    Left,
    Up,
    Right,
    Down,
    Insert,
    Delete,
    Help,
    LWin,
    RWin,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    NumLock,
    Scroll,
    LShift,
    RShift,
    LControl,
    RControl,
    LMenu,
    RMenu,
    LMeta,
}

/// Element tree access. Every method takes `&self`: the engine owns the tree
/// and these calls are forwarded by reference, the way a foreign API is.
pub trait DocumentEngine {
    fn element_by_id(&self, document: NativeDocumentRef, id: &str) -> NativeElementRef;
    fn elements_by_tag(&self, document: NativeDocumentRef, tag: &str) -> Vec<NativeElementRef>;
    fn owner_document(&self, element: NativeElementRef) -> NativeDocumentRef;

    fn element_id(&self, element: NativeElementRef) -> String;
    fn tag_name(&self, element: NativeElementRef) -> String;

    fn box_geometry(&self, element: NativeElementRef, area: BoxArea) -> Rectangle;
    fn set_offset(&self, element: NativeElementRef, offset: Position);
    fn set_box_size(&self, element: NativeElementRef, size: Size);

    fn property(&self, element: NativeElementRef, name: &str) -> Option<String>;
    fn set_property(&self, element: NativeElementRef, name: &str, value: &str);
    fn attribute(&self, element: NativeElementRef, name: &str) -> Option<String>;
    fn set_attribute(&self, element: NativeElementRef, name: &str, value: &str);
    fn set_inner_text(&self, element: NativeElementRef, text: &str);

    fn create_element(
        &self,
        parent: NativeElementRef,
        tag: &str,
        attributes: &[(String, String)],
    ) -> NativeElementRef;

    /// The application-data slot the bridge uses for its back-pointer.
    fn app_data(&self, element: NativeElementRef) -> Option<u64>;
    fn set_app_data(&self, element: NativeElementRef, data: Option<u64>);

    fn show_document(&self, document: NativeDocumentRef);
    fn hide_document(&self, document: NativeDocumentRef);
    fn is_document_visible(&self, document: NativeDocumentRef) -> bool;
}

/// One document-engine context: receives input, lays out and renders.
pub trait DocumentContext {
    fn process_key_down(&mut self, key: KeyIdentifier, modifiers: KeyModifier) -> bool;
    fn process_key_up(&mut self, key: KeyIdentifier, modifiers: KeyModifier) -> bool;
    fn process_text_input(&mut self, character: char) -> bool;
    fn process_mouse_move(&mut self, x: i32, y: i32, modifiers: KeyModifier) -> bool;
    fn process_mouse_button_down(&mut self, button: i32, modifiers: KeyModifier) -> bool;
    fn process_mouse_button_up(&mut self, button: i32, modifiers: KeyModifier) -> bool;
    fn process_mouse_wheel(&mut self, delta: f32, modifiers: KeyModifier) -> bool;

    /// Element currently under the pointer, or `NativeElementRef::NULL`.
    fn hover_element(&self) -> NativeElementRef;

    fn set_dimensions(&mut self, size: Size);
    fn load_document(&mut self, path: &str) -> NativeDocumentRef;
    fn unload_document(&mut self, document: NativeDocumentRef);

    fn update(&mut self);
    fn render(&mut self, renderer: &mut dyn RenderInterface);

    /// Attaches the engine's visual debugger to this context. Returns `false`
    /// when the engine was built without one.
    fn initialise_debugger(&mut self) -> bool {
        false
    }

    fn set_debugger_visible(&mut self, _visible: bool) {}

    fn is_debugger_visible(&self) -> bool {
        false
    }
}
