use crate::native::{BoxArea, DocumentEngine, NativeElementRef};
use crate::utils::{Colour, Position, Rectangle, Size};

/// Arena slot of a wrapper inside its `Document`. The generation makes ids of
/// evicted wrappers resolve to nothing once the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WrapperId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl WrapperId {
    /// Packed form stored in the native element's app-data slot.
    pub fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// Events delivered to element listeners. Pointer coordinates are in
/// document pixels; buttons use the document engine's numbering.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementEvent {
    Show,
    Hide,
    Resize(Size),
    Focus,
    Blur,
    MouseClick { position: Position, button: i32 },
    MouseDoubleClick { position: Position, button: i32 },
    MouseMove { position: Position },
    MousePress { position: Position, button: i32 },
    MouseUp { position: Position, button: i32 },
    MouseDrag { position: Position, button: i32 },
    MouseEnter { position: Position },
    MouseOut { position: Position },
    MouseOver { position: Position },
    AttributeChange(Vec<(String, String)>),
}

#[allow(unused_variables)]
pub trait ElementListener {
    fn on_show(&mut self) {}
    fn on_hide(&mut self) {}
    fn on_resize(&mut self, width: f32, height: f32) {}
    fn on_focus(&mut self) {}
    fn on_blur(&mut self) {}

    fn on_mouse_click(&mut self, x: i32, y: i32, button: i32) {}
    fn on_mouse_double_click(&mut self, x: i32, y: i32, button: i32) {}
    fn on_mouse_move(&mut self, x: i32, y: i32) {}
    fn on_mouse_press(&mut self, x: i32, y: i32, button: i32) {}
    fn on_mouse_up(&mut self, x: i32, y: i32, button: i32) {}
    fn on_mouse_drag(&mut self, x: i32, y: i32, button: i32) {}
    fn on_mouse_enter(&mut self, x: i32, y: i32) {}
    fn on_mouse_out(&mut self, x: i32, y: i32) {}
    fn on_mouse_over(&mut self, x: i32, y: i32) {}
    fn on_attribute_change(&mut self, changed: &[(String, String)]) {}
}

impl ElementEvent {
    pub(crate) fn deliver(&self, listener: &mut dyn ElementListener) {
        let xy = |p: &Position| (p.x as i32, p.y as i32);
        match self {
            ElementEvent::Show => listener.on_show(),
            ElementEvent::Hide => listener.on_hide(),
            ElementEvent::Resize(size) => listener.on_resize(size.width, size.height),
            ElementEvent::Focus => listener.on_focus(),
            ElementEvent::Blur => listener.on_blur(),
            ElementEvent::MouseClick { position, button } => {
                let (x, y) = xy(position);
                listener.on_mouse_click(x, y, *button)
            }
            ElementEvent::MouseDoubleClick { position, button } => {
                let (x, y) = xy(position);
                listener.on_mouse_double_click(x, y, *button)
            }
            ElementEvent::MouseMove { position } => {
                let (x, y) = xy(position);
                listener.on_mouse_move(x, y)
            }
            ElementEvent::MousePress { position, button } => {
                let (x, y) = xy(position);
                listener.on_mouse_press(x, y, *button)
            }
            ElementEvent::MouseUp { position, button } => {
                let (x, y) = xy(position);
                listener.on_mouse_up(x, y, *button)
            }
            ElementEvent::MouseDrag { position, button } => {
                let (x, y) = xy(position);
                listener.on_mouse_drag(x, y, *button)
            }
            ElementEvent::MouseEnter { position } => {
                let (x, y) = xy(position);
                listener.on_mouse_enter(x, y)
            }
            ElementEvent::MouseOut { position } => {
                let (x, y) = xy(position);
                listener.on_mouse_out(x, y)
            }
            ElementEvent::MouseOver { position } => {
                let (x, y) = xy(position);
                listener.on_mouse_over(x, y)
            }
            ElementEvent::AttributeChange(changed) => listener.on_attribute_change(changed),
        }
    }
}

/// Host-side mirror of one native element. Holds only the back-reference and
/// the listeners registered on it.
pub struct ElementWrapper {
    id: WrapperId,
    native: NativeElementRef,
    listeners: Vec<(ListenerId, Box<dyn ElementListener>)>,
    next_listener: u32,
}

impl ElementWrapper {
    pub(crate) fn new(id: WrapperId, native: NativeElementRef) -> Self {
        Self {
            id,
            native,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn id(&self) -> WrapperId {
        self.id
    }

    pub fn native(&self) -> NativeElementRef {
        self.native
    }

    pub fn add_listener(&mut self, listener: Box<dyn ElementListener>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn dispatch(&mut self, event: &ElementEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            event.deliver(listener.as_mut());
        }
    }
}

/// Borrowed view of a wrapper that forwards queries and mutations to the
/// native element.
#[derive(Clone, Copy)]
pub struct Element<'a> {
    wrapper: &'a ElementWrapper,
    engine: &'a dyn DocumentEngine,
}

impl<'a> Element<'a> {
    pub(crate) fn new(wrapper: &'a ElementWrapper, engine: &'a dyn DocumentEngine) -> Self {
        Self { wrapper, engine }
    }

    pub fn wrapper_id(&self) -> WrapperId {
        self.wrapper.id
    }

    pub fn native(&self) -> NativeElementRef {
        self.wrapper.native
    }

    pub fn id(&self) -> String {
        self.engine.element_id(self.wrapper.native)
    }

    pub fn tag(&self) -> String {
        self.engine.tag_name(self.wrapper.native)
    }

    /* BORDER BOX */
    pub fn bounds(&self) -> Rectangle {
        self.engine.box_geometry(self.wrapper.native, BoxArea::Border)
    }

    pub fn width(&self) -> f32 {
        self.bounds().width
    }

    pub fn height(&self) -> f32 {
        self.bounds().height
    }

    pub fn x(&self) -> f32 {
        self.bounds().x
    }

    pub fn y(&self) -> f32 {
        self.bounds().y
    }

    pub fn position(&self) -> Position {
        self.bounds().pos()
    }

    pub fn set_position(&self, position: Position) {
        self.engine.set_offset(self.wrapper.native, position);
    }

    pub fn set_bounds(&self, size: Size) {
        self.engine.set_box_size(self.wrapper.native, size);
    }

    /* CONTENT BOX */
    pub fn inner_bounds(&self) -> Rectangle {
        self.engine.box_geometry(self.wrapper.native, BoxArea::Content)
    }

    pub fn inner_width(&self) -> f32 {
        self.inner_bounds().width
    }

    pub fn inner_height(&self) -> f32 {
        self.inner_bounds().height
    }

    pub fn inner_x(&self) -> f32 {
        self.inner_bounds().x
    }

    pub fn inner_y(&self) -> f32 {
        self.inner_bounds().y
    }

    pub fn inner_position(&self) -> Position {
        self.inner_bounds().pos()
    }

    /* STYLE */
    pub fn colour(&self) -> Colour {
        self.colour_property("color")
    }

    pub fn background_colour(&self) -> Colour {
        self.colour_property("background-color")
    }

    fn colour_property(&self, name: &str) -> Colour {
        self.engine
            .property(self.wrapper.native, name)
            .and_then(|value| Colour::parse(&value))
            .unwrap_or(Colour::TRANSPARENT)
    }

    pub fn hide(&self) {
        self.engine
            .set_property(self.wrapper.native, "visibility", "hidden");
    }

    pub fn show(&self) {
        self.engine
            .set_property(self.wrapper.native, "visibility", "visible");
    }

    /* ATTRIBUTES */
    pub fn attribute_as_string(&self, name: &str) -> String {
        self.engine
            .attribute(self.wrapper.native, name)
            .unwrap_or_default()
    }

    pub fn attribute_as_int(&self, name: &str) -> i32 {
        self.attribute_as_string(name).trim().parse().unwrap_or(0)
    }

    pub fn attribute_as_float(&self, name: &str) -> f32 {
        self.attribute_as_string(name).trim().parse().unwrap_or(0.0)
    }

    pub fn attribute_as_bool(&self, name: &str) -> bool {
        matches!(
            self.attribute_as_string(name).trim(),
            "true" | "1" | "yes"
        )
    }

    pub fn set_attribute_as_string(&self, name: &str, value: &str) {
        self.engine.set_attribute(self.wrapper.native, name, value);
    }

    pub fn set_attribute_as_int(&self, name: &str, value: i32) {
        self.set_attribute_as_string(name, &value.to_string());
    }

    pub fn set_attribute_as_float(&self, name: &str, value: f32) {
        self.set_attribute_as_string(name, &value.to_string());
    }

    pub fn set_attribute_as_bool(&self, name: &str, value: bool) {
        self.set_attribute_as_string(name, if value { "true" } else { "false" });
    }

    pub fn set_text(&self, text: &str) {
        self.engine.set_inner_text(self.wrapper.native, text);
    }
}
