use std::collections::HashMap;
use std::sync::OnceLock;

use log::trace;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use crate::config::GestureConfig;
use crate::gesture::{Gesture, GestureClassifier};
use crate::native::{DocumentContext, KeyIdentifier, KeyModifier};
use crate::utils::Position;

/// One raw input event from the host, in the order the host received it.
#[derive(Debug, Clone, PartialEq)]
pub enum HostInputEvent {
    Key {
        code: KeyCode,
        text: Option<char>,
        pressed: bool,
        modifiers: ModifiersState,
    },
    PointerMotion {
        position: Position,
        modifiers: ModifiersState,
    },
    PointerButton {
        button: MouseButton,
        pressed: bool,
        position: Position,
        modifiers: ModifiersState,
    },
    Wheel {
        delta: f32,
        modifiers: ModifiersState,
    },
    FocusLost,
}

const KEY_TABLE: &[(KeyCode, KeyIdentifier)] = &[
    (KeyCode::Space, KeyIdentifier::Space),
    (KeyCode::Digit0, KeyIdentifier::Num0),
    (KeyCode::Digit1, KeyIdentifier::Num1),
    (KeyCode::Digit2, KeyIdentifier::Num2),
    (KeyCode::Digit3, KeyIdentifier::Num3),
    (KeyCode::Digit4, KeyIdentifier::Num4),
    (KeyCode::Digit5, KeyIdentifier::Num5),
    (KeyCode::Digit6, KeyIdentifier::Num6),
    (KeyCode::Digit7, KeyIdentifier::Num7),
    (KeyCode::Digit8, KeyIdentifier::Num8),
    (KeyCode::Digit9, KeyIdentifier::Num9),
    (KeyCode::KeyA, KeyIdentifier::A),
    (KeyCode::KeyB, KeyIdentifier::B),
    (KeyCode::KeyC, KeyIdentifier::C),
    (KeyCode::KeyD, KeyIdentifier::D),
    (KeyCode::KeyE, KeyIdentifier::E),
    (KeyCode::KeyF, KeyIdentifier::F),
    (KeyCode::KeyG, KeyIdentifier::G),
    (KeyCode::KeyH, KeyIdentifier::H),
    (KeyCode::KeyI, KeyIdentifier::I),
    (KeyCode::KeyJ, KeyIdentifier::J),
    (KeyCode::KeyK, KeyIdentifier::K),
    (KeyCode::KeyL, KeyIdentifier::L),
    (KeyCode::KeyM, KeyIdentifier::M),
    (KeyCode::KeyN, KeyIdentifier::N),
    (KeyCode::KeyO, KeyIdentifier::O),
    (KeyCode::KeyP, KeyIdentifier::P),
    (KeyCode::KeyQ, KeyIdentifier::Q),
    (KeyCode::KeyR, KeyIdentifier::R),
    (KeyCode::KeyS, KeyIdentifier::S),
    (KeyCode::KeyT, KeyIdentifier::T),
    (KeyCode::KeyU, KeyIdentifier::U),
    (KeyCode::KeyV, KeyIdentifier::V),
    (KeyCode::KeyW, KeyIdentifier::W),
    (KeyCode::KeyX, KeyIdentifier::X),
    (KeyCode::KeyY, KeyIdentifier::Y),
    (KeyCode::KeyZ, KeyIdentifier::Z),
    (KeyCode::Semicolon, KeyIdentifier::Oem1),
    (KeyCode::Equal, KeyIdentifier::OemPlus),
    (KeyCode::Comma, KeyIdentifier::OemComma),
    (KeyCode::Minus, KeyIdentifier::OemMinus),
    (KeyCode::Period, KeyIdentifier::OemPeriod),
    (KeyCode::Slash, KeyIdentifier::Oem2),
    (KeyCode::Backquote, KeyIdentifier::Oem3),
    (KeyCode::BracketLeft, KeyIdentifier::Oem4),
    (KeyCode::Backslash, KeyIdentifier::Oem5),
    (KeyCode::BracketRight, KeyIdentifier::Oem6),
    (KeyCode::Quote, KeyIdentifier::Oem7),
    (KeyCode::Numpad0, KeyIdentifier::Numpad0),
    (KeyCode::Numpad1, KeyIdentifier::Numpad1),
    (KeyCode::Numpad2, KeyIdentifier::Numpad2),
    (KeyCode::Numpad3, KeyIdentifier::Numpad3),
    (KeyCode::Numpad4, KeyIdentifier::Numpad4),
    (KeyCode::Numpad5, KeyIdentifier::Numpad5),
    (KeyCode::Numpad6, KeyIdentifier::Numpad6),
    (KeyCode::Numpad7, KeyIdentifier::Numpad7),
    (KeyCode::Numpad8, KeyIdentifier::Numpad8),
    (KeyCode::Numpad9, KeyIdentifier::Numpad9),
    (KeyCode::NumpadEnter, KeyIdentifier::NumpadEnter),
    (KeyCode::NumpadMultiply, KeyIdentifier::Multiply),
    (KeyCode::NumpadAdd, KeyIdentifier::Add),
    (KeyCode::NumpadSubtract, KeyIdentifier::Subtract),
    (KeyCode::NumpadDecimal, KeyIdentifier::Decimal),
    (KeyCode::NumpadDivide, KeyIdentifier::Divide),
    (KeyCode::NumpadClear, KeyIdentifier::Clear),
    (KeyCode::Backspace, KeyIdentifier::Back),
    (KeyCode::Tab, KeyIdentifier::Tab),
    (KeyCode::Enter, KeyIdentifier::Return),
    (KeyCode::Pause, KeyIdentifier::Pause),
    (KeyCode::CapsLock, KeyIdentifier::Capital),
    (KeyCode::Escape, KeyIdentifier::Escape),
    (KeyCode::PageUp, KeyIdentifier::Prior),
    (KeyCode::PageDown, KeyIdentifier::Next),
    (KeyCode::End, KeyIdentifier::End),
    (KeyCode::Home, KeyIdentifier::Home),
    (KeyCode::ArrowLeft, KeyIdentifier::Left),
    (KeyCode::ArrowUp, KeyIdentifier::Up),
    (KeyCode::ArrowRight, KeyIdentifier::Right),
    (KeyCode::ArrowDown, KeyIdentifier::Down),
    (KeyCode::Insert, KeyIdentifier::Insert),
    (KeyCode::Delete, KeyIdentifier::Delete),
    (KeyCode::Help, KeyIdentifier::Help),
    (KeyCode::SuperLeft, KeyIdentifier::LWin),
    (KeyCode::SuperRight, KeyIdentifier::RWin),
    (KeyCode::F1, KeyIdentifier::F1),
    (KeyCode::F2, KeyIdentifier::F2),
    (KeyCode::F3, KeyIdentifier::F3),
    (KeyCode::F4, KeyIdentifier::F4),
    (KeyCode::F5, KeyIdentifier::F5),
    (KeyCode::F6, KeyIdentifier::F6),
    (KeyCode::F7, KeyIdentifier::F7),
    (KeyCode::F8, KeyIdentifier::F8),
    (KeyCode::F9, KeyIdentifier::F9),
    (KeyCode::F10, KeyIdentifier::F10),
    (KeyCode::F11, KeyIdentifier::F11),
    (KeyCode::F12, KeyIdentifier::F12),
    (KeyCode::F13, KeyIdentifier::F13),
    (KeyCode::F14, KeyIdentifier::F14),
    (KeyCode::F15, KeyIdentifier::F15),
    (KeyCode::NumLock, KeyIdentifier::NumLock),
    (KeyCode::ScrollLock, KeyIdentifier::Scroll),
    (KeyCode::ShiftLeft, KeyIdentifier::LShift),
    (KeyCode::ShiftRight, KeyIdentifier::RShift),
    (KeyCode::ControlLeft, KeyIdentifier::LControl),
    (KeyCode::ControlRight, KeyIdentifier::RControl),
    (KeyCode::AltLeft, KeyIdentifier::LMenu),
    (KeyCode::AltRight, KeyIdentifier::RMenu),
    (KeyCode::Meta, KeyIdentifier::LMeta),
];

/// Bidirectional host key code ↔ document key identifier table. Keys missing
/// from the table have no identifier and are dropped.
pub struct KeyMap {
    to_identifier: HashMap<KeyCode, KeyIdentifier>,
    to_code: HashMap<KeyIdentifier, KeyCode>,
}

impl KeyMap {
    fn build() -> Self {
        let mut to_identifier = HashMap::with_capacity(KEY_TABLE.len());
        let mut to_code = HashMap::with_capacity(KEY_TABLE.len());
        for &(code, identifier) in KEY_TABLE {
            to_identifier.insert(code, identifier);
            to_code.insert(identifier, code);
        }
        Self {
            to_identifier,
            to_code,
        }
    }

    /// The process-wide table.
    pub fn get() -> &'static KeyMap {
        static MAP: OnceLock<KeyMap> = OnceLock::new();
        MAP.get_or_init(KeyMap::build)
    }

    pub fn identifier(&self, code: KeyCode) -> Option<KeyIdentifier> {
        self.to_identifier.get(&code).copied()
    }

    pub fn code(&self, identifier: KeyIdentifier) -> Option<KeyCode> {
        self.to_code.get(&identifier).copied()
    }

    pub fn len(&self) -> usize {
        self.to_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_identifier.is_empty()
    }

    pub fn entries() -> &'static [(KeyCode, KeyIdentifier)] {
        KEY_TABLE
    }
}

pub fn is_numpad_key(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Numpad0
            | KeyCode::Numpad1
            | KeyCode::Numpad2
            | KeyCode::Numpad3
            | KeyCode::Numpad4
            | KeyCode::Numpad5
            | KeyCode::Numpad6
            | KeyCode::Numpad7
            | KeyCode::Numpad8
            | KeyCode::Numpad9
            | KeyCode::NumpadEnter
            | KeyCode::NumpadMultiply
            | KeyCode::NumpadAdd
            | KeyCode::NumpadSubtract
            | KeyCode::NumpadDecimal
            | KeyCode::NumpadDivide
            | KeyCode::NumpadClear
    )
}

/// Keys the document handles itself; their text would be applied twice.
pub fn suppresses_text(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Backspace
            | KeyCode::Delete
            | KeyCode::ArrowLeft
            | KeyCode::ArrowRight
            | KeyCode::ArrowUp
            | KeyCode::ArrowDown
            | KeyCode::Enter
            | KeyCode::NumpadEnter
    )
}

pub fn translate_modifiers(state: ModifiersState) -> KeyModifier {
    let mut modifiers = KeyModifier::empty();
    modifiers.set(KeyModifier::SHIFT, state.shift_key());
    modifiers.set(KeyModifier::CTRL, state.control_key());
    modifiers.set(KeyModifier::ALT, state.alt_key());
    modifiers.set(KeyModifier::META, state.super_key());
    modifiers
}

pub fn key_modifiers(code: KeyCode, state: ModifiersState) -> KeyModifier {
    let mut modifiers = translate_modifiers(state);
    if is_numpad_key(code) {
        modifiers |= KeyModifier::NUMLOCK;
    }
    modifiers
}

pub fn mouse_button_index(button: MouseButton) -> i32 {
    match button {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
        _ => 2,
    }
}

/// Feeds host input into a document context and the gesture classifier.
///
/// Raw key, text, pointer and wheel events are forwarded to the context as
/// they arrive. The returned gestures are for the caller to deliver to
/// element listeners.
pub struct EventTranslator {
    classifier: GestureClassifier,
}

impl EventTranslator {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            classifier: GestureClassifier::new(config),
        }
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut GestureClassifier {
        &mut self.classifier
    }

    pub fn translate(
        &mut self,
        event: &HostInputEvent,
        now: f64,
        context: &mut dyn DocumentContext,
    ) -> Vec<Gesture> {
        match *event {
            HostInputEvent::Key {
                code,
                text,
                pressed,
                modifiers,
            } => {
                let mods = key_modifiers(code, modifiers);
                match KeyMap::get().identifier(code) {
                    Some(key) if pressed => {
                        context.process_key_down(key, mods);
                    }
                    Some(key) => {
                        context.process_key_up(key, mods);
                    }
                    None => trace!("dropping unmapped key {:?}", code),
                }
                if pressed && !suppresses_text(code) {
                    if let Some(character) = text {
                        context.process_text_input(character);
                    }
                }
                Vec::new()
            }
            HostInputEvent::PointerMotion {
                position,
                modifiers,
            } => {
                context.process_mouse_move(
                    position.x as i32,
                    position.y as i32,
                    translate_modifiers(modifiers),
                );
                self.classifier.motion(position)
            }
            HostInputEvent::PointerButton {
                button,
                pressed,
                position,
                modifiers,
            } => {
                let index = mouse_button_index(button);
                let mods = translate_modifiers(modifiers);
                if pressed {
                    context.process_mouse_button_down(index, mods);
                    self.classifier.press(index, position, now)
                } else {
                    context.process_mouse_button_up(index, mods);
                    self.classifier.release(index, position, now)
                }
            }
            HostInputEvent::Wheel { delta, modifiers } => {
                context.process_mouse_wheel(delta, translate_modifiers(modifiers));
                Vec::new()
            }
            HostInputEvent::FocusLost => {
                let gestures = self.classifier.focus_lost();
                for gesture in &gestures {
                    if let Gesture::Release { button, .. } = gesture {
                        context.process_mouse_button_up(*button, KeyModifier::empty());
                    }
                }
                gestures
            }
        }
    }
}

/// Turns winit window events into `HostInputEvent`s, tracking the modifier
/// state and cursor position winit reports separately.
#[derive(Debug, Default)]
pub struct InputCollector {
    modifiers: ModifiersState,
    cursor: Position,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modifiers(&self) -> ModifiersState {
        self.modifiers
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn collect(&mut self, event: &WindowEvent) -> Option<HostInputEvent> {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
                None
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return None;
                };
                Some(HostInputEvent::Key {
                    code,
                    text: event.text.as_ref().and_then(|text| text.chars().next()),
                    pressed: event.state == ElementState::Pressed,
                    modifiers: self.modifiers,
                })
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Position::new(position.x as f32, position.y as f32);
                Some(HostInputEvent::PointerMotion {
                    position: self.cursor,
                    modifiers: self.modifiers,
                })
            }
            WindowEvent::MouseInput { state, button, .. } => Some(HostInputEvent::PointerButton {
                button: *button,
                pressed: *state == ElementState::Pressed,
                position: self.cursor,
                modifiers: self.modifiers,
            }),
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                Some(HostInputEvent::Wheel {
                    delta,
                    modifiers: self.modifiers,
                })
            }
            WindowEvent::Focused(false) => Some(HostInputEvent::FocusLost),
            _ => None,
        }
    }
}
