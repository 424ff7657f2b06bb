mod common;

use common::{
    harness, harness_around, harness_with, quad, ContextCall, FakeEngine, QUAD_INDICES,
};
use plutonium_ui_bridge::config::BridgeConfig;
use plutonium_ui_bridge::element::ElementListener;
use plutonium_ui_bridge::error::BridgeError;
use plutonium_ui_bridge::input::HostInputEvent;
use plutonium_ui_bridge::native::{DocumentEngine, NativeElementRef};
use plutonium_ui_bridge::texture::TextureHandle;
use plutonium_ui_bridge::utils::{Position, Rectangle, Size};
use std::cell::RefCell;
use std::rc::Rc;
use winit::keyboard::ModifiersState;

#[test]
fn missing_document_is_an_error() {
    let mut h = harness();
    assert_eq!(
        h.bridge.load_document("missing.rml"),
        Err(BridgeError::ResourceNotFound("missing.rml".to_string()))
    );
    assert_eq!(h.bridge.documents().len(), 1);
}

#[test]
fn resize_reaches_the_context() {
    let mut h = harness();
    h.bridge.resize(Size::new(1024.0, 768.0));
    assert_eq!(
        h.fake.calls(),
        vec![ContextCall::Dimensions(Size::new(1024.0, 768.0))]
    );
    assert_eq!(h.bridge.viewport_size(), Size::new(1024.0, 768.0));
}

#[test]
fn frame_runs_update_then_render_callbacks() {
    let mut h = harness();
    let compiled = Rc::new(RefCell::new(None));
    let slot = compiled.clone();
    h.fake.set_render_script(move |renderer| {
        let mut slot = slot.borrow_mut();
        let handle = *slot.get_or_insert_with(|| {
            renderer.compile_geometry(&quad(0.0, 0.0, 16.0), &QUAD_INDICES, TextureHandle::NULL)
        });
        renderer.render_compiled_geometry(handle, Position::new(3.0, 4.0));
        renderer.render_geometry(
            &quad(0.0, 0.0, 2.0),
            &QUAD_INDICES,
            TextureHandle::NULL,
            Position::default(),
        );
    });

    h.bridge.update();
    h.bridge.render();
    h.bridge.render();

    assert_eq!(
        h.fake.calls(),
        vec![ContextCall::Update, ContextCall::Render, ContextCall::Render]
    );
    // one compiled mesh plus this frame's immediate mesh
    assert_eq!(h.canvas.live_meshes(), 2);
    let draws = h.canvas.draws();
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0].translation, Position::new(3.0, 4.0));
    assert_eq!(h.bridge.renderer().geometry().len(), 1);
}

#[test]
fn shutdown_releases_render_resources_and_documents() {
    let mut h = harness();
    h.fake.set_render_script(|renderer| {
        renderer.compile_geometry(&quad(0.0, 0.0, 1.0), &QUAD_INDICES, TextureHandle::NULL);
        renderer.generate_texture(&[0u8; 4], 1, 1);
    });
    h.bridge.render();
    assert_eq!(h.canvas.live_meshes(), 1);
    assert_eq!(h.canvas.live_textures(), 1);

    h.bridge.shutdown();
    assert_eq!(h.canvas.live_meshes(), 0);
    assert_eq!(h.canvas.live_textures(), 0);
    assert!(h.bridge.documents().is_empty());
    assert!(h.fake.calls().contains(&ContextCall::Unload(h.document)));

    // a second shutdown does nothing
    h.fake.clear_calls();
    h.bridge.shutdown();
    assert!(h.fake.calls().is_empty());
}

#[test]
fn close_document_drops_wrappers() {
    let mut h = harness();
    let native = h.fake.add_element(h.document, "div", "x", Rectangle::default());
    h.bridge
        .document_mut(h.document)
        .unwrap()
        .get_or_create_wrapper(native);

    assert!(h.bridge.close_document(h.document));
    assert!(h.bridge.document(h.document).is_none());
    assert!(!h.bridge.close_document(h.document));
    assert_eq!(h.fake.calls(), vec![ContextCall::Unload(h.document)]);
}

#[derive(Clone, Default)]
struct EdgeRecorder {
    events: Rc<RefCell<Vec<&'static str>>>,
}

impl ElementListener for EdgeRecorder {
    fn on_mouse_enter(&mut self, _x: i32, _y: i32) {
        self.events.borrow_mut().push("enter");
    }

    fn on_mouse_out(&mut self, _x: i32, _y: i32) {
        self.events.borrow_mut().push("out");
    }

    fn on_mouse_over(&mut self, _x: i32, _y: i32) {
        self.events.borrow_mut().push("over");
    }
}

#[test]
fn entering_the_viewport_is_edge_triggered() {
    let mut h = harness();
    h.bridge.resize(Size::new(100.0, 100.0));
    // element fills the viewport
    let native = h.fake.add_element(
        h.document,
        "div",
        "fill",
        Rectangle::new(0.0, 0.0, 100.0, 100.0),
    );
    let recorder = EdgeRecorder::default();
    let document = h.bridge.document_mut(h.document).unwrap();
    let id = document.get_or_create_wrapper(native).unwrap();
    document
        .wrapper_mut(id)
        .unwrap()
        .add_listener(Box::new(recorder.clone()));

    for (x, y) in [(10.0, 10.0), (20.0, 20.0), (30.0, 30.0)] {
        h.bridge.inject_event(&HostInputEvent::PointerMotion {
            position: Position::new(x, y),
            modifiers: ModifiersState::empty(),
        });
    }
    assert_eq!(*recorder.events.borrow(), vec!["over", "enter"]);
}

#[test]
fn config_thresholds_drive_gestures() {
    let mut config = BridgeConfig::default();
    config.gestures.drag_threshold = 100.0;
    let mut h = harness_with(config);
    assert_eq!(h.bridge.config().gestures.drag_threshold, 100.0);

    h.bridge.inject_event(&HostInputEvent::PointerButton {
        button: winit::event::MouseButton::Left,
        pressed: true,
        position: Position::new(0.0, 0.0),
        modifiers: ModifiersState::empty(),
    });
    h.bridge.inject_event(&HostInputEvent::PointerMotion {
        position: Position::new(50.0, 0.0),
        modifiers: ModifiersState::empty(),
    });
    assert!(!h.bridge.translator().classifier().state().dragging);

    h.bridge.inject_event(&HostInputEvent::PointerMotion {
        position: Position::new(150.0, 0.0),
        modifiers: ModifiersState::empty(),
    });
    assert!(h.bridge.translator().classifier().state().dragging);
}

#[test]
fn fonts_and_files_use_the_resource_root() {
    let mut config = BridgeConfig::default();
    config.resource_root = "/no/such/root/".to_string();
    let mut h = harness_with(config);
    assert!(!h.bridge.load_font("Delicious.otf", false));
    assert!(h.bridge.files().open("absent.rml").is_null());
}

#[test]
fn clipboard_goes_through_the_system_interface() {
    let mut h = harness();
    h.bridge.system_mut().set_clipboard_text("copied");
    assert_eq!(h.bridge.system_mut().clipboard_text(), "copied");
    h.clock.advance(1.5);
    assert_eq!(h.bridge.system().elapsed_time(), 1.5);
}

#[test]
fn loaded_documents_are_shown() {
    let fake = FakeEngine::new();
    fake.tree.borrow_mut().documents_start_hidden = true;
    let mut h = harness_around(fake, BridgeConfig::default());
    assert!(h.fake.is_document_visible(h.document));

    let second = h.bridge.load_document("second.rml").unwrap();
    assert!(h.fake.is_document_visible(second));
}

#[test]
fn debugger_visibility_follows_show_hide_and_toggle() {
    let mut h = harness();
    assert!(!h.bridge.is_debugger_visible());

    h.bridge.show_debugger().unwrap();
    assert!(h.bridge.is_debugger_visible());
    h.bridge.toggle_debugger().unwrap();
    assert!(!h.bridge.is_debugger_visible());
    h.bridge.toggle_debugger().unwrap();
    assert!(h.fake.tree.borrow().debugger_visible);
    h.bridge.hide_debugger().unwrap();
    assert!(!h.bridge.is_debugger_visible());
}

#[test]
fn debugger_calls_fail_without_an_engine_debugger() {
    let fake = FakeEngine::new();
    fake.tree.borrow_mut().without_debugger = true;
    let mut h = harness_around(fake, BridgeConfig::default());

    let unsupported = Err(BridgeError::UnsupportedOperation("debugger"));
    assert_eq!(h.bridge.show_debugger(), unsupported);
    assert_eq!(h.bridge.toggle_debugger(), unsupported);
    assert_eq!(h.bridge.hide_debugger(), unsupported);
    assert!(!h.bridge.is_debugger_visible());
    assert!(!h.fake.tree.borrow().debugger_visible);
}

#[test]
fn closing_a_document_forgets_unwrapped_hover() {
    let mut h = harness();
    let native = h.fake.add_element(
        h.document,
        "div",
        "plain",
        Rectangle::new(0.0, 0.0, 50.0, 50.0),
    );
    h.bridge.inject_event(&HostInputEvent::PointerMotion {
        position: Position::new(10.0, 10.0),
        modifiers: ModifiersState::empty(),
    });
    h.bridge.inject_event(&HostInputEvent::PointerButton {
        button: winit::event::MouseButton::Left,
        pressed: true,
        position: Position::new(10.0, 10.0),
        modifiers: ModifiersState::empty(),
    });
    assert_eq!(h.bridge.hovered_element(), native);
    let document = h.bridge.document(h.document).unwrap();
    assert!(document.wrapper_for(native).is_none());

    assert!(h.bridge.close_document(h.document));
    assert_eq!(h.bridge.hovered_element(), NativeElementRef::NULL);

    // the release has nowhere to go and nothing gets wrapped
    h.bridge.inject_event(&HostInputEvent::PointerButton {
        button: winit::event::MouseButton::Left,
        pressed: false,
        position: Position::new(10.0, 10.0),
        modifiers: ModifiersState::empty(),
    });
    assert_eq!(h.bridge.hovered_element(), NativeElementRef::NULL);
    assert!(h.bridge.documents().is_empty());
}

#[test]
fn closing_another_document_keeps_hover() {
    let mut h = harness();
    let other = h.bridge.load_document("other.rml").unwrap();
    let native = h.fake.add_element(
        h.document,
        "div",
        "plain",
        Rectangle::new(0.0, 0.0, 50.0, 50.0),
    );
    h.bridge.inject_event(&HostInputEvent::PointerMotion {
        position: Position::new(10.0, 10.0),
        modifiers: ModifiersState::empty(),
    });

    assert!(h.bridge.close_document(other));
    assert_eq!(h.bridge.hovered_element(), native);
}
