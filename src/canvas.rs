use image::RgbaImage;
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use uuid::Uuid;

use crate::renderer::{HostCanvas, MeshData};
use crate::utils::{Position, Rectangle};

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub mesh: Uuid,
    pub translation: Position,
    pub texture: Option<Uuid>,
    pub clip: Option<Rectangle>,
}

#[derive(Debug, Default)]
pub struct CanvasState {
    pub meshes: HashMap<Uuid, MeshData>,
    pub textures: HashMap<Uuid, (u32, u32)>,
    pub draws: Vec<DrawCommand>,
    pub clip_enabled: bool,
    pub clip_rect: Option<Rectangle>,
    pub meshes_created: usize,
    pub meshes_freed: usize,
}

/// In-memory canvas that records every resource and draw. Clones share the
/// same state, so a host can keep one to inspect what a frame produced.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    state: Rc<RefCell<CanvasState>>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, CanvasState> {
        self.state.borrow()
    }

    pub fn draws(&self) -> Vec<DrawCommand> {
        self.state.borrow().draws.clone()
    }

    pub fn live_meshes(&self) -> usize {
        self.state.borrow().meshes.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }
}

impl HostCanvas for RecordingCanvas {
    fn create_mesh(&mut self, mesh: &MeshData) -> Uuid {
        let id = Uuid::new_v4();
        let mut state = self.state.borrow_mut();
        state.meshes.insert(id, mesh.clone());
        state.meshes_created += 1;
        id
    }

    fn free_mesh(&mut self, mesh: Uuid) {
        let mut state = self.state.borrow_mut();
        if state.meshes.remove(&mesh).is_some() {
            state.meshes_freed += 1;
        }
    }

    fn add_mesh(&mut self, mesh: Uuid, translation: Position, texture: Option<Uuid>) {
        let mut state = self.state.borrow_mut();
        let clip = if state.clip_enabled {
            state.clip_rect
        } else {
            None
        };
        state.draws.push(DrawCommand {
            mesh,
            translation,
            texture,
            clip,
        });
    }

    fn set_clip(&mut self, enabled: bool) {
        self.state.borrow_mut().clip_enabled = enabled;
    }

    fn set_clip_rect(&mut self, rect: Option<Rectangle>) {
        self.state.borrow_mut().clip_rect = rect;
    }

    fn create_texture(&mut self, image: &RgbaImage) -> Uuid {
        let id = Uuid::new_v4();
        self.state
            .borrow_mut()
            .textures
            .insert(id, image.dimensions());
        id
    }

    fn free_texture(&mut self, texture: Uuid) {
        self.state.borrow_mut().textures.remove(&texture);
    }

    fn clear(&mut self) {
        self.state.borrow_mut().draws.clear();
    }
}
