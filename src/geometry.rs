//! Compiled geometry cache.
//!
//! Each compile uploads one host mesh and hands out a fresh handle; renders
//! of that handle reuse the mesh with only the translation changing.

use log::trace;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::BridgeError;
use crate::renderer::{HostCanvas, MeshData};
use crate::texture::{TextureCache, TextureHandle};
use crate::utils::{Position, Rectangle, Vertex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CompiledGeometryHandle(pub u64);

impl CompiledGeometryHandle {
    pub const NULL: CompiledGeometryHandle = CompiledGeometryHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct CompiledMesh {
    mesh: Uuid,
    texture: TextureHandle,
}

#[derive(Debug, Default)]
pub struct GeometryCache {
    compiled: HashMap<CompiledGeometryHandle, CompiledMesh>,
    next_handle: u64,
    // meshes from immediate draws, freed when the next frame begins
    transient: Vec<Uuid>,
    scissor_enabled: bool,
    scissor_region: Option<Rectangle>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            ..Default::default()
        }
    }

    fn validate(vertices: &[Vertex], indices: &[u32]) -> Result<(), BridgeError> {
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(BridgeError::InvalidGeometry {
                index,
                vertices: vertices.len(),
            });
        }
        Ok(())
    }

    pub fn compile(
        &mut self,
        canvas: &mut dyn HostCanvas,
        vertices: &[Vertex],
        indices: &[u32],
        texture: TextureHandle,
    ) -> Result<CompiledGeometryHandle, BridgeError> {
        Self::validate(vertices, indices)?;
        let mesh = canvas.create_mesh(&MeshData::from_vertices(vertices, indices));

        let handle = CompiledGeometryHandle(self.next_handle);
        self.next_handle += 1;
        self.compiled.insert(handle, CompiledMesh { mesh, texture });
        trace!(
            "compiled {:?}: {} vertices, {} indices",
            handle,
            vertices.len(),
            indices.len()
        );
        Ok(handle)
    }

    pub fn render_compiled(
        &self,
        canvas: &mut dyn HostCanvas,
        textures: &TextureCache,
        handle: CompiledGeometryHandle,
        translation: Position,
    ) -> Result<(), BridgeError> {
        if handle.is_null() {
            return Ok(());
        }
        let compiled = self
            .compiled
            .get(&handle)
            .ok_or(BridgeError::InvalidHandle {
                kind: "compiled geometry",
                handle: handle.0,
            })?;
        canvas.add_mesh(
            compiled.mesh,
            translation,
            textures.host_texture(compiled.texture),
        );
        Ok(())
    }

    pub fn release_compiled(
        &mut self,
        canvas: &mut dyn HostCanvas,
        handle: CompiledGeometryHandle,
    ) -> Result<(), BridgeError> {
        if handle.is_null() {
            return Ok(());
        }
        let compiled = self
            .compiled
            .remove(&handle)
            .ok_or(BridgeError::InvalidHandle {
                kind: "compiled geometry",
                handle: handle.0,
            })?;
        canvas.free_mesh(compiled.mesh);
        Ok(())
    }

    pub fn render_immediate(
        &mut self,
        canvas: &mut dyn HostCanvas,
        textures: &TextureCache,
        vertices: &[Vertex],
        indices: &[u32],
        texture: TextureHandle,
        translation: Position,
    ) -> Result<(), BridgeError> {
        Self::validate(vertices, indices)?;
        let mesh = canvas.create_mesh(&MeshData::from_vertices(vertices, indices));
        canvas.add_mesh(mesh, translation, textures.host_texture(texture));
        self.transient.push(mesh);
        Ok(())
    }

    pub fn set_scissor_enabled(&mut self, canvas: &mut dyn HostCanvas, enabled: bool) {
        self.scissor_enabled = enabled;
        canvas.set_clip(enabled);
        if !enabled {
            self.scissor_region = None;
            canvas.set_clip_rect(None);
        }
    }

    pub fn set_scissor_region(&mut self, canvas: &mut dyn HostCanvas, region: Rectangle) {
        self.scissor_region = Some(region);
        canvas.set_clip_rect(Some(region));
    }

    /// The clip rectangle applied to draws issued now, if any.
    pub fn active_scissor(&self) -> Option<Rectangle> {
        if self.scissor_enabled {
            self.scissor_region
        } else {
            None
        }
    }

    pub fn is_live(&self, handle: CompiledGeometryHandle) -> bool {
        self.compiled.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn begin_frame(&mut self, canvas: &mut dyn HostCanvas) {
        canvas.clear();
        for mesh in self.transient.drain(..) {
            canvas.free_mesh(mesh);
        }
    }

    pub fn release_all(&mut self, canvas: &mut dyn HostCanvas) {
        for (_, compiled) in self.compiled.drain() {
            canvas.free_mesh(compiled.mesh);
        }
        for mesh in self.transient.drain(..) {
            canvas.free_mesh(mesh);
        }
    }
}
