use image::RgbaImage;
use log::warn;
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

use crate::geometry::{CompiledGeometryHandle, GeometryCache};
use crate::texture::{ResourceLoader, TextureCache, TextureHandle};
use crate::utils::{Position, Rectangle, Vertex};

/// Callbacks the document engine issues while rendering a frame.
///
/// Implementations must not panic: failures become null handles, `None`
/// or silent no-ops.
pub trait RenderInterface {
    /// Geometry the engine does not expect to draw again.
    fn render_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        texture: TextureHandle,
        translation: Position,
    );

    /// Geometry the engine believes will be static for the foreseeable future.
    fn compile_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        texture: TextureHandle,
    ) -> CompiledGeometryHandle;

    fn render_compiled_geometry(&mut self, geometry: CompiledGeometryHandle, translation: Position);
    fn release_compiled_geometry(&mut self, geometry: CompiledGeometryHandle);

    fn enable_scissor_region(&mut self, enable: bool);
    fn set_scissor_region(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Returns the handle and pixel dimensions of the loaded texture.
    fn load_texture(&mut self, source: &str) -> Option<(TextureHandle, (u32, u32))>;
    /// `source` is tightly packed RGBA8.
    fn generate_texture(&mut self, source: &[u8], width: u32, height: u32)
        -> Option<TextureHandle>;
    fn release_texture(&mut self, texture: TextureHandle);
}

/// Mesh arrays in the layout the host expects: 2D positions, UVs and
/// normalised colours, indexed triangles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 2]>,
    pub uvs: Vec<[f32; 2]>,
    pub colours: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn from_vertices(vertices: &[Vertex], indices: &[u32]) -> Self {
        Self {
            positions: vertices.iter().map(|v| v.position).collect(),
            uvs: vertices.iter().map(|v| v.tex_coord).collect(),
            colours: vertices.iter().map(|v| v.colour.to_f32()).collect(),
            indices: indices.to_vec(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// The host's drawable target. Resources are named by `Uuid`, the same way
/// the host keys its texture map.
pub trait HostCanvas {
    fn create_mesh(&mut self, mesh: &MeshData) -> Uuid;
    fn free_mesh(&mut self, mesh: Uuid);
    /// Queues one draw of `mesh` for this frame.
    fn add_mesh(&mut self, mesh: Uuid, translation: Position, texture: Option<Uuid>);

    fn set_clip(&mut self, enabled: bool);
    fn set_clip_rect(&mut self, rect: Option<Rectangle>);

    fn create_texture(&mut self, image: &RgbaImage) -> Uuid;
    fn free_texture(&mut self, texture: Uuid);

    /// Drops the queued draws of the previous frame.
    fn clear(&mut self);
}

/// Lets the host keep a handle on a canvas it also hands to the bridge, e.g.
/// to submit a `WgpuCanvas` into its own render pass.
impl<T: HostCanvas> HostCanvas for Rc<RefCell<T>> {
    fn create_mesh(&mut self, mesh: &MeshData) -> Uuid {
        self.borrow_mut().create_mesh(mesh)
    }

    fn free_mesh(&mut self, mesh: Uuid) {
        self.borrow_mut().free_mesh(mesh)
    }

    fn add_mesh(&mut self, mesh: Uuid, translation: Position, texture: Option<Uuid>) {
        self.borrow_mut().add_mesh(mesh, translation, texture)
    }

    fn set_clip(&mut self, enabled: bool) {
        self.borrow_mut().set_clip(enabled)
    }

    fn set_clip_rect(&mut self, rect: Option<Rectangle>) {
        self.borrow_mut().set_clip_rect(rect)
    }

    fn create_texture(&mut self, image: &RgbaImage) -> Uuid {
        self.borrow_mut().create_texture(image)
    }

    fn free_texture(&mut self, texture: Uuid) {
        self.borrow_mut().free_texture(texture)
    }

    fn clear(&mut self) {
        self.borrow_mut().clear()
    }
}

/// `RenderInterface` implementation backed by a host canvas: geometry cache,
/// texture cache and the resource loader used for file textures.
pub struct BridgeRenderer {
    canvas: Box<dyn HostCanvas>,
    loader: Box<dyn ResourceLoader>,
    geometry: GeometryCache,
    textures: TextureCache,
}

impl BridgeRenderer {
    pub fn new(canvas: Box<dyn HostCanvas>, loader: Box<dyn ResourceLoader>) -> Self {
        Self {
            canvas,
            loader,
            geometry: GeometryCache::new(),
            textures: TextureCache::new(),
        }
    }

    pub fn begin_frame(&mut self) {
        self.geometry.begin_frame(self.canvas.as_mut());
    }

    pub fn geometry(&self) -> &GeometryCache {
        &self.geometry
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    pub fn canvas(&self) -> &dyn HostCanvas {
        self.canvas.as_ref()
    }

    pub fn canvas_mut(&mut self) -> &mut dyn HostCanvas {
        self.canvas.as_mut()
    }

    /// Frees every host resource still held. Used on teardown.
    pub fn release_all(&mut self) {
        self.geometry.release_all(self.canvas.as_mut());
        self.textures.release_all(self.canvas.as_mut());
        self.canvas.clear();
    }
}

impl RenderInterface for BridgeRenderer {
    fn render_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        texture: TextureHandle,
        translation: Position,
    ) {
        if let Err(err) = self.geometry.render_immediate(
            self.canvas.as_mut(),
            &self.textures,
            vertices,
            indices,
            texture,
            translation,
        ) {
            warn!("render_geometry: {}", err);
        }
    }

    fn compile_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        texture: TextureHandle,
    ) -> CompiledGeometryHandle {
        match self
            .geometry
            .compile(self.canvas.as_mut(), vertices, indices, texture)
        {
            Ok(handle) => handle,
            Err(err) => {
                warn!("compile_geometry: {}", err);
                CompiledGeometryHandle::NULL
            }
        }
    }

    fn render_compiled_geometry(
        &mut self,
        geometry: CompiledGeometryHandle,
        translation: Position,
    ) {
        if let Err(err) = self.geometry.render_compiled(
            self.canvas.as_mut(),
            &self.textures,
            geometry,
            translation,
        ) {
            warn!("render_compiled_geometry: {}", err);
        }
    }

    fn release_compiled_geometry(&mut self, geometry: CompiledGeometryHandle) {
        if let Err(err) = self
            .geometry
            .release_compiled(self.canvas.as_mut(), geometry)
        {
            warn!("release_compiled_geometry: {}", err);
        }
    }

    fn enable_scissor_region(&mut self, enable: bool) {
        self.geometry
            .set_scissor_enabled(self.canvas.as_mut(), enable);
    }

    fn set_scissor_region(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let rect = Rectangle::new(x as f32, y as f32, width as f32, height as f32);
        self.geometry.set_scissor_region(self.canvas.as_mut(), rect);
    }

    fn load_texture(&mut self, source: &str) -> Option<(TextureHandle, (u32, u32))> {
        match self
            .textures
            .load_from_source(self.canvas.as_mut(), self.loader.as_ref(), source)
        {
            Ok(loaded) => Some(loaded),
            Err(err) => {
                warn!("load_texture: {}", err);
                None
            }
        }
    }

    fn generate_texture(
        &mut self,
        source: &[u8],
        width: u32,
        height: u32,
    ) -> Option<TextureHandle> {
        match self
            .textures
            .generate_from_pixels(self.canvas.as_mut(), source, width, height)
        {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!("generate_texture: {}", err);
                None
            }
        }
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if let Err(err) = self.textures.release(self.canvas.as_mut(), texture) {
            warn!("release_texture: {}", err);
        }
    }
}
