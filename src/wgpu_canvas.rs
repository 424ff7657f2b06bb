//! `HostCanvas` on top of a wgpu device owned by the host.
//!
//! Meshes and textures are uploaded when created. Draws are queued during the
//! document's render callbacks and replayed into a render pass by `submit`.

use image::RgbaImage;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use wgpu::util::DeviceExt;

use crate::renderer::{HostCanvas, MeshData};
use crate::utils::{Position, Rectangle, Size};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct GpuVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
    pub colour: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct TransformUniform {
    pub viewport: [f32; 2],
    pub translation: [f32; 2],
}

struct GpuMesh {
    // None for meshes without indices, which draw nothing
    buffers: Option<(wgpu::Buffer, wgpu::Buffer)>,
    num_indices: u32,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct QueuedDraw {
    mesh: Uuid,
    texture: Option<Uuid>,
    transform_bind_group: wgpu::BindGroup,
    scissor: Option<Rectangle>,
}

pub struct WgpuCanvas {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    render_pipeline: wgpu::RenderPipeline,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    transform_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    meshes: HashMap<Uuid, GpuMesh>,
    textures: HashMap<Uuid, GpuTexture>,
    draws: Vec<QueuedDraw>,
    clip_enabled: bool,
    clip_rect: Option<Rectangle>,
    viewport_size: Size,
}

impl WgpuCanvas {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        target_format: wgpu::TextureFormat,
        viewport_size: Size,
    ) -> Self {
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("ui_texture_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let transform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("ui_transform_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<TransformUniform>() as _,
                        ),
                    },
                    count: None,
                }],
            });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ui_shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/ui.wgsl"))),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("UI Pipeline Layout"),
            bind_group_layouts: &[&texture_bind_group_layout, &transform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("UI Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x2,
                        1 => Float32x2,
                        2 => Float32x4
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ui_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // untextured draws sample a single white texel
        let white_image = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        let white = Self::upload_texture(
            &device,
            &queue,
            &texture_bind_group_layout,
            &sampler,
            &white_image,
        );

        Self {
            device,
            queue,
            render_pipeline,
            texture_bind_group_layout,
            transform_bind_group_layout,
            sampler,
            white,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            draws: Vec::new(),
            clip_enabled: false,
            clip_rect: None,
            viewport_size,
        }
    }

    pub fn resize(&mut self, viewport_size: Size) {
        self.viewport_size = viewport_size;
    }

    fn upload_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        image: &RgbaImage,
    ) -> GpuTexture {
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("UI Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some("UI Texture Bind Group"),
        });

        GpuTexture {
            _texture: texture,
            bind_group,
        }
    }

    fn scissor_pixels(&self, rect: Rectangle) -> Option<(u32, u32, u32, u32)> {
        let max_w = self.viewport_size.width.max(0.0);
        let max_h = self.viewport_size.height.max(0.0);
        let x0 = rect.x.clamp(0.0, max_w);
        let y0 = rect.y.clamp(0.0, max_h);
        let x1 = (rect.x + rect.width).clamp(0.0, max_w);
        let y1 = (rect.y + rect.height).clamp(0.0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
    }

    /// Replays the queued draws. The pass must target a texture of the
    /// format given to `new` and the current viewport size.
    pub fn submit(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_pipeline(&self.render_pipeline);
        let full = (
            0,
            0,
            self.viewport_size.width.max(1.0) as u32,
            self.viewport_size.height.max(1.0) as u32,
        );

        for draw in &self.draws {
            let Some(mesh) = self.meshes.get(&draw.mesh) else {
                continue;
            };
            let Some((vertex_buffer, index_buffer)) = &mesh.buffers else {
                continue;
            };
            let (x, y, w, h) = match draw.scissor {
                Some(rect) => match self.scissor_pixels(rect) {
                    Some(scissor) => scissor,
                    // fully clipped
                    None => continue,
                },
                None => full,
            };
            let texture = draw
                .texture
                .and_then(|key| self.textures.get(&key))
                .unwrap_or(&self.white);

            rpass.set_scissor_rect(x, y, w, h);
            rpass.set_bind_group(0, &texture.bind_group, &[]);
            rpass.set_bind_group(1, &draw.transform_bind_group, &[]);
            rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
            rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.num_indices, 0, 0..1);
        }
    }
}

impl HostCanvas for WgpuCanvas {
    fn create_mesh(&mut self, mesh: &MeshData) -> Uuid {
        let key = Uuid::new_v4();
        let vertices: Vec<GpuVertex> = (0..mesh.vertex_count())
            .map(|i| GpuVertex {
                position: mesh.positions[i],
                tex_coords: mesh.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                colour: mesh.colours.get(i).copied().unwrap_or([1.0; 4]),
            })
            .collect();

        let buffers = if vertices.is_empty() || mesh.indices.is_empty() {
            None
        } else {
            let vertex_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("UI Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("UI Index Buffer"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
            Some((vertex_buffer, index_buffer))
        };

        self.meshes.insert(
            key,
            GpuMesh {
                buffers,
                num_indices: mesh.indices.len() as u32,
            },
        );
        key
    }

    fn free_mesh(&mut self, mesh: Uuid) {
        self.meshes.remove(&mesh);
    }

    fn add_mesh(&mut self, mesh: Uuid, translation: Position, texture: Option<Uuid>) {
        let uniform = TransformUniform {
            viewport: [self.viewport_size.width, self.viewport_size.height],
            translation: [translation.x, translation.y],
        };
        let transform_uniform_buffer =
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("UI Transform Uniform Buffer"),
                    contents: bytemuck::cast_slice(&[uniform]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
        let transform_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.transform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_uniform_buffer.as_entire_binding(),
            }],
            label: Some("UI Transform Bind Group"),
        });

        let scissor = if self.clip_enabled {
            self.clip_rect
        } else {
            None
        };
        self.draws.push(QueuedDraw {
            mesh,
            texture,
            transform_bind_group,
            scissor,
        });
    }

    fn set_clip(&mut self, enabled: bool) {
        self.clip_enabled = enabled;
    }

    fn set_clip_rect(&mut self, rect: Option<Rectangle>) {
        self.clip_rect = rect;
    }

    fn create_texture(&mut self, image: &RgbaImage) -> Uuid {
        let key = Uuid::new_v4();
        let texture = Self::upload_texture(
            &self.device,
            &self.queue,
            &self.texture_bind_group_layout,
            &self.sampler,
            image,
        );
        self.textures.insert(key, texture);
        key
    }

    fn free_texture(&mut self, texture: Uuid) {
        self.textures.remove(&texture);
    }

    fn clear(&mut self) {
        self.draws.clear();
    }
}
