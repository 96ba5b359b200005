//! The 3D scene: persistent set-dressing plus the mutable linkage.
//!
//! `SceneView` owns the GPU device, the render pipelines, and every buffer in
//! the scene. The static objects (support beam, mass block, floor grid,
//! ruler) are built once; the spring and damper groups are regenerated from
//! [`geometry`](crate::scene::geometry) whenever the mass position or scale
//! changes, and swapped in atomically: a frame either shows the old linkage
//! or the new one, never half of each.
//!
//! Regeneration replaces the previous vertex/index/model buffers outright;
//! the dropped `wgpu` buffers release their memory, and
//! [`dynamic_buffer_count`](SceneView::dynamic_buffer_count) exposes the live
//! count so the no-leak property is testable.

use std::sync::Arc;

use tracing::{debug, warn};
use wgpu::util::DeviceExt;

use crate::playback::MotionSink;
use crate::scene::camera::OrbitCamera;
use crate::scene::geometry::{
    self, LinkageParams, MeshData, box_mesh, cone, cylinder,
};
use crate::scene::shaders;
use crate::scene::types::{
    CameraUniforms, LineVertex, MeshVertex, ModelUniforms, OverlayVertex, SceneConfig, identity,
    palette, translation, translation_scale,
};

/// Depth buffer format shared by the 3D pipelines
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Maximum overlay vertices per frame (chart trace plus frame)
const OVERLAY_CAPACITY: usize = 65536;

/// Mass rest position before any series is loaded
pub const DEFAULT_MASS_Y: f32 = -2.0;

/// Horizontal position of the ruler, left of the support beam
const RULER_X: f32 = -4.5;

/// Floor grid height
const FLOOR_Y: f32 = -10.0;

/// Map a mass magnitude (0.1–10) to a visual scale factor (0.6–1.4)
pub fn mass_scale_factor(mass: f64) -> f32 {
    (0.6 + (mass / 10.0) * 0.8) as f32
}

/// One uploadable mesh: geometry buffers plus a model transform
struct MeshGroup {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
}

impl MeshGroup {
    /// Buffers owned by this group (vertex, index, model)
    const BUFFERS: usize = 3;
}

/// Scene renderer and owner of the linkage state
pub struct SceneView {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,

    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,

    /// Orbit camera; interactive regardless of playback state
    pub camera: OrbitCamera,

    // Static set-dressing, built once
    statics: MeshGroup,
    line_buffer: wgpu::Buffer,
    line_count: u32,

    // Mutable scene state
    mass: MeshGroup,
    indicator: MeshGroup,
    spring: Option<MeshGroup>,
    damper: Option<MeshGroup>,
    overlay_buffer: wgpu::Buffer,

    // Offscreen target with readback, for tests and snapshots
    color_texture: wgpu::Texture,
    depth_texture: wgpu::Texture,
    staging_buffer: wgpu::Buffer,

    config: SceneConfig,
    params: LinkageParams,
    mass_y: f32,
    mass_scale: f32,
    linkage_degenerate: bool,
}

impl SceneView {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>, config: SceneConfig) -> Self {
        let params = LinkageParams::default();

        let mesh_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::mesh_shader().into()),
        });
        let line_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::line_shader().into()),
        });
        let overlay_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::overlay_shader().into()),
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[uniform_entry(0)],
        });
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[uniform_entry(0)],
        });

        let mesh_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Mesh Pipeline Layout"),
                bind_group_layouts: &[&camera_layout, &model_layout],
                push_constant_ranges: &[],
            });
        let line_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Line Pipeline Layout"),
                bind_group_layouts: &[&camera_layout],
                push_constant_ranges: &[],
            });
        let overlay_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Overlay Pipeline Layout"),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
            });

        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Render Pipeline"),
            layout: Some(&mesh_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &mesh_module,
                entry_point: Some("vs_mesh"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        // position
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        // normal
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 12,
                            shader_location: 1,
                        },
                        // color
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x4,
                            offset: 24,
                            shader_location: 2,
                        },
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &mesh_module,
                entry_point: Some("fs_mesh"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(depth_state(true)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Render Pipeline"),
            layout: Some(&line_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &line_module,
                entry_point: Some("vs_line"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x4,
                            offset: 12,
                            shader_location: 1,
                        },
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_module,
                entry_point: Some("fs_line"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(depth_state(true)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let overlay_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Overlay Render Pipeline"),
            layout: Some(&overlay_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &overlay_module,
                entry_point: Some("vs_overlay"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<OverlayVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 0,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x4,
                            offset: 8,
                            shader_location: 1,
                        },
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &overlay_module,
                entry_point: Some("fs_overlay"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            // The overlay draws on top of everything
            depth_stencil: Some(depth_state(false)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniform Buffer"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let overlay_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay Vertex Buffer"),
            size: (OVERLAY_CAPACITY * std::mem::size_of::<OverlayVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let statics = create_mesh_group(
            &device,
            &model_layout,
            &support_meshes(&params),
            identity(),
            "Support",
        )
        .expect("support geometry is never empty");
        let mass = create_mesh_group(
            &device,
            &model_layout,
            &mass_meshes(&params),
            translation_scale(0.0, DEFAULT_MASS_Y, 0.0, 1.0),
            "Mass",
        )
        .expect("mass geometry is never empty");
        let indicator = create_mesh_group(
            &device,
            &model_layout,
            &indicator_mesh(),
            translation(RULER_X - 0.55, DEFAULT_MASS_Y, 0.0),
            "Indicator",
        )
        .expect("indicator geometry is never empty");

        let lines = static_lines(&params);
        let line_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Static Line Buffer"),
            contents: bytemuck::cast_slice(&lines),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let (color_texture, depth_texture, staging_buffer) =
            create_targets(&device, &config);

        let camera = OrbitCamera::new(config.width as f32 / config.height as f32);

        let mut view = Self {
            device,
            queue,
            mesh_pipeline,
            line_pipeline,
            overlay_pipeline,
            camera_buffer,
            camera_bind_group,
            model_layout,
            camera,
            statics,
            line_buffer,
            line_count: lines.len() as u32,
            mass,
            indicator,
            spring: None,
            damper: None,
            overlay_buffer,
            color_texture,
            depth_texture,
            staging_buffer,
            config,
            params,
            mass_y: DEFAULT_MASS_Y,
            mass_scale: 1.0,
            linkage_degenerate: false,
        };
        view.rebuild_linkage();
        view
    }

    /// Move the mass block and regenerate the linkage
    pub fn set_mass_position(&mut self, y: f64) {
        self.mass_y = y as f32;
        self.update_mass_model();
        self.rebuild_linkage();
    }

    /// Map a mass magnitude to a visual scale and regenerate the linkage.
    ///
    /// The scale changes the block's footprint, which moves the attachment
    /// points, so the spring and damper spans change with it.
    pub fn set_mass_scale(&mut self, mass: f64) {
        self.mass_scale = mass_scale_factor(mass);
        self.update_mass_model();
        self.rebuild_linkage();
    }

    /// Move the initial-position marker on the ruler
    pub fn set_indicator_position(&mut self, y: f64) {
        self.queue.write_buffer(
            &self.indicator.model_buffer,
            0,
            bytemuck::bytes_of(&ModelUniforms {
                model: translation(RULER_X - 0.55, y as f32, 0.0),
            }),
        );
    }

    /// Current mass position
    pub fn mass_position(&self) -> f32 {
        self.mass_y
    }

    /// Whether the last regeneration hit the degenerate-span policy
    pub fn is_linkage_degenerate(&self) -> bool {
        self.linkage_degenerate
    }

    /// Live buffers owned by the regenerated groups.
    ///
    /// Stays constant across rebuilds: each regeneration drops the previous
    /// group's buffers before the new count is reported.
    pub fn dynamic_buffer_count(&self) -> usize {
        [&self.spring, &self.damper]
            .into_iter()
            .flatten()
            .count()
            * MeshGroup::BUFFERS
    }

    fn update_mass_model(&self) {
        self.queue.write_buffer(
            &self.mass.model_buffer,
            0,
            bytemuck::bytes_of(&ModelUniforms {
                model: translation_scale(0.0, self.mass_y, 0.0, self.mass_scale),
            }),
        );
    }

    /// Regenerate the spring and damper groups from the current state.
    ///
    /// Both replacement groups are built before either is swapped in, so a
    /// concurrent render never sees a half-updated linkage.
    fn rebuild_linkage(&mut self) {
        let half_height = self.params.mass_height / 2.0 * self.mass_scale;
        let spring_parts = geometry::spring_meshes(self.mass_y, half_height, &self.params);
        let damper_parts = geometry::damper_meshes(self.mass_y, half_height, &self.params);

        let degenerate = spring_parts.is_empty() || damper_parts.is_empty();
        if degenerate && !self.linkage_degenerate {
            debug!(mass_y = self.mass_y, "span below minimum; skipping linkage");
        }
        self.linkage_degenerate = degenerate;

        let spring = create_mesh_group(
            &self.device,
            &self.model_layout,
            &MeshData::merged(&spring_parts),
            identity(),
            "Spring",
        );
        let damper = create_mesh_group(
            &self.device,
            &self.model_layout,
            &MeshData::merged(&damper_parts),
            identity(),
            "Damper",
        );
        self.spring = spring;
        self.damper = damper;
    }

    /// Draw the scene into `target`, then the chart overlay on top.
    ///
    /// Runs every frame whether or not playback is active.
    pub fn render(&self, target: &wgpu::TextureView, overlay: &[OverlayVertex]) {
        assert!(
            overlay.len() <= OVERLAY_CAPACITY,
            "overlay vertex count {} exceeds capacity {}",
            overlay.len(),
            OVERLAY_CAPACITY
        );

        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&self.camera.uniforms()),
        );
        if !overlay.is_empty() {
            self.queue
                .write_buffer(&self.overlay_buffer, 0, bytemuck::cast_slice(overlay));
        }

        let depth_view = self
            .depth_texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: self.config.clear_color[0] as f64,
                            g: self.config.clear_color[1] as f64,
                            b: self.config.clear_color[2] as f64,
                            a: self.config.clear_color[3] as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if self.line_count > 0 {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                pass.set_vertex_buffer(0, self.line_buffer.slice(..));
                pass.draw(0..self.line_count, 0..1);
            }

            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            let groups = [
                Some(&self.statics),
                Some(&self.mass),
                Some(&self.indicator),
                self.spring.as_ref(),
                self.damper.as_ref(),
            ];
            for group in groups.into_iter().flatten() {
                pass.set_bind_group(1, &group.model_bind_group, &[]);
                pass.set_vertex_buffer(0, group.vertex_buffer.slice(..));
                pass.set_index_buffer(group.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..group.index_count, 0, 0..1);
            }

            if !overlay.is_empty() {
                pass.set_pipeline(&self.overlay_pipeline);
                pass.set_vertex_buffer(0, self.overlay_buffer.slice(..));
                pass.draw(0..overlay.len() as u32, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Render into the internal offscreen target
    pub fn render_offscreen(&self, overlay: &[OverlayVertex]) {
        let view = self
            .color_texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.render(&view, overlay);
    }

    /// Read back the offscreen target as RGBA pixels.
    ///
    /// Blocks until the GPU has finished; primarily for tests.
    pub fn read_pixels(&self) -> Vec<u8> {
        let unpadded_bytes_per_row = self.config.width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(self.config.height),
                },
            },
            wgpu::Extent3d {
                width: self.config.width,
                height: self.config.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = self.staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .expect("map_async callback dropped")
            .expect("failed to map staging buffer");

        let data = buffer_slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((self.config.width * self.config.height * 4) as usize);
        for row in 0..self.config.height {
            let start = (row * padded_bytes_per_row) as usize;
            pixels.extend_from_slice(&data[start..start + unpadded_bytes_per_row as usize]);
        }
        drop(data);
        self.staging_buffer.unmap();
        pixels
    }

    /// Resize the render targets and camera aspect
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        let (color, depth, staging) = create_targets(&self.device, &self.config);
        self.color_texture = color;
        self.depth_texture = depth;
        self.staging_buffer = staging;
        self.camera.set_aspect(width as f32 / height as f32);
    }

    /// Current render configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The wgpu device (the windowed app reconfigures its surface with it)
    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    /// The wgpu queue
    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }

    /// Linkage synthesis constants
    pub fn params(&self) -> &LinkageParams {
        &self.params
    }
}

impl MotionSink for SceneView {
    fn set_mass_position(&mut self, y: f64) {
        SceneView::set_mass_position(self, y);
    }
}

// =============================================================================
// Construction Helpers
// =============================================================================

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn depth_state(write_enabled: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write_enabled,
        depth_compare: if write_enabled {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        },
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn create_targets(
    device: &wgpu::Device,
    config: &SceneConfig,
) -> (wgpu::Texture, wgpu::Texture, wgpu::Buffer) {
    let extent = wgpu::Extent3d {
        width: config.width,
        height: config.height,
        depth_or_array_layers: 1,
    };
    let color = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Offscreen Color Texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_bytes_per_row = (config.width * 4).div_ceil(align) * align;
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Staging Buffer"),
        size: (padded_bytes_per_row * config.height) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    (color, depth, staging)
}

fn create_mesh_group(
    device: &wgpu::Device,
    model_layout: &wgpu::BindGroupLayout,
    mesh: &MeshData,
    model: [[f32; 4]; 4],
    label: &str,
) -> Option<MeshGroup> {
    if mesh.is_empty() {
        return None;
    }
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Vertex Buffer")),
        contents: bytemuck::cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Index Buffer")),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Model Buffer")),
        contents: bytemuck::bytes_of(&ModelUniforms { model }),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label} Model Bind Group")),
        layout: model_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: model_buffer.as_entire_binding(),
        }],
    });
    Some(MeshGroup {
        vertex_buffer,
        index_buffer,
        index_count: mesh.indices.len() as u32,
        model_buffer,
        model_bind_group,
    })
}

// =============================================================================
// Static Set-Dressing
// =============================================================================

/// Support beam with accent stripe and mount bosses, in world space
fn support_meshes(params: &LinkageParams) -> MeshData {
    let beam_y = params.beam_y;
    let half_thickness = params.beam_thickness / 2.0;
    let parts = [
        box_mesh(6.0, params.beam_thickness, 3.0, palette::BEAM).translated(0.0, beam_y, 0.0),
        box_mesh(6.05, 0.06, 3.05, palette::BEAM_ACCENT).translated(
            0.0,
            beam_y - half_thickness,
            0.0,
        ),
        cylinder(0.15, 0.2, 16, palette::MOUNT).translated(
            params.spring_x,
            beam_y - half_thickness - 0.1,
            0.0,
        ),
        cylinder(0.15, 0.2, 16, palette::MOUNT).translated(
            params.damper_x,
            beam_y - half_thickness - 0.1,
            0.0,
        ),
    ];
    MeshData::merged(&parts)
}

/// Mass block with its mount bosses, centered at the local origin so the
/// model matrix can scale it about its own center
fn mass_meshes(params: &LinkageParams) -> MeshData {
    let half_height = params.mass_height / 2.0;
    let parts = [
        box_mesh(
            params.mass_width,
            params.mass_height,
            params.mass_depth,
            palette::MASS,
        ),
        cylinder(0.12, 0.15, 16, palette::MOUNT).translated(
            params.spring_x,
            half_height + 0.075,
            0.0,
        ),
        cylinder(0.12, 0.15, 16, palette::MOUNT).translated(
            params.damper_x,
            half_height + 0.075,
            0.0,
        ),
    ];
    MeshData::merged(&parts)
}

/// Initial-position marker: a cone pointing toward the ruler (+X)
fn indicator_mesh() -> MeshData {
    cone(0.2, 0.45, 8, palette::INDICATOR).rotated_z(-std::f32::consts::FRAC_PI_2)
}

/// Floor grid, ruler with tick marks, and beam hatching
fn static_lines(params: &LinkageParams) -> Vec<LineVertex> {
    let mut lines = Vec::new();
    let mut segment = |a: [f32; 3], b: [f32; 3], color: [f32; 4]| {
        lines.push(LineVertex::new(a, color));
        lines.push(LineVertex::new(b, color));
    };

    // Floor grid, 30x30 with highlighted axes
    for i in -15..=15 {
        let v = i as f32;
        let color = if i == 0 {
            palette::GRID_MAIN
        } else {
            palette::GRID_SUB
        };
        segment([v, FLOOR_Y, -15.0], [v, FLOOR_Y, 15.0], color);
        segment([-15.0, FLOOR_Y, v], [15.0, FLOOR_Y, v], color);
    }

    // Ruler: vertical line plus tick marks every meter
    segment(
        [RULER_X, FLOOR_Y, 0.0],
        [RULER_X, params.beam_y + 1.0, 0.0],
        palette::RULER,
    );
    let mut minor_tick = palette::RULER_TICK;
    minor_tick[3] = 0.3;
    for y in (FLOOR_Y as i32)..=(params.beam_y as i32) {
        let major = y % 2 == 0;
        let half_len = if major { 0.15 } else { 0.075 };
        let color = if major { palette::RULER_TICK } else { minor_tick };
        segment(
            [RULER_X - half_len, y as f32, 0.0],
            [RULER_X + half_len, y as f32, 0.0],
            color,
        );
    }

    // Diagonal hatching on the beam top face (fixed-wall convention)
    let top = params.beam_y + params.beam_thickness / 2.0 + 0.01;
    for i in -5..=5 {
        let x = i as f32 * 0.5 - 3.0;
        segment([x, top, -1.5], [x + 0.8, top, 1.5], palette::HATCH);
    }

    lines
}

// =============================================================================
// Device Helpers
// =============================================================================

/// Create a headless device/queue pair, or `None` when no adapter exists.
///
/// Tests use this to skip GPU coverage on machines without one.
pub async fn create_headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await?;
    match adapter
        .request_device(&wgpu::DeviceDescriptor::default(), None)
        .await
    {
        Ok(pair) => Some(pair),
        Err(error) => {
            warn!(%error, "adapter found but device creation failed");
            None
        }
    }
}
