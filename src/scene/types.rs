//! GPU buffer types for linkage rendering.
//!
//! These types are uploaded directly to GPU buffers. All use f32 and are
//! repr(C) so their layout matches the WGSL structs in
//! [`shaders`](crate::scene::shaders).

use bytemuck::{Pod, Zeroable};

/// A vertex of a shaded triangle mesh
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MeshVertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Outward surface normal
    pub normal: [f32; 3],
    /// RGBA base color
    pub color: [f32; 4],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], color: [f32; 4]) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }
}

/// A vertex of the unlit 3D line pipeline (grid, ruler, hatching)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// A vertex of the 2D overlay pipeline (chart trace and frame), already in
/// normalized device coordinates
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct OverlayVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl OverlayVertex {
    pub fn new(position: [f32; 2], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// Camera matrices passed to the GPU.
///
/// Layout matches the WGSL uniform struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniforms {
    /// View matrix (world -> camera space)
    pub view: [[f32; 4]; 4],
    /// Projection matrix (camera -> clip space)
    pub projection: [[f32; 4]; 4],
    /// Camera position in world space (for specular lighting)
    pub camera_pos: [f32; 3],
    pub _padding: f32,
}

/// Per-group model transform
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
}

/// Configuration for the scene renderer
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Render target width in pixels
    pub width: u32,
    /// Render target height in pixels
    pub height: u32,
    /// Color target format; the windowed app passes the surface format
    pub format: wgpu::TextureFormat,
    /// Background clear color (RGBA)
    pub clear_color: [f32; 4],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            clear_color: palette::BACKGROUND,
        }
    }
}

/// Scene color palette, converted from the reference visual style
pub mod palette {
    pub const BACKGROUND: [f32; 4] = [0.047, 0.063, 0.094, 1.0];
    pub const BEAM: [f32; 4] = [0.42, 0.42, 0.42, 1.0];
    pub const BEAM_ACCENT: [f32; 4] = [0.314, 0.314, 0.314, 1.0];
    pub const MOUNT: [f32; 4] = [0.533, 0.533, 0.533, 1.0];
    pub const SPRING: [f32; 4] = [0.69, 0.69, 0.69, 1.0];
    pub const SPRING_CAP: [f32; 4] = [0.6, 0.6, 0.6, 1.0];
    pub const DAMPER_OUTER: [f32; 4] = [0.29, 0.333, 0.408, 1.0];
    pub const DAMPER_PISTON: [f32; 4] = [0.627, 0.682, 0.753, 1.0];
    pub const DAMPER_ROD: [f32; 4] = [0.753, 0.753, 0.753, 1.0];
    pub const MASS: [f32; 4] = [0.192, 0.51, 0.808, 1.0];
    pub const INDICATOR: [f32; 4] = [1.0, 0.42, 0.42, 1.0];
    pub const RULER: [f32; 4] = [0.29, 0.333, 0.408, 0.6];
    pub const RULER_TICK: [f32; 4] = [0.443, 0.502, 0.588, 0.6];
    pub const GRID_MAIN: [f32; 4] = [0.102, 0.125, 0.173, 0.4];
    pub const GRID_SUB: [f32; 4] = [0.078, 0.102, 0.141, 0.4];
    pub const HATCH: [f32; 4] = [0.267, 0.267, 0.267, 0.4];
    pub const CHART_LINE: [f32; 4] = [0.29, 0.62, 1.0, 1.0];
    pub const CHART_FRAME: [f32; 4] = [1.0, 1.0, 1.0, 0.12];
}

// =============================================================================
// Model Matrix Helpers
// =============================================================================

/// 4x4 identity, column-major
pub fn identity() -> [[f32; 4]; 4] {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Translation matrix, column-major
pub fn translation(x: f32, y: f32, z: f32) -> [[f32; 4]; 4] {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [x, y, z, 1.0],
    ]
}

/// Uniform scale about the local origin followed by a translation.
///
/// Used for the mass block: scale about the block center, then move it to
/// its world position.
pub fn translation_scale(x: f32, y: f32, z: f32, scale: f32) -> [[f32; 4]; 4] {
    [
        [scale, 0.0, 0.0, 0.0],
        [0.0, scale, 0.0, 0.0],
        [0.0, 0.0, scale, 0.0],
        [x, y, z, 1.0],
    ]
}
