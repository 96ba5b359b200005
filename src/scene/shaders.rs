//! WGSL shaders for the linkage scene.
//!
//! Three pipelines share these sources: shaded triangle meshes (support,
//! mass, spring, damper), unlit 3D lines (grid, ruler, hatching), and the 2D
//! overlay used for the chart.

/// Camera uniform struct shared by the 3D shaders
pub const CAMERA_UNIFORMS: &str = r#"
struct CameraUniforms {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    camera_pos: vec3<f32>,
    _padding: f32,
}

@group(0) @binding(0) var<uniform> camera: CameraUniforms;
"#;

/// Vertex + fragment shader for shaded meshes.
///
/// Vertices carry their base color; a per-group model matrix places the
/// group in the world. Lighting is Blinn-Phong with a fixed key light.
pub const MESH_SHADER: &str = r#"
struct ModelUniforms {
    model: mat4x4<f32>,
}

@group(1) @binding(0) var<uniform> object: ModelUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) world_position: vec3<f32>,
    @location(2) color: vec4<f32>,
}

@vertex
fn vs_mesh(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;

    let world = object.model * vec4<f32>(in.position, 1.0);
    out.clip_position = camera.projection * camera.view * world;
    // Uniform scale only, so the model matrix works for normals too
    out.world_normal = (object.model * vec4<f32>(in.normal, 0.0)).xyz;
    out.world_position = world.xyz;
    out.color = in.color;

    return out;
}

@fragment
fn fs_mesh(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.world_normal);

    // Fixed key light from upper-front-right, cool fill from the left
    let key_dir = normalize(vec3<f32>(0.5, 1.0, 0.4));
    let fill_dir = normalize(vec3<f32>(-0.6, 0.3, -0.3));
    let view_dir = normalize(camera.camera_pos - in.world_position);
    let half_dir = normalize(key_dir + view_dir);

    let ambient = 0.3;
    let diffuse = max(dot(normal, key_dir), 0.0) * 0.55;
    let fill = max(dot(normal, fill_dir), 0.0) * 0.12;
    let specular = pow(max(dot(normal, half_dir), 0.0), 32.0) * 0.25;

    let color = in.color.rgb * (ambient + diffuse + fill) + vec3<f32>(specular);
    return vec4<f32>(color, in.color.a);
}
"#;

/// Vertex + fragment shader for unlit world-space lines
pub const LINE_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_line(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.projection * camera.view * vec4<f32>(in.position, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_line(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Vertex + fragment shader for the 2D chart overlay.
///
/// Positions are already in normalized device coordinates; no camera.
pub const OVERLAY_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_overlay(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = vec4<f32>(in.position, 0.0, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_overlay(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Complete mesh shader module source
pub fn mesh_shader() -> String {
    format!("{CAMERA_UNIFORMS}{MESH_SHADER}")
}

/// Complete line shader module source
pub fn line_shader() -> String {
    format!("{CAMERA_UNIFORMS}{LINE_SHADER}")
}

/// Complete overlay shader module source
pub fn overlay_shader() -> String {
    OVERLAY_SHADER.to_string()
}
