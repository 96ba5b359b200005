//! Procedural mesh synthesis for the spring/damper linkage.
//!
//! Everything here is a pure function from a handful of scalars to CPU-side
//! mesh data: a helical spring swept as a tube along a parametrized helix,
//! and a telescoping damper split into a fixed-fraction housing and a
//! variable-length piston rod. The synthesizers regenerate every frame from
//! the current mass position; holding no state of their own is what lets the
//! scene view swap whole mesh groups atomically.
//!
//! Degenerate inputs have a defined policy, not an error path: when the
//! attachment span falls below the minimum (coils would self-intersect, the
//! rod length would go negative), the synthesizer emits no geometry for that
//! frame. Valid inputs never produce a NaN vertex.

use std::f32::consts::TAU;

use crate::scene::types::{MeshVertex, palette};

/// Spans shorter than this cannot hold a valid spring helix
pub const MIN_SPRING_SPAN: f32 = 0.3;

/// Spans shorter than this cannot hold the damper housing plus a rod
pub const MIN_DAMPER_SPAN: f32 = 0.5;

/// How far the piston rod reaches up into the housing
const ROD_OVERLAP: f32 = 0.1;

/// Radial resolution of swept tubes
const TUBE_RADIAL_SEGMENTS: u32 = 8;

/// Radial resolution of end caps and small fittings
const CAP_SEGMENTS: u32 = 16;

/// Radial resolution of the damper cylinders
const DAMPER_SEGMENTS: u32 = 20;

/// Thickness of spring end-cap disks
const CAP_THICKNESS: f32 = 0.08;

/// Synthesis constants for the whole linkage.
///
/// `beam_y` and friends describe the fixed support; the spring and damper
/// hang from `support_y()` down to the top face of the mass.
#[derive(Debug, Clone)]
pub struct LinkageParams {
    /// Center height of the support beam
    pub beam_y: f32,
    /// Support beam thickness
    pub beam_thickness: f32,
    /// Drop from the beam underside to the attachment points
    pub mount_drop: f32,
    /// Gap kept between the mass top face and the linkage ends
    pub clearance: f32,
    /// Horizontal offset of the spring from the mass center
    pub spring_x: f32,
    /// Horizontal offset of the damper from the mass center
    pub damper_x: f32,
    /// Number of helix turns
    pub coil_count: u32,
    /// Helix parameter steps over [0, 1]
    pub segment_count: u32,
    /// Helix radius
    pub spring_radius: f32,
    /// Radius of the swept spring wire
    pub wire_radius: f32,
    /// Damper housing radius
    pub damper_outer_radius: f32,
    /// Piston rod radius
    pub damper_rod_radius: f32,
    /// Fraction of the span taken by the fixed housing
    pub damper_housing_fraction: f32,
    /// Mass block extents
    pub mass_width: f32,
    pub mass_height: f32,
    pub mass_depth: f32,
}

impl LinkageParams {
    /// Height of the attachment points under the beam
    pub fn support_y(&self) -> f32 {
        self.beam_y - self.beam_thickness / 2.0 - self.mount_drop
    }

    /// Free distance between the attachments and the mass top face.
    ///
    /// This is the single scalar both synthesizers are driven by; negative
    /// when the mass overlaps the support.
    pub fn attachment_span(&self, mass_y: f32, mass_half_height: f32) -> f32 {
        self.support_y() - (mass_y + mass_half_height + self.clearance)
    }
}

impl Default for LinkageParams {
    fn default() -> Self {
        Self {
            beam_y: 6.0,
            beam_thickness: 0.5,
            mount_drop: 0.2,
            clearance: 0.15,
            spring_x: -0.8,
            damper_x: 0.8,
            coil_count: 14,
            segment_count: 140,
            spring_radius: 0.35,
            wire_radius: 0.055,
            damper_outer_radius: 0.28,
            damper_rod_radius: 0.08,
            damper_housing_fraction: 0.45,
            mass_width: 3.2,
            mass_height: 1.0,
            mass_depth: 1.8,
        }
    }
}

/// A triangle mesh in CPU memory, ready for buffer upload
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Translate every vertex position
    pub fn translated(mut self, x: f32, y: f32, z: f32) -> Self {
        for v in &mut self.vertices {
            v.position[0] += x;
            v.position[1] += y;
            v.position[2] += z;
        }
        self
    }

    /// Rotate positions and normals about the Z axis
    pub fn rotated_z(mut self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        for v in &mut self.vertices {
            let [px, py, pz] = v.position;
            v.position = [cos * px - sin * py, sin * px + cos * py, pz];
            let [nx, ny, nz] = v.normal;
            v.normal = [cos * nx - sin * ny, sin * nx + cos * ny, nz];
        }
        self
    }

    /// Append another mesh, re-basing its indices
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Concatenate a set of parts into one mesh
    pub fn merged(parts: &[MeshData]) -> MeshData {
        let mut merged = MeshData::default();
        for part in parts {
            merged.append(part);
        }
        merged
    }

    /// Whether every position and normal component is finite
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(|v| {
            v.position.iter().all(|c| c.is_finite()) && v.normal.iter().all(|c| c.is_finite())
        })
    }
}

/// Split of the damper span into housing and rod lengths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamperLayout {
    /// Fixed housing length (constant fraction of the span)
    pub housing_length: f32,
    /// Piston rod length, `span - housing + overlap`
    pub rod_length: f32,
}

/// Compute the housing/rod split for a given span.
///
/// The rod reaches [`ROD_OVERLAP`] up into the housing so the joint is never
/// visually open. For any span ≥ [`MIN_DAMPER_SPAN`] the rod length is
/// strictly positive.
pub fn damper_layout(span: f32, housing_fraction: f32) -> DamperLayout {
    let housing_length = span * housing_fraction;
    DamperLayout {
        housing_length,
        rod_length: span - housing_length + ROD_OVERLAP,
    }
}

// =============================================================================
// Linkage Synthesis
// =============================================================================

/// Synthesize the spring meshes for the current mass position.
///
/// Returns the replacement part set (coil tube plus two end-cap disks), or an
/// empty set when the span is below [`MIN_SPRING_SPAN`].
pub fn spring_meshes(mass_y: f32, mass_half_height: f32, params: &LinkageParams) -> Vec<MeshData> {
    let span = params.attachment_span(mass_y, mass_half_height);
    if span < MIN_SPRING_SPAN {
        return Vec::new();
    }
    let top = params.support_y();
    let bottom = top - span;

    let path = helix_path(
        bottom,
        span,
        params.coil_count,
        params.segment_count,
        params.spring_radius,
    );
    let coil = sweep_tube(&path, params.wire_radius, TUBE_RADIAL_SEGMENTS, palette::SPRING);

    let cap_radius = params.spring_radius * 0.6;
    let parts = [
        coil,
        cylinder(cap_radius, CAP_THICKNESS, CAP_SEGMENTS, palette::SPRING_CAP).translated(
            0.0, top, 0.0,
        ),
        cylinder(cap_radius, CAP_THICKNESS, CAP_SEGMENTS, palette::SPRING_CAP).translated(
            0.0, bottom, 0.0,
        ),
    ];
    parts
        .into_iter()
        .map(|part| part.translated(params.spring_x, 0.0, 0.0))
        .collect()
}

/// Synthesize the damper meshes for the current mass position.
///
/// The housing hangs from the support and takes a fixed fraction of the
/// span; the piston rod covers the remainder down to the attachment plate on
/// the mass. Empty when the span is below [`MIN_DAMPER_SPAN`].
pub fn damper_meshes(mass_y: f32, mass_half_height: f32, params: &LinkageParams) -> Vec<MeshData> {
    let span = params.attachment_span(mass_y, mass_half_height);
    if span < MIN_DAMPER_SPAN {
        return Vec::new();
    }
    let top = params.support_y();
    let bottom = top - span;
    let layout = damper_layout(span, params.damper_housing_fraction);
    let housing_bottom = top - layout.housing_length;

    let outer = params.damper_outer_radius;
    let rod_r = params.damper_rod_radius;

    let parts = [
        // Housing, fixed to the support
        cylinder(outer, layout.housing_length, DAMPER_SEGMENTS, palette::DAMPER_OUTER)
            .translated(0.0, top - layout.housing_length / 2.0, 0.0),
        // Caps at both housing ends
        cylinder(outer + 0.04, 0.08, DAMPER_SEGMENTS, palette::DAMPER_PISTON)
            .translated(0.0, top, 0.0),
        cylinder(outer + 0.02, 0.06, DAMPER_SEGMENTS, palette::DAMPER_PISTON)
            .translated(0.0, housing_bottom, 0.0),
        // Piston rod, from inside the housing down to the mass
        cylinder(rod_r, layout.rod_length, CAP_SEGMENTS, palette::DAMPER_ROD).translated(
            0.0,
            housing_bottom - layout.rod_length / 2.0 + ROD_OVERLAP / 2.0,
            0.0,
        ),
        // Piston head visible at the housing opening
        cylinder(outer - 0.04, 0.12, DAMPER_SEGMENTS, palette::DAMPER_PISTON)
            .translated(0.0, housing_bottom + 0.06, 0.0),
        // Attachment plate on the mass
        cylinder(0.15, 0.06, CAP_SEGMENTS, palette::DAMPER_PISTON).translated(0.0, bottom, 0.0),
        // Short stub connecting the housing to the support
        cylinder(rod_r, 0.2, CAP_SEGMENTS, palette::DAMPER_ROD).translated(0.0, top + 0.1, 0.0),
    ];
    parts
        .into_iter()
        .map(|part| part.translated(params.damper_x, 0.0, 0.0))
        .collect()
}

/// Sample the spring helix.
///
/// `segment_count` parameter steps over [0, 1], each mapped to
/// `(cos(θ)·r, bottom_y + t·span, sin(θ)·r)` with `θ = t·coil_count·2π`.
pub fn helix_path(
    bottom_y: f32,
    span: f32,
    coil_count: u32,
    segment_count: u32,
    radius: f32,
) -> Vec<[f32; 3]> {
    (0..=segment_count)
        .map(|i| {
            let t = i as f32 / segment_count as f32;
            let theta = t * coil_count as f32 * TAU;
            [
                theta.cos() * radius,
                bottom_y + t * span,
                theta.sin() * radius,
            ]
        })
        .collect()
}

// =============================================================================
// Mesh Primitives
// =============================================================================

/// Sweep a tube of `wire_radius` along a polyline.
///
/// Ring frames are carried along the path by parallel transport, so the tube
/// never twists or pinches between segments. Ends are open; callers attach
/// cap disks where attachment hardware should show.
pub fn sweep_tube(
    path: &[[f32; 3]],
    wire_radius: f32,
    radial_segments: u32,
    color: [f32; 4],
) -> MeshData {
    if path.len() < 2 {
        return MeshData::default();
    }
    let rings = path.len();
    let radial = radial_segments as usize;

    // Tangents by central differences, one-sided at the ends
    let mut tangents = Vec::with_capacity(rings);
    for i in 0..rings {
        let dir = if i == 0 {
            sub(path[1], path[0])
        } else if i == rings - 1 {
            sub(path[rings - 1], path[rings - 2])
        } else {
            sub(path[i + 1], path[i - 1])
        };
        tangents.push(normalize(dir));
    }

    // Seed frame perpendicular to the first tangent, then parallel-transport
    let seed_up = if tangents[0][1].abs() < 0.9 {
        [0.0, 1.0, 0.0]
    } else {
        [1.0, 0.0, 0.0]
    };
    let mut frame_normal = normalize(cross(seed_up, tangents[0]));

    let mut mesh = MeshData {
        vertices: Vec::with_capacity(rings * radial),
        indices: Vec::with_capacity((rings - 1) * radial * 6),
    };

    for i in 0..rings {
        if i > 0 {
            let along = dot(frame_normal, tangents[i]);
            let projected = sub(frame_normal, scale(tangents[i], along));
            if length(projected) > 1e-6 {
                frame_normal = normalize(projected);
            }
        }
        let bitangent = cross(frame_normal, tangents[i]);

        for j in 0..radial {
            let phi = j as f32 / radial as f32 * TAU;
            let dir = add(scale(frame_normal, phi.cos()), scale(bitangent, phi.sin()));
            let position = add(path[i], scale(dir, wire_radius));
            mesh.vertices.push(MeshVertex::new(position, dir, color));
        }
    }

    for i in 0..rings - 1 {
        let ring = (i * radial) as u32;
        let next_ring = ((i + 1) * radial) as u32;
        for j in 0..radial as u32 {
            let j1 = (j + 1) % radial as u32;
            mesh.indices
                .extend_from_slice(&[ring + j, next_ring + j, next_ring + j1]);
            mesh.indices
                .extend_from_slice(&[ring + j, next_ring + j1, ring + j1]);
        }
    }
    mesh
}

/// A closed cylinder centered at the origin along Y
pub fn cylinder(radius: f32, height: f32, radial_segments: u32, color: [f32; 4]) -> MeshData {
    let radial = radial_segments as usize;
    let half = height / 2.0;
    let mut mesh = MeshData::default();

    // Side wall with radial normals
    for j in 0..radial {
        let theta = j as f32 / radial as f32 * TAU;
        let (x, z) = (theta.cos(), theta.sin());
        let normal = [x, 0.0, z];
        mesh.vertices
            .push(MeshVertex::new([x * radius, -half, z * radius], normal, color));
        mesh.vertices
            .push(MeshVertex::new([x * radius, half, z * radius], normal, color));
    }
    for j in 0..radial as u32 {
        let j1 = (j + 1) % radial as u32;
        let (bottom, top) = (j * 2, j * 2 + 1);
        let (bottom1, top1) = (j1 * 2, j1 * 2 + 1);
        mesh.indices.extend_from_slice(&[bottom, top, top1]);
        mesh.indices.extend_from_slice(&[bottom, top1, bottom1]);
    }

    // Caps with axial normals; ring vertices duplicated for the hard edge
    for &(y, normal_y) in &[(half, 1.0f32), (-half, -1.0f32)] {
        let center = mesh.vertices.len() as u32;
        let normal = [0.0, normal_y, 0.0];
        mesh.vertices
            .push(MeshVertex::new([0.0, y, 0.0], normal, color));
        for j in 0..radial {
            let theta = j as f32 / radial as f32 * TAU;
            mesh.vertices.push(MeshVertex::new(
                [theta.cos() * radius, y, theta.sin() * radius],
                normal,
                color,
            ));
        }
        for j in 0..radial as u32 {
            let j1 = (j + 1) % radial as u32;
            if normal_y > 0.0 {
                mesh.indices
                    .extend_from_slice(&[center, center + 1 + j1, center + 1 + j]);
            } else {
                mesh.indices
                    .extend_from_slice(&[center, center + 1 + j, center + 1 + j1]);
            }
        }
    }
    mesh
}

/// A cone pointing along +Y, base at -height/2, with a base cap
pub fn cone(radius: f32, height: f32, radial_segments: u32, color: [f32; 4]) -> MeshData {
    let radial = radial_segments as usize;
    let half = height / 2.0;
    let mut mesh = MeshData::default();

    // Side: base ring plus one apex vertex per segment for sharp shading
    for j in 0..radial {
        let theta = j as f32 / radial as f32 * TAU;
        let (x, z) = (theta.cos(), theta.sin());
        let normal = normalize([x * height, radius, z * height]);
        mesh.vertices
            .push(MeshVertex::new([x * radius, -half, z * radius], normal, color));
        mesh.vertices
            .push(MeshVertex::new([0.0, half, 0.0], normal, color));
    }
    for j in 0..radial as u32 {
        let j1 = (j + 1) % radial as u32;
        mesh.indices
            .extend_from_slice(&[j * 2, j * 2 + 1, j1 * 2]);
    }

    // Base cap
    let center = mesh.vertices.len() as u32;
    let down = [0.0, -1.0, 0.0];
    mesh.vertices
        .push(MeshVertex::new([0.0, -half, 0.0], down, color));
    for j in 0..radial {
        let theta = j as f32 / radial as f32 * TAU;
        mesh.vertices.push(MeshVertex::new(
            [theta.cos() * radius, -half, theta.sin() * radius],
            down,
            color,
        ));
    }
    for j in 0..radial as u32 {
        let j1 = (j + 1) % radial as u32;
        mesh.indices
            .extend_from_slice(&[center, center + 1 + j, center + 1 + j1]);
    }
    mesh
}

/// An axis-aligned box centered at the origin
pub fn box_mesh(width: f32, height: f32, depth: f32, color: [f32; 4]) -> MeshData {
    let (hw, hh, hd) = (width / 2.0, height / 2.0, depth / 2.0);
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [1.0, 0.0, 0.0],
            [
                [hw, -hh, -hd],
                [hw, hh, -hd],
                [hw, hh, hd],
                [hw, -hh, hd],
            ],
        ),
        (
            [-1.0, 0.0, 0.0],
            [
                [-hw, -hh, hd],
                [-hw, hh, hd],
                [-hw, hh, -hd],
                [-hw, -hh, -hd],
            ],
        ),
        (
            [0.0, 1.0, 0.0],
            [
                [-hw, hh, -hd],
                [-hw, hh, hd],
                [hw, hh, hd],
                [hw, hh, -hd],
            ],
        ),
        (
            [0.0, -1.0, 0.0],
            [
                [-hw, -hh, -hd],
                [hw, -hh, -hd],
                [hw, -hh, hd],
                [-hw, -hh, hd],
            ],
        ),
        (
            [0.0, 0.0, 1.0],
            [
                [-hw, -hh, hd],
                [hw, -hh, hd],
                [hw, hh, hd],
                [-hw, hh, hd],
            ],
        ),
        (
            [0.0, 0.0, -1.0],
            [
                [hw, -hh, -hd],
                [-hw, -hh, -hd],
                [-hw, hh, -hd],
                [hw, hh, -hd],
            ],
        ),
    ];

    let mut mesh = MeshData::default();
    for (normal, corners) in faces {
        let base = mesh.vertices.len() as u32;
        for corner in corners {
            mesh.vertices.push(MeshVertex::new(corner, normal, color));
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

// =============================================================================
// Vector Helpers
// =============================================================================

fn add(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(v: [f32; 3], s: f32) -> [f32; 3] {
    [v[0] * s, v[1] * s, v[2] * s]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn length(v: [f32; 3]) -> f32 {
    dot(v, v).sqrt()
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = length(v);
    if len > 1e-10 {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> LinkageParams {
        LinkageParams::default()
    }

    /// A mass position with a comfortable span under default params
    const VALID_MASS_Y: f32 = -2.0;

    /// A mass position pushed up into the support, span below both minima
    const DEGENERATE_MASS_Y: f32 = 5.2;

    #[test]
    fn support_height_from_beam() {
        let p = params();
        assert!((p.support_y() - 5.55).abs() < 1e-6);
    }

    #[test]
    fn span_shrinks_as_mass_rises() {
        let p = params();
        let low = p.attachment_span(-3.0, 0.5);
        let high = p.attachment_span(-1.0, 0.5);
        assert!((low - high - 2.0).abs() < 1e-6);
    }

    #[test]
    fn helix_path_shape() {
        let path = helix_path(-1.0, 4.0, 14, 140, 0.35);
        assert_eq!(path.len(), 141);
        assert_eq!(path[0][1], -1.0);
        assert!((path[140][1] - 3.0).abs() < 1e-5);
        for p in &path {
            let r = (p[0] * p[0] + p[2] * p[2]).sqrt();
            assert!((r - 0.35).abs() < 1e-5, "point off the helix radius");
        }
    }

    #[test]
    fn tube_counts_and_index_bounds() {
        let path = helix_path(0.0, 2.0, 4, 40, 0.3);
        let tube = sweep_tube(&path, 0.05, 8, palette::SPRING);
        assert_eq!(tube.vertex_count(), 41 * 8);
        assert_eq!(tube.triangle_count(), 40 * 8 * 2);
        for &i in &tube.indices {
            assert!((i as usize) < tube.vertex_count());
        }
        assert!(tube.is_finite());
    }

    #[test]
    fn tube_ring_vertices_stay_near_path() {
        let path = helix_path(0.0, 2.0, 4, 40, 0.3);
        let tube = sweep_tube(&path, 0.05, 8, palette::SPRING);
        for (i, ring_point) in path.iter().enumerate() {
            for j in 0..8 {
                let v = &tube.vertices[i * 8 + j];
                let d = length(sub(v.position, *ring_point));
                assert!((d - 0.05).abs() < 1e-4, "vertex off the wire radius");
            }
        }
    }

    #[test]
    fn degenerate_path_produces_empty_tube() {
        assert!(sweep_tube(&[[0.0, 0.0, 0.0]], 0.05, 8, palette::SPRING).is_empty());
        assert!(sweep_tube(&[], 0.05, 8, palette::SPRING).is_empty());
    }

    #[test]
    fn cylinder_counts() {
        let mesh = cylinder(0.3, 1.0, 16, palette::DAMPER_OUTER);
        // 2 side rings + 2 caps of (center + ring)
        assert_eq!(mesh.vertex_count(), 16 * 2 + 2 * (16 + 1));
        assert_eq!(mesh.triangle_count(), 16 * 2 + 16 * 2);
        assert!(mesh.is_finite());
    }

    #[test]
    fn cone_counts() {
        let mesh = cone(0.2, 0.45, 8, palette::INDICATOR);
        assert_eq!(mesh.vertex_count(), 8 * 2 + 1 + 8);
        assert_eq!(mesh.triangle_count(), 8 * 2);
        assert!(mesh.is_finite());
    }

    #[test]
    fn box_counts() {
        let mesh = box_mesh(3.2, 1.0, 1.8, palette::MASS);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.is_finite());
    }

    #[test]
    fn merged_rebases_indices() {
        let a = box_mesh(1.0, 1.0, 1.0, palette::MASS);
        let b = cylinder(0.2, 0.5, 8, palette::MOUNT);
        let merged = MeshData::merged(&[a.clone(), b.clone()]);
        assert_eq!(merged.vertex_count(), a.vertex_count() + b.vertex_count());
        assert_eq!(
            merged.triangle_count(),
            a.triangle_count() + b.triangle_count()
        );
        let max_index = merged.indices.iter().max().copied().unwrap() as usize;
        assert!(max_index < merged.vertex_count());
    }

    #[test]
    fn rotated_z_turns_y_into_x() {
        let mesh = cone(0.2, 0.4, 8, palette::INDICATOR).rotated_z(-std::f32::consts::FRAC_PI_2);
        // The apex was at +Y; after -90° about Z it points along +X.
        let apex = mesh
            .vertices
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MIN, f32::max);
        assert!((apex - 0.2).abs() < 1e-5);
        assert!(mesh.is_finite());
    }

    #[test]
    fn spring_has_three_parts_when_valid() {
        let parts = spring_meshes(VALID_MASS_Y, 0.5, &params());
        assert_eq!(parts.len(), 3);
        for part in &parts {
            assert!(!part.is_empty());
            assert!(part.is_finite());
        }
    }

    #[test]
    fn spring_coil_spans_support_to_mass() {
        let p = params();
        let parts = spring_meshes(VALID_MASS_Y, 0.5, &p);
        let coil = &parts[0];
        let span = p.attachment_span(VALID_MASS_Y, 0.5);
        let top = p.support_y();
        let bottom = top - span;
        let (mut min_y, mut max_y) = (f32::MAX, f32::MIN);
        for v in &coil.vertices {
            min_y = min_y.min(v.position[1]);
            max_y = max_y.max(v.position[1]);
        }
        assert!((min_y - bottom).abs() < p.wire_radius + 1e-4);
        assert!((max_y - top).abs() < p.wire_radius + 1e-4);
    }

    #[test]
    fn spring_empty_below_minimum_span() {
        assert!(spring_meshes(DEGENERATE_MASS_Y, 0.5, &params()).is_empty());
    }

    #[test]
    fn spring_threshold_separates_valid_from_degenerate() {
        let p = params();
        // Solve mass_y so that span sits just above / just below the minimum.
        let at_minimum = p.support_y() - p.clearance - 0.5 - MIN_SPRING_SPAN;
        assert_eq!(spring_meshes(at_minimum - 1e-3, 0.5, &p).len(), 3);
        assert!(spring_meshes(at_minimum + 1e-2, 0.5, &p).is_empty());
    }

    #[test]
    fn damper_has_seven_parts_when_valid() {
        let parts = damper_meshes(VALID_MASS_Y, 0.5, &params());
        assert_eq!(parts.len(), 7);
        for part in &parts {
            assert!(!part.is_empty());
            assert!(part.is_finite());
        }
    }

    #[test]
    fn damper_empty_below_minimum_span() {
        assert!(damper_meshes(DEGENERATE_MASS_Y, 0.5, &params()).is_empty());
    }

    #[test]
    fn damper_layout_is_proportional() {
        let layout = damper_layout(4.0, 0.45);
        assert!((layout.housing_length - 1.8).abs() < 1e-6);
        assert!((layout.rod_length - 2.3).abs() < 1e-6);
    }

    #[test]
    fn rod_length_positive_down_to_minimum_span() {
        let p = params();
        let mut span = MIN_DAMPER_SPAN;
        while span < 10.0 {
            let layout = damper_layout(span, p.damper_housing_fraction);
            assert!(layout.rod_length > 0.0, "rod collapsed at span {span}");
            assert!(layout.housing_length > 0.0);
            span += 0.25;
        }
    }

    #[test]
    fn synthesis_is_pure() {
        // Same inputs, same meshes: no hidden state between regenerations.
        let a = spring_meshes(VALID_MASS_Y, 0.5, &params());
        let b = spring_meshes(VALID_MASS_Y, 0.5, &params());
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.vertex_count(), y.vertex_count());
            assert_eq!(x.indices, y.indices);
        }
    }

    #[test]
    fn no_nan_vertices_across_positions() {
        let p = params();
        let mut mass_y = -9.0;
        while mass_y < 6.0 {
            for part in spring_meshes(mass_y, 0.5, &p)
                .iter()
                .chain(damper_meshes(mass_y, 0.5, &p).iter())
            {
                assert!(part.is_finite(), "NaN vertex at mass_y {mass_y}");
            }
            mass_y += 0.5;
        }
    }
}
