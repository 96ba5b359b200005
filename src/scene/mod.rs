//! 3D linkage scene: procedural geometry synthesis and wgpu rendering.
//!
//! The scene shows a mass suspended from a fixed support by a helical spring
//! and a telescoping damper. The spring and damper meshes are regenerated
//! every frame from the single mass-position scalar; see
//! [`geometry`] for the synthesis rules and [`view::SceneView`] for buffer
//! ownership and the atomic swap that keeps frames consistent.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use springscope::scene::{SceneView, SceneConfig, create_headless_device};
//!
//! let (device, queue) = pollster::block_on(create_headless_device()).unwrap();
//! let mut scene = SceneView::new(Arc::new(device), Arc::new(queue), SceneConfig::default());
//!
//! // Drive the linkage and draw a frame offscreen
//! scene.set_mass_position(-1.25);
//! scene.render_offscreen(&[]);
//! let pixels = scene.read_pixels();
//! ```

pub mod camera;
pub mod geometry;
pub mod shaders;
pub mod types;
pub mod view;

pub use camera::OrbitCamera;
pub use geometry::{
    DamperLayout, LinkageParams, MIN_DAMPER_SPAN, MIN_SPRING_SPAN, MeshData, damper_layout,
    damper_meshes, helix_path, spring_meshes,
};
pub use types::{
    CameraUniforms, LineVertex, MeshVertex, ModelUniforms, OverlayVertex, SceneConfig, palette,
};
pub use view::{DEFAULT_MASS_Y, SceneView, create_headless_device, mass_scale_factor};
