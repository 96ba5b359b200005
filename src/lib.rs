//! springscope - 3D playback and charting for mass-spring-damper simulation results.
//!
//! This crate turns a solver-produced time/position series into a synchronized
//! pair of views: a procedurally generated spring/damper linkage rendered with
//! wgpu, and a 2D position-vs-time chart revealed progressively as playback
//! advances.

pub mod app;
pub mod playback;
pub mod scene;
pub mod series;
pub mod solver;
pub mod trace;
