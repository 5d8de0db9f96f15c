//! # Strafe: A Small ECS Arcade Shooter
//!
//! A keyboard-controlled ship, a formation of animated UFOs, and a boss that
//! bombs the player whenever it passes underneath. Everything on screen is an
//! entity in a small archetype [`ecs`]; behaviour lives in plain functions
//! over the [`World`](ecs::World), run in a fixed order by
//! [`systems::pipeline`].
//!
//! Without the `gpu` feature the crate is a headless simulation: every system
//! runs against a [`RecordingCanvas`](render::RecordingCanvas).

pub mod animation;
pub mod assets;
pub mod components;
pub mod config;
pub mod ecs;
pub mod game;
pub mod input;
pub mod math;
pub mod render;
pub mod spawn;
pub mod systems;
pub mod time;

#[cfg(feature = "gpu")]
pub mod window;
