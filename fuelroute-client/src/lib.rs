///! Fuel route client library
///!
///! Route optimization and nearby-station search workflows over a headless
///! map overlay model. Presentation goes through the [`port::ViewPort`] trait.

pub mod api;
pub mod app;
pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod logging;
pub mod map;
pub mod port;
pub mod render;
