pub mod camera;
pub mod config;
pub mod location;
pub mod overlay;
pub mod screen;
pub mod server;
