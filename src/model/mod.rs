pub mod config;
pub mod params;
pub mod registry;
pub mod song;
