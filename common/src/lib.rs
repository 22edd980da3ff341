pub mod config;
pub mod config_presets;
