use anyhow::{Context, Result};

use crate::config::ShowroomConfig;

mod asset_loader;
mod asset_pipeline;
mod camera;
mod catalog;
mod category;
mod config;
mod controls;
mod engine;
mod environment;
mod geometry;
mod input;
mod labels;
mod lighting;
mod material_manager;
mod math;
mod model;
mod navigation;
mod picking;
mod rendering;
mod scene_graph;
mod showroom;
mod window;

fn main() -> Result<()> {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();

    let config = ShowroomConfig::load().context("Failed to load showroom configuration")?;

    pollster::block_on(window::run(config))?;

    Ok(())
}
