// Library exports for vizdash

pub mod chart;
pub mod cluster;
pub mod config;
pub mod csv_reader;
pub mod data;
pub mod filter;
pub mod impute;
pub mod options;
pub mod orientation;
pub mod palette;
pub mod parser;
pub mod preprocessor;
pub mod render;
pub mod resolve;
pub mod selection;
pub mod session;
pub mod transform;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            format: OutputFormat::Png,
        }
    }
}
