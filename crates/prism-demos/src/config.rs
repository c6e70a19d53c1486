use std::fmt;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

/// Which demo scene to open.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum DemoKind {
    /// One colored triangle.
    Triangle,
    /// Ten spinning textured cubes.
    Boxes,
    /// Diffuse/specular mapped cubes under directional, point and spot lights.
    Lighting,
    /// A scene file under the lighting setup.
    Model,
    /// Stencil outlines around two cubes.
    Outline,
    /// Alpha-blended windows sorted back to front.
    Blending,
}

impl fmt::Display for DemoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DemoKind::Triangle => "triangle",
            DemoKind::Boxes => "boxes",
            DemoKind::Lighting => "lighting",
            DemoKind::Model => "model",
            DemoKind::Outline => "outline",
            DemoKind::Blending => "blending",
        };
        f.write_str(name)
    }
}

#[derive(Parser, Debug)]
#[command(name = "prism-demos")]
#[command(about = "wgpu rendering demos: fly camera, lighting, models, stencil and blending")]
pub struct Args {
    /// Demo to run
    #[arg(long, value_enum, default_value_t = DemoKind::Lighting)]
    pub demo: DemoKind,

    /// Directory holding textures and models
    #[arg(long, env = "PRISM_ASSETS", default_value = "assets")]
    pub assets: PathBuf,

    /// Directory holding the WGSL shaders (defaults to the crate's shaders/)
    #[arg(long, env = "PRISM_SHADERS")]
    pub shaders: Option<PathBuf>,

    /// Scene file (`.gltf`, `.glb` or `.obj`) for the model demo, relative to the assets directory unless absolute
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Log filter (env_logger syntax); overrides RUST_LOG
    #[arg(long)]
    pub log: Option<String>,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 800.0)]
    pub width: f64,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 600.0)]
    pub height: f64,

    /// Leave the cursor free; hold the right mouse button to look around
    #[arg(long)]
    pub no_capture: bool,
}

pub const DEFAULT_MODEL: &str = "nanosuit/nanosuit.obj";

/// Resolved locations of everything the demos load from disk.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub assets: PathBuf,
    pub shaders: PathBuf,
    pub model: PathBuf,
}

impl DemoConfig {
    pub fn from_args(args: &Args) -> Self {
        let shaders = args
            .shaders
            .clone()
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("shaders"));
        let model = args.model.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL));

        Self {
            model: args.assets.join(model),
            assets: args.assets.clone(),
            shaders,
        }
    }

    pub fn asset(&self, name: impl AsRef<Path>) -> PathBuf {
        self.assets.join(name)
    }

    /// `(<name>.vert.wgsl, <name>.frag.wgsl)` in the shader directory.
    pub fn shader_pair(&self, name: &str) -> (PathBuf, PathBuf) {
        (
            self.shaders.join(format!("{name}.vert.wgsl")),
            self.shaders.join(format!("{name}.frag.wgsl")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("prism-demos").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.demo, DemoKind::Lighting);
        assert_eq!((args.width, args.height), (800.0, 600.0));
        assert!(!args.no_capture);
    }

    #[test]
    fn demo_names_match_display() {
        for kind in DemoKind::value_variants() {
            let args = parse(&["--demo", &kind.to_string()]);
            assert_eq!(args.demo, *kind);
        }
    }

    #[test]
    fn paths_resolve_against_assets() {
        let args = parse(&["--assets", "/data/prism", "--model", "backpack/scene.gltf", "--shaders", "/tmp/wgsl"]);
        let config = DemoConfig::from_args(&args);
        assert_eq!(config.model, PathBuf::from("/data/prism/backpack/scene.gltf"));
        assert_eq!(config.asset("marble.jpg"), PathBuf::from("/data/prism/marble.jpg"));
        assert_eq!(
            config.shader_pair("lamp"),
            (PathBuf::from("/tmp/wgsl/lamp.vert.wgsl"), PathBuf::from("/tmp/wgsl/lamp.frag.wgsl"))
        );
    }

    #[test]
    fn absolute_model_path_wins() {
        let args = parse(&["--assets", "assets", "--model", "/models/suit.glb"]);
        assert_eq!(DemoConfig::from_args(&args).model, PathBuf::from("/models/suit.glb"));
    }

    #[test]
    fn shaders_default_to_crate_dir() {
        let args = parse(&[]);
        let config = DemoConfig::from_args(&args);
        assert!(config.shaders.ends_with("shaders"));
    }
}
