mod config;
mod demos;
mod harness;

use anyhow::Result;
use clap::Parser;
use winit::dpi::LogicalSize;

use prism_engine::device::GpuInit;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::window::{Runtime, RuntimeConfig};

use config::{Args, DemoConfig};
use harness::DemoApp;

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log.clone().map(LoggingConfig::with_filter).unwrap_or_default());

    let config = DemoConfig::from_args(&args);
    log::info!(
        "starting demo `{}` (assets: {}, shaders: {})",
        args.demo,
        config.assets.display(),
        config.shaders.display()
    );

    let runtime = RuntimeConfig {
        title: format!("prism · {}", args.demo),
        initial_size: LogicalSize::new(args.width, args.height),
        capture_cursor: !args.no_capture,
    };

    Runtime::run(runtime, GpuInit::default(), DemoApp::new(demos::create(args.demo, config)))
}
