use std::path::Path;
use std::process::ExitCode;

use bandsite::{error, Config, Pipeline};
use bandsite::error::{Result, Chainable};
use bandsite::templating::minijinja::MiniJinjaEngine;

use crate::flags::{Action, Conductor};

mod flags;

fn init_tracing(flags: &Conductor) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(flags.log_directive()));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build(flags: &Conductor) -> Result<Config> {
    let config = Config::discover(flags.root.as_deref(), flags.config.as_deref())?;
    let mut pipeline = Pipeline::new::<MiniJinjaEngine>(config);
    let summary = pipeline.run()
        .chain_with(|| error!("build failed", "last stage reached" => pipeline.stage()))?;

    let palette: Vec<_> = summary.palette.iter()
        .map(|color| format!("{:?}", color.to_rgb8()))
        .collect();

    tracing::info!(
        members = summary.members,
        instruments = summary.instruments,
        pages = summary.pages.len(),
        palette = %palette.join(" "),
        "build complete"
    );

    Ok(pipeline.config().clone())
}

#[cfg(feature = "s3")]
fn publish(output: &Path, bucket: &str) -> Result<()> {
    use bandsite::publish::{ensure_distribution, upload, S3Sink};

    let sink = S3Sink::new()?;
    upload(&sink, output, bucket)?;
    let id = ensure_distribution(&sink, bucket)?;
    tracing::info!("site published to s3://{bucket} behind distribution {id}");
    Ok(())
}

#[cfg(not(feature = "s3"))]
fn publish(output: &Path, bucket: &str) -> Result<()> {
    bandsite::err! {
        "deploying requires conductor to be built with the `s3` feature",
        "output" => output.display(),
        "bucket" => bucket,
    }
}

fn run(flags: &Conductor, action: &Action) -> Result<()> {
    let config = build(flags)?;
    match action {
        Action::Build => Ok(()),
        Action::Deploy { bucket } => publish(&config.output_dir(), bucket)
            .chain_with(|| error!("deployment failed", "bucket" => bucket)),
    }
}

fn main() -> ExitCode {
    let (flags, action) = match flags::parse(std::env::args_os().skip(1).collect()) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("error: {e}\n\n{}", flags::USAGE);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&flags);
    match run(&flags, &action) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
