use std::path::PathBuf;
use std::process::ExitCode;

use mrml_lib::command::execute_json_batch;
use mrml_lib::{Scene, SceneSettings};

/// Paths given on the command line
#[derive(Debug, Default)]
struct Args {
    scene: Option<PathBuf>,
    commands: Option<PathBuf>,
    out: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mrml=info,mrml_lib=info".into()),
        )
        .init();

    let args = parse_args();
    let settings = SceneSettings::load();
    if SceneSettings::config_path().is_some_and(|path| !path.exists()) {
        match settings.save() {
            Ok(()) => tracing::debug!("Wrote default settings"),
            Err(e) => tracing::warn!("Could not write default settings: {e}"),
        }
    }
    let mut scene = Scene::with_settings(settings);

    if let Some(path) = &args.scene {
        if let Err(e) = scene.connect(Some(path.as_path())) {
            tracing::error!("Failed to load scene from {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
        tracing::info!("Loaded scene from {} ({} nodes)", path.display(), scene.number_of_nodes());
    }

    if let Some(path) = &args.commands {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to read command file {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        };
        match execute_json_batch(&mut scene, &json) {
            Ok(responses) => {
                for response in responses {
                    match serde_json::to_string(&response) {
                        Ok(line) => println!("{line}"),
                        Err(e) => tracing::error!("Failed to encode response: {e}"),
                    }
                }
            }
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(path) = &args.out {
        if let Err(e) = scene.commit(Some(path.as_path())) {
            tracing::error!("Failed to write scene to {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();
    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1).map(PathBuf::from);
        match args[i].as_str() {
            "--scene" => parsed.scene = value,
            "--commands" => parsed.commands = value,
            "--out" => parsed.out = value,
            other => {
                tracing::warn!("Ignoring unknown argument {other}");
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    parsed
}
