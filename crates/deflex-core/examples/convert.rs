//! Convert a design document and print the layout outline plus output JSON.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example convert -- design.json [config.json]
//! ```

use deflex_core::{BuildConfig, convert_json};
use std::process::ExitCode;

fn run(design_path: &str, config_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let input = std::fs::read_to_string(design_path)?;
    let config: BuildConfig = match config_path {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => BuildConfig::default(),
    };

    let conversion = convert_json(&input, &config)?;
    for d in conversion.warnings() {
        let node = d.node.as_ref().map_or("-".to_string(), |id| format!("#{id}"));
        log::warn!("[{}] {node}: {}", d.rule, d.message);
    }

    print!("{}", conversion.outline());
    println!("{}", serde_json::to_string_pretty(&conversion.output())?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(design_path) = args.first() else {
        eprintln!("usage: convert <design.json> [config.json]");
        return ExitCode::from(2);
    };

    match run(design_path, args.get(1).map(String::as_str)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
