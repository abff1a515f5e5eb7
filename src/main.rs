mod cli;

use anyhow::{Context, Result};
use cli::{parse_args, Args};
use codewalk::config::{self, Config};
use codewalk::{
    error_helpers, logger, resolve, ByteRange, Fileprint, FileprintFormatter, StepLocation, Walk,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// JSON shape printed by `codewalk resolve --json`
#[derive(Serialize)]
struct Resolution<'a> {
    file: String,
    address: &'a str,
    range: ByteRange,
    location: StepLocation,
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {:#}; using default configuration", e);
            Config::default()
        }
    };
    config::validate_config(&config)?;

    let debug = config.debug() || logger::debug_requested_by_env();
    if let Some(log_path) = logger::init_debug_logging(debug)? {
        tracing::debug!(path = %log_path.display(), "debug logging enabled");
    }

    let use_color = config.color() && FileprintFormatter::should_use_color();

    match args {
        Args::Resolve { file, address, context, json } => {
            let context = context.unwrap_or(config.context_lines());
            resolve_address(&file, &address, context, json, use_color)?;
        }
        Args::Walk { path, root, json } => {
            show_walk(&path, root, json, use_color)?;
        }
        Args::Print { file, lo, hi, context, full } => {
            let context = context.unwrap_or(config.context_lines());
            print_file(&file, lo, hi, context, full, use_color)?;
        }
        Args::Config { show } => {
            show_config(&config, show)?;
        }
    }

    Ok(())
}

fn read_source(path: &Path) -> Result<Vec<u8>> {
    fs::read(path)
        .map_err(|e| anyhow::anyhow!(error_helpers::read_error(path, &e, "reading source file")))
}

fn resolve_address(
    file: &Path,
    address: &str,
    context: usize,
    json: bool,
    use_color: bool,
) -> Result<()> {
    let buf = read_source(file)?;
    let range = resolve(address, &buf, ByteRange::default())
        .with_context(|| format!("{}:{}", file.display(), address))?;
    let location = StepLocation::from_range(&buf, range);

    if json {
        let resolution = Resolution {
            file: file.display().to_string(),
            address,
            range,
            location,
        };
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    let label = if location.lo_line == location.hi_line {
        format!("{}:{}", file.display(), location.lo_line)
    } else {
        format!("{}:{},{}", file.display(), location.lo_line, location.hi_line)
    };
    let fileprint = Fileprint::from_range(&buf, range, context);
    print!("{}", FileprintFormatter::format_snippet(&label, &fileprint, use_color));

    Ok(())
}

fn show_walk(path: &Path, root: Option<PathBuf>, json: bool, use_color: bool) -> Result<()> {
    let root = root.unwrap_or_else(|| match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    });
    let walk = Walk::load(path, &root)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&walk)?);
    } else {
        print!("{}", FileprintFormatter::format_walk(&walk, use_color));
    }

    Ok(())
}

fn print_file(
    file: &Path,
    lo: usize,
    hi: usize,
    context: usize,
    full: bool,
    use_color: bool,
) -> Result<()> {
    let buf = read_source(file)?;
    let fileprint = Fileprint::new(&buf, lo, hi, context);
    print!("{}", FileprintFormatter::format(&fileprint, use_color, full));
    Ok(())
}

fn show_config(config: &Config, show: bool) -> Result<()> {
    if show {
        let config_str = toml::to_string_pretty(config).context("Failed to serialize config")?;
        print!("{}", config_str);
    } else {
        println!("Configuration file: {}", config::config_file_path()?.display());
        println!("Log file: {}", logger::get_log_path()?.display());
    }
    Ok(())
}
