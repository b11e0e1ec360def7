use anyhow::{Context, Result};
use clap::Parser;
use motionkit::{format_move, init_logging, parse_block, Config, LineMove, Runner, BUILD_DATE, VERSION};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// G-code file to execute; reads stdin when omitted
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Machine configuration file (TOML or JSON)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enforce soft limits regardless of the configuration
    #[arg(long)]
    soft_limits: bool,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    init_config: bool,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => match Config::default_path() {
            Ok(path) if path.exists() => path,
            _ => {
                debug!("No config file found, using defaults");
                return Ok(Config::new());
            }
        },
    };
    Config::load_from_file(&path)
        .with_context(|| format!("Failed to load config: {}", path.display()))
}

fn write_default_config(cli: &Cli) -> Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    Config::new()
        .save_to_file(&path)
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    info!("Wrote default config to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    info!("motionkit {} (built {})", VERSION, BUILD_DATE);

    if cli.init_config {
        return write_default_config(&cli);
    }

    let config = load_config(&cli)?;
    let mut runner = Runner::new(config);
    if cli.soft_limits {
        runner.machine_mut().soft_limits_mut().set_enabled(true);
    }

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut out = io::BufWriter::new(io::stdout().lock());
    let mut sink = |line: LineMove| -> io::Result<()> { writeln!(out, "{}", format_move(&line)) };

    for (index, line) in reader.lines().enumerate() {
        let text = line.context("Failed to read G-code input")?;
        let number = index + 1;
        let mut block = parse_block(&text)
            .with_context(|| format!("Line {}: cannot parse '{}'", number, text.trim()))?;
        if block.line_number.is_none() {
            block.line_number = Some(u32::try_from(number).unwrap_or(u32::MAX));
        }
        runner
            .execute(&block, &mut sink)
            .with_context(|| format!("Line {}: '{}'", number, text.trim()))?;
    }
    runner.finish(&mut sink)?;
    drop(sink);
    out.flush()?;

    Ok(())
}
