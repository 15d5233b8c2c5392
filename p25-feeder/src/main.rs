//! tsbk-decode: Command-line decoder for captured P25 control channel bursts.
//!
//! Supports:
//! - Decoding a burst file to text or JSON lines
//! - Summarizing a burst file (validity, encryption, per-opcode tally)
//! - Showing or initializing the config file

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use p25_core::{create, Direction, Identifier, Opcode, Tsbk, Vendor};

mod capture;
mod config;

use capture::{BurstReader, LineDefaults, RawBurst};
use config::{Config, OutputFormat};

#[derive(Parser)]
#[command(
    name = "tsbk-decode",
    version,
    about = "APCO-25 trunking signalling block decoder"
)]
struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a burst file, one block per line
    Decode {
        /// Path to a burst file (hex, one burst per line)
        file: PathBuf,

        /// Print one JSON object per block
        #[arg(long)]
        json: bool,

        /// Direction for lines that do not name one (isp/osp)
        #[arg(long)]
        direction: Option<Direction>,

        /// NAC for lines that do not carry one (hex)
        #[arg(long, value_parser = parse_nac_arg)]
        nac: Option<u16>,

        /// Also print blocks that failed the CRC
        #[arg(long)]
        show_invalid: bool,
    },
    /// Summarize a burst file
    Stats {
        /// Path to a burst file
        file: PathBuf,

        /// Direction for lines that do not name one (isp/osp)
        #[arg(long)]
        direction: Option<Direction>,
    },
    /// Show the effective config, or write the default config file
    Config {
        /// Write the default config to ~/.p25-decode/config.yaml
        #[arg(long)]
        init: bool,
    },
}

fn parse_nac_arg(s: &str) -> Result<u16, String> {
    config::parse_nac(s).ok_or_else(|| format!("invalid NAC '{s}': expected up to 3 hex digits"))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_config();

    match cli.command {
        Commands::Decode {
            file,
            json,
            direction,
            nac,
            show_invalid,
        } => {
            let mut config = config;
            if let Some(d) = direction {
                config.decoder.direction = d;
            }
            if let Some(n) = nac {
                config.decoder.nac = n;
            }
            if json {
                config.output.format = OutputFormat::Json;
            }
            config.decoder.show_invalid |= show_invalid;
            cmd_decode(&file, &config);
        }
        Commands::Stats { file, direction } => {
            let mut config = config;
            if let Some(d) = direction {
                config.decoder.direction = d;
            }
            cmd_stats(&file, &config);
        }
        Commands::Config { init } => cmd_config(&config, init),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Read and decode every burst in `file`, logging lines that fail to parse.
fn decode_file(file: &Path, config: &Config) -> Vec<Tsbk> {
    let defaults = LineDefaults {
        direction: config.decoder.direction,
        nac: config.decoder.nac,
        start_time: now_seconds(),
    };
    let reader = BurstReader::new(file, defaults);

    let (bursts, rejected) = match reader.read_all() {
        Ok(r) => r,
        Err(e) => {
            error!("Cannot read {}: {e}", file.display());
            std::process::exit(1);
        }
    };

    for (line, err) in &rejected {
        warn!("{}:{line}: skipped: {err}", file.display());
    }

    bursts.into_iter().map(decode_burst).collect()
}

fn decode_burst(burst: RawBurst) -> Tsbk {
    let line = burst.line;
    let tsbk = create(
        burst.direction,
        burst.duid,
        burst.message,
        burst.nac,
        burst.timestamp,
    );
    debug!(
        line,
        opcode = %tsbk.opcode(),
        valid = tsbk.is_valid(),
        corrected = tsbk.corrected_bits(),
        "decoded block"
    );
    tsbk
}

/// One JSON output line.
#[derive(Serialize)]
struct Record<'a> {
    stub: String,
    opcode: Opcode,
    vendor: Vendor,
    valid: bool,
    encrypted: bool,
    last_block: bool,
    identifiers: Vec<Identifier>,
    #[serde(flatten)]
    tsbk: &'a Tsbk,
}

impl<'a> Record<'a> {
    fn new(tsbk: &'a Tsbk) -> Self {
        Record {
            stub: tsbk.message_stub(),
            opcode: tsbk.opcode(),
            vendor: tsbk.vendor(),
            valid: tsbk.is_valid(),
            encrypted: tsbk.is_encrypted(),
            last_block: tsbk.is_last_block(),
            identifiers: tsbk.identifiers(),
            tsbk,
        }
    }
}

fn format_text(tsbk: &Tsbk) -> String {
    let mut line = format!(
        "{:.6} {} NAC:{:03X} {} {}",
        tsbk.timestamp(),
        tsbk.direction(),
        tsbk.nac(),
        tsbk.duid(),
        tsbk
    );
    let ids = tsbk.identifiers();
    if tsbk.is_valid() && !ids.is_empty() {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        line.push_str(&format!(" [{}]", ids.join(", ")));
    }
    line
}

fn cmd_decode(file: &Path, config: &Config) {
    let blocks = decode_file(file, config);

    let mut shown = 0u64;
    for tsbk in &blocks {
        if !tsbk.is_valid() && !config.decoder.show_invalid {
            continue;
        }
        match config.output.format {
            OutputFormat::Text => println!("{}", format_text(tsbk)),
            OutputFormat::Json => match serde_json::to_string(&Record::new(tsbk)) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!("JSON encoding failed: {e}"),
            },
        }
        shown += 1;
    }

    info!("{} blocks decoded, {shown} shown", blocks.len());
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
struct Summary {
    total: usize,
    valid: usize,
    corrected: usize,
    invalid: usize,
    encrypted: usize,
    /// (opcode, count) for valid blocks, most frequent first.
    opcodes: Vec<(Opcode, usize)>,
}

fn summarize(blocks: &[Tsbk]) -> Summary {
    let mut summary = Summary {
        total: blocks.len(),
        ..Summary::default()
    };
    let mut tally: HashMap<Opcode, usize> = HashMap::new();

    for tsbk in blocks {
        if !tsbk.is_valid() {
            summary.invalid += 1;
            continue;
        }
        summary.valid += 1;
        if tsbk.corrected_bits() > 0 {
            summary.corrected += 1;
        }
        if tsbk.is_encrypted() {
            summary.encrypted += 1;
        }
        *tally.entry(tsbk.opcode()).or_default() += 1;
    }

    let mut opcodes: Vec<(Opcode, usize)> = tally.into_iter().collect();
    opcodes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.to_string().cmp(&b.0.to_string())));
    summary.opcodes = opcodes;
    summary
}

fn cmd_stats(file: &Path, config: &Config) {
    let blocks = decode_file(file, config);
    let summary = summarize(&blocks);

    println!("File:       {}", file.display());
    println!("Bursts:     {}", summary.total);
    println!("Valid:      {}", summary.valid);
    println!("Corrected:  {}", summary.corrected);
    println!("CRC failed: {}", summary.invalid);
    println!("Encrypted:  {}", summary.encrypted);

    if !summary.opcodes.is_empty() {
        println!();
        println!("Opcodes:");
        for (opcode, count) in &summary.opcodes {
            println!("  {count:>6}  {opcode}");
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(config: &Config, init: bool) {
    if init {
        match config::save_config(&Config::default()) {
            Ok(path) => info!("Wrote default config to {}", path.display()),
            Err(e) => {
                error!("Cannot write config: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("# {}", config::config_file().display());
    print!("{}", config::serialize_config(config));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
