//! Configuration file management for tsbk-decode.
//!
//! Reads/writes `~/.p25-decode/config.yaml` with decoder defaults (channel
//! direction, NAC, whether to print failed blocks) and the output format.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use p25_core::{Direction, P25Error};

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub decoder: DecoderConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    /// Direction assumed for lines that do not name one.
    pub direction: Direction,
    /// NAC assumed for lines that do not carry one.
    pub nac: u16,
    pub show_invalid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = P25Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(P25Error::Config(format!("unknown output format: {s}"))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            decoder: DecoderConfig {
                direction: Direction::Outbound,
                nac: 0,
                show_invalid: false,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
            },
        }
    }
}

/// Get the config directory path (`~/.p25-decode/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".p25-decode")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    ["HOME", "USERPROFILE"]
        .into_iter()
        .find_map(std::env::var_os)
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
}

/// Load config from `~/.p25-decode/config.yaml`.
///
/// Returns default config if file doesn't exist.
pub fn load_config() -> Config {
    load_config_from(&config_file())
}

/// Load config from an explicit path, falling back to defaults.
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(_) => return Config::default(),
    };

    parse_config(&text).unwrap_or_default()
}

/// Save config to `~/.p25-decode/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf, P25Error> {
    let path = config_file();
    save_config_to(config, &path)?;
    Ok(path)
}

/// Save config to an explicit path, creating parent directories.
pub fn save_config_to(config: &Config, path: &Path) -> Result<(), P25Error> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| P25Error::Config(e.to_string()))?;
    }
    std::fs::write(path, serialize_config(config)).map_err(|e| P25Error::Config(e.to_string()))
}

/// Parse simple YAML-like config text.
pub fn parse_config(text: &str) -> Option<Config> {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            current_section = val.is_empty().then(|| key.to_string());
            continue;
        }

        let Some(ref section) = current_section else {
            continue;
        };
        let Some(val) = parse_string_value(val) else {
            continue;
        };

        match (section.as_str(), key) {
            ("decoder", "direction") => {
                if let Ok(d) = val.parse::<Direction>() {
                    config.decoder.direction = d;
                }
            }
            ("decoder", "nac") => {
                if let Some(nac) = parse_nac(&val) {
                    config.decoder.nac = nac;
                }
            }
            ("decoder", "show_invalid") => {
                if let Ok(b) = val.parse::<bool>() {
                    config.decoder.show_invalid = b;
                }
            }
            ("output", "format") => {
                if let Ok(f) = val.parse::<OutputFormat>() {
                    config.output.format = f;
                }
            }
            _ => {}
        }
    }

    Some(config)
}

/// Scalar value with YAML null forms removed and one layer of quotes stripped.
fn parse_string_value(val: &str) -> Option<String> {
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| val.strip_prefix(*q)?.strip_suffix(*q))
        .unwrap_or(val);
    match unquoted {
        "" | "~" | "null" => None,
        v => Some(v.to_string()),
    }
}

/// Parse a 12-bit NAC written as hex, with or without a `0x` prefix.
pub fn parse_nac(val: &str) -> Option<u16> {
    let digits = val
        .strip_prefix("0x")
        .or_else(|| val.strip_prefix("0X"))
        .unwrap_or(val);
    u16::from_str_radix(digits, 16)
        .ok()
        .filter(|nac| *nac <= 0xFFF)
}

/// Serialize config to YAML-like text.
pub fn serialize_config(config: &Config) -> String {
    let direction = match config.decoder.direction {
        Direction::Inbound => "inbound",
        Direction::Outbound => "outbound",
    };

    let lines = [
        "# p25-decode configuration".to_string(),
        String::new(),
        "decoder:".into(),
        format!("  direction: {direction}"),
        format!("  nac: 0x{:03X}", config.decoder.nac),
        format!("  show_invalid: {}", config.decoder.show_invalid),
        String::new(),
        "output:".into(),
        format!("  format: {}", config.output.format),
    ];

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
