//! Layered configuration: compiled-in defaults, an optional system config
//! file, an optional user config file, then command-line flags — each layer
//! overriding the one before it, field by field.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Merged settings consumed by the simulation core. `bind.*` keybindings are
/// accepted and preserved for the (out-of-scope) input/GUI layer but are
/// otherwise inert here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_path: PathBuf,
    pub debug_logfile: Option<PathBuf>,
    pub listen_port_range: (u16, u16),
    pub server_url: String,
    pub lang: String,
    pub simulation_k: u32,
    #[serde(default)]
    pub keybindings: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./data"),
            debug_logfile: None,
            listen_port_range: (
                crate::constants::DEFAULT_LISTEN_PORT,
                crate::constants::DEFAULT_LISTEN_PORT + 16,
            ),
            server_url: "https://ravaged-planets.example/api".to_string(),
            lang: "en".to_string(),
            simulation_k: crate::constants::DEFAULT_SIMULATION_K,
            keybindings: BTreeMap::new(),
        }
    }
}

/// A config file's contents, deserialized straight from TOML. Every field
/// is optional so a file only needs to mention what it overrides.
#[derive(Debug, Clone, Default, Deserialize)]
struct SettingsFile {
    data_path: Option<PathBuf>,
    debug_logfile: Option<PathBuf>,
    listen_port: Option<String>,
    server_url: Option<String>,
    lang: Option<String>,
    simulation_k: Option<u32>,
    #[serde(default, rename = "bind")]
    keybindings: BTreeMap<String, String>,
}

impl Settings {
    fn merge_file(&mut self, file: SettingsFile) {
        if let Some(v) = file.data_path {
            self.data_path = v;
        }
        if let Some(v) = file.debug_logfile {
            self.debug_logfile = Some(v);
        }
        if let Some(v) = file.listen_port {
            if let Some(range) = parse_port_range(&v) {
                self.listen_port_range = range;
            }
        }
        if let Some(v) = file.server_url {
            self.server_url = v;
        }
        if let Some(v) = file.lang {
            self.lang = v;
        }
        if let Some(v) = file.simulation_k {
            self.simulation_k = v;
        }
        self.keybindings.extend(file.keybindings);
    }

    fn load_file(&mut self, path: &Path) -> CoreResult<()> {
        if !path.exists() {
            return Ok(());
        }
        let text = std::fs::read_to_string(path)?;
        let file: SettingsFile =
            toml::from_str(&text).map_err(|e| CoreError::Parse(format!("{}: {}", path.display(), e)))?;
        self.merge_file(file);
        Ok(())
    }

    /// Builds settings from defaults, then `system_path`, then `user_path`
    /// (each optional), then CLI flags parsed from `args` (excluding
    /// argv[0], which callers supply themselves via `Cli::parse_from`).
    pub fn load(
        system_path: Option<&Path>,
        user_path: Option<&Path>,
        cli: &Cli,
    ) -> CoreResult<Settings> {
        let mut settings = Settings::default();
        if let Some(p) = system_path {
            settings.load_file(p)?;
        }
        if let Some(p) = user_path {
            settings.load_file(p)?;
        }
        cli.apply(&mut settings)?;
        Ok(settings)
    }
}

fn parse_port_range(spec: &str) -> Option<(u16, u16)> {
    let (a, b) = spec.split_once('-')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

/// Command-line overrides, parsed with `clap`'s derive API.
#[derive(Debug, Parser)]
#[command(name = "ravaged-planets", about = "Deterministic lockstep RTS simulation core")]
pub struct Cli {
    #[arg(long)]
    pub data_path: Option<PathBuf>,
    #[arg(long)]
    pub debug_logfile: Option<PathBuf>,
    /// Port range, e.g. "9871-9887".
    #[arg(long)]
    pub listen_port: Option<String>,
    #[arg(long)]
    pub server_url: Option<String>,
    #[arg(long)]
    pub lang: Option<String>,
    #[arg(long)]
    pub simulation_k: Option<u32>,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) -> CoreResult<()> {
        if let Some(v) = &self.data_path {
            settings.data_path = v.clone();
        }
        if let Some(v) = &self.debug_logfile {
            settings.debug_logfile = Some(v.clone());
        }
        if let Some(v) = &self.listen_port {
            settings.listen_port_range = parse_port_range(v)
                .ok_or_else(|| CoreError::Parse(format!("bad --listen-port range: {v}")))?;
        }
        if let Some(v) = &self.server_url {
            settings.server_url = v.clone();
        }
        if let Some(v) = &self.lang {
            settings.lang = v.clone();
        }
        if let Some(v) = self.simulation_k {
            settings.simulation_k = v;
        }
        Ok(())
    }
}
