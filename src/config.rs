use derive_more::{Deref, From, Into};
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use palette::Srgba;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("Unsupported colour syntax '{0}'")]
    Syntax(String),
    #[error("Invalid hex colour '{0}'")]
    Hex(String),
    #[error("Invalid colour component '{0}'")]
    Component(String),
}

/// A colour written the way a stylesheet would: `#RGB`, `#RRGGBB`, `#RRGGBBAA`,
/// `rgb(r, g, b)` or `rgba(r, g, b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Deref, From, Into, DeserializeFromStr, SerializeDisplay)]
pub struct CssColor(Srgba<f64>);

impl CssColor {
    fn parse_hex(hex: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError::Hex(format!("#{hex}"));
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let (rgb, alpha) = match hex.len() {
            3 | 6 => (hex, u8::MAX),
            8 => (
                &hex[..6],
                u8::from_str_radix(&hex[6..], 16).map_err(|_| invalid())?,
            ),
            _ => return Err(invalid()),
        };
        let rgb = palette::Srgb::<u8>::from_str(rgb).map_err(|_| invalid())?;
        Ok(Self(
            palette::Srgba::<u8>::new(rgb.red, rgb.green, rgb.blue, alpha).into_format(),
        ))
    }

    fn parse_function(body: &str, with_alpha: bool) -> Result<Self, ColorParseError> {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != if with_alpha { 4 } else { 3 } {
            return Err(ColorParseError::Syntax(body.to_string()));
        }

        let channel = |s: &str| -> Result<f64, ColorParseError> {
            s.parse::<f64>()
                .map(|v| v.clamp(0.0, 255.0) / 255.0)
                .map_err(|_| ColorParseError::Component(s.to_string()))
        };
        let alpha = match parts.get(3) {
            Some(s) => s
                .parse::<f64>()
                .map(|v| v.clamp(0.0, 1.0))
                .map_err(|_| ColorParseError::Component(s.to_string()))?,
            None => 1.0,
        };

        Ok(Self(Srgba::new(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            alpha,
        )))
    }
}

impl FromStr for CssColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        if let Some(body) = s.strip_prefix("rgba(").and_then(|b| b.strip_suffix(')')) {
            return Self::parse_function(body, true);
        }
        if let Some(body) = s.strip_prefix("rgb(").and_then(|b| b.strip_suffix(')')) {
            return Self::parse_function(body, false);
        }
        Err(ColorParseError::Syntax(s.to_string()))
    }
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c: Srgba<u8> = self.0.into_format();
        write!(
            f,
            "rgba({}, {}, {}, {})",
            c.red,
            c.green,
            c.blue,
            self.0.alpha
        )
    }
}

fn css(s: &str) -> CssColor {
    s.parse().unwrap_or(CssColor(Srgba::new(0.0, 0.0, 0.0, 1.0)))
}

/// Appearance and timing of the ring. Geometry values are fractions of the canvas side.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RingConfig {
    pub draw_scale: f64,
    pub circle_x: f64,
    pub circle_y: f64,

    pub inner_radius_progress: f64,
    pub progress_bar_width: f64,
    /// Fraction of a turn where the arc starts. 0.75 is twelve o'clock.
    pub arc_angle_offset: f64,

    pub inner_radius_unfilled: f64,
    pub unfilled_bar_width: f64,
    pub unfilled_bar_color: CssColor,

    pub outer_radius: f64,
    pub outer_radius_line_width: f64,
    pub background_fill: CssColor,
    pub background_border_color: CssColor,

    pub hold_text: String,
    pub hold_text_color: CssColor,
    pub font_size: f64,
    pub font_family: String,

    /// Progress per second.
    pub fill_rate: f64,
    /// Keep the ring on screen once it has filled.
    pub show_after_finish: bool,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            draw_scale: 1.0,
            circle_x: 0.50,
            circle_y: 0.50,
            inner_radius_progress: 0.40,
            progress_bar_width: 0.08,
            arc_angle_offset: 0.75,
            inner_radius_unfilled: 0.40,
            unfilled_bar_width: 0.06,
            unfilled_bar_color: css("#667074"),
            outer_radius: 0.47,
            outer_radius_line_width: 0.01,
            background_fill: css("rgba(0, 0, 0, 0.8)"),
            background_border_color: css("#000000"),
            hold_text: "HOLD".to_string(),
            hold_text_color: css("#FFFF00"),
            font_size: 0.21,
            font_family: "helvetica-neue".to_string(),
            fill_rate: 0.75,
            show_after_finish: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config path: {}", .0.display())]
    InvalidPath(PathBuf),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "holdring", "hold-ring").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn build<S>(file: S) -> Result<RingConfig, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let s = config::Config::builder()
        .add_source(file)
        .add_source(config::Environment::with_prefix("HOLD_RING").try_parsing(true))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Loads the user config file if one exists, then environment overrides.
pub fn load_config() -> Result<RingConfig, ConfigError> {
    let config_path = get_config_path()?;
    build(config::File::from(config_path).required(false))
}

/// Loads an explicit config file, which must exist.
pub fn load_config_from(path: &Path) -> Result<RingConfig, ConfigError> {
    build(config::File::from(path).required(true))
}

pub fn load_or_default() -> RingConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Falling back to default configuration: {}", e);
            RingConfig::default()
        }
    }
}

pub fn write_default_config() -> Result<PathBuf, ConfigError> {
    let path = get_config_path()?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

/// Directory to watch and the file inside it whose changes mean a reload. Relative
/// paths resolve against `cwd`. The directory is created and canonicalised so it
/// compares equal to the paths notify reports.
fn watch_target(config_path: &Path, cwd: &Path) -> Result<(PathBuf, PathBuf), ConfigError> {
    let absolute = if config_path.is_absolute() {
        config_path.to_path_buf()
    } else {
        cwd.join(config_path)
    };
    let invalid = || ConfigError::InvalidPath(absolute.clone());
    let file_name = absolute.file_name().ok_or_else(invalid)?;
    let dir = absolute.parent().ok_or_else(invalid)?;

    fs_err::create_dir_all(dir)?;
    let dir = fs_err::canonicalize(dir)?;
    let file = dir.join(file_name);
    Ok((dir, file))
}

fn is_reload(event: &notify::Event, config_file: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_file)
}

async fn watch_config(
    tx: Sender<AppEvent>,
    config_path: &Path,
    cwd: &Path,
) -> Result<(), ConfigError> {
    let (dir, file) = watch_target(config_path, cwd)?;
    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    log::debug!("Watching {} for changes", file.display());

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) if is_reload(&event, &file) => {
                if tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
    Ok(())
}

/// Sends [`AppEvent::ConfigReload`] whenever `config_path` is written, created or removed.
pub async fn run_async_watcher(tx: Sender<AppEvent>, config_path: PathBuf) {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            log::error!("Config watcher disabled, no working directory: {}", e);
            return;
        }
    };

    if let Err(e) = watch_config(tx, &config_path, &cwd).await {
        log::error!("Config watcher for {} stopped: {}", config_path.display(), e);
    }
}
