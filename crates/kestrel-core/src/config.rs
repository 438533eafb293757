//! Configuration for Kestrel windows and applications.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How input coordinates are reported to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HdpiMode {
    /// Coordinates stay in the native layer's logical (screen) space.
    #[default]
    Logical,
    /// Coordinates are scaled to back-buffer pixels.
    Pixels,
}

/// Typed view of an integer frame-rate setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpsTarget {
    /// `-1` (or any negative value): do not render, only idle.
    Paused,
    /// `0`: render as fast as possible, no pacing.
    Unthrottled,
    /// Render at most this many frames per second.
    Limited(u32),
}

impl FpsTarget {
    pub const PAUSED: i32 = -1;
    pub const UNTHROTTLED: i32 = 0;

    pub fn from_raw(fps: i32) -> Self {
        match fps {
            i32::MIN..=-1 => FpsTarget::Paused,
            0 => FpsTarget::Unthrottled,
            n => FpsTarget::Limited(n as u32),
        }
    }

    pub fn is_paused(self) -> bool {
        matches!(self, FpsTarget::Paused)
    }
}

/// Per-window settings.
///
/// Geometry and decoration fields are read once when the native window is
/// created; the frame-rate fields drive the frame scheduler at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Initial top-left position in screen coordinates, platform default when `None`.
    pub position: Option<(i32, i32)>,
    pub resizable: bool,
    pub decorated: bool,
    pub maximized: bool,
    pub visible: bool,
    pub hdpi_mode: HdpiMode,
    /// Target fps while focused. `-1` paused, `0` unthrottled.
    pub foreground_fps: i32,
    /// Target fps while visible but unfocused.
    pub background_fps: i32,
    /// Target fps while iconified or invisible. Paused by default.
    pub hidden_fps: i32,
    /// Pacing of iterations that do not render (paused windows).
    pub idle_fps: u32,
    pub vsync: bool,
    pub continuous_rendering: bool,
    /// Share GL object namespaces with the controller's first window.
    pub share_context: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Kestrel Window".to_string(),
            width: 640,
            height: 480,
            position: None,
            resizable: true,
            decorated: true,
            maximized: false,
            visible: true,
            hdpi_mode: HdpiMode::Logical,
            foreground_fps: 60,
            background_fps: 60,
            hidden_fps: FpsTarget::PAUSED,
            idle_fps: 60,
            vsync: true,
            continuous_rendering: true,
            share_context: true,
        }
    }
}

impl WindowConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_fps(mut self, foreground: i32, background: i32, hidden: i32) -> Self {
        self.foreground_fps = foreground;
        self.background_fps = background;
        self.hidden_fps = hidden;
        self
    }

    pub fn with_hdpi_mode(mut self, mode: HdpiMode) -> Self {
        self.hdpi_mode = mode;
        self
    }

    pub fn with_continuous_rendering(mut self, continuous: bool) -> Self {
        self.continuous_rendering = continuous;
        self
    }
}

/// Application-wide settings, typically loaded from `kestrel.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Defaults for the first window.
    pub window: WindowConfig,
    /// Treat a panicking posted runnable as fatal for its window.
    pub error_on_runnable_panic: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ApplicationConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("loaded application config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fps_target_from_raw() {
        assert_eq!(FpsTarget::from_raw(-1), FpsTarget::Paused);
        assert_eq!(FpsTarget::from_raw(-30), FpsTarget::Paused);
        assert_eq!(FpsTarget::from_raw(0), FpsTarget::Unthrottled);
        assert_eq!(FpsTarget::from_raw(30), FpsTarget::Limited(30));
    }

    #[test]
    fn test_window_defaults() {
        let config = WindowConfig::default();
        assert_eq!(config.hdpi_mode, HdpiMode::Logical);
        assert!(FpsTarget::from_raw(config.hidden_fps).is_paused());
        assert!(config.continuous_rendering);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ApplicationConfig::from_toml_str(
            r#"
            [window]
            title = "Editor"
            background_fps = 10
            hdpi_mode = "Pixels"
            "#,
        )
        .unwrap();

        assert_eq!(config.window.title, "Editor");
        assert_eq!(config.window.background_fps, 10);
        assert_eq!(config.window.hdpi_mode, HdpiMode::Pixels);
        assert_eq!(config.window.foreground_fps, 60);
        assert!(!config.error_on_runnable_panic);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "error_on_runnable_panic = true\n[window]\nwidth = 1024").unwrap();

        let config = ApplicationConfig::load(file.path()).unwrap();
        assert!(config.error_on_runnable_panic);
        assert_eq!(config.window.width, 1024);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ApplicationConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = ApplicationConfig::from_toml_str("[window]\nwidth = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
