use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

use serde::{Deserialize, Serialize};

use crate::photo::PhotoRecord;

/// Scroll direction of the wall.
///
/// `Up`/`Down` lay lanes out as columns (main axis Y), `Left`/`Right`
/// as rows (main axis X).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Up
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(format!("invalid direction \"{}\"", other)),
        }
    }
}

impl Direction {
    /// Parse a direction string, falling back to `Up` with a warning on
    /// unrecognized input. Invalid directions are a soft error.
    pub fn parse_lossy(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|_| {
            tracing::warn!("Invalid direction \"{}\". Using \"up\".", s);
            Direction::Up
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Lanes are rows scrolling along X
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Scroll offset decreases instead of growing
    #[inline]
    pub fn is_reversed(self) -> bool {
        matches!(self, Direction::Down | Direction::Right)
    }

    /// Signed unit step applied to the main-axis offset each frame
    #[inline]
    pub fn unit_step(self) -> f64 {
        if self.is_reversed() {
            -1.0
        } else {
            1.0
        }
    }
}

// Accept any string, coercing unknown values to Up (soft failure)
impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Direction::parse_lossy(&s))
    }
}

/// Container width: track the host surface or a fixed pixel size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallWidth {
    Auto,
    Px(u32),
}

// Serialized as the string "auto" or a bare integer
impl Serialize for WallWidth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            WallWidth::Auto => serializer.serialize_str("auto"),
            WallWidth::Px(px) => serializer.serialize_u32(*px),
        }
    }
}

impl Default for WallWidth {
    fn default() -> Self {
        WallWidth::Auto
    }
}

// Accept either the string "auto" or an integer pixel size
impl<'de> Deserialize<'de> for WallWidth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct WallWidthVisitor;

        impl<'de> Visitor<'de> for WallWidthVisitor {
            type Value = WallWidth;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("\"auto\" or an integer pixel width")
            }

            fn visit_str<E>(self, value: &str) -> Result<WallWidth, E>
            where
                E: de::Error,
            {
                if value == "auto" {
                    Ok(WallWidth::Auto)
                } else {
                    Err(E::custom(format!("invalid width \"{}\"", value)))
                }
            }

            fn visit_u64<E>(self, value: u64) -> Result<WallWidth, E>
            where
                E: de::Error,
            {
                Ok(WallWidth::Px(value as u32))
            }

            fn visit_i64<E>(self, value: i64) -> Result<WallWidth, E>
            where
                E: de::Error,
            {
                if value < 0 {
                    Err(E::custom("width must be non-negative"))
                } else {
                    Ok(WallWidth::Px(value as u32))
                }
            }
        }

        deserializer.deserialize_any(WallWidthVisitor)
    }
}

/// Fully-resolved wall configuration.
///
/// Defaults mirror the classic photo-columns gallery; every field can be
/// overridden per bind via [`WallOptions`] or process-wide via
/// [`set_defaults`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallConfig {
    /// Wall background color (hex)
    #[serde(default = "default_bgcolor")]
    pub bgcolor: String,
    /// Container width
    #[serde(default)]
    pub width: WallWidth,
    /// Lane cross-size in vertical mode
    #[serde(default = "default_cols_width")]
    pub cols_width: u32,
    /// Item main-size in vertical mode, lane cross-size in horizontal mode
    #[serde(default = "default_item_height")]
    pub item_height: u32,
    /// Container height
    #[serde(default = "default_height")]
    pub height: u32,
    /// Gap between items
    #[serde(default = "default_gap")]
    pub gap: u32,
    /// Title font size
    #[serde(default = "default_title_size")]
    pub title_size: u32,
    /// Subtitle font size
    #[serde(default = "default_subtitle_size")]
    pub subtitle_size: u32,
    /// Resting overlay opacity
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Overlay color (hex)
    #[serde(default = "default_bgcolor")]
    pub overlay_color: String,
    /// Freeze the hovered lane while the rest keeps scrolling
    #[serde(default = "default_true")]
    pub stop_on_hover: bool,
    /// Title offset inside the hover mask
    #[serde(default = "default_title_top")]
    pub title_top: u32,
    /// Subtitle offset inside the hover mask
    #[serde(default = "default_subtitle_top")]
    pub subtitle_top: u32,
    /// Hover mask height
    #[serde(default = "default_mask_height")]
    pub mask_height: u32,
    /// Base displacement per logical frame
    #[serde(default = "default_animation_speed")]
    pub animation_speed: f64,
    /// Resize-to-refresh debounce delay in milliseconds
    #[serde(default = "default_debounce_delay")]
    pub debounce_delay_ms: u64,
    /// Scroll direction
    #[serde(default)]
    pub direction: Direction,
    /// Give each lane its own speed multiplier
    #[serde(default)]
    pub variable_speed: bool,
    /// Multiplier range when `variable_speed` is on
    /// (0.5 = 50% to 150% of base speed)
    #[serde(default = "default_speed_variation")]
    pub speed_variation: f64,
    /// Pause the whole wall while the pointer is inside it
    #[serde(default)]
    pub pause_all_on_hover: bool,
    /// Defer image assignment until an item nears the viewport
    #[serde(default)]
    pub lazy_load: bool,
    /// Margin around the viewport that triggers lazy loading
    #[serde(default = "default_lazy_load_threshold")]
    pub lazy_load_threshold: u32,
    /// Background color while an image is pending
    #[serde(default = "default_placeholder_color")]
    pub placeholder_color: String,
    /// Photo list
    #[serde(default)]
    pub data: Vec<PhotoRecord>,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            bgcolor: default_bgcolor(),
            width: WallWidth::default(),
            cols_width: default_cols_width(),
            item_height: default_item_height(),
            height: default_height(),
            gap: default_gap(),
            title_size: default_title_size(),
            subtitle_size: default_subtitle_size(),
            opacity: default_opacity(),
            overlay_color: default_bgcolor(),
            stop_on_hover: default_true(),
            title_top: default_title_top(),
            subtitle_top: default_subtitle_top(),
            mask_height: default_mask_height(),
            animation_speed: default_animation_speed(),
            debounce_delay_ms: default_debounce_delay(),
            direction: Direction::default(),
            variable_speed: false,
            speed_variation: default_speed_variation(),
            pause_all_on_hover: false,
            lazy_load: false,
            lazy_load_threshold: default_lazy_load_threshold(),
            placeholder_color: default_placeholder_color(),
            data: Vec::new(),
        }
    }
}

fn default_bgcolor() -> String {
    "#000".to_string()
}

fn default_cols_width() -> u32 {
    200
}

fn default_item_height() -> u32 {
    300
}

fn default_height() -> u32 {
    600
}

fn default_gap() -> u32 {
    5
}

fn default_title_size() -> u32 {
    16
}

fn default_subtitle_size() -> u32 {
    14
}

fn default_opacity() -> f64 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_title_top() -> u32 {
    56
}

fn default_subtitle_top() -> u32 {
    80
}

fn default_mask_height() -> u32 {
    120
}

fn default_animation_speed() -> f64 {
    1.0
}

fn default_debounce_delay() -> u64 {
    150
}

fn default_speed_variation() -> f64 {
    0.5
}

fn default_lazy_load_threshold() -> u32 {
    100
}

fn default_placeholder_color() -> String {
    "#333".to_string()
}

impl WallConfig {
    /// Load configuration from file or return current defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(defaults())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/photowall/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("photowall")
            .join("config.toml")
    }
}

/// Partial options merged over the defaults snapshot at bind time.
///
/// Every unset field falls back to the process-wide defaults; `direction`
/// is accepted as a string so invalid values can degrade to `up`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WallOptions {
    pub bgcolor: Option<String>,
    pub width: Option<WallWidth>,
    pub cols_width: Option<u32>,
    pub item_height: Option<u32>,
    pub height: Option<u32>,
    pub gap: Option<u32>,
    pub title_size: Option<u32>,
    pub subtitle_size: Option<u32>,
    pub opacity: Option<f64>,
    pub overlay_color: Option<String>,
    pub stop_on_hover: Option<bool>,
    pub title_top: Option<u32>,
    pub subtitle_top: Option<u32>,
    pub mask_height: Option<u32>,
    pub animation_speed: Option<f64>,
    pub debounce_delay_ms: Option<u64>,
    pub direction: Option<String>,
    pub variable_speed: Option<bool>,
    pub speed_variation: Option<f64>,
    pub pause_all_on_hover: Option<bool>,
    pub lazy_load: Option<bool>,
    pub lazy_load_threshold: Option<u32>,
    pub placeholder_color: Option<String>,
    pub data: Option<Vec<PhotoRecord>>,
}

impl WallOptions {
    /// Merge these options over a snapshot of the process-wide defaults.
    ///
    /// The snapshot is taken at call time: later `set_defaults` calls do
    /// not retroactively alter configurations already resolved.
    pub fn resolve(self) -> WallConfig {
        let mut config = defaults();

        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = self.$field {
                    config.$field = v;
                })*
            };
        }

        merge!(
            bgcolor,
            width,
            cols_width,
            item_height,
            height,
            gap,
            title_size,
            subtitle_size,
            opacity,
            overlay_color,
            stop_on_hover,
            title_top,
            subtitle_top,
            mask_height,
            animation_speed,
            debounce_delay_ms,
            variable_speed,
            speed_variation,
            pause_all_on_hover,
            lazy_load,
            lazy_load_threshold,
            placeholder_color,
            data,
        );

        if let Some(dir) = self.direction {
            config.direction = Direction::parse_lossy(&dir);
        }

        config
    }
}

fn defaults_cell() -> &'static Mutex<WallConfig> {
    static CELL: OnceLock<Mutex<WallConfig>> = OnceLock::new();
    CELL.get_or_init(|| Mutex::new(WallConfig::default()))
}

/// Snapshot of the process-wide default configuration
pub fn defaults() -> WallConfig {
    defaults_cell()
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Replace the process-wide default configuration.
///
/// Only binds that happen after this call observe the new values.
pub fn set_defaults(config: WallConfig) {
    *defaults_cell().lock().unwrap_or_else(|e| e.into_inner()) = config;
}

/// Update the process-wide defaults in place
pub fn update_defaults<F: FnOnce(&mut WallConfig)>(f: F) {
    let mut guard = defaults_cell().lock().unwrap_or_else(|e| e.into_inner());
    f(&mut guard);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WallConfig::default();
        assert_eq!(config.cols_width, 200);
        assert_eq!(config.item_height, 300);
        assert_eq!(config.height, 600);
        assert_eq!(config.gap, 5);
        assert_eq!(config.direction, Direction::Up);
        assert!(config.stop_on_hover);
        assert!(!config.variable_speed);
        assert!(config.data.is_empty());
    }

    #[test]
    fn test_direction_parse_lossy() {
        assert_eq!(Direction::parse_lossy("down"), Direction::Down);
        assert_eq!(Direction::parse_lossy("sideways"), Direction::Up);
    }

    #[test]
    fn test_direction_axes() {
        assert!(Direction::Left.is_horizontal());
        assert!(Direction::Right.is_horizontal());
        assert!(!Direction::Up.is_horizontal());
        assert!(Direction::Down.is_reversed());
        assert!(Direction::Right.is_reversed());
        assert_eq!(Direction::Up.unit_step(), 1.0);
        assert_eq!(Direction::Right.unit_step(), -1.0);
    }

    #[test]
    fn test_wall_width_deserialize() {
        #[derive(Deserialize)]
        struct W {
            width: WallWidth,
        }
        let auto: W = serde_json::from_str(r#"{"width":"auto"}"#).unwrap();
        assert_eq!(auto.width, WallWidth::Auto);
        let px: W = serde_json::from_str(r#"{"width":640}"#).unwrap();
        assert_eq!(px.width, WallWidth::Px(640));
    }

    #[test]
    fn test_options_merge_over_defaults() {
        let options = WallOptions {
            item_height: Some(100),
            direction: Some("right".to_string()),
            ..Default::default()
        };
        let config = options.resolve();
        assert_eq!(config.item_height, 100);
        assert_eq!(config.direction, Direction::Right);
        // untouched fields keep their defaults
        assert_eq!(config.cols_width, 200);
    }

    #[test]
    fn test_defaults_snapshot_at_resolve() {
        update_defaults(|d| d.bgcolor = "#111".to_string());
        let config = WallOptions::default().resolve();
        assert_eq!(config.bgcolor, "#111");

        // later default changes do not alter an already-resolved config
        update_defaults(|d| d.bgcolor = default_bgcolor());
        assert_eq!(config.bgcolor, "#111");
    }

    #[test]
    fn test_invalid_direction_coerced() {
        let options = WallOptions {
            direction: Some("diagonal".to_string()),
            ..Default::default()
        };
        assert_eq!(options.resolve().direction, Direction::Up);
    }
}
