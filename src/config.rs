/*
 * Simulation Config Module
 *
 * This module defines the SimulationConfig struct holding every tunable
 * parameter of the flocking core, plus the camera and color settings used by
 * the viewer. Values come from compiled defaults, an optional JSON file and
 * `name=value` command-line overrides, in that order. The config is validated
 * once and is never mutated while a simulation runs: the grid cell size is
 * derived from the visual distance when the grid is built.
 */

use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::grid::UniformGrid;
use crate::MAX_FRAME_MS;

// Camera behavior for the viewer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    pub zoom_factor: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 1.1,
            min_zoom: 0.1,
            max_zoom: 1.0,
        }
    }
}

// Colors as 0xRRGGBB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Palette {
    pub world_color: u32,
    pub background_color: u32,
    pub birb_color: u32,
    pub grid_color: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            world_color: 0x000000,
            background_color: 0x222222,
            birb_color: 0xffffff,
            grid_color: 0xffffff,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub world_width: f32,
    pub world_height: f32,
    pub birb_count: usize,
    // Units per millisecond
    pub birb_speed: f32,
    // Radians per millisecond
    pub turn_speed: f32,
    pub visual_distance: f32,
    pub min_distance: f32,
    pub alignment_factor: f32,
    pub cohesion_factor: f32,
    pub separation_factor: f32,
    // Falls back to the visual distance when unset
    pub cell_size: Option<f32>,
    pub seed: Option<u64>,
    pub camera: CameraConfig,
    pub palette: Palette,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world_width: 10240.0,
            world_height: 10240.0,
            birb_count: 1000,
            birb_speed: 4.0,
            turn_speed: 0.05,
            visual_distance: 128.0,
            min_distance: 64.0,
            alignment_factor: 0.5,
            cohesion_factor: 0.1,
            separation_factor: 0.2,
            cell_size: None,
            seed: None,
            camera: CameraConfig::default(),
            palette: Palette::default(),
        }
    }
}

impl SimulationConfig {
    // Read a JSON config file; missing keys keep their defaults
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    // Build a validated config from `name=value` arguments. A `config=<path>`
    // argument loads that file first; the remaining pairs override it in order.
    pub fn from_args<I, S>(args: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pairs = Vec::new();
        for arg in args {
            let arg = arg.as_ref();
            match arg.trim_start_matches('-').split_once('=') {
                Some((name, value)) => pairs.push((name.to_string(), value.to_string())),
                None => warn!("ignoring argument {arg:?}, expected name=value"),
            }
        }

        let mut config = match pairs.iter().find(|(name, _)| name == "config") {
            Some((_, path)) => Self::load(path)?,
            None => Self::default(),
        };

        for (name, value) in pairs.iter().filter(|(name, _)| name != "config") {
            config.apply_override(name, value);
        }

        config.validate()?;
        Ok(config)
    }

    // Apply one override by its camelCase name. Unparseable values keep the
    // current setting. Returns whether the value was taken.
    pub fn apply_override(&mut self, name: &str, value: &str) -> bool {
        let applied = match name {
            "worldWidth" => parse_int_into(value, &mut self.world_width),
            "worldHeight" => parse_int_into(value, &mut self.world_height),
            "birbCount" => parse_int_into(value, &mut self.birb_count),
            "birbSpeed" => parse_into(value, &mut self.birb_speed),
            "turnSpeed" => parse_into(value, &mut self.turn_speed),
            "visualDistance" => parse_int_into(value, &mut self.visual_distance),
            "minDistance" => parse_int_into(value, &mut self.min_distance),
            "alignmentFactor" => parse_into(value, &mut self.alignment_factor),
            "cohesionFactor" => parse_into(value, &mut self.cohesion_factor),
            "separationFactor" => parse_into(value, &mut self.separation_factor),
            "cellSize" => parse_option_into(value, &mut self.cell_size),
            "seed" => parse_option_into(leading_integer(value), &mut self.seed),
            "zoomFactor" => parse_into(value, &mut self.camera.zoom_factor),
            "minZoom" => parse_into(value, &mut self.camera.min_zoom),
            "maxZoom" => parse_into(value, &mut self.camera.max_zoom),
            _ => {
                warn!("ignoring unknown option {name:?}");
                return false;
            }
        };

        if !applied {
            warn!("ignoring {name}={value:?}, keeping the previous value");
        }
        applied
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let (width, height) = (self.world_width, self.world_height);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidWorld { width, height });
        }
        if self.birb_count == 0 {
            return Err(ConfigError::EmptyPopulation);
        }

        let visual = self.visual_distance;
        if !(visual.is_finite() && visual > 0.0) {
            return Err(ConfigError::InvalidVisualDistance(visual));
        }
        let min = self.min_distance;
        if !(min.is_finite() && min >= 0.0 && min < visual) {
            return Err(ConfigError::InvalidMinDistance { min, visual });
        }
        if let Some(cell) = self.cell_size {
            if !(cell.is_finite() && cell > 0.0 && cell >= visual) {
                return Err(ConfigError::InvalidCellSize { cell, visual });
            }
        }

        for (name, value) in [("birbSpeed", self.birb_speed), ("turnSpeed", self.turn_speed)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }

        // Wrapping is a single add or subtract, so no tick may cross a whole world side
        let distance = self.birb_speed * MAX_FRAME_MS;
        let extent = width.min(height);
        if distance >= extent {
            return Err(ConfigError::SpeedExceedsWorld {
                distance,
                frame_ms: MAX_FRAME_MS,
                extent,
            });
        }

        for (name, value) in [
            ("alignmentFactor", self.alignment_factor),
            ("cohesionFactor", self.cohesion_factor),
            ("separationFactor", self.separation_factor),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteFactor { name, value });
            }
        }

        UniformGrid::dimensions(self.cell_size(), width, height)?;
        Ok(())
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size.unwrap_or(self.visual_distance)
    }

    #[inline]
    pub fn visual_distance_sq(&self) -> f32 {
        self.visual_distance * self.visual_distance
    }

    #[inline]
    pub fn min_distance_sq(&self) -> f32 {
        self.min_distance * self.min_distance
    }
}

fn parse_into<T: FromStr>(value: &str, slot: &mut T) -> bool {
    match value.trim().parse() {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(_) => false,
    }
}

// Integer options read only the leading digits, so "100.5" is taken as 100
fn parse_int_into<T: FromStr>(value: &str, slot: &mut T) -> bool {
    parse_into(leading_integer(value), slot)
}

// Optional sign followed by as many digits as lead the value
fn leading_integer(value: &str) -> &str {
    let value = value.trim();
    let sign = usize::from(value.starts_with(['+', '-']));
    let digits = value[sign..].bytes().take_while(u8::is_ascii_digit).count();
    &value[..sign + digits]
}

fn parse_option_into<T: FromStr>(value: &str, slot: &mut Option<T>) -> bool {
    match value.trim().parse() {
        Ok(parsed) => {
            *slot = Some(parsed);
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cell_size(), config.visual_distance);
    }

    #[test]
    fn overrides_apply_in_order() {
        let config = SimulationConfig::from_args(["birbCount=50", "--birbSpeed=0.5", "birbCount=60"])
            .expect("valid overrides");
        assert_eq!(config.birb_count, 60);
        assert_eq!(config.birb_speed, 0.5);
    }

    #[test]
    fn bad_values_keep_previous_setting() {
        let mut config = SimulationConfig::default();
        assert!(!config.apply_override("visualDistance", "far"));
        assert!(!config.apply_override("worldWidth", ".5"));
        assert!(!config.apply_override("birbCount", "-3"));
        assert!(!config.apply_override("noSuchOption", "1"));
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn integer_options_take_leading_digits() {
        let mut config = SimulationConfig::default();
        assert!(config.apply_override("minDistance", "32"));
        assert_eq!(config.min_distance, 32.0);
        assert!(config.apply_override("worldWidth", "100.5"));
        assert_eq!(config.world_width, 100.0);
        assert!(config.apply_override("birbCount", " 250birbs"));
        assert_eq!(config.birb_count, 250);
        assert!(config.apply_override("seed", "7.9"));
        assert_eq!(config.seed, Some(7));
        assert!(config.apply_override("visualDistance", "+96"));
        assert_eq!(config.visual_distance, 96.0);

        // Float options still read the whole value
        assert!(config.apply_override("birbSpeed", "0.25"));
        assert_eq!(config.birb_speed, 0.25);
    }

    #[test]
    fn leading_integer_stops_at_first_non_digit() {
        assert_eq!(leading_integer("100.5"), "100");
        assert_eq!(leading_integer("-12px"), "-12");
        assert_eq!(leading_integer("1e3"), "1");
        assert_eq!(leading_integer("abc"), "");
        assert_eq!(leading_integer("-"), "-");
    }

    #[test]
    fn rejects_speed_that_crosses_the_world_in_one_frame() {
        // Default speed covers 400 units in a capped 100 ms frame
        let config = SimulationConfig {
            world_width: 100.0,
            world_height: 100.0,
            visual_distance: 30.0,
            min_distance: 10.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SpeedExceedsWorld { extent, .. }) if extent == 100.0
        ));

        // The shorter side decides
        let config = SimulationConfig {
            world_width: 10240.0,
            world_height: 400.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::SpeedExceedsWorld { .. })));

        let config = SimulationConfig {
            world_height: 401.0,
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_grids_too_large_to_allocate() {
        let config = SimulationConfig {
            world_width: 4_000_000.0,
            world_height: 4_000_000.0,
            visual_distance: 1.0,
            min_distance: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::GridTooLarge { .. })));

        let result = SimulationConfig::from_args(["worldWidth=4000000", "worldHeight=4000000", "visualDistance=1", "minDistance=0"]);
        assert!(matches!(result, Err(ConfigError::GridTooLarge { .. })));
    }

    #[test]
    fn rejects_degenerate_configurations() {
        let config = SimulationConfig { world_width: 0.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWorld { .. })));

        let config = SimulationConfig { birb_count: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyPopulation)));

        let config = SimulationConfig { visual_distance: 0.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidVisualDistance(_))));

        let config = SimulationConfig { min_distance: 200.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMinDistance { .. })));

        let config = SimulationConfig { cell_size: Some(64.0), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCellSize { .. })));

        let config = SimulationConfig { turn_speed: -1.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRate { name: "turnSpeed", .. })));

        let config = SimulationConfig { cohesion_factor: f32::NAN, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::NonFiniteFactor { .. })));
    }

    #[test]
    fn from_args_validates() {
        let result = SimulationConfig::from_args(["birbCount=0"]);
        assert!(matches!(result, Err(ConfigError::EmptyPopulation)));
    }

    #[test]
    fn json_uses_camel_case_and_partial_files() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{ "birbCount": 12, "camera": { "maxZoom": 3.0 } }"#)
                .expect("parse");
        assert_eq!(config.birb_count, 12);
        assert_eq!(config.camera.max_zoom, 3.0);
        assert_eq!(config.camera.zoom_factor, 1.1);
        assert_eq!(config.visual_distance, 128.0);
    }

    #[test]
    fn missing_file_is_reported() {
        let result = SimulationConfig::load("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
