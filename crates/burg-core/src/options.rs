//! Generator options and configuration loading
//!
//! Options can come from JSON or from an rc-style text file:
//!
//! ```text
//! # comment
//! OPTIONS=city_width:120,city_height:80,!river
//! OPTIONS=park_count:3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Every tunable of the city generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenOptions {
    // City
    pub city_width: i32,
    pub city_height: i32,
    pub district_min: i32,
    pub district_max: i32,

    // Streets: width range of splits at depth <= street_wide_depth, and deeper
    pub street_wide_min: i32,
    pub street_wide_max: i32,
    pub street_narrow_min: i32,
    pub street_narrow_max: i32,
    pub street_wide_depth: u32,

    // Lots
    pub lot_poor_min: i32,
    pub lot_poor_max: i32,
    pub lot_good_min: i32,
    pub lot_good_max: i32,
    pub grounds_margin_good: i32,
    pub grounds_margin_lux: i32,

    // Buildings
    pub room_min: i32,
    pub room_max: i32,
    pub block_min: i32,
    pub block_max: i32,

    // Special districts and decoration
    pub park_count: u32,
    pub square_count: u32,
    pub graveyard: bool,
    pub river: bool,
    pub tree_chance: u32,
    pub cellars: bool,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            city_width: CITY_WIDTH,
            city_height: CITY_HEIGHT,
            district_min: DISTRICT_MIN,
            district_max: DISTRICT_MAX,

            street_wide_min: 4,
            street_wide_max: 5,
            street_narrow_min: 2,
            street_narrow_max: 3,
            street_wide_depth: 2,

            lot_poor_min: 8,
            lot_poor_max: 16,
            lot_good_min: 14,
            lot_good_max: 24,
            grounds_margin_good: 2,
            grounds_margin_lux: 3,

            room_min: ROOM_MIN,
            room_max: ROOM_MAX,
            block_min: BLOCK_MIN,
            block_max: BLOCK_MAX,

            park_count: 2,
            square_count: 1,
            graveyard: true,
            river: false,
            tree_chance: 8,
            cellars: true,
        }
    }
}

impl GenOptions {
    /// Load options from a JSON file
    pub fn load_json(path: &Path) -> Result<Self, OptionsError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| OptionsError::Io(e.to_string()))?;
        let options: Self =
            serde_json::from_str(&contents).map_err(|e| OptionsError::Parse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from an rc-style file
    pub fn load_rc(path: &Path) -> Result<Self, OptionsError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| OptionsError::Io(e.to_string()))?;
        Self::parse_config(&contents)
    }

    /// Parse rc-style text on top of the defaults
    pub fn parse_config(contents: &str) -> Result<Self, OptionsError> {
        let mut options = Self::default();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(opts) = line.strip_prefix("OPTIONS=") else {
                return Err(OptionsError::Parse(line.to_string()));
            };
            for opt in opts.split(',') {
                let opt = opt.trim();
                if !opt.is_empty() {
                    options.parse_option(opt)?;
                }
            }
        }

        options.validate()?;
        Ok(options)
    }

    fn parse_option(&mut self, opt: &str) -> Result<(), OptionsError> {
        if let Some((key, value)) = opt.split_once(':').or_else(|| opt.split_once('=')) {
            return self.set_option(key.trim(), value.trim());
        }
        match opt.strip_prefix('!') {
            Some(name) => self.set_bool_option(name, false),
            None => self.set_bool_option(opt, true),
        }
    }

    fn set_bool_option(&mut self, name: &str, value: bool) -> Result<(), OptionsError> {
        match name {
            "graveyard" => self.graveyard = value,
            "river" => self.river = value,
            "cellars" => self.cellars = value,
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionsError> {
        let invalid = || OptionsError::InvalidValue(name.to_string(), value.to_string());
        let int = || value.parse::<i32>().map_err(|_| invalid());
        let uint = || value.parse::<u32>().map_err(|_| invalid());
        let flag = || match value {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(invalid()),
        };

        match name {
            "city_width" => self.city_width = int()?,
            "city_height" => self.city_height = int()?,
            "district_min" => self.district_min = int()?,
            "district_max" => self.district_max = int()?,
            "street_wide_min" => self.street_wide_min = int()?,
            "street_wide_max" => self.street_wide_max = int()?,
            "street_narrow_min" => self.street_narrow_min = int()?,
            "street_narrow_max" => self.street_narrow_max = int()?,
            "street_wide_depth" => self.street_wide_depth = uint()?,
            "lot_poor_min" => self.lot_poor_min = int()?,
            "lot_poor_max" => self.lot_poor_max = int()?,
            "lot_good_min" => self.lot_good_min = int()?,
            "lot_good_max" => self.lot_good_max = int()?,
            "grounds_margin_good" => self.grounds_margin_good = int()?,
            "grounds_margin_lux" => self.grounds_margin_lux = int()?,
            "room_min" => self.room_min = int()?,
            "room_max" => self.room_max = int()?,
            "block_min" => self.block_min = int()?,
            "block_max" => self.block_max = int()?,
            "park_count" => self.park_count = uint()?,
            "square_count" => self.square_count = uint()?,
            "tree_chance" => self.tree_chance = uint()?,
            "graveyard" => self.graveyard = flag()?,
            "river" => self.river = flag()?,
            "cellars" => self.cellars = flag()?,
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    /// Reject sizes the generators cannot work with
    pub fn validate(&self) -> Result<(), OptionsError> {
        let ranges = [
            ("district", self.district_min, self.district_max),
            ("street_wide", self.street_wide_min, self.street_wide_max),
            ("street_narrow", self.street_narrow_min, self.street_narrow_max),
            ("lot_poor", self.lot_poor_min, self.lot_poor_max),
            ("lot_good", self.lot_good_min, self.lot_good_max),
            ("room", self.room_min, self.room_max),
            ("block", self.block_min, self.block_max),
        ];
        for (name, min, max) in ranges {
            if min < 1 || max < min {
                return Err(OptionsError::InvalidValue(
                    name.to_string(),
                    format!("{min}..{max}"),
                ));
            }
        }
        if self.city_width < self.district_min || self.city_height < self.district_min {
            return Err(OptionsError::InvalidValue(
                "city_size".to_string(),
                format!("{}x{}", self.city_width, self.city_height),
            ));
        }
        if self.tree_chance > 100 {
            return Err(OptionsError::InvalidValue(
                "tree_chance".to_string(),
                self.tree_chance.to_string(),
            ));
        }
        Ok(())
    }

    /// Serialize to rc-style text that [`GenOptions::parse_config`] reads back
    pub fn to_config_string(&self) -> String {
        let mut lines = vec!["# burg generator options".to_string()];
        lines.push(format!(
            "OPTIONS=city_width:{},city_height:{},district_min:{},district_max:{}",
            self.city_width, self.city_height, self.district_min, self.district_max
        ));
        lines.push(format!(
            "OPTIONS=street_wide_min:{},street_wide_max:{},street_narrow_min:{},street_narrow_max:{},street_wide_depth:{}",
            self.street_wide_min,
            self.street_wide_max,
            self.street_narrow_min,
            self.street_narrow_max,
            self.street_wide_depth
        ));
        lines.push(format!(
            "OPTIONS=lot_poor_min:{},lot_poor_max:{},lot_good_min:{},lot_good_max:{},grounds_margin_good:{},grounds_margin_lux:{}",
            self.lot_poor_min,
            self.lot_poor_max,
            self.lot_good_min,
            self.lot_good_max,
            self.grounds_margin_good,
            self.grounds_margin_lux
        ));
        lines.push(format!(
            "OPTIONS=room_min:{},room_max:{},block_min:{},block_max:{}",
            self.room_min, self.room_max, self.block_min, self.block_max
        ));
        let flag = |on: bool, name: &str| if on { name.to_string() } else { format!("!{name}") };
        lines.push(format!(
            "OPTIONS=park_count:{},square_count:{},tree_chance:{},{},{},{}",
            self.park_count,
            self.square_count,
            self.tree_chance,
            flag(self.graveyard, "graveyard"),
            flag(self.river, "river"),
            flag(self.cellars, "cellars")
        ));
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Options loading error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    #[error("Invalid value '{1}' for option '{0}'")]
    InvalidValue(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        let opts = GenOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.room_min, 5);
        assert_eq!(opts.room_max, 10);
    }

    #[test]
    fn test_parse_values_and_flags() {
        let config = "# test\nOPTIONS=city_width:120,park_count:3\nOPTIONS=river,!cellars";
        let opts = GenOptions::parse_config(config).unwrap();
        assert_eq!(opts.city_width, 120);
        assert_eq!(opts.park_count, 3);
        assert!(opts.river);
        assert!(!opts.cellars);
    }

    #[test]
    fn test_unknown_option() {
        let err = GenOptions::parse_config("OPTIONS=colour").unwrap_err();
        assert_eq!(err, OptionsError::UnknownOption("colour".to_string()));
    }

    #[test]
    fn test_invalid_range_rejected() {
        let err = GenOptions::parse_config("OPTIONS=room_min:12").unwrap_err();
        assert!(matches!(err, OptionsError::InvalidValue(name, _) if name == "room"));
    }

    #[test]
    fn test_roundtrip() {
        let mut opts = GenOptions::default();
        opts.city_width = 90;
        opts.river = true;
        opts.graveyard = false;
        let parsed = GenOptions::parse_config(&opts.to_config_string()).unwrap();
        assert_eq!(parsed, opts);
    }

    #[test]
    fn test_json_defaults_missing_fields() {
        let opts: GenOptions = serde_json::from_str(r#"{"city_width": 80}"#).unwrap();
        assert_eq!(opts.city_width, 80);
        assert_eq!(opts.block_max, BLOCK_MAX);
    }
}
