use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sample_sets::is_valid_color;

/// Card styling passed through to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardStyle {
    pub background: String,
    pub header_background: String,
    pub header_color: String,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            background: "#15E3AC".into(),
            header_background: "#15E3AC".into(),
            header_color: "#15E3AC".into(),
        }
    }
}

/// Default size and symbols of tree drawings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeDefaults {
    pub width: u32,
    pub height: u32,
    pub symbol_size: f64,
}

impl Default for TreeDefaults {
    fn default() -> Self {
        Self {
            width: 750,
            height: 520,
            symbol_size: 8.0,
        }
    }
}

/// Plot styling and view defaults.
///
/// One value is built at startup and handed to every view constructor.
/// Missing keys in a TOML file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub plot_width: u32,
    pub plot_height: u32,
    /// Max number of points to overlay on a plot.
    pub threshold: usize,
    pub plot_colours: Vec<String>,
    /// Colors handed out to sample sets created at load time.
    pub sample_set_colours: Vec<String>,
    pub colormap: String,
    pub default_palette: String,
    pub default_window_size: u64,
    pub card_style: CardStyle,
    pub tree: TreeDefaults,
    /// Categorical palettes for multiway sample set pairs, by name.
    pub categorical_palettes: BTreeMap<String, Vec<String>>,
}

fn palette(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|c| c.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        let mut categorical_palettes = BTreeMap::new();
        categorical_palettes.insert(
            "glasbey_dark".to_owned(),
            palette(&[
                "#d60000", "#018700", "#b500ff", "#05acc6", "#97ff00", "#ffa52f",
                "#ff8ec8", "#79525e", "#00fdcf", "#afa5ff", "#93ac83", "#9a6900",
            ]),
        );
        categorical_palettes.insert(
            "glasbey_light".to_owned(),
            palette(&[
                "#d7ffbd", "#ffc6ff", "#bcfffd", "#fff3b0", "#ffcdd0", "#d2d5ff",
                "#ffe1a4", "#b9ffd5", "#e8ffff", "#fff1e9", "#dfdaaa", "#c5edff",
            ]),
        );
        Self {
            plot_width: 1000,
            plot_height: 600,
            threshold: 1000,
            plot_colours: palette(&["#15E3AC", "#0FA57E", "#0D5160"]),
            sample_set_colours: palette(&[
                "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
                "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
            ]),
            colormap: "viridis".into(),
            default_palette: "glasbey_dark".into(),
            default_window_size: 10000,
            card_style: CardStyle::default(),
            tree: TreeDefaults::default(),
            categorical_palettes,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidParameter(msg));
        if self.plot_width == 0 || self.plot_height == 0 {
            return invalid("plot dimensions must be positive".into());
        }
        if self.default_window_size == 0 {
            return invalid("default window size must be positive".into());
        }
        if self.sample_set_colours.is_empty() {
            return invalid("sample_set_colours is empty".into());
        }
        if self.tree.width == 0 || self.tree.height == 0 || self.tree.symbol_size < 0.0 {
            return invalid("tree defaults out of range".into());
        }
        match self.categorical_palettes.get(&self.default_palette) {
            Some(colors) if !colors.is_empty() => {}
            _ => return invalid(format!("unknown palette {:?}", self.default_palette)),
        }
        let colors = self
            .plot_colours
            .iter()
            .chain(&self.sample_set_colours)
            .chain(self.categorical_palettes.values().flatten());
        for color in colors {
            if !is_valid_color(color) {
                return invalid(format!("{:?} is not a color", color));
            }
        }
        Ok(())
    }

    /// Color for the `n`th sample set, cycling through the palette.
    /// An empty palette gives `"black"`.
    pub fn sample_set_colour(&self, n: usize) -> &str {
        match self.sample_set_colours.len() {
            0 => "black",
            len => &self.sample_set_colours[n % len],
        }
    }

    pub fn palette(&self, name: &str) -> Option<&[String]> {
        self.categorical_palettes.get(name).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() -> Result<()> {
        Config::default().validate()
    }

    #[test]
    fn test_partial_toml_keeps_defaults() -> Result<()> {
        let config = Config::from_toml_str(
            "plot_width = 800\ndefault_window_size = 5000\n[tree]\nheight = 300\n",
        )?;
        assert_eq!(config.plot_width, 800);
        assert_eq!(config.plot_height, 600);
        assert_eq!(config.default_window_size, 5000);
        assert_eq!(config.tree.height, 300);
        assert_eq!(config.tree.width, 750);
        Ok(())
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_toml_str("default_window_size = 0").is_err());
        assert!(Config::from_toml_str("default_palette = \"nope\"").is_err());
        assert!(Config::from_toml_str("sample_set_colours = [\"#zzz\"]").is_err());
        assert!(matches!(
            Config::from_toml_str("plot_width = \"wide\""),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_round_trips_through_toml() -> Result<()> {
        let config = Config::default();
        assert_eq!(Config::from_toml_str(&config.to_toml_string()?)?, config);
        Ok(())
    }

    #[test]
    fn test_sample_set_colours_cycle() {
        let config = Config::default();
        let n = config.sample_set_colours.len();
        assert_eq!(config.sample_set_colour(n + 1), config.sample_set_colour(1));

        let empty = Config {
            sample_set_colours: vec![],
            ..Config::default()
        };
        assert_eq!(empty.sample_set_colour(3), "black");
        assert!(empty.validate().is_err());
    }
}
