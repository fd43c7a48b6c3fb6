use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use xivmap::{MapOptions, MapRenderer, Orientation, Point, TextStyle};

/// How positions in a layout file are expressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// In-game map coordinates, converted with the map's size factor.
    #[default]
    Coord,
    /// Canvas pixels, used as-is.
    Pixel,
}

#[derive(Debug, Deserialize)]
pub struct Icon {
    pub path: PathBuf,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct Label {
    pub text: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub style: TextStyle,
}

/// One thing drawn over the background.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry {
    Icon(Icon),
    Label(Label),
}

/// Everything drawn on top of a background map. Entries are drawn in file
/// order, so later entries cover earlier ones.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub options: Option<MapOptions>,
    pub units: Units,
    pub entries: Vec<Entry>,
}

impl Layout {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read layout {}", path.display()))?;
        let mut layout: Layout = serde_json::from_str(&contents)
            .with_context(|| format!("unable to parse layout {}", path.display()))?;
        if let Some(base) = path.parent() {
            for entry in &mut layout.entries {
                if let Entry::Icon(icon) = entry {
                    if icon.path.is_relative() {
                        icon.path = base.join(&icon.path);
                    }
                }
            }
        }
        Ok(layout)
    }

    fn position(&self, map: &MapRenderer, x: f64, y: f64) -> Point {
        let point = Point::new(x, y);
        match self.units {
            Units::Coord => map.coord_to_pixel(point),
            Units::Pixel => point,
        }
    }

    pub async fn render(&self, map: &mut MapRenderer) -> Result<()> {
        map.draw().await?;
        let (mut icons, mut labels) = (0, 0);
        for entry in &self.entries {
            match entry {
                Entry::Icon(icon) => {
                    let position = self.position(map, icon.x, icon.y);
                    map.draw_icon(&icon.path, position).await?;
                    icons += 1;
                }
                Entry::Label(label) => {
                    let position = self.position(map, label.x, label.y);
                    map.draw_text(&label.text, position, label.orientation, &label.style)
                        .await?;
                    labels += 1;
                }
            }
        }
        log::info!("drew {icons} icons and {labels} labels");
        Ok(())
    }
}
