//! Point-of-interest overlays for 2048×2048 game maps.
//!
//! A [`MapRenderer`] owns a fixed-size RGBA surface. Callers draw the
//! background once, then any number of icons and labels, and finally write
//! the surface out as a PNG:
//!
//! ```no_run
//! # async fn run() -> Result<(), xivmap::MapError> {
//! use xivmap::{MapOptions, MapRenderer, Orientation, Point, TextStyle};
//!
//! let mut map = MapRenderer::new("map.png", MapOptions::default())?;
//! let aetheryte = map.coord_to_pixel(Point::new(11.3, 10.4));
//! map.draw()
//!     .await?
//!     .draw_icon("aetheryte.png", aetheryte)
//!     .await?
//!     .draw_text("Aetheryte Plaza", aetheryte, Orientation::Down, &TextStyle::default())
//!     .await?;
//! map.write("out.png").await?;
//! # Ok(())
//! # }
//! ```

use std::{fmt, path::PathBuf};

pub mod options;
pub mod renderer;
pub mod text;
pub mod transform;

pub use options::{Color, MapOptions, TextStyle};
pub use renderer::MapRenderer;
pub use text::{Orientation, TextMetrics};
pub use transform::{coord_to_pixel, pixel_to_coord, Axes, Point, CANVAS_SIZE};

/// Which required path argument was left empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    Background,
    Icon,
    Output,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PathKind::Background => "map image",
            PathKind::Icon => "icon image",
            PathKind::Output => "output image",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("no file path specified for {0}")]
    MissingPath(PathKind),

    #[error("unable to load image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("nothing to write, call draw() at least once")]
    NotDrawn,

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("unable to parse embedded font {0}")]
    Font(&'static str),

    #[error("unable to encode png: {0}")]
    Encode(#[source] image::ImageError),

    #[error("image task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
