use std::{
    fmt,
    path::{Path, PathBuf},
};

use image::{
    codecs::png::PngEncoder, imageops, imageops::FilterType, ColorType, DynamicImage,
    ImageEncoder, RgbaImage,
};
use tokio::io::AsyncWriteExt;

use crate::{
    text::{self, Fonts},
    transform, Axes, MapError, MapOptions, Orientation, PathKind, Point, TextMetrics, TextStyle,
    CANVAS_SIZE,
};

/// Edge length of an icon at icon scale 1.
pub const ICON_SIZE: f64 = 64.0;

/// Composites a background map, icons and labels onto a 2048×2048 surface.
///
/// Every draw call borrows the renderer mutably and hands the same renderer
/// back, so calls chain and can never overlap: each one finishes its decode
/// and its pixel writes before the next can start.
pub struct MapRenderer {
    background: PathBuf,
    options: MapOptions,
    surface: RgbaImage,
    fonts: Fonts,
    background_drawn: bool,
}

impl fmt::Debug for MapRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapRenderer")
            .field("background", &self.background)
            .field("options", &self.options)
            .field("background_drawn", &self.background_drawn)
            .finish_non_exhaustive()
    }
}

fn encode_png(surface: &RgbaImage) -> Result<Vec<u8>, MapError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            surface.as_raw(),
            surface.width(),
            surface.height(),
            ColorType::Rgba8,
        )
        .map_err(MapError::Encode)?;
    Ok(bytes)
}

async fn load_image(path: PathBuf) -> Result<DynamicImage, MapError> {
    tokio::task::spawn_blocking(move || {
        image::open(&path).map_err(|source| MapError::Load { path, source })
    })
    .await?
}

impl MapRenderer {
    pub fn new(background: impl Into<PathBuf>, options: MapOptions) -> Result<Self, MapError> {
        let background = background.into();
        if background.as_os_str().is_empty() {
            return Err(MapError::MissingPath(PathKind::Background));
        }
        options.validate()?;
        Ok(Self {
            background,
            options,
            surface: RgbaImage::new(CANVAS_SIZE, CANVAS_SIZE),
            fonts: Fonts::load()?,
            background_drawn: false,
        })
    }

    pub fn background(&self) -> &Path {
        &self.background
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn pixel_to_coord<T: Axes>(&self, value: T) -> T {
        transform::pixel_to_coord(value, self.options.size_factor)
    }

    pub fn coord_to_pixel<T: Axes>(&self, value: T) -> T {
        transform::coord_to_pixel(value, self.options.size_factor)
    }

    pub fn measure_text(&self, text: &str, style: &TextStyle) -> TextMetrics {
        self.fonts.measure(text, style)
    }

    /// Decodes the background map and copies it onto the surface at the
    /// origin, at its natural size. Drawing it again replaces those pixels.
    pub async fn draw(&mut self) -> Result<&mut Self, MapError> {
        let background = load_image(self.background.clone()).await?.into_rgba8();
        log::debug!(
            "drawing background {} ({}x{})",
            self.background.display(),
            background.width(),
            background.height()
        );
        imageops::replace(&mut self.surface, &background, 0, 0);
        self.background_drawn = true;
        Ok(self)
    }

    /// Draws an icon centred on `position`, scaled to `64 * icon_scale`
    /// pixels square. `position` is an `(x, y)` pair or a [`Point`].
    pub async fn draw_icon(
        &mut self,
        path: impl AsRef<Path>,
        position: impl Into<Point>,
    ) -> Result<&mut Self, MapError> {
        let path = path.as_ref().to_path_buf();
        if path.as_os_str().is_empty() {
            return Err(MapError::MissingPath(PathKind::Icon));
        }
        let position = position.into();

        let icon = load_image(path.clone()).await?;
        let edge = ICON_SIZE * self.options.icon_scale;
        let side = edge.round().max(1.0) as u32;
        let icon = icon.resize_exact(side, side, FilterType::CatmullRom).into_rgba8();

        let left = (position.x - edge / 2.0).round() as i64;
        let top = (position.y - edge / 2.0).round() as i64;
        log::debug!("drawing icon {} at ({left}, {top}), {side}px", path.display());
        imageops::overlay(&mut self.surface, &icon, left, top);
        Ok(self)
    }

    /// Draws a stroked and filled label next to `position`, placed according
    /// to `orientation`.
    pub async fn draw_text(
        &mut self,
        text: &str,
        position: impl Into<Point>,
        orientation: Orientation,
        style: &TextStyle,
    ) -> Result<&mut Self, MapError> {
        let position = position.into();
        let metrics = self.fonts.measure(text, style);
        let (dx, dy) = orientation.offset(metrics);
        let baseline = Point::new(position.x + f64::from(dx), position.y + f64::from(dy));
        log::debug!(
            "drawing text {text:?} {orientation:?} of ({}, {}), baseline at ({}, {})",
            position.x,
            position.y,
            baseline.x,
            baseline.y
        );
        text::paint(
            &mut self.surface,
            self.fonts.face(style.italic),
            text,
            baseline,
            style,
        );
        Ok(self)
    }

    /// PNG-encodes the current surface.
    pub fn encode_png(&self) -> Result<Vec<u8>, MapError> {
        encode_png(&self.surface)
    }

    /// Writes the surface to `path` as a PNG. Fails with
    /// [`MapError::NotDrawn`] until [`draw`](Self::draw) has succeeded.
    pub async fn write(&self, path: impl AsRef<Path>) -> Result<(), MapError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(MapError::MissingPath(PathKind::Output));
        }
        if !self.background_drawn {
            return Err(MapError::NotDrawn);
        }

        let surface = self.surface.clone();
        let bytes = tokio::task::spawn_blocking(move || encode_png(&surface)).await??;
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
