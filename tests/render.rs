use std::path::{Path, PathBuf};

use image::{GenericImageView, Rgba, RgbaImage};
use xivmap::{Color, MapError, MapOptions, MapRenderer, Orientation, PathKind, Point, TextStyle};

fn checkerboard(dir: &Path) -> PathBuf {
    let path = dir.join("background.png");
    RgbaImage::from_fn(2048, 2048, |x, y| {
        if (x / 256 + y / 256) % 2 == 0 {
            Rgba([40, 90, 40, 255])
        } else {
            Rgba([60, 120, 60, 255])
        }
    })
    .save(&path)
    .unwrap();
    path
}

fn marker(dir: &Path) -> PathBuf {
    let path = dir.join("marker.png");
    RgbaImage::from_fn(32, 32, |x, y| {
        let (dx, dy) = (x as i32 - 16, y as i32 - 16);
        if dx * dx + dy * dy < 14 * 14 {
            Rgba([220, 40, 40, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
    .save(&path)
    .unwrap();
    path
}

#[tokio::test]
async fn renders_and_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let background = checkerboard(dir.path());
    let icon = marker(dir.path());
    let out = dir.path().join("out.png");

    let mut map = MapRenderer::new(&background, MapOptions::default()).unwrap();
    map.draw().await.unwrap();
    map.draw_icon(&icon, (1024.0, 1024.0)).await.unwrap();
    map.draw_text("Label", (1024.0, 1024.0), Orientation::from(3), &TextStyle::default())
        .await
        .unwrap();
    map.write(&out).await.unwrap();

    let written = std::fs::metadata(&out).unwrap();
    assert!(written.len() > 0);

    let decoded = image::open(&out).unwrap();
    assert_eq!(decoded.dimensions(), (2048, 2048));
    assert_eq!(decoded.get_pixel(1024, 1024), Rgba([220, 40, 40, 255]));
    assert_eq!(decoded.get_pixel(10, 10), Rgba([40, 90, 40, 255]));
}

#[tokio::test]
async fn draw_calls_return_the_same_renderer() {
    let dir = tempfile::tempdir().unwrap();
    let background = checkerboard(dir.path());
    let icon = marker(dir.path());
    let mut map = MapRenderer::new(&background, MapOptions::default()).unwrap();
    let addr: *const MapRenderer = &map;

    let same = map.draw().await.unwrap();
    assert!(std::ptr::eq(same as *const MapRenderer, addr));
    let same = map.draw_icon(&icon, Point::new(5.0, 5.0)).await.unwrap();
    assert!(std::ptr::eq(same as *const MapRenderer, addr));
    let same = map
        .draw_text("Here", Point::new(5.0, 5.0), Orientation::Right, &TextStyle::default())
        .await
        .unwrap();
    assert!(std::ptr::eq(same as *const MapRenderer, addr));
}

#[tokio::test]
async fn chained_calls_compose() -> Result<(), MapError> {
    let dir = tempfile::tempdir().unwrap();
    let background = checkerboard(dir.path());
    let icon = marker(dir.path());
    let out = dir.path().join("chained.png");

    let mut map = MapRenderer::new(&background, MapOptions::default().with_size_factor(200.0))?;
    let camp = map.coord_to_pixel(Point::new(6.0, 8.5));
    let style = TextStyle::default()
        .with_size(22.0)
        .with_fill_style("#ffd700".parse::<Color>()?)
        .with_italic(true);

    map.draw()
        .await?
        .draw_icon(&icon, camp)
        .await?
        .draw_text("Camp", camp, Orientation::Up, &style)
        .await?
        .write(&out)
        .await?;

    assert!(out.exists());
    let decoded = image::open(&out).unwrap();
    let (x, y) = (camp.x.round() as u32, camp.y.round() as u32);
    assert_eq!(decoded.get_pixel(x, y), Rgba([220, 40, 40, 255]));
    Ok(())
}

#[tokio::test]
async fn renderer_is_reusable_after_write() {
    let dir = tempfile::tempdir().unwrap();
    let background = checkerboard(dir.path());
    let icon = marker(dir.path());

    let mut map = MapRenderer::new(&background, MapOptions::default()).unwrap();
    map.draw().await.unwrap();
    map.write(dir.path().join("plain.png")).await.unwrap();
    map.draw_icon(&icon, (100.0, 100.0)).await.unwrap();
    map.write(dir.path().join("marked.png")).await.unwrap();

    let plain = image::open(dir.path().join("plain.png")).unwrap();
    let marked = image::open(dir.path().join("marked.png")).unwrap();
    assert_ne!(plain.get_pixel(100, 100), marked.get_pixel(100, 100));
    assert_eq!(plain.get_pixel(1500, 1500), marked.get_pixel(1500, 1500));
}

#[tokio::test]
async fn missing_paths_are_rejected() {
    assert!(matches!(
        MapRenderer::new("", MapOptions::default()),
        Err(MapError::MissingPath(PathKind::Background))
    ));

    let dir = tempfile::tempdir().unwrap();
    let mut map = MapRenderer::new(checkerboard(dir.path()), MapOptions::default()).unwrap();
    assert!(matches!(
        map.draw_icon("", (1.0, 1.0)).await,
        Err(MapError::MissingPath(PathKind::Icon))
    ));
    map.draw().await.unwrap();
    assert!(matches!(
        map.write("").await,
        Err(MapError::MissingPath(PathKind::Output))
    ));
}

#[tokio::test]
async fn corrupt_background_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.png");
    std::fs::write(&bogus, b"not a png").unwrap();

    let mut map = MapRenderer::new(&bogus, MapOptions::default()).unwrap();
    match map.draw().await {
        Err(MapError::Load { path, .. }) => assert_eq!(path, bogus),
        other => panic!("expected a load error, got {other:?}"),
    }
}
