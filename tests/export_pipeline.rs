//! End-to-end poster scenarios through the public API with the real backend.
//!
//! Fixtures (template, photo, poster.toml) are generated into a temp
//! directory per test. Tests that need glyphs return early on machines
//! without a usable system font.

use image::{Rgba, RgbaImage};
use poster_forge::config::{self, PlacementMode};
use poster_forge::export::write_artifact;
use poster_forge::geometry::{Offset, Rect};
use poster_forge::imaging::text::resolve_font;
use poster_forge::imaging::{EncodeParams, ExportFormat, ImageBackend, Quality, RustBackend};
use poster_forge::preview::PreviewOutcome;
use poster_forge::{EditorSession, PosterError};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const TEMPLATE_COLOR: Rgba<u8> = Rgba([20, 40, 60, 255]);
const PHOTO_COLOR: Rgba<u8> = Rgba([200, 30, 30, 255]);

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// 1200x1800 template, 800x600 photo, poster.toml pointing at both.
    fn new(mode: &str) -> Self {
        let dir = TempDir::new().unwrap();
        RgbaImage::from_pixel(1200, 1800, TEMPLATE_COLOR)
            .save(dir.path().join("template.png"))
            .unwrap();
        RgbaImage::from_pixel(800, 600, PHOTO_COLOR)
            .save(dir.path().join("photo.png"))
            .unwrap();
        std::fs::write(
            dir.path().join("poster.toml"),
            format!(
                "[template]\npath = {:?}\n\n[placement]\nmode = \"{mode}\"\n",
                dir.path().join("template.png").display().to_string()
            ),
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    fn session(&self) -> EditorSession {
        let config = config::load_config(self.dir.path()).unwrap();
        EditorSession::open(&config, Arc::new(RustBackend::new())).unwrap()
    }
}

fn close(a: Rgba<u8>, b: Rgba<u8>, tolerance: u8) -> bool {
    (0..3).all(|i| a[i].abs_diff(b[i]) <= tolerance)
}

fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

// =============================================================================
// Fixed frame
// =============================================================================

#[test]
fn crop_then_export_fills_frame() {
    let fx = Fixture::new("fixed");
    let mut session = fx.session();
    session.load_photo(&fx.path("photo.png")).unwrap();
    session
        .apply_crop(Rect::new(100.0, 50.0, 400.0, 530.0).unwrap(), 1.0)
        .unwrap();

    let cropped = session.state().cropped.clone().unwrap();
    assert_eq!((cropped.natural_width(), cropped.natural_height()), (400, 530));

    let artifact = session.export().unwrap();
    assert_eq!(artifact.filename, "poster.jpg");
    let poster = decode(&artifact.bytes);
    assert_eq!(poster.dimensions(), (1200, 1800));

    // frame interior carries the photo, outside stays template
    assert!(close(*poster.get_pixel(275, 845), PHOTO_COLOR, 12));
    assert!(close(*poster.get_pixel(70, 570), PHOTO_COLOR, 12));
    assert!(close(*poster.get_pixel(30, 845), TEMPLATE_COLOR, 12));
    assert!(close(*poster.get_pixel(600, 845), TEMPLATE_COLOR, 12));
}

#[test]
fn name_is_drawn_below_frame() {
    if resolve_font(None).ok().flatten().is_none() {
        return;
    }
    let fx = Fixture::new("fixed");
    let mut session = fx.session();
    session.load_photo(&fx.path("photo.png")).unwrap();
    session
        .apply_crop(Rect::new(100.0, 50.0, 400.0, 530.0).unwrap(), 1.0)
        .unwrap();
    session.set_name("Ava Chen");

    let artifact = session.export().unwrap();
    assert_eq!(artifact.filename, "Ava_Chen.jpg");
    let poster = decode(&artifact.bytes);

    let bright: Vec<(u32, u32)> = poster
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > 200 && p[1] > 200 && p[2] > 200)
        .map(|(x, y, _)| (x, y))
        .collect();
    assert!(!bright.is_empty(), "no white text found");
    // 30px font, top at 1130 + 12
    assert!(bright.iter().all(|(_, y)| *y >= 1130 && *y < 1200));
    let min_x = bright.iter().map(|(x, _)| *x).min().unwrap();
    let max_x = bright.iter().map(|(x, _)| *x).max().unwrap();
    let center = f64::from(min_x + max_x) / 2.0;
    assert!((center - 275.0).abs() < 10.0, "text centered at {center}");
}

#[test]
fn untouched_poster_is_the_template_reencoded() {
    let fx = Fixture::new("fixed");
    let session = fx.session();

    let artifact = session.export().unwrap();
    let template = image::open(fx.path("template.png")).unwrap().to_rgba8();
    let direct = RustBackend::new()
        .encode(
            &template,
            &EncodeParams {
                format: ExportFormat::Jpeg,
                quality: Quality::new(92),
            },
        )
        .unwrap();
    assert_eq!(artifact.bytes, direct);
    assert_eq!(artifact.filename, "poster.jpg");
}

#[test]
fn back_to_back_exports_succeed() {
    let fx = Fixture::new("fixed");
    let session = fx.session();
    let first = session.export().unwrap();
    let second = session.export().unwrap();
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(session.last_export().unwrap(), second);
}

#[test]
fn wrong_aspect_is_rejected() {
    let fx = Fixture::new("fixed");
    let mut session = fx.session();
    session.load_photo(&fx.path("photo.png")).unwrap();
    let err = session
        .apply_crop(Rect::new(0.0, 0.0, 600.0, 600.0).unwrap(), 1.0)
        .unwrap_err();
    assert!(matches!(err, PosterError::AspectMismatch { .. }));
}

// =============================================================================
// Preview
// =============================================================================

#[test]
fn preview_fits_container() {
    let fx = Fixture::new("fixed");
    let session = fx.session();
    let outcome = session.render_preview(420).unwrap();
    assert!(matches!(outcome, PreviewOutcome::Committed(_)));
    let frame = session.latest_preview().unwrap();
    assert_eq!(
        (frame.image.natural_width(), frame.image.natural_height()),
        (420, 630)
    );
}

#[test]
fn background_previews_keep_newest() {
    let fx = Fixture::new("fixed");
    let session = fx.session();
    let handles: Vec<_> = [300, 360, 420].iter().map(|w| session.spawn_preview(*w)).collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    assert_eq!(session.latest_preview().unwrap().image.natural_width(), 420);
}

// =============================================================================
// Free placement
// =============================================================================

#[test]
fn free_photo_is_centered_then_offset() {
    let fx = Fixture::new("free");
    let mut session = fx.session();
    session.load_photo(&fx.path("photo.png")).unwrap();

    // 800x600 centered: [200, 600, 800x600]
    let centered = decode(&session.export().unwrap().bytes);
    assert!(close(*centered.get_pixel(210, 610), PHOTO_COLOR, 12));
    assert!(close(*centered.get_pixel(190, 610), TEMPLATE_COLOR, 12));

    session.nudge(Offset::new(-100.0, 0.0)).unwrap();
    let moved = decode(&session.export().unwrap().bytes);
    assert!(close(*moved.get_pixel(110, 610), PHOTO_COLOR, 12));
    assert!(close(*moved.get_pixel(950, 610), TEMPLATE_COLOR, 12));
}

#[test]
fn free_mode_config_is_loaded() {
    let fx = Fixture::new("free");
    let config = config::load_config(fx.dir.path()).unwrap();
    assert_eq!(config.placement.mode, PlacementMode::Free);
}

// =============================================================================
// Writing artifacts
// =============================================================================

#[test]
fn artifact_written_to_disk_decodes() {
    let fx = Fixture::new("fixed");
    let session = fx.session();
    let artifact = session.export().unwrap();
    let out = fx.path("out");
    let path = write_artifact(&artifact, &out).unwrap();
    assert_eq!(path, out.join("poster.jpg"));
    let written = image::open(&path).unwrap();
    assert_eq!((written.width(), written.height()), (1200, 1800));
    assert!(Path::new(&path).exists());
}
