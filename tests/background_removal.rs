//! Background removal over realistic inputs: flattened stamps and
//! mixed-content images.

use stampforge::background::{remove_white_background, BackgroundOptions};
use stampforge::ink::InkOptions;
use stampforge::jitter::NoJitter;
use stampforge::layout::StampRenderer;
use stampforge::surface::{new_surface, PixmapFactory};
use stampforge::text::FontStore;
use stampforge::{StampConfig, StampType};
use tiny_skia::{Color, Pixmap, PixmapPaint, Transform};

#[test]
fn checkerboard_keeps_dark_cells_and_drops_white_cells() {
  let mut pixmap = new_surface(8, 8).unwrap();
  pixmap.fill(Color::WHITE);
  for y in 0..8u32 {
    for x in 0..8u32 {
      if (x + y) % 2 == 0 {
        let rect = tiny_skia::Rect::from_xywh(x as f32, y as f32, 1.0, 1.0).unwrap();
        let path = tiny_skia::PathBuilder::from_rect(rect);
        let mut paint = tiny_skia::Paint::default();
        paint.set_color_rgba8(26, 26, 26, 255);
        paint.anti_alias = false;
        pixmap.fill_path(
          &path,
          &paint,
          tiny_skia::FillRule::Winding,
          Transform::identity(),
          None,
        );
      }
    }
  }

  let out = remove_white_background(pixmap, &BackgroundOptions::default());
  for y in 0..8u32 {
    for x in 0..8u32 {
      let alpha = out.pixels()[(y * 8 + x) as usize].alpha();
      if (x + y) % 2 == 0 {
        assert_eq!(alpha, 255, "dark cell ({x},{y}) lost");
      } else {
        assert_eq!(alpha, 0, "white cell ({x},{y}) kept");
      }
    }
  }
}

#[test]
fn flattened_stamp_cuts_back_out_of_white_paper() {
  // Generate a stamp, flatten it onto white, then cut the white away.
  let renderer = StampRenderer::with_parts(Box::new(PixmapFactory), FontStore::empty())
    .with_ink_options(InkOptions {
      blots: 0,
      smudges: 0,
    });
  let config = StampConfig::placeholder(StampType::LogoSquare);
  let stamp = renderer.render(&config, &mut NoJitter).unwrap();

  let mut paper = new_surface(stamp.width(), stamp.height()).unwrap();
  paper.fill(Color::WHITE);
  paper.draw_pixmap(
    0,
    0,
    stamp.as_ref(),
    &PixmapPaint::default(),
    Transform::identity(),
    None,
  );

  let out = remove_white_background(paper, &BackgroundOptions::default());
  let total = out.pixels().len();
  let transparent = out.pixels().iter().filter(|px| px.alpha() == 0).count();
  let opaque = out.pixels().iter().filter(|px| px.alpha() == 255).count();

  // The corner outside the rounded border is bare paper.
  assert_eq!(out.pixels()[0].alpha(), 0);
  // Most of the surface is paper, but the ink survives.
  assert!(transparent > total / 2, "only {transparent}/{total} cut");
  assert!(opaque > 100, "only {opaque} ink pixels survived");
}

#[test]
fn custom_threshold_widens_the_background_class() {
  let mut pixmap = new_surface(4, 4).unwrap();
  pixmap.fill(Color::from_rgba8(210, 210, 210, 255));

  let default_out = remove_white_background(pixmap.clone(), &BackgroundOptions::default());
  assert!(default_out.pixels().iter().all(|px| px.alpha() == 255));

  let loose = BackgroundOptions {
    threshold: 200,
    ..BackgroundOptions::default()
  };
  let loose_out = remove_white_background(pixmap, &loose);
  assert!(loose_out.pixels().iter().all(|px| px.alpha() == 0));
}

#[test]
fn removal_then_reflatten_round_trips_visibly() {
  // Cutting out and re-flattening onto fresh white paper preserves the
  // dark content.
  let mut original = new_surface(16, 16).unwrap();
  original.fill(Color::WHITE);
  let rect = tiny_skia::Rect::from_xywh(4.0, 4.0, 8.0, 8.0).unwrap();
  let path = tiny_skia::PathBuilder::from_rect(rect);
  let mut paint = tiny_skia::Paint::default();
  paint.set_color_rgba8(26, 26, 26, 255);
  paint.anti_alias = false;
  original.fill_path(
    &path,
    &paint,
    tiny_skia::FillRule::Winding,
    Transform::identity(),
    None,
  );

  let cutout = remove_white_background(original, &BackgroundOptions::default());

  let mut repaper: Pixmap = new_surface(16, 16).unwrap();
  repaper.fill(Color::WHITE);
  repaper.draw_pixmap(
    0,
    0,
    cutout.as_ref(),
    &PixmapPaint::default(),
    Transform::identity(),
    None,
  );

  let center = repaper.pixels()[8 * 16 + 8].demultiply();
  assert_eq!((center.red(), center.green(), center.blue()), (26, 26, 26));
  let corner = repaper.pixels()[0].demultiply();
  assert_eq!((corner.red(), corner.green(), corner.blue()), (255, 255, 255));
}
