use super::*;

#[test]
fn landscape_without_frame_caps_width() {
    // 4000x3000 -> 1920x1440
    let p = plan((4000, 3000), None).unwrap();
    assert_eq!(p.canvas, CanvasSize { width: 1920, height: 1440 });
    assert_eq!(p.source_crop, Rect::new(0.0, 0.0, 4000.0, 3000.0));
    assert!(!p.framed);
}

#[test]
fn portrait_and_square_without_frame_cap_height() {
    assert_eq!(
        frameless_canvas(3000, 4000).unwrap(),
        CanvasSize { width: 1440, height: 1920 }
    );
    assert_eq!(
        frameless_canvas(2500, 2500).unwrap(),
        CanvasSize { width: 1920, height: 1920 }
    );
}

#[test]
fn small_sources_are_never_upscaled() {
    assert_eq!(
        frameless_canvas(640, 480).unwrap(),
        CanvasSize { width: 640, height: 480 }
    );
    assert_eq!(
        frameless_canvas(300, 500).unwrap(),
        CanvasSize { width: 300, height: 500 }
    );
}

#[test]
fn frameless_preserves_aspect_within_a_pixel() {
    for (w, h) in [(4000, 3000), (1921, 1080), (5000, 7), (7, 5000), (3333, 2222), (1, 1)] {
        let c = frameless_canvas(w, h).unwrap();
        assert!(c.width <= MAX_DIMENSION && c.height <= MAX_DIMENSION);
        if w >= h {
            assert_eq!(c.width, w.min(MAX_DIMENSION));
        }
        let lhs = f64::from(c.height) * f64::from(w);
        let rhs = f64::from(c.width) * f64::from(h);
        // Off by at most one output pixel along the derived edge.
        assert!(
            (lhs - rhs).abs() <= f64::from(w.max(h)),
            "{w}x{h} -> {c}"
        );
    }
}

#[test]
fn zero_sized_source_is_a_composite_error() {
    assert!(matches!(
        frameless_canvas(0, 10),
        Err(StudioError::Composite(_))
    ));
    assert!(plan((10, 0), Some((1, 1))).is_err());
}

#[test]
fn zero_frame_dimension_falls_back_to_nine_sixteenths() {
    assert_eq!(frame_aspect(0, 500), 9.0 / 16.0);
    assert_eq!(frame_aspect(500, 0), 9.0 / 16.0);
    assert_eq!(frame_aspect(0, 0), FALLBACK_FRAME_ASPECT);
    assert_eq!(
        framed_canvas(frame_aspect(0, 0)),
        CanvasSize { width: 1080, height: 1920 }
    );
}

#[test]
fn framed_canvas_follows_frame_aspect() {
    for (w_f, h_f) in [(1080, 1920), (1, 1), (4, 3), (1000, 1500), (3, 7)] {
        let r = frame_aspect(w_f, h_f);
        let c = framed_canvas(r);
        assert_eq!(c.width, 1080);
        assert!((f64::from(c.height) - 1080.0 / r).abs() <= 1.0);
    }
}

#[test]
fn portrait_source_under_square_frame_crops_height() {
    // 800x1200 under a 1:1 frame: full width, 800 tall, centered at y=200.
    let p = plan((800, 1200), Some((500, 500))).unwrap();
    assert_eq!(p.canvas, CanvasSize { width: 1080, height: 1080 });
    assert_eq!(p.source_crop, Rect::new(0.0, 200.0, 800.0, 1000.0));
    assert!(p.framed);
}

#[test]
fn wide_source_under_portrait_frame_crops_width() {
    let canvas = framed_canvas(frame_aspect(1080, 1920));
    let crop = cover_crop(4000, 3000, canvas);
    assert_eq!(crop.y0, 0.0);
    assert_eq!(crop.height(), 3000.0);
    let expected_w = 3000.0 * canvas.aspect();
    assert!((crop.width() - expected_w).abs() < 1e-9);
    assert!((crop.x0 - (4000.0 - expected_w) / 2.0).abs() < 1e-9);
}

#[test]
fn cover_crop_stays_inside_and_centered() {
    let canvases = [
        framed_canvas(1.0),
        framed_canvas(9.0 / 16.0),
        framed_canvas(16.0 / 9.0),
        framed_canvas(0.3),
    ];
    for (w, h) in [(800, 1200), (4000, 3000), (1, 1), (1080, 1920), (7, 5000), (5000, 7)] {
        for canvas in canvases {
            let crop = cover_crop(w, h, canvas);
            assert!(crop.x0 >= 0.0 && crop.y0 >= 0.0);
            assert!(crop.width() <= f64::from(w) + 1e-9);
            assert!(crop.height() <= f64::from(h) + 1e-9);
            assert!((crop.x0 + crop.width() / 2.0 - f64::from(w) / 2.0).abs() <= 0.5);
            assert!((crop.y0 + crop.height() / 2.0 - f64::from(h) / 2.0).abs() <= 0.5);
            let crop_aspect = crop.width() / crop.height();
            assert!((crop_aspect - canvas.aspect()).abs() / canvas.aspect() < 1e-9);
        }
    }
}
