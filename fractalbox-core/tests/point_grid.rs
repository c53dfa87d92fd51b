use fractalbox_core::{Complex, EvalParams, Family, IterationOutcome, PlaneMap, RasterSize, Rectangle};

/// Evaluate every pixel of a mapped raster and collect outcomes into a flat Vec.
fn evaluate_grid(family: &Family, params: &EvalParams, map: &PlaneMap) -> Vec<IterationOutcome> {
    let raster = map.raster();
    let mut results = Vec::with_capacity(raster.pixel_count());
    for py in 0..raster.height {
        for px in 0..raster.width {
            let point = map.to_plane(px, py);
            results.push(family.evaluate(point, params));
        }
    }
    results
}

#[test]
fn mandelbrot_grid_has_both_classes() {
    let params = EvalParams::default();
    let map = PlaneMap::new(
        Rectangle::new(-2.0, 1.25, 0.5, -1.25),
        RasterSize::new(100, 100),
    )
    .unwrap();

    let results = evaluate_grid(&Family::Mandelbrot, &params, &map);
    assert_eq!(results.len(), 100 * 100);

    let escaped = results.iter().filter(|r| r.is_escaped()).count();
    let stable = results.iter().filter(|r| !r.is_escaped()).count();

    assert!(escaped > 0, "should have some escaped points");
    assert!(stable > 0, "should have some non-escaping points");
    assert_eq!(escaped + stable, 10_000);
}

#[test]
fn julia_grid_has_both_classes() {
    let params = EvalParams::default();
    let map = PlaneMap::new(
        Rectangle::new(-2.0, 2.0, 2.0, -2.0),
        RasterSize::new(100, 100),
    )
    .unwrap();

    let results = evaluate_grid(&Family::default_julia(), &params, &map);
    assert_eq!(results.len(), 10_000);

    let escaped = results.iter().filter(|r| r.is_escaped()).count();
    let stable = results.iter().filter(|r| !r.is_escaped()).count();

    assert!(escaped > 0, "should have some escaped points");
    assert!(stable > 0, "should have some non-escaping points");
}

#[test]
fn grid_evaluation_is_deterministic() {
    let params = EvalParams::default();
    let map = PlaneMap::new(
        Rectangle::new(-2.0, 1.5, 1.0, -1.5),
        RasterSize::new(80, 60),
    )
    .unwrap();

    let run1 = evaluate_grid(&Family::Mandelbrot, &params, &map);
    let run2 = evaluate_grid(&Family::Mandelbrot, &params, &map);
    assert_eq!(run1, run2, "two identical passes must agree");
}

#[test]
fn escaped_counts_stay_below_budget() {
    let params = EvalParams::default().with_max_iterations(64);
    let map = PlaneMap::new(
        Rectangle::new(-2.0, 1.25, 0.5, -1.25),
        RasterSize::new(64, 64),
    )
    .unwrap();

    for outcome in evaluate_grid(&Family::Mandelbrot, &params, &map) {
        if let IterationOutcome::Escaped { iterations } = outcome {
            assert!(iterations < 64, "escape count must stay below max_iterations");
        }
    }
}

#[test]
fn cursor_probe_matches_grid_cell() {
    // Probing a single point (cursor-follow display) must agree with the
    // value a full grid pass would store for the same pixel.
    let params = EvalParams::default();
    let map = PlaneMap::new(
        Rectangle::new(-2.0, 1.25, 0.5, -1.25),
        RasterSize::new(50, 50),
    )
    .unwrap();
    let family = Family::Mandelbrot;

    let grid = evaluate_grid(&family, &params, &map);
    for &(px, py) in &[(0u32, 0u32), (25, 25), (49, 49), (10, 40)] {
        let probe = family.evaluate(map.to_plane(px, py), &params);
        assert_eq!(grid[(py * 50 + px) as usize], probe);
    }
}

#[test]
fn point_display_formats() {
    let p = Complex::new(-0.5, 0.25);
    assert_eq!(format!("{p}"), "-0.5 + 0.25i");
    let n = Complex::new(0.5, -0.25);
    assert_eq!(format!("{n}"), "0.5 - 0.25i");
}
