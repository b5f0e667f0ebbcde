use kurbo::{Point, Size, Vec2};

use dotfield::{DotGridEffect, GridConfig, HostGeometry, StaticHost, TimeMs};

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn digest_u64(bytes: &[u8]) -> u64 {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for chunk in bytes.chunks(8) {
        let mut v = 0u64;
        for (i, &b) in chunk.iter().enumerate() {
            v |= (b as u64) << (i * 8);
        }
        state = mix64(state ^ v);
    }
    state
}

fn test_config() -> GridConfig {
    GridConfig {
        dot_size: 4.0,
        gap: 12.0,
        proximity: 30.0,
        ..GridConfig::default()
    }
}

#[test]
fn resize_from_zero_repopulates_the_grid() {
    let mut host = StaticHost::new(HostGeometry::sized(0.0, 0.0));
    let mut effect = DotGridEffect::new(test_config());

    effect.mount(&host);
    assert!(effect.is_running());
    assert!(effect.dots().is_empty());

    host.set_viewport(Size::new(300.0, 150.0));
    effect.handle_resize(&host);
    // 16px cell: 19 columns by 10 rows.
    assert_eq!(effect.dots().len(), 190);

    host.set_viewport(Size::ZERO);
    effect.handle_resize(&host);
    assert!(effect.dots().is_empty());
}

#[test]
fn fast_sweep_shoves_only_nearby_dots() {
    let host = StaticHost::new(HostGeometry::sized(300.0, 150.0));
    let mut effect = DotGridEffect::new(test_config());
    effect.mount(&host);

    // 50px in 100ms is 500px/s, well past the default 100px/s trigger.
    effect.pointer_moved(TimeMs(0.0), Point::new(10.0, 75.0), &host);
    effect.pointer_moved(TimeMs(100.0), Point::new(60.0, 75.0), &host);

    let pointer = Point::new(60.0, 75.0);
    let mut displaced = 0;
    for dot in effect.dots() {
        let near = (dot.position - pointer).hypot() < 30.0;
        assert_eq!(dot.motion.is_active(), near, "dot at {:?}", dot.position);
        if near {
            displaced += 1;
        }
    }
    assert!(displaced > 0);
}

#[test]
fn slow_glide_displaces_nothing() {
    let host = StaticHost::new(HostGeometry::sized(300.0, 150.0));
    let mut effect = DotGridEffect::new(test_config());
    effect.mount(&host);

    // 5px in 100ms is 50px/s, under the trigger.
    effect.pointer_moved(TimeMs(0.0), Point::new(60.0, 75.0), &host);
    effect.pointer_moved(TimeMs(100.0), Point::new(65.0, 75.0), &host);

    assert!(effect.dots().iter().all(|d| !d.motion.is_active()));
}

#[test]
fn click_shock_settles_back_to_rest() {
    let host = StaticHost::new(HostGeometry::sized(300.0, 150.0));
    let mut effect = DotGridEffect::new(test_config());
    effect.mount(&host);

    effect.clicked(TimeMs(0.0), Point::new(150.0, 75.0), &host);
    assert!(effect.dots().iter().any(|d| d.motion.is_active()));

    effect.advance(TimeMs(100.0));
    assert!(effect.dots().iter().any(|d| d.offset != Vec2::ZERO));

    // Long enough for every glide to finish, then every elastic return.
    effect.advance(TimeMs(5_000.0));
    effect.advance(TimeMs(10_000.0));
    for dot in effect.dots() {
        assert!(!dot.motion.is_active());
        assert_eq!(dot.offset, Vec2::ZERO);
    }
}

#[test]
fn teardown_stops_frame_production() {
    let host = StaticHost::new(HostGeometry::sized(300.0, 150.0));
    let mut effect = DotGridEffect::new(test_config());
    effect.mount(&host);
    assert!(effect.render_frame(&host).is_some());

    effect.teardown();
    assert!(effect.render_frame(&host).is_none());
    assert!(effect.dots().is_empty());
}

fn run_script() -> Vec<u64> {
    let mut host = StaticHost::new(HostGeometry::sized(200.0, 120.0));
    let mut effect = DotGridEffect::new(test_config());
    effect.mount(&host);

    let mut digests = Vec::new();
    for step in 0u32..12 {
        let t = TimeMs(f64::from(step) * 60.0);
        match step {
            3 => effect.clicked(t, Point::new(100.0, 60.0), &host),
            6 => {
                effect.advance(t);
                host.set_scroll(Vec2::new(0.0, 7.0));
            }
            _ => {
                let x = 10.0 + f64::from(step) * 15.0;
                effect.pointer_moved(t, Point::new(x, 60.0), &host);
            }
        }
        effect.advance(t);
        let frame = effect.render_frame(&host).unwrap();
        assert!(frame.premultiplied);
        digests.push(digest_u64(&frame.data));
    }
    digests
}

#[test]
fn identical_scripts_render_identical_bytes() {
    let a = run_script();
    let b = run_script();
    assert_eq!(a, b);
    // The script visibly changes the picture along the way.
    assert!(a.windows(2).any(|w| w[0] != w[1]));
}
