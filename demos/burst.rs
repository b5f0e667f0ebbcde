use dotfield::{Fps, GridConfig, HostSpec, Rgb8, Scene, ScenePlayer, ScriptEvent};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Fast horizontal sweep, then a click in the middle of the canvas.
    let mut events = Vec::new();
    for i in 0..12u32 {
        events.push(ScriptEvent::Move {
            at_ms: f64::from(i) * 60.0,
            x: 40.0 + f64::from(i) * 48.0,
            y: 180.0,
        });
    }
    events.push(ScriptEvent::Click {
        at_ms: 900.0,
        x: 320.0,
        y: 180.0,
    });

    let scene = Scene {
        fps: Fps::new(30, 1)?,
        duration_s: 2.0,
        host: HostSpec {
            width: 640.0,
            height: 360.0,
            border_radius: 24.0,
            ..HostSpec::default()
        },
        grid: GridConfig {
            dot_size: 6.0,
            gap: 18.0,
            base_color: Rgb8::new(0x54, 0x54, 0x54),
            active_color: Rgb8::new(0x00, 0xff, 0xff),
            proximity: 120.0,
            shock_strength: 7.0,
            ..GridConfig::default()
        },
        events,
    };

    let mut player = ScenePlayer::new(scene)?;
    std::fs::create_dir_all("target/burst")?;

    let bg = Rgb8::new(0x12, 0x12, 0x12);
    while let Some((index, frame)) = player.next_frame() {
        if index.0 % 15 != 0 {
            continue;
        }
        let path = format!("target/burst/frame_{:02}.png", index.0);
        image::save_buffer_with_format(
            &path,
            &frame.over_background(bg),
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )?;
        println!("wrote {path}");
    }

    Ok(())
}
