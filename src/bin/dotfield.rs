use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dotfield", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame of a scene as a PNG.
    Frame(FrameArgs),
    /// Render every frame of a scene as numbered PNGs.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Composite over this hex color instead of keeping transparency.
    #[arg(long)]
    background: Option<String>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for frame_#####.png files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Composite over this hex color instead of keeping transparency.
    #[arg(long)]
    background: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_scene_json(path: &Path) -> anyhow::Result<dotfield::Scene> {
    let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let r = BufReader::new(f);
    let scene: dotfield::Scene = serde_json::from_reader(r).with_context(|| "parse scene JSON")?;
    Ok(scene)
}

fn parse_background(s: &str) -> anyhow::Result<dotfield::Rgb8> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("background must be a 6-digit hex color, got '{s}'");
    }
    Ok(dotfield::Rgb8::from_hex_lossy(s))
}

fn write_png(
    path: &Path,
    frame: &dotfield::FrameRGBA,
    background: Option<dotfield::Rgb8>,
) -> anyhow::Result<()> {
    let pixels = match background {
        Some(bg) => frame.over_background(bg),
        None => frame.to_straight_alpha(),
    };
    image::save_buffer_with_format(
        path,
        &pixels,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = read_scene_json(&args.in_path)?;
    scene.validate()?;
    let background = args
        .background
        .as_deref()
        .map(parse_background)
        .transpose()?;

    let mut player = dotfield::ScenePlayer::new(scene)?;
    let mut wanted = None;
    while let Some((index, frame)) = player.next_frame() {
        if index.0 == args.frame {
            wanted = Some(frame);
            break;
        }
    }
    let frame = wanted.with_context(|| format!("frame {} is past the end of the scene", args.frame))?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    write_png(&args.out, &frame, background)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let scene = read_scene_json(&args.in_path)?;
    scene.validate()?;
    let background = args
        .background
        .as_deref()
        .map(parse_background)
        .transpose()?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut player = dotfield::ScenePlayer::new(scene)?;
    let mut written = 0u64;
    player.render_all(|index, frame| {
        let path = args.out_dir.join(format!("frame_{:05}.png", index.0));
        write_png(&path, &frame, background).map_err(dotfield::DotfieldError::from)?;
        written += 1;
        Ok(())
    })?;

    eprintln!("wrote {} frames to {}", written, args.out_dir.display());
    Ok(())
}
