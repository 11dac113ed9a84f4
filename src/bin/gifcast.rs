use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "gifcast", version, about = "Encode PNG frames into an animated GIF")]
struct Cli {
    /// Input frames (PNG), encoded in the order given. All frames must share one size.
    #[arg(required = true)]
    frames: Vec<PathBuf>,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// Encoder options JSON; flags given on the command line override its values.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Frame delay in milliseconds.
    #[arg(long)]
    delay: Option<u32>,

    /// Frames per second; takes precedence over `--delay`.
    #[arg(long)]
    fps: Option<f64>,

    /// Loop count: -1 plays once, 0 loops forever, n repeats n times.
    #[arg(long, allow_hyphen_values = true)]
    repeat: Option<i32>,

    /// Quantizer sample factor (1 best, 10 default, 30 fastest).
    #[arg(long)]
    quality: Option<i32>,

    /// Transparent color as hex `RRGGBB`.
    #[arg(long)]
    transparent: Option<String>,

    /// Disposal method code (0..=3).
    #[arg(long)]
    dispose: Option<u8>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let opts = build_options(&cli)?;

    let (first_path, rest) = cli
        .frames
        .split_first()
        .context("at least one input frame is required")?;
    let first = load_frame(first_path)?;
    let mut enc = gifcast::GifEncoder::with_options(first.width(), first.height(), &opts)?;

    if let Some(parent) = cli.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let file = std::fs::File::create(&cli.out)
        .with_context(|| format!("create output '{}'", cli.out.display()))?;
    enc.add_output(gifcast::WriterOutput::new(std::io::BufWriter::new(file)))?;

    enc.start()?;
    enc.add_image(&first)
        .with_context(|| format!("encode '{}'", first_path.display()))?;
    for path in rest {
        let img = load_frame(path)?;
        enc.add_image(&img)
            .with_context(|| format!("encode '{}'", path.display()))?;
    }
    enc.finish()?;

    eprintln!(
        "wrote {} ({} frames)",
        cli.out.display(),
        enc.frames_written()
    );
    Ok(())
}

fn build_options(cli: &Cli) -> anyhow::Result<gifcast::EncoderOptions> {
    let mut opts = match &cli.options {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read options '{}'", path.display()))?;
            gifcast::EncoderOptions::from_json_str(&s)?
        }
        None => gifcast::EncoderOptions::default(),
    };
    if let Some(ms) = cli.delay {
        opts.delay_ms = ms;
        // A frame rate from the options file would otherwise take precedence.
        opts.frame_rate = None;
    }
    if let Some(fps) = cli.fps {
        opts.frame_rate = Some(fps);
    }
    if let Some(r) = cli.repeat {
        opts.repeat = gifcast::Repeat::try_from(r)?;
    }
    if let Some(q) = cli.quality {
        opts.quality = q;
    }
    if let Some(hex) = &cli.transparent {
        let v = u32::from_str_radix(hex.trim_start_matches('#'), 16)
            .with_context(|| format!("parse transparent color '{hex}'"))?;
        opts.transparent = Some(gifcast::Rgb::from_u32(v));
    }
    if let Some(code) = cli.dispose {
        opts.dispose = Some(gifcast::Disposal::try_from(code)?);
    }
    opts.validate()?;
    Ok(opts)
}

fn load_frame(path: &Path) -> anyhow::Result<image::RgbaImage> {
    let img = image::open(path).with_context(|| format!("decode frame '{}'", path.display()))?;
    Ok(img.to_rgba8())
}
