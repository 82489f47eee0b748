use std::{
    fs,
    path::{Path, PathBuf},
};

use ambientfx::{
    AnnotationScope, HostEvent, LayoutPolicy, Millis, OverlayConfig, Point, ReactiveOverlay,
    SvgMount, TimerHost as _, TimerTarget as _, Typewriter, TypewriterConfig, TypewriterOutput,
    VirtualHost, Viewport,
};
use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser, Debug)]
#[command(name = "ambientfx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Annotate drawable elements of an SVG document.
    Annotate(AnnotateArgs),
    /// Print the reference point of every annotated shape.
    Layout(LayoutArgs),
    /// Print which shapes are active for a pointer position.
    Pointer(PointerArgs),
    /// Render the overlay as a PNG, highlighting active shapes.
    Snapshot(SnapshotArgs),
    /// Simulate a typewriter reveal on a virtual clock.
    Type(TypeArgs),
}

#[derive(Parser, Debug)]
struct AnnotateArgs {
    /// Input SVG.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output SVG path. Annotated markup goes to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Which drawable elements receive ids.
    #[arg(long, value_enum, default_value_t = ScopeChoice::Rendered)]
    scope: ScopeChoice,
}

#[derive(clap::Args, Debug)]
struct OverlayArgs {
    /// Input SVG.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Viewport width.
    #[arg(long)]
    width: f64,

    /// Viewport height.
    #[arg(long)]
    height: f64,

    /// Overlay configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Layout policy, overriding the configuration file.
    #[arg(long, value_enum)]
    policy: Option<PolicyChoice>,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    #[command(flatten)]
    overlay: OverlayArgs,
}

#[derive(Parser, Debug)]
struct PointerArgs {
    #[command(flatten)]
    overlay: OverlayArgs,

    /// Pointer x in viewport coordinates.
    #[arg(long)]
    x: f64,

    /// Pointer y in viewport coordinates.
    #[arg(long)]
    y: f64,

    /// Evaluate with suppression raised.
    #[arg(long)]
    suppressed: bool,
}

#[derive(Parser, Debug)]
struct SnapshotArgs {
    #[command(flatten)]
    overlay: OverlayArgs,

    /// Pointer x in viewport coordinates.
    #[arg(long, requires = "y")]
    x: Option<f64>,

    /// Pointer y in viewport coordinates.
    #[arg(long, requires = "x")]
    y: Option<f64>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct TypeArgs {
    /// Text to reveal.
    #[arg(long)]
    text: String,

    /// Typewriter configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep simulating until this time. Without it the run ends at completion.
    #[arg(long)]
    until_ms: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScopeChoice {
    Rendered,
    Outermost,
}

impl From<ScopeChoice> for AnnotationScope {
    fn from(value: ScopeChoice) -> Self {
        match value {
            ScopeChoice::Rendered => Self::Rendered,
            ScopeChoice::Outermost => Self::Outermost,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyChoice {
    Measured,
    Procedural,
}

impl From<PolicyChoice> for LayoutPolicy {
    fn from(value: PolicyChoice) -> Self {
        match value {
            PolicyChoice::Measured => Self::Measured,
            PolicyChoice::Procedural => Self::Procedural,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ambientfx=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Annotate(args) => cmd_annotate(args),
        Command::Layout(args) => cmd_layout(args),
        Command::Pointer(args) => cmd_pointer(args),
        Command::Snapshot(args) => cmd_snapshot(args),
        Command::Type(args) => cmd_type(args),
    }
}

fn read_text(path: &Path, what: &str) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {what} '{}'", path.display()))
}

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_annotate(args: AnnotateArgs) -> anyhow::Result<()> {
    let svg = read_text(&args.in_path, "svg")?;
    let doc = ambientfx::annotate_with(&svg, args.scope.into());

    match &args.out {
        Some(out) => {
            create_parent_dir(out)?;
            fs::write(out, doc.markup()).with_context(|| format!("write svg '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{}", doc.markup()),
    }
    for id in doc.ids() {
        eprintln!("{id}");
    }
    Ok(())
}

/// Start an overlay over the input document, mounted through `usvg`.
fn start_overlay(
    args: &OverlayArgs,
    host: &mut VirtualHost,
) -> anyhow::Result<ReactiveOverlay<SvgMount>> {
    let mut config = match &args.config {
        Some(path) => OverlayConfig::from_json(&read_text(path, "overlay config")?)
            .with_context(|| format!("parse overlay config '{}'", path.display()))?,
        None => OverlayConfig::default(),
    };
    if let Some(policy) = args.policy {
        config.policy = policy.into();
    }

    let svg = read_text(&args.in_path, "svg")?;
    let viewport = Viewport::new(args.width, args.height);
    let mut overlay = ReactiveOverlay::new(config, SvgMount::new().with_system_fonts(), viewport);
    overlay.start(&svg, host);
    Ok(overlay)
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let mut host = VirtualHost::new();
    let overlay = start_overlay(&args.overlay, &mut host)?;
    println!("{}", serde_json::to_string_pretty(&overlay.snapshot())?);
    Ok(())
}

fn cmd_pointer(args: PointerArgs) -> anyhow::Result<()> {
    let mut host = VirtualHost::new();
    let mut overlay = start_overlay(&args.overlay, &mut host)?;
    overlay.set_suppressed(args.suppressed);
    overlay.on_event(HostEvent::PointerMove(Point::new(args.x, args.y)));
    println!("{}", serde_json::to_string(&overlay.active_ids())?);
    Ok(())
}

fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let mut host = VirtualHost::new();
    let mut overlay = start_overlay(&args.overlay, &mut host)?;
    if let (Some(x), Some(y)) = (args.x, args.y) {
        overlay.on_event(HostEvent::PointerMove(Point::new(x, y)));
    }

    let active = overlay.active_ids();
    let doc = overlay
        .document()
        .context("overlay has no document after start (bug)")?;
    let snap = ambientfx::render_snapshot(
        doc,
        active.iter().map(String::as_str),
        overlay.viewport(),
    )?;

    create_parent_dir(&args.out)?;
    // snapshots are opaque, so premultiplied and straight alpha agree
    image::save_buffer_with_format(
        &args.out,
        &snap.rgba8_premul,
        snap.width,
        snap.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} ({} active)", args.out.display(), active.len());
    Ok(())
}

#[derive(serde::Serialize)]
struct TypeFrame<'a> {
    t_ms: u64,
    #[serde(flatten)]
    output: &'a TypewriterOutput,
}

fn cmd_type(args: TypeArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => TypewriterConfig::from_json(&read_text(path, "typewriter config")?)
            .with_context(|| format!("parse typewriter config '{}'", path.display()))?,
        None => TypewriterConfig::default(),
    };

    let mut host = VirtualHost::new();
    let mut tw = Typewriter::new(config);
    tw.start(&args.text, &mut host);

    let mut last = tw.output();
    print_frame(0, &last)?;

    let limit = Millis(args.until_ms.unwrap_or(u64::MAX));
    while let Some(id) = host.pop_due(limit) {
        tw.on_timer(id, &mut host);
        let out = tw.output();
        if out != last {
            print_frame(host.now().0, &out)?;
            last = out;
        }
        if args.until_ms.is_none() && tw.is_complete() {
            break;
        }
    }

    tw.stop(&mut host);
    Ok(())
}

fn print_frame(t_ms: u64, output: &TypewriterOutput) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(&TypeFrame { t_ms, output })?);
    Ok(())
}
