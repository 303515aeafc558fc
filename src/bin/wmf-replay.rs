use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use wmf_replay::{
    CommandRegistry, Interpreter, Metafile, MetafileWriter, RecordingSurface, ReplaySettings,
};

#[derive(Parser, Debug)]
#[command(name = "wmf-replay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print header information and a per-record histogram.
    Info(InfoArgs),
    /// Dump decoded records (or replayed surface calls) as JSON lines.
    Dump(DumpArgs),
    /// Replay onto the CPU surface and write a PNG.
    Render(RenderArgs),
    /// Decode every record and encode it back into a new metafile.
    Reencode(ReencodeArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input metafile.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct DumpArgs {
    /// Input metafile.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Dump the draw calls produced by replay instead of the decoded records.
    #[arg(long)]
    ops: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input metafile.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Replay settings JSON.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Output width in pixels (overrides the settings file).
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (overrides the settings file).
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Parser, Debug)]
struct ReencodeArgs {
    /// Input metafile.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output metafile.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Dump(args) => cmd_dump(args),
        Command::Render(args) => cmd_render(args),
        Command::Reencode(args) => cmd_reencode(args),
    }
}

fn read_metafile(path: &Path) -> anyhow::Result<Metafile> {
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    let mf = Metafile::parse(&bytes).with_context(|| format!("parse '{}'", path.display()))?;
    Ok(mf)
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let mf = read_metafile(&args.in_path)?;

    if let Some(p) = mf.placeable {
        println!(
            "placeable: bounds=({}, {})-({}, {}) units_per_inch={}",
            p.bounds.left, p.bounds.top, p.bounds.right, p.bounds.bottom, p.units_per_inch
        );
    }
    println!(
        "header: version=0x{:04x} size_words={} objects={} max_record_words={}",
        mf.header.version, mf.header.size_words, mf.header.object_count, mf.header.max_record_words
    );
    println!("records: {}", mf.records.len());

    let mut counts = std::collections::BTreeMap::<u16, usize>::new();
    for r in &mf.records {
        *counts.entry(r.opcode()).or_default() += 1;
    }
    for (op, n) in counts {
        let name = CommandRegistry::name(op).unwrap_or("?");
        println!("  0x{op:04x} {name:<24} {n}");
    }
    Ok(())
}

fn cmd_dump(args: DumpArgs) -> anyhow::Result<()> {
    let mf = read_metafile(&args.in_path)?;

    if args.ops {
        let mut surface = RecordingSurface::new();
        let report = Interpreter::new(ReplaySettings::default().with_env_overrides())
            .run(&mf.records, &mut surface)?;
        for op in surface.ops() {
            println!("{}", serde_json::to_string(op)?);
        }
        eprintln!(
            "replayed {} of {} records ({} failed)",
            report.replayed,
            report.records,
            report.failures.len()
        );
        return Ok(());
    }

    for (index, record) in mf.records.iter().enumerate() {
        match CommandRegistry::decode(record) {
            Ok(cmd) => println!("{}", serde_json::to_string(&cmd)?),
            Err(err) => eprintln!("record {index}: {err}"),
        }
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mf = read_metafile(&args.in_path)?;

    let mut settings = match &args.settings {
        Some(path) => ReplaySettings::from_json_path(path)?,
        None => ReplaySettings::default(),
    }
    .with_env_overrides();
    if args.width.is_some() {
        settings.width = args.width;
    }
    if args.height.is_some() {
        settings.height = args.height;
    }

    let (frame, report) = wmf_replay::render_metafile(&mf, &settings)?;
    for failure in &report.failures {
        eprintln!(
            "record {} (0x{:04x}): {}",
            failure.index, failure.opcode, failure.error
        );
    }

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_unpremultiplied(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_reencode(args: ReencodeArgs) -> anyhow::Result<()> {
    let mf = read_metafile(&args.in_path)?;

    let commands = mf
        .records
        .iter()
        .enumerate()
        .map(|(i, r)| CommandRegistry::decode(r).with_context(|| format!("decode record {i}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut writer = MetafileWriter::new();
    if let Some(p) = mf.placeable {
        writer = writer.with_placeable(p);
    }
    let bytes = writer.commands_to_bytes(&commands)?;
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write '{}'", args.out.display()))?;

    eprintln!("wrote {} ({} records)", args.out.display(), commands.len());
    Ok(())
}
