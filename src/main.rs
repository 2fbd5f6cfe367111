//! PMT command-line importer
//!
//! Decodes `.mesh`, `.anim` and `.skel` files, prints what was recovered and
//! exports scenes to JSON or OBJ.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use pmt_export::{
    import_animation, import_mesh, import_skeleton, JsonSceneBuilder, ObjWriter, SceneBuilder,
};
use pmt_parsers::logging::{init_with_config, TracingConfig};
use pmt_parsers::{
    decode_batch, decode_file, file_stem, AssetKind, BatchSummary, DecodedAsset, HumanReadable,
    MeshFormat, ParseOptions,
};

/// PMT - importer for reverse-engineered mesh, animation and skeleton files
#[derive(Parser)]
#[command(name = "pmt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for summaries
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Decoder options as JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep the stored V coordinate instead of flipping it
    #[arg(long, global = true)]
    no_flip_uv: bool,

    /// Accept face indices past the vertex count
    #[arg(long, global = true)]
    no_validate_faces: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExportTarget {
    Json,
    Obj,
}

impl std::str::FromStr for ExportTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportTarget::Json),
            "obj" => Ok(ExportTarget::Obj),
            _ => Err(format!("Unknown export target: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a mesh file
    Mesh(MeshArgs),

    /// Decode an animation file
    Anim(FileArgs),

    /// Decode a skeleton file
    Skel(FileArgs),

    /// Decode many files in parallel
    Batch(BatchArgs),

    /// Decode a file and write it as a scene
    Export(ExportArgs),
}

#[derive(Args)]
struct MeshArgs {
    /// Path to the .mesh file
    path: PathBuf,

    /// Mesh layout: prop, map or wcm
    #[arg(short = 't', long = "type", default_value = "prop")]
    layout: MeshFormat,
}

#[derive(Args)]
struct FileArgs {
    /// Path to the file
    path: PathBuf,
}

#[derive(Args)]
struct BatchArgs {
    /// Files or directories to decode
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Layout used for every .mesh file
    #[arg(short = 't', long = "type", default_value = "prop")]
    layout: MeshFormat,
}

#[derive(Args)]
struct ExportArgs {
    /// Input asset
    input: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Export target: json or obj
    #[arg(long, default_value = "json")]
    to: ExportTarget,

    /// Mesh layout when the input is a .mesh file
    #[arg(short = 't', long = "type", default_value = "prop")]
    layout: MeshFormat,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_with_config(TracingConfig::for_verbosity(cli.verbose));

    let options = load_options(&cli)?;

    match cli.command {
        Commands::Mesh(args) => {
            cmd_decode(&args.path, AssetKind::Mesh(args.layout), &options, cli.format)
        }
        Commands::Anim(args) => cmd_decode(&args.path, AssetKind::Anim, &options, cli.format),
        Commands::Skel(args) => cmd_decode(&args.path, AssetKind::Skel, &options, cli.format),
        Commands::Batch(args) => cmd_batch(args, &options, cli.format),
        Commands::Export(args) => cmd_export(args, &options),
    }
}

/// Options from `--config`, then command-line overrides
fn load_options(cli: &Cli) -> Result<ParseOptions> {
    let mut options = match &cli.config {
        Some(path) => ParseOptions::from_json_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => ParseOptions::default(),
    };

    if cli.no_flip_uv {
        options.flip_uv_v = false;
    }
    if cli.no_validate_faces {
        options.validate_face_indices = false;
    }
    Ok(options)
}

fn emit<T: HumanReadable>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value.to_json())?),
        OutputFormat::Yaml => print!("{}", value.to_yaml()),
        OutputFormat::Text => print!("{}", value.to_readable_string()),
    }
    Ok(())
}

fn cmd_decode(
    path: &Path,
    kind: AssetKind,
    options: &ParseOptions,
    format: OutputFormat,
) -> Result<()> {
    if !path.exists() {
        bail!("File not found: {:?}", path);
    }

    let asset = decode_file(path, kind, options)
        .with_context(|| format!("Failed to decode {:?}", path))?;

    if !asset.outcome().is_complete() {
        warn!(path = %path.display(), outcome = %asset.outcome(), "Partial result");
    }
    emit(&asset, format)
}

/// Expand directories to the supported files directly inside them
fn collect_inputs(paths: &[PathBuf], layout: MeshFormat) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(path)
                .with_context(|| format!("Failed to read directory {:?}", path))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && AssetKind::from_path(p, layout).is_some())
                .collect();
            found.sort();
            inputs.extend(found);
        } else {
            inputs.push(path.clone());
        }
    }
    Ok(inputs)
}

fn cmd_batch(args: BatchArgs, options: &ParseOptions, format: OutputFormat) -> Result<()> {
    let inputs = collect_inputs(&args.paths, args.layout)?;
    info!("Decoding {} files", inputs.len());

    let items = decode_batch(&inputs, args.layout, options);
    let summary = BatchSummary::from_items(&items);

    match format {
        OutputFormat::Text => {
            println!("{:<10} {:<8} {}", "Status", "Units", "Path");
            println!("{:-<10} {:-<8} {:-<50}", "", "", "");
            for item in &items {
                match &item.result {
                    Ok(asset) => {
                        let status = if asset.outcome().is_complete() { "complete" } else { "partial" };
                        println!("{:<10} {:<8} {}", status, asset.unit_count(), item.path.display());
                    }
                    Err(e) => println!("{:<10} {:<8} {} ({})", "failed", "-", item.path.display(), e),
                }
            }
            println!(
                "\nTotal: {} files, {} complete, {} partial, {} failed",
                summary.total(),
                summary.complete,
                summary.partial,
                summary.failed
            );
        }
        _ => {
            let files: Vec<_> = items
                .iter()
                .map(|item| match &item.result {
                    Ok(asset) => serde_json::json!({
                        "path": item.path,
                        "units": asset.unit_count(),
                        "outcome": asset.outcome().to_json(),
                    }),
                    Err(e) => serde_json::json!({
                        "path": item.path,
                        "error": e.to_string(),
                    }),
                })
                .collect();
            let report = serde_json::json!({
                "files": files,
                "complete": summary.complete,
                "partial": summary.partial,
                "failed": summary.failed,
            });
            if format == OutputFormat::Yaml {
                print!("{}", serde_yaml::to_string(&report)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
    }

    if summary.total() > 0 && summary.failed == summary.total() {
        bail!("No file could be decoded");
    }
    Ok(())
}

/// Feed one decoded asset into a builder
fn import_asset<B>(builder: &mut B, asset: &DecodedAsset, stem: &str) -> Result<usize>
where
    B: SceneBuilder,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let count = match asset {
        DecodedAsset::Mesh(mesh) => import_mesh(builder, mesh, stem)?,
        DecodedAsset::Anim(clip) => import_animation(builder, clip)?,
        DecodedAsset::Skel(skeleton) => import_skeleton(builder, skeleton, stem)?,
    };
    Ok(count)
}

fn cmd_export(args: ExportArgs, options: &ParseOptions) -> Result<()> {
    let kind = AssetKind::from_path(&args.input, args.layout)
        .with_context(|| format!("Unsupported input {:?}", args.input))?;
    let asset = decode_file(&args.input, kind, options)
        .with_context(|| format!("Failed to decode {:?}", args.input))?;
    let stem = file_stem(&args.input);

    let count = match args.to {
        ExportTarget::Json => {
            let mut builder = JsonSceneBuilder::with_options(pmt_export::JsonExportOptions {
                pretty: !args.compact,
                include_metadata: true,
            })
            .source(args.input.display().to_string());
            let count = import_asset(&mut builder, &asset, &stem)?;
            builder
                .write(&args.output)
                .with_context(|| format!("Failed to write {:?}", args.output))?;
            count
        }
        ExportTarget::Obj => {
            let mut writer = ObjWriter::create(&args.output)
                .with_context(|| format!("Failed to create {:?}", args.output))?;
            let count = import_asset(&mut writer, &asset, &stem)?;
            writer.finish()?;
            count
        }
    };

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        count,
        outcome = %asset.outcome(),
        "Export complete"
    );
    println!("Exported {} object(s) to {:?}", count, args.output);
    Ok(())
}
