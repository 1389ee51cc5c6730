//! NWN2MDK CLI
//!
//! Import MDB/GR2 files into a scene document and export scene documents
//! back to the game formats through the NWN2MDK converters.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use nwn2mdk_metadata::{MetadataSchema, Scene, SceneObject};
use nwn2mdk_pipeline::logging::{self, TracingConfig};
use nwn2mdk_pipeline::{
    DocumentHost, ExportReport, ExportRequest, ImportRequest, Pipeline, PipelineConfig,
};

/// NWN2MDK - Neverwinter Nights 2 model conversion pipeline
#[derive(Parser)]
#[command(name = "nwn2mdk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// JSON pipeline configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing nw2fbx and fbx2nw
    #[arg(long, global = true)]
    tools_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {s}")),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Import MDB/GR2 files into a scene document
    Import(ImportArgs),

    /// Export a scene document as an MDB model
    ExportMdb(ExportMdbArgs),

    /// Export a scene document as a GR2 skeleton or animation
    ExportGr2(ExportGr2Args),

    /// Fold legacy annotations into typed metadata
    Migrate(SceneArgs),

    /// Print the objects of a scene document
    Show(SceneArgs),
}

#[derive(Args)]
struct SceneArgs {
    /// Scene document
    #[arg(short, long)]
    scene: PathBuf,
}

#[derive(Args)]
struct ImportArgs {
    /// Scene document, created if absent
    #[arg(short, long)]
    scene: PathBuf,

    /// Keep bone orientation as stored in the file
    #[arg(long)]
    no_bone_orientation: bool,

    /// Files to import; the first one selects the working directory
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Args)]
struct ExportMdbArgs {
    /// Scene document
    #[arg(short, long)]
    scene: PathBuf,

    /// Output MDB file
    output: PathBuf,
}

#[derive(Args)]
struct ExportGr2Args {
    /// Scene document
    #[arg(short, long)]
    scene: PathBuf,

    /// Output GR2 file
    output: PathBuf,

    /// Bake keyframe animation
    #[arg(long)]
    bake: bool,

    /// Baked keyframe simplification (0 disables it)
    #[arg(long, default_value = "1.0", requires = "bake")]
    simplify: f32,
}

fn setup_logging(verbosity: u8) {
    logging::init_with_config(TracingConfig::from_verbosity(verbosity));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.tools_dir)?;
    debug!(tools_dir = %config.tools_dir.display(), "Using converters");

    match cli.command {
        Commands::Import(args) => cmd_import(args, config, cli.format),
        Commands::ExportMdb(args) => {
            let request = ExportRequest::mdb(&args.output);
            cmd_export(&args.scene, &request, config, cli.format)
        }
        Commands::ExportGr2(args) => {
            let request = ExportRequest::gr2(&args.output, args.bake.then_some(args.simplify))?;
            cmd_export(&args.scene, &request, config, cli.format)
        }
        Commands::Migrate(args) => cmd_migrate(args, cli.format),
        Commands::Show(args) => cmd_show(args, cli.format),
    }
}

/// Defaults, then the config file, then `NWN2MDK_TOOLS_DIR`, then `--tools-dir`
fn load_config(path: Option<&Path>, tools_dir: Option<PathBuf>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::load(path)?,
        None => {
            let mut config = PipelineConfig::default();
            if let Some(dir) = std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
                config.tools_dir = dir;
            }
            config
        }
    };

    let config = config.with_env_overrides();
    Ok(match tools_dir {
        Some(dir) => config.with_tools_dir(dir),
        None => config,
    })
}

fn load_or_new(path: &Path) -> Result<Scene> {
    if path.exists() {
        Ok(Scene::load(path)?)
    } else {
        info!(scene = %path.display(), "Creating new scene document");
        Ok(Scene::new())
    }
}

fn cmd_import(args: ImportArgs, config: PipelineConfig, format: OutputFormat) -> Result<()> {
    let mut scene = load_or_new(&args.scene)?;

    let files = args
        .files
        .iter()
        .map(std::path::absolute)
        .collect::<std::io::Result<Vec<_>>>()
        .context("Failed to resolve input files")?;
    let request = ImportRequest::new(&files[0])
        .with_files(files.iter().cloned())
        .with_bone_orientation(!args.no_bone_orientation);

    let mut pipeline = Pipeline::new(config, DocumentHost::new());
    let report = pipeline.import(&mut scene, &request).context("Import failed")?;
    scene.save(&args.scene)?;

    let imported: Vec<&SceneObject> = report.objects.iter().map(|&i| &scene.objects[i]).collect();

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "scene": args.scene.display().to_string(),
                "converter": report.converter.to_string(),
                "log": report.log_path.display().to_string(),
                "objects": imported,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if !report.converter.is_success() {
                println!("Converter {}; see {}", report.converter, report.log_path.display());
            }
            println!("Imported {} objects into {}", imported.len(), args.scene.display());
            for object in imported {
                println!("  {:<32} {}", object.name, object.schema.kind());
            }
        }
    }

    Ok(())
}

fn cmd_export(
    scene_path: &Path,
    request: &ExportRequest,
    config: PipelineConfig,
    format: OutputFormat,
) -> Result<()> {
    let mut scene = Scene::load(scene_path)?;

    let mut pipeline = Pipeline::new(config, DocumentHost::new());
    let report = pipeline.export(&mut scene, request).context("Export failed")?;

    print_export(&report, format)?;

    if let Some(message) = report.report() {
        bail!(message.message);
    }
    Ok(())
}

fn print_export(report: &ExportReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "output": report.output.display().to_string(),
                "success": report.is_success(),
                "converter": report.converter.to_string(),
                "log": report.log_path.display().to_string(),
                "report": report.report(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if report.is_success() {
                println!("Exported {}", report.output.display());
            }
        }
    }
    Ok(())
}

fn cmd_migrate(args: SceneArgs, format: OutputFormat) -> Result<()> {
    let mut scene = Scene::load(&args.scene)?;
    let migrated = scene.adopt_legacy_annotations();
    scene.save(&args.scene)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "scene": args.scene.display().to_string(),
                "objects": scene.len(),
                "migrated": migrated,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Migrated {migrated} of {} objects", scene.len());
        }
    }
    Ok(())
}

fn cmd_show(args: SceneArgs, format: OutputFormat) -> Result<()> {
    let scene = Scene::load(&args.scene)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&scene)?);
        }
        OutputFormat::Text => {
            println!("{} ({} objects)", args.scene.display(), scene.len());
            for object in scene.iter() {
                print_object(object);
            }
        }
    }
    Ok(())
}

fn print_object(object: &SceneObject) {
    println!();
    println!("{}", object.name);
    match &object.schema {
        MetadataSchema::Unclassified => println!("  Unclassified"),
        MetadataSchema::Mesh(mesh) => {
            println!("  Mesh");
            println!("    Tint map:          {}", mesh.tint_map().unwrap_or("-"));
            println!("    Diffuse color:     {:?}", mesh.diffuse_color.to_array());
            println!("    Specular color:    {:?}", mesh.specular_color.to_array());
            println!("    Specular level:    {}", mesh.specular_level);
            println!("    Glossiness:        {}", mesh.glossiness);
            println!("    Transparency mask: {}", mesh.use_transparency_mask);
            println!("    Head:              {}", mesh.is_head);
            println!("    No shadows:        {}", mesh.cast_no_shadows);
            println!("    Environment map:   {}", mesh.use_environment_map);
            println!("    Glow:              {}", mesh.glow);
            println!("    Projected tex:     {}", mesh.receive_projected_textures);
        }
        MetadataSchema::HairInfo { shortening_behavior } => {
            println!("  Hair info: {shortening_behavior}");
        }
        MetadataSchema::HelmInfo { hair_hiding_behavior } => {
            println!("  Helm info: {hair_hiding_behavior}");
        }
    }
    for (key, value) in object.annotations.iter() {
        println!("  {key} = {value}");
    }
}
