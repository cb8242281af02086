use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{LevelFilter, info};

use polymodel::{CompileOptions, Face, PolyModel, Surface};

#[derive(Parser)]
#[command(name = "polymodel", about = "Inspect and rebuild polygon model bytecode")]
struct Args {
    /// Print every face, and log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the submodel hierarchy and faces of a model
    Dump { file: PathBuf },
    /// Decompile a model and compile it again with a fresh BSP
    Recompile {
        input: PathBuf,
        output: PathBuf,
        /// Cost of each face a splitter cuts, relative to imbalance
        #[arg(long, default_value_t = CompileOptions::default().span_weight)]
        span_weight: u32,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match args.command {
        Command::Dump { file } => dump(&file, args.verbose),
        Command::Recompile {
            input,
            output,
            span_weight,
        } => recompile(&input, &output, span_weight),
    }
}

fn load(path: &Path) -> Result<PolyModel> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let model = PolyModel::decompile(&data)
        .with_context(|| format!("decompiling {}", path.display()))?;
    info!(
        "{}: {} bytes, {} submodels, {} faces",
        path.display(),
        data.len(),
        model.submodels.len(),
        model.face_count()
    );
    Ok(model)
}

fn dump(path: &Path, verbose: bool) -> Result<()> {
    let model = load(path)?;
    for (index, submodel) in model.submodels.iter().enumerate() {
        let parent = submodel
            .parent
            .map_or_else(|| "-".to_owned(), |p| p.to_string());
        println!(
            "submodel {index} parent {parent} at {:#06x} offset {} faces {}",
            submodel.pointer,
            submodel.offset,
            submodel.faces.len()
        );
        println!(
            "  bounds {} .. {} radius {}",
            submodel.min, submodel.max, submodel.radius
        );
        if verbose {
            for face in &submodel.faces {
                println!("  {}", describe(face));
            }
        }
    }
    Ok(())
}

fn describe(face: &Face) -> String {
    let surface = match face.surface {
        Surface::Flat(color) => format!("flat {color:#06x}"),
        Surface::Textured(texture) => format!("texture {texture}"),
    };
    let points: Vec<String> = face
        .vertices
        .iter()
        .map(|v| v.position.to_string())
        .collect();
    format!("{surface} normal {}: {}", face.normal, points.join(" "))
}

fn recompile(input: &Path, output: &Path, span_weight: u32) -> Result<()> {
    let mut model = load(input)?;

    let options = CompileOptions {
        span_weight,
        ..CompileOptions::default()
    };
    model
        .compile(&options)
        .with_context(|| format!("compiling {}", input.display()))?;

    // fragments from splitting only show up in the compiled stream
    let check = PolyModel::decompile(&model.data).context("reading back compiled model")?;
    fs::write(output, &model.data).with_context(|| format!("writing {}", output.display()))?;
    info!(
        "{}: {} bytes, {} faces after splitting",
        output.display(),
        model.data.len(),
        check.face_count()
    );
    Ok(())
}
