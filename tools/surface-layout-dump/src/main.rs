use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use aero_surface_layout::{
    Generation, LayoutEngine, PlatformConfig, Plane, ResourceDescriptor, Selector,
};
use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

mod report;

use report::{LayoutReport, QueryReport};

#[derive(Parser, Debug)]
#[command(
    name = "surface-layout-dump",
    version,
    about = "Compute the physical layout of a GPU surface and print it as JSON."
)]
struct Args {
    /// Platform config JSON (`{"generation": "gen9", "workarounds": "DISABLE_MIPTAIL"}`).
    /// Takes precedence over `--generation`.
    ///
    /// Environment variable: `AERO_LAYOUT_PLATFORM`.
    #[arg(long, value_name = "PATH", env = "AERO_LAYOUT_PLATFORM")]
    platform: Option<PathBuf>,

    /// Generation to use when no platform config is given.
    ///
    /// Environment variable: `AERO_LAYOUT_GENERATION`.
    #[arg(
        long,
        value_enum,
        env = "AERO_LAYOUT_GENERATION",
        default_value_t = GenerationArg::Gen9
    )]
    generation: GenerationArg,

    /// Resource descriptor JSON; `-` reads stdin.
    #[arg(long, value_name = "PATH")]
    descriptor: PathBuf,

    /// Sub-resource to resolve, as `mip,array,face,slice[,plane[,sample]]` (plane is y, u or v;
    /// sample picks a plane of an arrayed multisampled surface).
    #[arg(long = "query", value_name = "SELECTOR", value_parser = parse_selector)]
    queries: Vec<Selector>,

    /// Pretty-print the JSON output.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GenerationArg {
    Gen8,
    Gen9,
    Gen12,
}

impl From<GenerationArg> for Generation {
    fn from(arg: GenerationArg) -> Self {
        match arg {
            GenerationArg::Gen8 => Generation::Gen8,
            GenerationArg::Gen9 => Generation::Gen9,
            GenerationArg::Gen12 => Generation::Gen12,
        }
    }
}

fn parse_selector(value: &str) -> anyhow::Result<Selector> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if !(4..=6).contains(&parts.len()) {
        bail!("expected mip,array,face,slice[,plane[,sample]], got {value:?}");
    }
    let number = |index: usize, name: &str| -> anyhow::Result<u32> {
        parts[index]
            .parse()
            .with_context(|| format!("invalid {name} {:?}", parts[index]))
    };
    let plane = match parts.get(4).map(|p| p.to_ascii_lowercase()).as_deref() {
        None | Some("y") => Plane::Y,
        Some("u") => Plane::U,
        Some("v") => Plane::V,
        Some(other) => bail!("invalid plane {other:?} (expected y, u or v)"),
    };
    let sample = if parts.len() == 6 {
        number(5, "sample")?
    } else {
        0
    };
    Ok(Selector::mip(number(0, "mip")?)
        .with_array_index(number(1, "array index")?)
        .with_face(number(2, "face")?)
        .with_slice(number(3, "slice")?)
        .with_plane(plane)
        .with_sample(sample))
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("read descriptor from stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn platform_config(args: &Args) -> anyhow::Result<PlatformConfig> {
    match &args.platform {
        Some(path) => {
            let text = read_input(path)?;
            serde_json::from_str(&text)
                .with_context(|| format!("parse platform config {}", path.display()))
        }
        None => Ok(PlatformConfig::new(args.generation.into())),
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    run(Args::parse())
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = platform_config(&args)?;
    let descriptor: ResourceDescriptor = serde_json::from_str(&read_input(&args.descriptor)?)
        .with_context(|| format!("parse descriptor {}", args.descriptor.display()))?;

    let engine = LayoutEngine::from_config(&config);
    let layout = engine
        .create_layout(&descriptor)
        .context("create layout")?;
    tracing::info!(
        generation = ?config.generation,
        format = ?descriptor.format,
        size = layout.total_size(),
        "computed layout"
    );

    let queries = args
        .queries
        .iter()
        .map(|selector| {
            let offset = layout
                .query_offset(selector)
                .with_context(|| format!("query {selector:?}"))?;
            Ok(QueryReport {
                selector: *selector,
                offset,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let report = LayoutReport::new(&layout, queries);
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").context("write report")?;
    Ok(())
}
