use std::path::PathBuf;

use clap::Parser;

/// Atlas generation parameters.
#[derive(Debug, Clone)]
pub struct AtlasConfig {
    pub width: u32,
    pub height: u32,
    pub visualize: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            visualize: true,
        }
    }
}

/// Fully resolved pipeline configuration (constructed from CLI args).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub atlas: AtlasConfig,
    pub dry_run: bool,
    pub verbose: bool,
    pub threads: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            atlas: AtlasConfig::default(),
            dry_run: false,
            verbose: false,
            threads: None,
        }
    }
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "lumel",
    about = "Lightmap UV atlas generator for triangle meshes",
    version
)]
pub struct CliArgs {
    /// Input mesh file (OBJ)
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Output directory
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    /// Atlas width in pixels
    #[arg(long, default_value_t = 512)]
    pub atlas_width: u32,

    /// Atlas height in pixels
    #[arg(long, default_value_t = 512)]
    pub atlas_height: u32,

    /// Skip rendering the atlas debug image
    #[arg(long)]
    pub no_atlas_image: bool,

    /// Scan input and report stats only
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Worker thread count (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl From<CliArgs> for PipelineConfig {
    fn from(args: CliArgs) -> Self {
        PipelineConfig {
            input: args.input,
            output: args.output,
            atlas: AtlasConfig {
                width: args.atlas_width,
                height: args.atlas_height,
                visualize: !args.no_atlas_image,
            },
            dry_run: args.dry_run,
            verbose: args.verbose,
            threads: args.threads,
        }
    }
}
