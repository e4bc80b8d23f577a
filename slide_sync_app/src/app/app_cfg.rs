use std::path::PathBuf;

use slide_sync_lib::DetectOptions;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportVerbosity {
    Quiet,
    Default,
    Verbose,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    Normal,
    Json,
}

// Where the ordered list of slide images comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlidesCfg {
    Paths(Vec<PathBuf>),
    Manifest {
        manifest_path: PathBuf,
        slides_dir: PathBuf,
        entry: usize,
    },
}

#[derive(Debug, Clone)]
pub struct OutputCfg {
    pub format: OutputFormat,
    pub verbosity: ReportVerbosity,
}

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub video: Option<PathBuf>,
    pub slides: SlidesCfg,

    // Only verify that every slide in the manifest exists.
    pub check_manifest: bool,

    pub detect_opts: DetectOptions,
    pub output_cfg: OutputCfg,
}
