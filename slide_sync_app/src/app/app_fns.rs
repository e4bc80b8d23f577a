use std::{
    error::Error,
    io::{BufWriter, Write},
    path::PathBuf,
};

use eyre::WrapErr;
use slide_sync_lib::{manifest, FfmpegVideoSource, Timeline, TransitionDetector};

use crate::app::*;

pub fn run_app() -> i32 {
    let cfg = arg_parse::parse_args();
    configure_logs(cfg.output_cfg.verbosity);

    let ret = match run_app_inner(&cfg) {
        Ok(()) => 0,
        Err(fatal_error) => {
            print_fatal_err(fatal_error, cfg.output_cfg.verbosity);
            1
        }
    };

    ret
}

fn run_app_inner(cfg: &AppCfg) -> eyre::Result<()> {
    if cfg.check_manifest {
        return check_manifest(cfg);
    }

    let slides = resolve_slides(&cfg.slides)?;

    let video_path = cfg
        .video
        .as_deref()
        .ok_or_else(|| eyre::Report::msg("no video was given (use --video)"))?;

    if !slide_sync_lib::ffmpeg_is_available() {
        return Err(AppError::FfmpegNotFound.into());
    }

    info!(
        "Aligning {} against {} slides",
        video_path.display(),
        slides.len()
    );

    let source = FfmpegVideoSource::new(video_path);
    let timeline = TransitionDetector::from_options(cfg.detect_opts)
        .detect(&source, &slides)
        .map_err(AppError::from)
        .wrap_err_with(|| format!("Failed to process {}", video_path.display()))?;

    print_timeline(&timeline, cfg.output_cfg.format);

    Ok(())
}

// Turn the slide configuration into an ordered list of slide image paths.
fn resolve_slides(slides_cfg: &SlidesCfg) -> eyre::Result<Vec<PathBuf>> {
    match slides_cfg {
        SlidesCfg::Paths(paths) => Ok(paths.clone()),
        SlidesCfg::Manifest {
            manifest_path,
            slides_dir,
            entry,
        } => {
            let entries = manifest::load_manifest(manifest_path).map_err(AppError::from)?;

            let Some(chosen) = entries.get(*entry) else {
                return Err(AppError::NoSuchEntry {
                    manifest: manifest_path.clone(),
                    entry: *entry,
                    len: entries.len(),
                }
                .into());
            };

            let paths = chosen.slide_paths(slides_dir);
            if paths.is_empty() {
                return Err(AppError::EmptyEntry {
                    entry: *entry,
                    video_url: chosen.video_url.clone(),
                }
                .into());
            }

            debug!("Manifest entry {entry} is {}", chosen.video_url);
            Ok(paths)
        }
    }
}

#[allow(clippy::print_stdout)]
fn check_manifest(cfg: &AppCfg) -> eyre::Result<()> {
    let SlidesCfg::Manifest {
        manifest_path,
        slides_dir,
        ..
    } = &cfg.slides
    else {
        return Err(eyre::Report::msg("--check-manifest requires --manifest"));
    };

    let entries = manifest::load_manifest(manifest_path).map_err(AppError::from)?;
    let missing = manifest::missing_slides(&entries, slides_dir);

    for path in &missing {
        println!("{}", path.display());
    }

    if missing.is_empty() {
        info!(
            "All slides referenced by {} entries are present in {}",
            entries.len(),
            slides_dir.display()
        );
        Ok(())
    } else {
        Err(AppError::MissingSlides(missing.len()).into())
    }
}

#[allow(clippy::print_stdout)]
fn print_timeline(timeline: &Timeline, format: OutputFormat) {
    match format {
        OutputFormat::Normal => {
            println!("{:>5}  {:>10}  {:>10}  path", "slide", "start", "end");
            for interval in timeline.intervals() {
                println!(
                    "{:>5}  {:>10.3}  {:>10.3}  {}",
                    interval.slide_index(),
                    interval.start_time(),
                    interval.end_time(),
                    interval.slide_path().display()
                );
            }
        }
        OutputFormat::Json => {
            let mut stdout = BufWriter::new(std::io::stdout());
            serde_json::to_writer_pretty(&mut stdout, timeline.intervals()).unwrap_or_default();
            let _ = writeln!(stdout);
        }
    }

    let stats = timeline.stats();
    if stats.frames_sampled > 0 && stats.frames_unmatched == stats.frames_sampled {
        warn!("No sampled frame matched any slide. Try a higher --threshold.");
    }
    if stats.frames_skipped > 0 {
        warn!("{} frames could not be decoded and were skipped", stats.frames_skipped);
    }
}

fn print_fatal_err(fatal_err: eyre::Report, verbosity: ReportVerbosity) {
    error!(target: "app-errorlog", "{}", fatal_err);

    if verbosity == ReportVerbosity::Verbose {
        let mut source: Option<&(dyn Error + 'static)> = fatal_err.source();
        while let Some(e) = source {
            error!(target: "app-errorlog", "    caused by: {}", e);
            source = e.source();
        }
    }
}

pub fn configure_logs(verbosity: ReportVerbosity) {
    use simplelog::*;

    let mut cfg = simplelog::ConfigBuilder::new();
    cfg.set_target_level(LevelFilter::Error);

    let min_loglevel = match verbosity {
        ReportVerbosity::Quiet => LevelFilter::Warn,
        ReportVerbosity::Default => LevelFilter::Info,
        ReportVerbosity::Verbose => LevelFilter::Trace,
    };

    TermLogger::init(
        min_loglevel,
        cfg.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("TermLogger failed to initialize");
}
