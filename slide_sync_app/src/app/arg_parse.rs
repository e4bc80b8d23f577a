use std::path::{Path, PathBuf};

use clap::{value_parser, ArgAction::*};
use slide_sync_lib::*;

use crate::app::*;

// inputs
const VIDEO: &str = "Video file";
const SLIDES: &str = "Slide images";
const MANIFEST: &str = "Manifest file";
const SLIDES_DIR: &str = "Slides directory";
const ENTRY: &str = "Manifest entry";
const CHECK_MANIFEST: &str = "Check manifest";

// detection configuration
const SAMPLE_INTERVAL: &str = "Sample interval";
const THRESHOLD: &str = "Match threshold";
const HASH_SIZE: &str = "Hash size";

// output settings
const OUTPUT_FORMAT: &str = "Format";

// Arg specification
const ARGS_FILE: &str = "Args file";

//Verbosity
const VERBOSITY_QUIET: &str = "Quiet";
const VERBOSITY_VERBOSE: &str = "Verbose";

const DISPLAY_ORDERING: [&str; 13] = [
    //
    //inputs
    VIDEO,
    SLIDES,
    MANIFEST,
    SLIDES_DIR,
    ENTRY,
    CHECK_MANIFEST,
    //
    //detection
    SAMPLE_INTERVAL,
    THRESHOLD,
    HASH_SIZE,
    //
    //outputs
    OUTPUT_FORMAT,
    //
    //verbosity
    VERBOSITY_QUIET,
    VERBOSITY_VERBOSE,
    //argument replacement
    ARGS_FILE,
];

fn build_app() -> clap::Command {
    let get_ordering = |arg_name: &str| -> usize {
        match DISPLAY_ORDERING.iter().position(|x| *x == arg_name) {
            Some(idx) => idx,
            None => {
                panic!("argument not assigned a display order: {arg_name:?}");
            }
        }
    };

    //args are not added through method chaining because rustfmt struggles with very long expressions.
    let mut clap_app = clap::Command::new("Slide sync")
        .version(clap::crate_version!())
        .about("Find which presentation slide is on screen at each point of a video");

    clap_app = clap_app.arg(
        clap::Arg::new(VIDEO)
            .long("video")
            .required_unless_present_any([ARGS_FILE, CHECK_MANIFEST])
            .num_args(1)
            .value_parser(value_parser!(PathBuf))
            .help("The presentation video to align against the slides")
            .display_order(get_ordering(VIDEO)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(SLIDES)
            .long("slides")
            .required_unless_present_any([ARGS_FILE, MANIFEST])
            .conflicts_with(MANIFEST)
            .num_args(1..)
            .value_parser(value_parser!(PathBuf))
            .action(Append)
            .help("Slide images in deck order. The first image is slide 0.")
            .display_order(get_ordering(SLIDES)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MANIFEST)
            .long("manifest")
            .num_args(1)
            .value_parser(value_parser!(PathBuf))
            .help("Take the slide images from a JSON manifest instead of --slides. The manifest is a list of {\"video_url\", \"slides\": {key: filename}} entries")
            .display_order(get_ordering(MANIFEST)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(SLIDES_DIR)
            .long("slides-dir")
            .num_args(1)
            .value_parser(value_parser!(PathBuf))
            .default_value("slides")
            .help("Directory containing the slide images named in the manifest")
            .display_order(get_ordering(SLIDES_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(ENTRY)
            .long("entry")
            .num_args(1)
            .value_parser(value_parser!(usize))
            .default_value("0")
            .help("Which entry of the manifest describes the video (counting from 0)")
            .display_order(get_ordering(ENTRY)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(CHECK_MANIFEST)
            .long("check-manifest")
            .requires(MANIFEST)
            .action(SetTrue)
            .num_args(0)
            .help("Do not detect anything. Print every slide image referenced by the manifest that does not exist")
            .display_order(get_ordering(CHECK_MANIFEST)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(SAMPLE_INTERVAL)
            .long("sample-interval")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .default_value(DEFAULT_SAMPLE_INTERVAL_SECS.to_string())
            .help("Seconds between sampled video frames. Transitions are located to within this interval, but smaller values take longer")
            .display_order(get_ordering(SAMPLE_INTERVAL)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(THRESHOLD)
            .long("threshold")
            .num_args(1)
            .value_parser(value_parser!(u32))
            .default_value(DEFAULT_MATCH_THRESHOLD.to_string())
            .help("A frame shows a slide only if fewer than this many fingerprint bits differ. Suggested values are 10-15 for the default hash size")
            .display_order(get_ordering(THRESHOLD)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(HASH_SIZE)
            .long("hash-size")
            .num_args(1)
            .value_parser(value_parser!(u32).range(1..=32))
            .default_value(DEFAULT_HASH_SIZE.to_string())
            .help("Side length of the fingerprint. Fingerprints contain hash-size squared bits")
            .display_order(get_ordering(HASH_SIZE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(OUTPUT_FORMAT)
            .long("output-format")
            .num_args(1)
            .value_parser(value_parser!(OutputFormat))
            .default_value("normal")
            .help("Print the timeline as a table or as JSON")
            .display_order(get_ordering(OUTPUT_FORMAT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(ARGS_FILE)
            .long("args-file")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .help("Read command line arguments from a file. If this argument is used it must be the only argument")
            .display_order(get_ordering(ARGS_FILE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_QUIET)
            .long("quiet")
            .help("Reduced verbosity")
            .conflicts_with(VERBOSITY_VERBOSE)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_QUIET)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_VERBOSE)
            .long("verbose")
            .help("Increased verbosity")
            .conflicts_with(VERBOSITY_QUIET)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_VERBOSE)),
    );

    clap_app
}

pub fn parse_args() -> AppCfg {
    //Start by parsing the provided arguments from the commandline. If the --args-file
    //argument is provided, then we will ignore the true command line arguments and
    //take the arguments from the file instead.
    let args = get_args_from_cmdline_or_file();
    cfg_from_matches(&args)
}

fn cfg_from_matches(args: &clap::ArgMatches) -> AppCfg {
    let slides = match args.get_one::<PathBuf>(MANIFEST) {
        Some(manifest_path) => SlidesCfg::Manifest {
            manifest_path: manifest_path.clone(),
            slides_dir: args
                .get_one::<PathBuf>(SLIDES_DIR)
                .cloned()
                .unwrap_or_else(|| PathBuf::from("slides")),
            entry: args.get_one::<usize>(ENTRY).copied().unwrap_or_default(),
        },
        None => SlidesCfg::Paths(
            args.get_many::<PathBuf>(SLIDES)
                .map(|paths| paths.cloned().collect())
                .unwrap_or_default(),
        ),
    };

    let detect_opts = {
        let defaults = DetectOptions::default();
        DetectOptions {
            sample_interval_secs: args
                .get_one::<f64>(SAMPLE_INTERVAL)
                .copied()
                .unwrap_or(defaults.sample_interval_secs),
            match_threshold: args
                .get_one::<u32>(THRESHOLD)
                .copied()
                .unwrap_or(defaults.match_threshold),
            hash_options: HashOptions {
                hash_size: args
                    .get_one::<u32>(HASH_SIZE)
                    .copied()
                    .unwrap_or(defaults.hash_options.hash_size),
                ..defaults.hash_options
            },
        }
    };

    let verbosity = if args.get_flag(VERBOSITY_QUIET) {
        ReportVerbosity::Quiet
    } else if args.get_flag(VERBOSITY_VERBOSE) {
        ReportVerbosity::Verbose
    } else {
        ReportVerbosity::Default
    };

    let output_cfg = OutputCfg {
        format: args
            .get_one::<OutputFormat>(OUTPUT_FORMAT)
            .copied()
            .unwrap_or(OutputFormat::Normal),
        verbosity,
    };

    let ret = AppCfg {
        video: args.get_one::<PathBuf>(VIDEO).cloned(),
        slides,
        check_manifest: args.get_flag(CHECK_MANIFEST),
        detect_opts,
        output_cfg,
    };

    ret
}

// Arguments are always first read from the command line, but if --args-file
// is present, then arguments are actually located in a file on disk.
// This fn obtains the args from the correct location.
fn get_args_from_cmdline_or_file() -> clap::ArgMatches {
    let cmdline_args = build_app().get_matches();

    match cmdline_args.get_one::<PathBuf>(ARGS_FILE) {
        None => cmdline_args,
        Some(args_path) => get_argsfile_args(args_path),
    }
}

fn get_argsfile_args(argsfile_path: &Path) -> clap::ArgMatches {
    let args = std::fs::read_to_string(argsfile_path)
        .map_err(eyre::Report::msg)
        .and_then(|text| split_argsfile(&text))
        .map_err(|e| {
            e.wrap_err(format!(
                "Failed to parse args file at location {}",
                argsfile_path.to_string_lossy()
            ))
        })
        .unwrap_or_else(|e| print_error_and_quit(e));

    //When parsing args from file, the binary name will not be present,
    // so update the parser that we use to not expect it.
    let matches = build_app().no_binary_name(true).get_matches_from(args);
    matches
}

//lines starting with '#' are comments. Everything else is split the way a shell would split it.
fn split_argsfile(text: &str) -> eyre::Result<Vec<String>> {
    let contents = text
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");

    shell_words::split(&contents).map_err(eyre::Report::msg)
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> Result<AppCfg, clap::Error> {
        build_app()
            .try_get_matches_from(std::iter::once("slide_sync").chain(args.iter().copied()))
            .map(|matches| cfg_from_matches(&matches))
    }

    #[test]
    fn test_display_ordering_is_complete() {
        //panics if any argument was not given a display order
        build_app().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cfg = parse(&["--video", "talk.mp4", "--slides", "a.png", "b.png"]).unwrap();

        assert_eq!(cfg.video, Some(PathBuf::from("talk.mp4")));
        assert_eq!(
            cfg.slides,
            SlidesCfg::Paths(vec![PathBuf::from("a.png"), PathBuf::from("b.png")])
        );
        assert_eq!(cfg.detect_opts, DetectOptions::default());
        assert_eq!(cfg.output_cfg.format, OutputFormat::Normal);
        assert_eq!(cfg.output_cfg.verbosity, ReportVerbosity::Default);
        assert!(!cfg.check_manifest);
    }

    #[test]
    fn test_detection_options() {
        #[rustfmt::skip]
        let cfg = parse(&[
            "--video", "talk.mp4",
            "--slides", "a.png",
            "--sample-interval", "0.5",
            "--threshold", "40",
            "--hash-size", "12",
            "--output-format", "json",
            "--verbose",
        ])
        .unwrap();

        assert_eq!(cfg.detect_opts.sample_interval_secs, 0.5);
        assert_eq!(cfg.detect_opts.match_threshold, 40);
        assert_eq!(cfg.detect_opts.hash_options.hash_size, 12);
        assert_eq!(cfg.output_cfg.format, OutputFormat::Json);
        assert_eq!(cfg.output_cfg.verbosity, ReportVerbosity::Verbose);
    }

    #[test]
    fn test_manifest() {
        #[rustfmt::skip]
        let cfg = parse(&[
            "--video", "talk.mp4",
            "--manifest", "video_url.json",
            "--entry", "2",
        ])
        .unwrap();

        assert_eq!(
            cfg.slides,
            SlidesCfg::Manifest {
                manifest_path: PathBuf::from("video_url.json"),
                slides_dir: PathBuf::from("slides"),
                entry: 2,
            }
        );
    }

    #[test]
    fn test_check_manifest_needs_no_video() {
        let cfg = parse(&["--manifest", "video_url.json", "--check-manifest"]).unwrap();
        assert!(cfg.check_manifest);
        assert_eq!(cfg.video, None);
    }

    #[test]
    fn test_invalid_combinations() {
        assert!(parse(&["--slides", "a.png"]).is_err());
        assert!(parse(&["--video", "talk.mp4"]).is_err());
        assert!(parse(&["--video", "v.mp4", "--slides", "a.png", "--manifest", "m.json"]).is_err());
        assert!(parse(&["--video", "v.mp4", "--slides", "a.png", "--check-manifest"]).is_err());
        assert!(parse(&["--video", "v.mp4", "--slides", "a.png", "--quiet", "--verbose"]).is_err());
        assert!(parse(&["--video", "v.mp4", "--slides", "a.png", "--hash-size", "0"]).is_err());
    }

    #[test]
    fn test_argsfile_comments_and_quoting() {
        let text = "# lecture 3\n--video \"week 3/talk.mp4\"\n  # deck\n--slides a.png 'b c.png'\n";
        let args = split_argsfile(text).unwrap();
        assert_eq!(args, vec!["--video", "week 3/talk.mp4", "--slides", "a.png", "b c.png"]);
    }
}
