// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use crate::app_config::{LogLevel, ProjectOptions, TextEncoding};
use crate::project::SubtitleProject;

mod app_config;
mod errors;
mod events;
mod file_utils;
mod language_utils;
mod project;
mod subtitles;
mod translator;

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or update a subtitle project file (default command)
    #[command(alias = "prepare")]
    Prepare(PrepareArgs),

    /// Generate shell completions for subtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct PrepareArgs {
    /// Input SRT file or .subtrans project file
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output path for the translated subtitles
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short = 'l', long)]
    target_language: Option<String>,

    /// Project mode (true, write, read, reload, resume, retranslate, reparse, preview)
    #[arg(short, long)]
    project: Option<String>,

    /// Write a backup of the project file when it is loaded
    #[arg(long)]
    write_backup: bool,

    /// Include the original text in the translated subtitles
    #[arg(long)]
    include_original: bool,

    /// Disable the background autosave loop
    #[arg(long)]
    no_autosave: bool,

    /// Text encoding for file reads and writes (utf-8, utf-8-bom)
    #[arg(long)]
    encoding: Option<String>,

    /// Optionally specify the name of the movie to help the translator
    #[arg(long)]
    moviename: Option<String>,

    /// Export the translated output for whatever has been translated so far
    #[arg(short, long)]
    export: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// subtrans - resumable subtitle translation projects
///
/// Manages the on-disk checkpoint of a subtitle translation run: creates
/// project files from SRT sources, resumes and inspects existing projects,
/// writes backups and exports translated output.
#[derive(Parser, Debug)]
#[command(name = "subtrans")]
#[command(version = "1.0.0")]
#[command(about = "Subtitle translation project and checkpoint tool")]
#[command(long_about = "subtrans manages the on-disk state of resumable subtitle translation runs.

EXAMPLES:
    subtrans movie.srt --project write          # Create movie.subtrans from an SRT file
    subtrans movie.subtrans                     # Open an existing project file
    subtrans movie.srt --project resume         # Resume from the project file if it exists
    subtrans movie.subtrans --export            # Export translated output from a checkpoint
    subtrans movie.srt -l fr --project write    # Set the target language in the project
    subtrans completions bash > subtrans.bash   # Generate bash completions

CONFIGURATION:
    Defaults are read from conf.json when present; command line flags
    override it. Translation runs use the library API with a translator
    backend; this tool manages the project files those runs depend on.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input SRT file or .subtrans project file
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output path for the translated subtitles
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short = 'l', long)]
    target_language: Option<String>,

    /// Project mode (true, write, read, reload, resume, retranslate, reparse, preview)
    #[arg(short, long)]
    project: Option<String>,

    /// Write a backup of the project file when it is loaded
    #[arg(long)]
    write_backup: bool,

    /// Include the original text in the translated subtitles
    #[arg(long)]
    include_original: bool,

    /// Disable the background autosave loop
    #[arg(long)]
    no_autosave: bool,

    /// Text encoding for file reads and writes (utf-8, utf-8-bom)
    #[arg(long)]
    encoding: Option<String>,

    /// Optionally specify the name of the movie to help the translator
    #[arg(long)]
    moviename: Option<String>,

    /// Export the translated output for whatever has been translated so far
    #[arg(short, long)]
    export: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {}: {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default; updated after
    // the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Prepare(args)) => run_prepare(args),
        None => {
            // Default behavior - use top-level args
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;

            let args = PrepareArgs {
                input_path,
                output: cli.output,
                target_language: cli.target_language,
                project: cli.project,
                write_backup: cli.write_backup,
                include_original: cli.include_original,
                no_autosave: cli.no_autosave,
                encoding: cli.encoding,
                moviename: cli.moviename,
                export: cli.export,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_prepare(args)
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    let mut options = ProjectOptions::from_file_or_default(&args.config_path)?;

    // Command line arguments override the config file
    if let Some(project_mode) = &args.project {
        options.project_mode = project_mode.clone();
    }
    if let Some(target_language) = &args.target_language {
        options.target_language = target_language.clone();
    }
    if let Some(encoding) = &args.encoding {
        options.encoding = encoding.parse::<TextEncoding>()?;
    }
    if args.include_original {
        options.include_original = true;
    }
    if args.write_backup {
        options.write_backup = true;
    }
    if args.no_autosave {
        options.autosave = false;
    }
    if let Some(moviename) = &args.moviename {
        options.movie_name = Some(moviename.clone());
    }
    if let Some(log_level) = args.log_level {
        options.log_level = log_level.into();
    }
    options.validate()?;

    log::set_max_level(options.log_level.to_level_filter());

    language_utils::validate_language_code(&options.target_language)?;

    let movie_name = options.movie_name.clone().unwrap_or_else(|| {
        args.input_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    });

    let write_backup = options.write_backup;
    let mut project = SubtitleProject::new(options.clone());

    project.initialise(&args.input_path, args.output.as_deref(), write_backup)?;

    let mut settings = BTreeMap::new();
    settings.insert(
        "target_language".to_string(),
        Value::String(options.target_language.clone()),
    );
    settings.insert("movie_name".to_string(), Value::String(movie_name));
    settings.insert(
        "include_original".to_string(),
        Value::Bool(options.include_original),
    );
    project.update_project_settings(&settings)?;

    info!(
        "Project holds {} subtitles from {:?}",
        project.line_count(),
        args.input_path
    );

    if project.any_translated() && args.export {
        project.save_translation(None);
    }

    if project.flags().write_project {
        project.write_project_file(None)?;
        info!("Project data written to {:?}", project.project_file());
    }

    project.stop_autosave();

    Ok(())
}
