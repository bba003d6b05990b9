// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use eafkit::app_config::{self, Config};
use eafkit::app_controller::{Controller, OutputOptions, TierEdit};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Where edited documents go
#[derive(Args, Debug)]
struct OutputArgs {
    /// Directory for edited documents (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Overwrite the input document instead of writing a suffixed copy
    #[arg(long, conflicts_with = "output_dir")]
    in_place: bool,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

impl From<OutputArgs> for OutputOptions {
    fn from(args: OutputArgs) -> Self {
        OutputOptions {
            output_dir: args.output_dir,
            in_place: args.in_place,
            force_overwrite: args.force_overwrite,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the tiers of a document
    Tiers {
        /// Input .eaf file
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,
    },

    /// Report tier coverage against the baseline tier of each speaker
    Status {
        /// Input .eaf file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,
    },

    /// Export annotations to CSV
    Export {
        /// Input .eaf file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// CSV file to write (overrides the configuration)
        #[arg(long)]
        csv_file: Option<String>,

        /// Append to the CSV file instead of replacing it
        #[arg(long)]
        append: bool,

        /// Fields to export, comma separated (overrides the configuration)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Copy a tier and insert the copy into the document
    CopyTier {
        /// Input .eaf file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Tier to copy
        #[arg(short, long)]
        source: String,

        /// Id of the new tier
        #[arg(short, long)]
        target: String,

        /// Parent of the new tier (independent when omitted)
        #[arg(short, long)]
        parent: Option<String>,

        /// Linguistic type of the new tier
        #[arg(long = "type")]
        linguistic_type: Option<String>,

        /// Insert after this tier (after the source when omitted)
        #[arg(long)]
        after: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Rename a tier and every reference to it
    RenameTier {
        /// Input .eaf file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Tier to rename
        #[arg(long)]
        tier: String,

        /// New tier id
        #[arg(long)]
        new_id: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Change the parent and type of a tier, converting its annotations
    Reparent {
        /// Input .eaf file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Tier to change
        #[arg(long)]
        tier: String,

        /// New parent (the tier becomes independent when omitted)
        #[arg(short, long)]
        parent: Option<String>,

        /// New linguistic type
        #[arg(long = "type")]
        linguistic_type: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check documents for structural problems
    Check {
        /// Input .eaf file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,
    },

    /// Generate shell completions for eafkit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// eafkit - tier editing for ELAN annotation documents
///
/// Reads ELAN .eaf files, edits their tiers, reports coverage and exports
/// annotations to CSV.
#[derive(Parser, Debug)]
#[command(name = "eafkit")]
#[command(version)]
#[command(about = "Tier editing for ELAN annotation documents")]
#[command(long_about = "eafkit edits the tiers of ELAN annotation documents and exports their annotations.

EXAMPLES:
    eafkit tiers session.eaf                                 # List tiers
    eafkit status corpus/                                    # Coverage per speaker
    eafkit export corpus/ --csv-file out.csv                 # Export all tiers
    eafkit copy-tier -s Broad@JL -t Narrow@JL session.eaf    # Copy a tier
    eafkit reparent --tier Gloss@JL -p Broad@JL --type Gloss session.eaf
    eafkit check corpus/                                     # Integrity report
    eafkit completions bash > eafkit.bash                    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
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
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let emoji = Self::get_emoji_for_level(record.level());
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "eafkit", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    run_command(cli.command, config)
}

fn run_command(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::Tiers { input_path } => {
            let controller = Controller::with_config(config)?;
            let document = controller.load(&input_path)?;
            for line in controller.tier_listing(&document) {
                println!("{}", line);
            }
        }
        Commands::Status { input_path } => {
            let controller = Controller::with_config(config)?;
            controller.for_each_document(&input_path, |path| {
                let document = controller.load(path)?;
                println!("{}", document.name());
                for (tier_id, coverage) in controller.status(&document) {
                    println!("\t{}\t{:.2}", tier_id, coverage);
                }
                Ok(true)
            })?;
        }
        Commands::Export {
            input_path,
            csv_file,
            append,
            fields,
        } => {
            if let Some(csv_file) = csv_file {
                config.csv_file = csv_file;
            }
            if append {
                config.csv_append = true;
            }
            if !fields.is_empty() {
                config.export_fields = fields;
            }
            let controller = Controller::with_config(config)?;
            let (summary, rows) = controller.export(&input_path)?;
            info!(
                "Success: {} rows from {} document(s) in {}",
                rows,
                summary.processed,
                controller.config().csv_file
            );
        }
        Commands::CopyTier {
            input_path,
            source,
            target,
            parent,
            linguistic_type,
            after,
            output,
        } => {
            let edit = TierEdit::Copy {
                source,
                target,
                parent,
                linguistic_type,
                after,
            };
            run_edit(config, &input_path, &edit, output.into())?;
        }
        Commands::RenameTier {
            input_path,
            tier,
            new_id,
            output,
        } => {
            let edit = TierEdit::Rename { tier, new_id };
            run_edit(config, &input_path, &edit, output.into())?;
        }
        Commands::Reparent {
            input_path,
            tier,
            parent,
            linguistic_type,
            output,
        } => {
            let edit = TierEdit::Reparent {
                tier,
                parent,
                linguistic_type,
            };
            run_edit(config, &input_path, &edit, output.into())?;
        }
        Commands::Check { input_path } => {
            let controller = Controller::with_config(config)?;
            let reports = controller.check(&input_path)?;
            let failed = reports.iter().filter(|r| !r.passed).count();
            for report in &reports {
                if report.passed {
                    info!("{}: OK", report.document);
                    continue;
                }
                warn!("{}: {} issue(s)", report.document, report.issues.len());
                for issue in &report.issues {
                    println!("{}\t{}", report.document, issue);
                }
            }
            if failed > 0 {
                return Err(anyhow!("{} of {} document(s) failed the integrity check", failed, reports.len()));
            }
        }
        Commands::Completions { .. } => {}
    }
    Ok(())
}

fn run_edit(config: Config, input_path: &Path, edit: &TierEdit, output: OutputOptions) -> Result<()> {
    let controller = Controller::with_config(config)?;
    let summary = controller
        .edit(input_path, edit, &output)
        .with_context(|| format!("Failed to edit {}", input_path.display()))?;

    if summary.failed > 0 {
        error!("{} document(s) could not be edited", summary.failed);
    }
    info!(
        "Success: {} edited, {} skipped",
        summary.processed, summary.skipped
    );
    Ok(())
}
