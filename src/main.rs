use std::error::Error;

use clap::{Args, Parser, Subcommand};
use gate_schematics::{
    batch::{Batch, BatchConfig, BatchJob, ConfirmPolicy, SamplingStrategy},
    schematic::build_topology,
};
use log::LevelFilter;

/// Creates sets of logic gate tree schematics and their Karnaugh maps. Sets contain no
/// duplicates.
#[derive(Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log: Option<String>,

    #[arg(long, global = true, default_value = "info", value_parser = parse_level)]
    log_level: LevelFilter,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a batch of unique schematics and their Karnaugh maps
    Generate(GenerateArgs),
    /// Print or convert a saved batch snapshot as JSON
    Json {
        snapshot: String,
        out: Option<String>,
    },
    /// Print the base layout for an input count
    Layout { inputs: usize },
}

#[derive(Args)]
struct GenerateArgs {
    /// JSON batch configuration; only `--clear` may be combined with it
    #[arg(long)]
    config: Option<String>,

    /// Number of inputs of the schematic
    #[arg(short, long, required_unless_present = "config", conflicts_with = "config")]
    inputs: Option<usize>,

    /// Number of random versions to make from the layout
    #[arg(short, long, required_unless_present = "config", conflicts_with = "config")]
    versions: Option<usize>,

    /// Factor by which the written schematics are scaled up
    #[arg(short, long, default_value_t = 1, conflicts_with = "config")]
    scale: usize,

    /// Name the outputs are saved under
    #[arg(long, required_unless_present = "config", conflicts_with = "config")]
    fname: Option<String>,

    #[arg(long, default_value = "output", conflicts_with = "config")]
    output_dir: String,

    /// Empty the output folder before running
    #[arg(long)]
    clear: bool,

    #[arg(
        long,
        value_enum,
        default_value_t = SamplingStrategy::Reject,
        conflicts_with = "config"
    )]
    strategy: SamplingStrategy,

    /// What to do when nearly every possible version is requested
    #[arg(
        long,
        value_enum,
        default_value_t = ConfirmPolicy::Prompt,
        conflicts_with = "config"
    )]
    confirm: ConfirmPolicy,

    #[arg(long, conflicts_with = "config")]
    seed: Option<u64>,

    /// Max random draws per version
    #[arg(long, conflicts_with = "config")]
    max_attempts: Option<usize>,

    /// Run on a single thread
    #[arg(long, conflicts_with = "config")]
    sequential: bool,
}

impl GenerateArgs {
    fn into_config(self) -> Result<BatchConfig, Box<dyn Error>> {
        if let Some(path) = self.config {
            let mut config = BatchConfig::load_from_file(&path)?;
            config.clear |= self.clear;
            return Ok(config);
        }

        let mut config = BatchConfig::new(
            self.inputs.ok_or("missing number of inputs")?,
            self.versions.ok_or("missing number of versions")?,
            &self.fname.ok_or("missing file name")?,
        );
        config.scale = self.scale;
        config.output_dir = self.output_dir;
        config.clear = self.clear;
        config.strategy = self.strategy;
        config.confirm = self.confirm;
        config.seed = self.seed;
        config.parallel = !self.sequential;
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        Ok(config)
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    level
        .parse()
        .map_err(|_| format!("unknown log level '{}'", level))
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logs(cli.log.as_deref(), cli.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli.command) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Generate(args) => {
            let config = args.into_config()?;
            let batch = BatchJob::new(config.clone()).execute()?;
            if config.save {
                println!(
                    "{} versions saved to {}",
                    batch.versions.len(),
                    config.output_dir
                );
            }
        }
        Command::Json { snapshot, out } => {
            let batch = Batch::load_from_binary(&snapshot)?;

            if let Some(json_path) = out {
                batch.save_as_json(&json_path)?;
                println!("Batch JSON saved to {}", json_path);
            } else {
                println!("{}", serde_json::to_string_pretty(&batch)?);
            }
        }
        Command::Layout { inputs } => {
            let grid = build_topology(inputs)?;
            print!("{}", grid);
            println!("{} gates", grid.count_gates());
        }
    }
    Ok(())
}

fn init_logs(log_path: Option<&str>, level: LevelFilter) -> Result<(), Box<dyn Error>> {
    let pattern = "{d} - {l} - {m}{n}";
    let stderr = log4rs::append::console::ConsoleAppender::builder()
        .target(log4rs::append::console::Target::Stderr)
        .encoder(Box::new(log4rs::encode::pattern::PatternEncoder::new(
            pattern,
        )))
        .build();

    let mut config_builder = log4rs::Config::builder()
        .appender(log4rs::config::Appender::builder().build("console", Box::new(stderr)));
    let mut root_builder = log4rs::config::Root::builder().appender("console");

    if let Some(log_path) = log_path {
        let file_appender = log4rs::append::file::FileAppender::builder()
            .encoder(Box::new(log4rs::encode::pattern::PatternEncoder::new(
                pattern,
            )))
            .build(log_path)?;
        config_builder = config_builder
            .appender(log4rs::config::Appender::builder().build("file", Box::new(file_appender)));
        root_builder = root_builder.appender("file");
    }

    #[cfg(feature = "trace")]
    {
        let trace_file_appender = log4rs::append::file::FileAppender::builder()
            .encoder(Box::new(log4rs::encode::pattern::PatternEncoder::new(
                pattern,
            )))
            .build("trace.log")?;
        config_builder = config_builder.appender(
            log4rs::config::Appender::builder().build("trace", Box::new(trace_file_appender)),
        );
        config_builder = config_builder.logger(
            log4rs::config::Logger::builder()
                .appender("trace")
                .additive(false)
                .build("gate_schematics::schematic", LevelFilter::Trace),
        );
    }

    let config = config_builder.build(root_builder.build(level))?;
    log4rs::init_config(config)?;

    Ok(())
}
