use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

use loupe::domain::entities::ProcessingStatus;
use loupe::engine::{DEFAULT_PROFILING_SAMPLE_RATE, ProfilingCategory};
use loupe::infrastructure::persistence::JsonLinesStorageFactory;
use loupe::infrastructure::registry::StaticParserRegistry;
use loupe::infrastructure::{default_engine_services, scan_source};
use loupe::{ExtractionError, ExtractionFrontend, ProcessingOptions};

#[derive(Parser)]
#[command(name = "loupe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract timeline events from forensic sources", long_about = None)]
struct Cli {
    /// Source to extract from: a file, directory, device or storage media image
    #[arg(required_unless_present = "info")]
    source: Option<PathBuf>,

    /// Storage file the results are written to
    #[arg(short = 'w', long, required_unless_present = "info")]
    storage_file: Option<PathBuf>,

    /// TOML file with processing options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List the available hashers, parsers and presets, then exit
    #[arg(long)]
    info: bool,

    /// Parser filter expression, for example "win7,!filestat"
    #[arg(long)]
    parsers: Option<String>,

    /// Comma separated hashers, or "all"
    #[arg(long)]
    hashers: Option<String>,

    /// File with the locations to extract from
    #[arg(short, long)]
    filter_file: Option<PathBuf>,

    /// Event filter expression recorded with the session
    #[arg(long)]
    filter: Option<String>,

    /// Time zone used when the source does not reveal one
    #[arg(short = 'z', long)]
    timezone: Option<String>,

    /// Number of extraction workers, 0 selects automatically
    #[arg(long)]
    workers: Option<usize>,

    #[arg(long)]
    single_process: bool,

    #[arg(long)]
    force_preprocessing: bool,

    #[arg(long)]
    process_archives: bool,

    /// Catch parser crashes in workers
    #[arg(long)]
    crash_handler: bool,

    #[arg(long)]
    preferred_year: Option<i32>,

    #[arg(long)]
    encoding: Option<String>,

    #[arg(long)]
    temporary_directory: Option<PathBuf>,

    /// Text prepended to every event display name
    #[arg(long)]
    text_prepend: Option<String>,

    /// Mount point of the source, stripped from event display names
    #[arg(long)]
    mount_path: Option<PathBuf>,

    /// Distribute work over a local queue instead of the message queue
    #[arg(long)]
    no_message_queue: bool,

    /// Log worker status and memory usage periodically
    #[arg(long)]
    show_memory_usage: bool,

    /// Write profiling samples to this directory
    #[arg(long)]
    profiling_directory: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_PROFILING_SAMPLE_RATE)]
    profiling_sample_rate: u32,

    /// One of: all, memory, parsers, processing, serializers
    #[arg(long, default_value = "all")]
    profiling_type: String,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    /// Merges command line flags over the options from the config file
    fn processing_options(&self) -> Result<ProcessingOptions> {
        let mut options = match &self.config {
            Some(path) => ProcessingOptions::load_from_file(path)?,
            None => ProcessingOptions::default(),
        };

        options.command_line_arguments = Some(std::env::args().collect::<Vec<_>>().join(" "));
        if let Some(parsers) = &self.parsers {
            options.parser_filter_expression = Some(parsers.clone());
        }
        if let Some(hashers) = &self.hashers {
            options.hasher_names_string = Some(hashers.clone());
        }
        if let Some(filter_file) = &self.filter_file {
            options.filter_file = Some(filter_file.clone());
        }
        if let Some(timezone) = &self.timezone {
            options.timezone = timezone.clone();
        }
        if let Some(workers) = self.workers {
            options.number_of_workers = workers;
        }
        if let Some(year) = self.preferred_year {
            options.preferred_year = Some(year);
        }
        if let Some(encoding) = &self.encoding {
            options.preferred_encoding = encoding.clone();
        }
        if let Some(directory) = &self.temporary_directory {
            options.temporary_directory = Some(directory.clone());
        }
        options.single_process_mode |= self.single_process;
        options.force_preprocessing |= self.force_preprocessing;
        options.process_archive_files |= self.process_archives;
        options.enable_crash_handler |= self.crash_handler;

        Ok(options)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut frontend = ExtractionFrontend::new(
        Arc::new(StaticParserRegistry::builtin()),
        Arc::new(JsonLinesStorageFactory::new()),
        default_engine_services(),
    );

    if cli.info {
        print_information(&frontend)?;
        return Ok(());
    }

    let (Some(source), Some(storage_file)) = (&cli.source, &cli.storage_file) else {
        bail!("A source and a storage file are required");
    };

    frontend.set_debug_mode(cli.debug);
    frontend.set_storage_file(storage_file);
    frontend.set_show_memory_information(cli.show_memory_usage);
    frontend.set_use_message_queue(!cli.no_message_queue);
    if let Some(text_prepend) = &cli.text_prepend {
        frontend.set_text_prepend(text_prepend);
    }
    if let Some(mount_path) = &cli.mount_path {
        frontend.set_mount_path(mount_path);
    }
    if let Some(filter) = &cli.filter {
        frontend.set_filter_expression(filter);
    }
    if let Some(directory) = &cli.profiling_directory {
        let category: ProfilingCategory = cli.profiling_type.parse()?;
        frontend.enable_profiling(directory, cli.profiling_sample_rate, category);
    }

    let abort = frontend.abort_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nAborting, waiting for workers to finish...");
        abort.abort();
    })
    .context("Failed to set signal handler")?;

    let (path_spec, source_type) = scan_source(source)
        .with_context(|| format!("Unable to scan source: {}", source.display()))?;
    tracing::info!("Source type: {}", source_type);

    let options = cli.processing_options()?;
    match frontend.process_sources(&[path_spec], source_type, options) {
        Ok(status) => print_status(&status),
        Err(ExtractionError::UserAbort { status }) => {
            print_status(&status)?;
            bail!("Processing aborted by user");
        }
        Err(e) => Err(e).context("Extraction failed"),
    }
}

fn print_status(status: &ProcessingStatus) -> Result<()> {
    let summary = serde_json::to_string_pretty(status).context("Failed to serialize status")?;
    println!("{summary}");
    Ok(())
}

fn print_information(frontend: &ExtractionFrontend) -> Result<()> {
    println!("Hashers:");
    for hasher in frontend.hashers_information() {
        println!("  {:<24} {}", hasher.name, hasher.description);
    }

    println!("\nParsers:");
    for parser in frontend.parsers_information() {
        println!("  {:<24} {}", parser.name, parser.description);
    }

    println!("\nParser plugins:");
    for plugin in frontend.parser_plugins_information(None)? {
        println!("  {}", plugin.name);
    }

    println!("\nParser presets:");
    for preset in frontend.parser_presets_information() {
        println!("  {:<24} {}", preset.name, preset.description);
    }

    Ok(())
}
