// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use dictsheet::app_config::{self, Config, GenerationProvider};
use dictsheet::commands::{ExportTarget, GenerateArgs, SessionCommand, HELP_TEXT};
use dictsheet::file_utils::FileManager;
use dictsheet::generation::GenerationResult;
use dictsheet::{Controller, GenerationTicket, Notice, NoticeLevel};

/// CLI Wrapper for GenerationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliGenerationProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliGenerationProvider> for GenerationProvider {
    fn from(cli_provider: CliGenerationProvider) -> Self {
        match cli_provider {
            CliGenerationProvider::Ollama => GenerationProvider::Ollama,
            CliGenerationProvider::OpenAI => GenerationProvider::OpenAI,
            CliGenerationProvider::Anthropic => GenerationProvider::Anthropic,
            CliGenerationProvider::LMStudio => GenerationProvider::LMStudio,
        }
    }
}

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a worksheet interactively (default command)
    Session,

    /// Generate and/or load sentences, then export every page
    Build(BuildArgs),

    /// Generate shell completions for dictsheet
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Grade level (1-6)
    #[arg(short, long)]
    grade: Option<String>,

    /// Proficiency level (easy, medium, hard or 쉬움, 보통, 어려움)
    #[arg(short = 'L', long)]
    level: Option<String>,

    /// Number of sentences to generate (1-20)
    #[arg(short = 'n', long)]
    count: Option<i64>,

    /// Dictation goal, e.g. "받침 있는 글자"
    #[arg(long)]
    goal: Option<String>,

    /// Text file with extra sentences, one per line
    #[arg(long, value_name = "FILE")]
    manual: Option<PathBuf>,

    /// Skip AI generation and use only the manual sentences
    #[arg(long, requires = "manual")]
    no_generate: bool,
}

impl BuildArgs {
    fn generate_args(&self) -> GenerateArgs {
        GenerateArgs {
            grade_level: self.grade.clone(),
            proficiency_level: self.level.clone(),
            number_of_sentences: self.count,
            dictation_goal: self.goal.clone(),
        }
    }
}

/// dictsheet - Dictation worksheet builder
///
/// Collects AI-generated and hand-typed sentences into a numbered list,
/// lays them out on printable pages and exports each page as a PNG.
#[derive(Parser, Debug)]
#[command(name = "dictsheet")]
#[command(version)]
#[command(about = "Dictation worksheet builder")]
#[command(long_about = "dictsheet builds printable dictation worksheets from AI-generated and typed sentences.

EXAMPLES:
    dictsheet                                        # Interactive session with default config
    dictsheet -p openai -m gpt-4o-mini session      # Use a specific provider and model
    dictsheet build -g 2 -n 8 --goal \"받침 있는 글자\" # Generate 8 sentences and export
    dictsheet build --manual words.txt --no-generate # Export typed sentences only
    dictsheet completions bash > dictsheet.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.1)
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Generation provider to use
    #[arg(short, long, value_enum, global = true)]
    provider: Option<CliGenerationProvider>,

    /// Model name to use for generation
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Directory exported images are written to
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
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
        // The logger itself passes everything; log::set_max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌"),
            Level::Warn => ("1;33", "🚧"),
            Level::Info => ("1;32", ""),
            Level::Debug => ("1;36", "🔍"),
            Level::Trace => ("1;35", "📋"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "dictsheet", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let controller = Controller::with_config(config)?;
    info!(
        "dictsheet: {} - {}",
        controller.config().generation.provider.display_name(),
        controller.gateway().model()
    );

    match cli.command {
        Some(Commands::Build(args)) => run_build(controller, &args).await,
        Some(Commands::Session) | None => run_session(controller).await,
        Some(Commands::Completions { .. }) => Ok(()),
    }
}

/// Load the config file (creating a default one when missing), apply CLI overrides and validate
fn load_config(options: &CommandLineOptions) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = Path::new(&options.config_path);
    let mut config = if FileManager::file_exists(config_path) {
        let content = FileManager::read_to_string(config_path)?;
        serde_json::from_str::<Config>(&content)
            .with_context(|| format!("Failed to parse config file: {}", options.config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", options.config_path);

        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        FileManager::write_to_file(config_path, &config_json)
            .with_context(|| format!("Failed to write default config to file: {}", options.config_path))?;
        config
    };

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.generation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.generation.active_provider_config_mut().model = model.clone();
    }
    if let Some(output_dir) = &options.output_dir {
        config.worksheet.output_dir = Some(output_dir.clone());
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

fn print_notice(notice: &Notice) {
    let marker = match notice.level {
        NoticeLevel::Success => "✔",
        NoticeLevel::Info => "ℹ",
        NoticeLevel::Error => "✖",
    };
    println!("{} {}", marker, notice);
}

fn print_prompt(collecting: bool) {
    print!("{}", if collecting { "... " } else { "> " });
    let _ = std::io::stdout().flush();
}

fn print_sentences(controller: &Controller) {
    if controller.sentences().is_empty() {
        println!("(no sentences yet)");
        return;
    }
    for (i, sentence) in controller.sentences().iter().enumerate() {
        println!("{:>3}. {}", i + 1, sentence);
    }
}

fn print_pages(controller: &Controller) {
    let pages = controller.pages();
    if pages.is_empty() {
        println!("Page 1/1: (empty)");
        return;
    }
    for page in &pages {
        println!(
            "Page {}/{}: sentences {}-{}",
            page.page_number,
            page.total_pages,
            page.display_number(0),
            page.display_number(page.len() - 1)
        );
    }
}

fn print_status(controller: &Controller) {
    let form = controller.form();
    println!(
        "Provider: {} ({})",
        controller.gateway().provider_name(),
        controller.gateway().model()
    );
    println!(
        "Sentences: {} on {} page(s){}",
        controller.store().len(),
        controller.page_count(),
        if controller.is_busy() { ", generating..." } else { "" }
    );
    println!(
        "Form: grade {}, {}, {} sentences, goal \"{}\"",
        form.grade_level, form.proficiency_level, form.number_of_sentences, form.dictation_goal
    );
    println!("Output: {:?}", controller.config().worksheet.resolved_output_dir());
}

fn report_export(result: Result<PathBuf, Notice>) {
    match result {
        Ok(path) => println!("Saved {}", path.display()),
        Err(notice) => print_notice(&notice),
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Run one parsed command against the session
async fn handle_command(
    controller: &mut Controller,
    command: SessionCommand,
    results: &mpsc::UnboundedSender<(GenerationTicket, GenerationResult)>,
    collecting: &mut Option<Vec<String>>,
) -> Flow {
    match command {
        SessionCommand::Generate(args) => match controller.begin_generation() {
            Err(notice) => print_notice(&notice),
            Ok(ticket) => {
                args.apply(controller.form_mut());
                let gateway = controller.gateway().clone();
                let form = controller.form().clone();
                let results = results.clone();
                tokio::spawn(async move {
                    let result = gateway.submit(&form).await;
                    let _ = results.send((ticket, result));
                });
                println!("Generating...");
            }
        },
        SessionCommand::Add(Some(line)) => {
            let added = controller.add_manual(&line);
            println!("Added {} sentence(s)", added);
        }
        SessionCommand::Add(None) => {
            println!("Type one sentence per line, finish with a lone '.'");
            *collecting = Some(Vec::new());
        }
        SessionCommand::Edit { index, text } => match controller.edit(index, &text) {
            Ok(()) => println!("Updated sentence {}", index + 1),
            Err(e) => print_notice(&Notice::store_failed(&e)),
        },
        SessionCommand::Delete { index } => match controller.delete(index) {
            Ok(removed) => println!("Deleted \"{}\"", removed),
            Err(e) => print_notice(&Notice::store_failed(&e)),
        },
        SessionCommand::List => print_sentences(controller),
        SessionCommand::Pages => print_pages(controller),
        SessionCommand::Export(ExportTarget::Page(page_number)) => {
            report_export(controller.export_page(page_number));
        }
        SessionCommand::Export(ExportTarget::All) => {
            for (_, result) in controller.export_all() {
                report_export(result);
            }
        }
        SessionCommand::Reset => print_notice(&controller.reset()),
        SessionCommand::Status => print_status(controller),
        SessionCommand::Ping => match controller.gateway().check_connection().await {
            Ok(()) => println!("{} is reachable", controller.gateway().provider_name()),
            Err(e) => println!("✖ {}", e),
        },
        SessionCommand::Help => println!("{}", HELP_TEXT),
        SessionCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}

/// Interactive session; generation runs in the background so the prompt stays live
async fn run_session(mut controller: Controller) -> Result<()> {
    let (results_tx, mut results_rx) = mpsc::unbounded_channel::<(GenerationTicket, GenerationResult)>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut collecting: Option<Vec<String>> = None;

    println!("{}", controller.config().worksheet.title);
    println!("Type 'help' for commands.");
    print_prompt(false);

    loop {
        tokio::select! {
            Some((ticket, result)) = results_rx.recv() => {
                if let Some(notice) = controller.finish_generation(ticket, result) {
                    println!();
                    print_notice(&notice);
                }
                print_prompt(collecting.is_some());
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };

                if let Some(buffer) = collecting.as_mut() {
                    if line.trim() == "." {
                        let text = buffer.join("\n");
                        collecting = None;
                        let added = controller.add_manual(&text);
                        println!("Added {} sentence(s)", added);
                    } else {
                        buffer.push(line);
                    }
                    print_prompt(collecting.is_some());
                    continue;
                }

                if !line.trim().is_empty() {
                    match line.parse::<SessionCommand>() {
                        Ok(command) => {
                            if let Flow::Quit =
                                handle_command(&mut controller, command, &results_tx, &mut collecting).await
                            {
                                break;
                            }
                        }
                        Err(e) => println!("{}", e),
                    }
                }
                print_prompt(collecting.is_some());
            }
        }
    }

    Ok(())
}

/// One-shot worksheet build: manual sentences, generation, then export of every page
async fn run_build(mut controller: Controller, args: &BuildArgs) -> Result<()> {
    if !args.no_generate {
        args.generate_args().apply(controller.form_mut());
        if let Some(notice) = controller.generate().await {
            print_notice(&notice);
            if notice.is_error() {
                return Err(anyhow!("Generation failed: {}", notice.description));
            }
        }
    }

    if let Some(path) = &args.manual {
        let text = FileManager::read_to_string(path)?;
        let added = controller.add_manual(&text);
        info!("Added {} sentences from {:?}", added, path);
    }

    let total = controller.page_count();
    let progress_bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));

    let mut failures = 0;
    for page_number in 1..=total {
        progress_bar.set_message(format!("page {}", page_number));
        match controller.export_page(page_number) {
            Ok(path) => progress_bar.println(format!("Saved {}", path.display())),
            Err(notice) => {
                failures += 1;
                progress_bar.println(notice.to_string());
            }
        }
        progress_bar.inc(1);
    }
    progress_bar.finish_and_clear();

    if failures > 0 {
        return Err(anyhow!("{} of {} pages could not be exported", failures, total));
    }

    info!(
        "Exported {} page(s) with {} sentences",
        total,
        controller.store().len()
    );
    Ok(())
}
