use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{CommandResponse, CommandResult};
use shortcut_export::{ExportConfig, SignMode};
use shortcut_model::ContainerFormat;
use shortcut_protocol::{serialize_json_pretty, ErrorEnvelope};
use shortcut_templates::TemplateRegistry;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "shortcut")]
#[command(about = "Generate and inspect macOS Shortcut files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML configuration file (overrides SHORTCUT_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available templates
    Templates,

    /// Show one template's parameter schema
    Describe(DescribeArgs),

    /// Render a template to a .shortcut file
    Generate(GenerateArgs),

    /// Decode a .shortcut file and summarise it
    Inspect(InspectArgs),

    /// Show generation statistics
    Stats,
}

#[derive(Args)]
struct DescribeArgs {
    /// Template name
    name: String,
}

#[derive(Args)]
struct GenerateArgs {
    /// Template name
    template: String,

    /// Template parameter as key=value (repeatable). JSON values keep their
    /// type: showResult=false, operations='[{"type":"uppercase"}]'. Numbers
    /// and booleans given for text parameters are passed as text (input=2024)
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Shortcut name (default: the template's display name)
    #[arg(long)]
    name: Option<String>,

    /// Output directory (overrides config and SHORTCUT_OUTPUT_DIR)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Physical encoding: binary or xml
    #[arg(long, value_parser = parse_format)]
    format: Option<ContainerFormat>,

    /// Sign with the shortcuts tool: anyone or people-who-know-me
    #[arg(long, value_parser = parse_sign_mode)]
    sign: Option<SignMode>,

    /// Open the written file in the Shortcuts app
    #[arg(long)]
    open: bool,
}

#[derive(Args)]
struct InspectArgs {
    /// Path to a .shortcut file
    file: PathBuf,

    /// Include each action's parameters as JSON
    #[arg(long)]
    parameters: bool,
}

fn parse_format(raw: &str) -> std::result::Result<ContainerFormat, String> {
    raw.parse()
}

fn parse_sign_mode(raw: &str) -> std::result::Result<SignMode, String> {
    raw.parse()
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn load_config(cli: &Cli) -> std::result::Result<ExportConfig, ErrorEnvelope> {
    ExportConfig::load(cli.config.as_deref())
        .map_err(|err| ErrorEnvelope::new(err.code(), err.to_string()))
}

fn run(cli: &Cli) -> CommandResult {
    let registry = TemplateRegistry::with_builtins();
    match &cli.command {
        Commands::Templates => commands::list_templates(&registry),
        Commands::Describe(args) => commands::describe_template(&registry, &args.name),
        Commands::Generate(args) => {
            let mut config = load_config(cli)?;
            if let Some(dir) = &args.out_dir {
                config.output_dir = dir.clone();
            }
            if let Some(format) = args.format {
                config.format = format;
            }
            if let Some(mode) = args.sign {
                config.sign_mode = mode;
            }
            if args.open {
                config.open_after_write = true;
            }
            let params = commands::parse_params(&args.params)?;
            commands::generate(
                &registry,
                &config,
                args.template.trim(),
                &params,
                args.name.as_deref(),
            )
        }
        Commands::Inspect(args) => commands::inspect(&args.file, args.parameters),
        Commands::Stats => commands::stats(&load_config(cli)?),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let response = CommandResponse::from(run(&cli));
    println!("{}", serialize_json_pretty(&response)?);
    if response.is_error() {
        if let Some(error) = &response.error {
            log::error!("{}: {}", error.code, error.message);
        }
        std::process::exit(1);
    }
    Ok(())
}
