use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use sitexml_core::{CategoryStrategy, Config, GeneratorOptions, Result, SiteGenerator, SiteXmlError};

mod args;
use args::{Cli, Commands, ConfigAction, Shell, SiteArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config_path = resolve_config_path(cli.config.as_deref());

    let result = match cli.command {
        Some(Commands::Generate { site, dry_run }) => handle_generate(&config_path, &site, dry_run),
        Some(Commands::Inspect { site }) => handle_inspect(&config_path, &site),
        Some(Commands::Config { action }) => handle_config(action, &config_path),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => handle_generate(&config_path, &cli.site, cli.dry_run),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn init_tracing(cli: &Cli) {
    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "sitexml_core=error",
        (false, 0) => "sitexml_core=info",
        (false, 1) => "sitexml_core=debug",
        _ => "sitexml_core=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "p2-sitexml", &mut io::stdout());
}

fn resolve_config_path(cli_config: Option<&Path>) -> PathBuf {
    match cli_config {
        Some(path) => path.to_path_buf(),
        None => Config::path(Path::new(".")),
    }
}

/// Build generator options
/// Priority: CLI options / environment > config file > defaults
fn build_options(config_path: &Path, site: &SiteArgs) -> Result<GeneratorOptions> {
    let mut options = Config::load(config_path)?.to_options();

    if let Some(repository) = &site.repository {
        options.repository = repository.clone();
    }
    if let Some(category) = &site.category {
        options.category = CategoryStrategy::from_override(Some(category.as_str()));
    }
    if let Some(extractor) = site.extractor {
        options.extractor = extractor.into();
    }

    Ok(options)
}

fn handle_generate(config_path: &Path, site: &SiteArgs, dry_run: bool) -> Result<()> {
    let generator = SiteGenerator::new(build_options(config_path, site)?);

    if dry_run {
        let result = generator.dry_run()?;
        print!("{}", result.plan.xml);
        return Ok(());
    }

    let result = generator.generate()?;
    if let Some(output) = result.output {
        println!(
            "{} {} ({} features, {} categories)",
            "Wrote:".green(),
            output.display(),
            result.plan.entries.len(),
            result.plan.categories.len()
        );
    }
    Ok(())
}

fn handle_inspect(config_path: &Path, site: &SiteArgs) -> Result<()> {
    let options = build_options(config_path, site)?;
    let generator = SiteGenerator::new(options.clone());
    let plan = generator.plan()?;

    println!();
    println!("Repository: {}", plan.repository.display().to_string().cyan());
    println!("Extractor:  {}", options.extractor);
    match &options.category {
        CategoryStrategy::Fixed(name) => println!("Category:   {} (fixed)", name.yellow()),
        CategoryStrategy::Inferred => println!("Metadata:   {}", plan.metadata_source),
    }
    println!();

    if plan.entries.is_empty() {
        println!("No feature archives found.");
        return Ok(());
    }

    for entry in &plan.entries {
        println!(
            "  {} {}",
            entry.identity.id.cyan().bold(),
            entry.identity.version
        );
        println!("    {}", entry.archive.url.dimmed());
        match &entry.category {
            Some(category) => println!("    category: {}", category.yellow()),
            None => println!("    category: {}", "(none)".dimmed()),
        }
    }
    println!();

    Ok(())
}

fn handle_config(action: ConfigAction, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(config_path)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(SiteXmlError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(config_path)?;
            config.set(&key, &value)?;
            config.save(config_path)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(config_path)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(config_path)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}
