//! Command-line interface for inspecting configuration documents.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use serde::Serialize;

use crate::environment::StandardEnvironment;
use crate::error::Result;
use crate::reader::{
    CollectingProblemReporter, FailFastProblemReporter, Problem, ProblemReporter,
    XmlDefinitionReader,
};
use crate::registry::{InMemoryDefinitionRegistry, RegistrySnapshot};
use crate::resource::DefaultResourceLoader;
use crate::types::Definition;

/// confdoc - Read declarative component configuration documents.
#[derive(Parser)]
#[command(name = "confdoc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a document and print the registered definitions.
    Inspect {
        /// Document location: path, file:/http(s): URL or classpath(*): pattern
        location: String,

        /// Activate a profile (repeatable)
        #[arg(short, long = "profile")]
        profiles: Vec<String>,

        /// Set a placeholder property as key=value (repeatable)
        #[arg(short = 'D', long = "property", value_parser = parse_key_value)]
        properties: Vec<(String, String)>,

        /// Read placeholder properties from a YAML file
        #[arg(long = "properties")]
        properties_file: Option<PathBuf>,

        /// Directory searched for classpath: locations (repeatable)
        #[arg(short = 'r', long = "search-root")]
        search_roots: Vec<PathBuf>,

        /// Allow later definitions and aliases to replace earlier ones
        #[arg(long)]
        allow_override: bool,

        /// Stop at the first problem
        #[arg(long)]
        fail_fast: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Yaml,
}

/// Settings of one `inspect` run.
#[derive(Debug, Clone)]
pub struct InspectOptions {
    pub location: String,
    pub profiles: Vec<String>,
    pub properties: Vec<(String, String)>,
    pub properties_file: Option<PathBuf>,
    pub search_roots: Vec<PathBuf>,
    pub allow_override: bool,
    pub fail_fast: bool,
}

/// Result of loading a document, as printed by `inspect`.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub location: String,
    pub loaded: usize,
    #[serde(flatten)]
    pub registry: RegistrySnapshot,
    pub problems: Vec<Problem>,
}

/// Run the CLI.
///
/// Returns the number of problems found.
pub fn run() -> Result<usize> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            location,
            profiles,
            properties,
            properties_file,
            search_roots,
            allow_override,
            fail_fast,
            format,
        } => {
            let options = InspectOptions {
                location,
                profiles,
                properties,
                properties_file,
                search_roots,
                allow_override,
                fail_fast,
            };
            inspect_command(&options, format)
        }
    }
}

/// Load the document described by `options` into a fresh registry.
///
/// # Errors
/// Fails when the properties file cannot be read, the document cannot be
/// loaded, or a problem is escalated in fail-fast mode.
pub fn inspect(options: &InspectOptions) -> Result<InspectReport> {
    let mut environment = StandardEnvironment::new()
        .with_active_profiles(options.profiles.iter().cloned())
        .with_properties(options.properties.iter().cloned());
    if let Some(path) = &options.properties_file {
        environment = environment.with_yaml_file(path)?;
    }

    let registry = Arc::new(InMemoryDefinitionRegistry::new().with_overriding(options.allow_override));
    let collector = Arc::new(CollectingProblemReporter::new());
    let reporter: Arc<dyn ProblemReporter> = if options.fail_fast {
        Arc::new(FailFastProblemReporter)
    } else {
        collector.clone()
    };

    let reader = XmlDefinitionReader::new(registry.clone())
        .with_environment(Arc::new(environment))
        .with_resource_loader(Arc::new(
            DefaultResourceLoader::new().with_search_roots(options.search_roots.iter().cloned()),
        ))
        .with_problem_reporter(reporter);

    let loaded = reader.load_definitions(&options.location)?;

    Ok(InspectReport {
        location: options.location.clone(),
        loaded,
        registry: registry.snapshot(),
        problems: collector.take(),
    })
}

fn inspect_command(options: &InspectOptions, format: OutputFormat) -> Result<usize> {
    let report = inspect(options)?;
    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&report)?),
        OutputFormat::Text => print_text(&report),
    }
    Ok(report.problems.len())
}

fn print_text(report: &InspectReport) {
    println!(
        "{} {} definitions from {}",
        style("Loaded").bold(),
        style(report.loaded).cyan(),
        style(&report.location).green()
    );
    println!();

    for (name, definition) in &report.registry.definitions {
        println!("  {} {}", style(name).cyan().bold(), describe(definition));
    }

    if !report.registry.aliases.is_empty() {
        println!();
        println!("{}", style("Aliases:").bold());
        for (alias, name) in &report.registry.aliases {
            println!("  {alias} -> {name}");
        }
    }

    if !report.problems.is_empty() {
        println!();
        println!(
            "{} {}",
            style("Problems:").red().bold(),
            style(report.problems.len()).yellow().bold()
        );
        for problem in &report.problems {
            println!(
                "  [{}] {}",
                style(problem.kind.as_str()).yellow(),
                problem.message
            );
            println!("      at {}", problem.location);
            if let Some(cause) = &problem.cause {
                println!("      caused by: {cause}");
            }
        }
    }
}

fn describe(definition: &Definition) -> String {
    let mut parts = Vec::new();
    if let Some(class_name) = &definition.class_name {
        parts.push(class_name.clone());
    }
    if let Some(parent) = &definition.parent_name {
        parts.push(format!("parent={parent}"));
    }
    if let Some(factory_bean) = &definition.factory_bean {
        parts.push(format!("factory-bean={factory_bean}"));
    }
    if definition.is_abstract {
        parts.push("abstract".to_string());
    }
    if definition.lazy_init {
        parts.push("lazy".to_string());
    }
    if let Some(scope) = &definition.scope {
        parts.push(format!("scope={scope}"));
    }
    if !definition.properties.is_empty() {
        parts.push(format!("{} properties", definition.properties.len()));
    }
    if !definition.constructor_args.is_empty() {
        parts.push(format!("{} constructor args", definition.constructor_args.len()));
    }
    parts.join(", ")
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}
