use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
    process::exit,
    time::Instant,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use sqf_frontend::{
    cache::cache::{ModuleCache, RootConfig, SourceProvider, WaitPolicy},
    commands::signatures::CommandTable,
    errors::errors::{CacheError, Diagnostic, Severity},
    header::parser::parse_header,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::{type_check, CheckerConfig},
};

#[derive(Parser, Debug)]
#[command(name = "sqf-check")]
#[command(about = "Syntax and type checker for SQF scripts and config files")]
struct Args {
    /// Files to check; `.hpp`, `.ext` and `.cpp` files are read as config
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Extra command descriptors (JSON) loaded after the bundled ones
    #[arg(long)]
    commands: Option<PathBuf>,

    /// Print diagnostics as JSON
    #[arg(long)]
    json: bool,

    /// Root config (description.ext or config.cpp) declaring CfgFunctions
    #[arg(long)]
    header: Option<PathBuf>,

    /// Warn when a local variable is read before it is assigned
    #[arg(long)]
    warn_undefined: bool,
}

/// Reads root configs straight from disk.
struct FileProvider;

impl SourceProvider<PathBuf> for FileProvider {
    fn load_root_config(
        &self,
        module: &PathBuf,
        _wait: &WaitPolicy,
    ) -> Result<Option<RootConfig>, CacheError> {
        if !module.is_file() {
            return Ok(None);
        }

        let source = read_to_string(module).map_err(|error| CacheError::Provider {
            module: module.display().to_string(),
            message: error.to_string(),
        })?;

        Ok(Some(RootConfig {
            file: module.display().to_string(),
            source,
        }))
    }
}

fn is_config_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("hpp" | "ext" | "cpp" | "h")
    )
}

fn load_table(commands: &Option<PathBuf>) -> Result<CommandTable> {
    let mut table = CommandTable::global().clone();

    if let Some(path) = commands {
        let json = read_to_string(path)
            .with_context(|| format!("failed to read command descriptors {}", path.display()))?;
        let extra = CommandTable::from_json(&json)
            .with_context(|| format!("invalid command descriptors in {}", path.display()))?;
        info!("loaded {} extra signatures from {}", extra.len(), path.display());
        table.extend(extra);
    }

    Ok(table)
}

fn load_config(args: &Args, cache: &ModuleCache<PathBuf>) -> Result<CheckerConfig> {
    let mut config = CheckerConfig {
        warn_undefined_locals: args.warn_undefined,
        ..Default::default()
    };

    if let Some(header) = &args.header {
        let functions = cache
            .config_functions(header, &FileProvider)
            .with_context(|| format!("failed to read functions from {}", header.display()))?;
        for function in &functions {
            config.add_function(&function.full_name());
        }
        info!("{} functions declared in {}", functions.len(), header.display());
    }

    Ok(config)
}

fn check_file(path: &Path, source: &str, table: &CommandTable, config: &CheckerConfig) -> Vec<Diagnostic> {
    let file = path.display().to_string();

    if is_config_file(path) {
        return parse_header(source, &file).diagnostics;
    }

    let (tokens, mut diagnostics) = tokenize(source, Some(file.as_str()));
    let parsed = parse(tokens, &file, table);
    diagnostics.extend(parsed.diagnostics);
    diagnostics.sort_by_key(|d| d.get_span().start);

    diagnostics.extend(type_check(&parsed.program, table, config, &file).diagnostics);
    diagnostics
}

fn diagnostic_to_json(diagnostic: &Diagnostic) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(diagnostic)?;
    if let Some(object) = value.as_object_mut() {
        object.insert("message".to_string(), diagnostic.message().into());
    }
    Ok(value)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let table = load_table(&args.commands)?;
    let cache = ModuleCache::new();
    let config = load_config(&args, &cache)?;

    let mut has_errors = false;
    let mut reports = vec![];

    for path in &args.files {
        let start = Instant::now();
        let source = read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let diagnostics = check_file(path, &source, &table, &config);
        debug!("checked {} in {:?}", path.display(), start.elapsed());

        has_errors |= diagnostics
            .iter()
            .any(|d| d.get_severity() == Severity::Error);

        if args.json {
            for diagnostic in &diagnostics {
                reports.push(diagnostic_to_json(diagnostic)?);
            }
        } else {
            for diagnostic in &diagnostics {
                println!("{}", diagnostic.render(&source));
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    if has_errors {
        exit(1);
    }
    Ok(())
}
