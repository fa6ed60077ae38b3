use anyhow::{Context, Result};
use clap::Parser;
use main_dex_list::cli::{Cli, Commands, OutputFormat};
use main_dex_list::config::{Config, load_config, resolve_classpath, resolve_format};
use main_dex_list::report::{ClosureReport, render_text};
use main_dex_list::roots::{roots_from_container, roots_from_file};
use main_dex_list::{ClassPath, ClassPathElement, UnitName, resolve_closure};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

const STATUS_ERROR: u8 = 1;

fn main() -> ExitCode {
    let cli = parse_cli();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("A fatal error occurred: {err:#}");
            ExitCode::from(STATUS_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Build {
            roots,
            classpath,
            root_names,
            roots_file,
            format,
            output,
        } => {
            let roots = collect_roots(roots.as_deref(), &root_names, roots_file, &config)?;
            let locations = resolve_classpath(classpath.as_deref(), &config)?;
            let format = resolve_format(format, &config);
            build(roots, &locations, format, output.as_deref())
        }
        Commands::List { location } => {
            let mut element = ClassPathElement::from_location(&location)?;
            let mut out = String::new();
            for path in element.list() {
                out.push_str(&path);
                out.push('\n');
            }
            element.close();
            write_output(&out, None)
        }
    }
}

fn parse_cli() -> Cli {
    let args: Vec<String> = std::env::args().collect();
    Cli::parse_from(rewrite_args_for_implicit_build(args))
}

/// `main-dex-list roots.jar a.jar:b.jar` is shorthand for `main-dex-list build ...`.
///
/// `build` goes right after the program name: its own options are not global,
/// so they must follow the subcommand, and the global ones are accepted there too.
fn rewrite_args_for_implicit_build(mut args: Vec<String>) -> Vec<String> {
    if args.len() <= 1 {
        return args;
    }

    let subcommands = ["build", "list", "help"];
    let with_value = [
        "--config",
        "--root",
        "--roots-file",
        "-f",
        "--format",
        "-o",
        "--output",
    ];

    let mut idx = 1usize;
    while idx < args.len() {
        let a = args[idx].as_str();
        if a == "--" {
            idx += 1;
            break;
        }

        if with_value.contains(&a) {
            idx += 2;
            continue;
        }

        if a.starts_with('-') {
            idx += 1;
            continue;
        }

        break;
    }

    if idx < args.len() {
        let token = args[idx].as_str();
        if !subcommands.contains(&token) {
            args.insert(1, "build".to_string());
        }
    }

    args
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn collect_roots(
    container: Option<&Path>,
    names: &[String],
    roots_file: Option<PathBuf>,
    config: &Config,
) -> Result<Vec<UnitName>> {
    let mut roots = Vec::new();
    if let Some(container) = container {
        roots.extend(roots_from_container(container)?);
    }
    if let Some(file) = roots_file.or_else(|| config.roots_file.clone()) {
        roots.extend(roots_from_file(&file)?);
    }
    roots.extend(names.iter().map(|n| UnitName::parse(n)));

    if roots.is_empty() {
        anyhow::bail!("No root classes given (pass a jar of roots, --root or --roots-file)");
    }
    Ok(roots)
}

fn build(
    roots: Vec<UnitName>,
    locations: &[PathBuf],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let start = Instant::now();
    let root_count = roots.len();
    let classpath = ClassPath::new(locations).context("Wrong classpath")?;
    let closure = resolve_closure(roots, classpath)?;

    let content = match format {
        OutputFormat::Text => render_text(&closure),
        OutputFormat::Json => {
            let report =
                ClosureReport::new(&closure, root_count, start.elapsed().as_millis() as u64);
            serde_json::to_string_pretty(&report)?
        }
    };

    write_output(&content, output)
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    } else {
        print!("{content}");
        if !content.is_empty() && !content.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}
