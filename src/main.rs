//! CLI entry point for prix

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use termcolor::{Color, ColorSpec, WriteColor};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use prix::alias::{AliasStore, print_aliases};
use prix::cleanup::{self, find_candidates, print_candidates, print_failures, remove_all};
use prix::error::{AliasError, HistoryError};
use prix::history::{self, DEFAULT_LIMIT, load_history, print_history, query};
use prix::lines::{count_tree, print_line_report};
use prix::output::{OutputConfig, Status, header, print_json, print_status, stdout_for};
use prix::probe::{PROBE_EXCLUDED, ProjectProbe, print_summary};
use prix::runner::{CommandRunner, print_command_result};
use prix::scan::{DEFAULT_EXCLUDED, DEFAULT_EXTENSIONS, ScanConfig};
use prix::todos::{DEFAULT_TAGS, print_todos, scan_tree};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // https://no-color.org/
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "prix")]
#[command(about = "Developer toolkit: line counts, TODO scanning, project checks and command aliases")]
#[command(version)]
struct Cli {
    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto", global = true)]
    color: ColorMode,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Output in JSON format
    #[arg(long = "json", global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the directory scanning commands.
#[derive(Args, Debug)]
struct ScanArgs {
    /// Directory to scan
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// File extensions to include (comma separated)
    #[arg(short = 'e', long = "ext", value_delimiter = ',')]
    ext: Vec<String>,

    /// Directory names to skip (comma separated)
    #[arg(short = 'i', long = "ignore", value_delimiter = ',')]
    ignore: Vec<String>,
}

impl ScanArgs {
    /// Build a scan config, falling back to the given defaults for options
    /// that were not passed.
    fn config(&self, default_extensions: &[&str], default_excluded: &[&str]) -> ScanConfig {
        let config = ScanConfig::new(self.dir.clone());
        let config = if self.ignore.is_empty() {
            config.excluding(default_excluded.iter().copied())
        } else {
            config.excluding(&self.ignore)
        };
        if self.ext.is_empty() {
            config.with_extensions(default_extensions.iter().copied())
        } else {
            config.with_extensions(&self.ext)
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count lines of code by file extension
    Count(ScanArgs),

    /// Find TODO, FIXME and other tagged comments
    Todo {
        #[command(flatten)]
        scan: ScanArgs,

        /// Tags to search for (comma separated)
        #[arg(short = 't', long = "type", value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Analyze project structure and configuration
    Analyze(ScanArgs),

    /// Save, list and run command aliases
    Alias {
        /// Alias file location
        #[arg(long = "alias-file", env = "PRIX_ALIAS_FILE", value_name = "PATH", global = true)]
        alias_file: Option<PathBuf>,

        #[command(subcommand)]
        action: Option<AliasAction>,
    },

    /// Show recent shell history and re-run entries
    History {
        /// Number of entries to show
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Only show commands containing TEXT (case insensitive)
        #[arg(short, long, value_name = "TEXT")]
        search: Option<String>,

        /// Run the entry numbered N
        #[arg(long, value_name = "N")]
        run: Option<usize>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove generated build and dependency directories
    Cleanup {
        /// Project directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Show what would be deleted without deleting
        #[arg(short, long)]
        dry_run: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// List available commands
    List,
}

#[derive(Subcommand, Debug)]
enum AliasAction {
    /// Save an alias for a command
    Set {
        /// Overwrite an existing alias
        #[arg(short, long)]
        force: bool,

        /// Alias name (letters, numbers, _ and -)
        name: String,

        /// Command to run; words are joined with spaces
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Delete an alias
    Remove { name: String },

    /// Delete every alias
    Clear,

    /// Run a saved alias
    Run { name: String },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = OutputConfig {
        use_color: !cli.json && should_use_color(cli.color),
        json: cli.json,
    };

    if let Err(e) = run(cli.command, output).await {
        eprintln!("prix: {:#}", e);
        process::exit(1);
    }
}

async fn run(command: Commands, output: OutputConfig) -> Result<()> {
    debug!(?command, "dispatching");
    match command {
        Commands::Count(args) => count(&args, output),
        Commands::Todo { scan, tags } => todo(&scan, tags, output),
        Commands::Analyze(args) => analyze(&args, output),
        Commands::Alias { alias_file, action } => alias(alias_file, action, output).await,
        Commands::History {
            limit,
            search,
            run,
            yes,
        } => show_history(limit, search.as_deref(), run, yes, output).await,
        Commands::Cleanup { dir, dry_run, yes } => clean(dir, dry_run, yes, output),
        Commands::List => list(output),
    }
}

fn count(args: &ScanArgs, output: OutputConfig) -> Result<()> {
    let report = count_tree(args.config(DEFAULT_EXTENSIONS, DEFAULT_EXCLUDED))?;
    if output.json {
        print_json(&report)?;
        return Ok(());
    }

    print_line_report(&report, output.use_color)?;
    print_status(
        &Status::from_warnings("Line count complete", &report.warnings),
        output.use_color,
    )?;
    Ok(())
}

fn todo(args: &ScanArgs, tags: Vec<String>, output: OutputConfig) -> Result<()> {
    let tags = if tags.is_empty() {
        DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
    } else {
        tags
    };

    let report = scan_tree(args.config(DEFAULT_EXTENSIONS, DEFAULT_EXCLUDED), &tags)?;
    if output.json {
        print_json(&report)?;
        return Ok(());
    }

    if report.matches.is_empty() {
        let status = Status::from_warnings("No TODOs found", &report.warnings);
        print_status(&status, output.use_color)?;
        return Ok(());
    }

    print_todos(&report, output.use_color)?;
    let noun = if report.matches.len() == 1 { "TODO" } else { "TODOs" };
    let message = format!("Found {} {}", report.matches.len(), noun);
    print_status(
        &Status::from_warnings(message, &report.warnings),
        output.use_color,
    )?;
    Ok(())
}

fn analyze(args: &ScanArgs, output: OutputConfig) -> Result<()> {
    let summary = ProjectProbe::with_config(args.config(&[], PROBE_EXCLUDED)).probe()?;
    if output.json {
        print_json(&summary)?;
        return Ok(());
    }

    print_summary(&summary, output.use_color)?;
    print_status(
        &Status::from_warnings("Analysis complete", &summary.warnings),
        output.use_color,
    )?;
    Ok(())
}

async fn alias(
    alias_file: Option<PathBuf>,
    action: Option<AliasAction>,
    output: OutputConfig,
) -> Result<()> {
    let store = match alias_file {
        Some(path) => AliasStore::new(path),
        None => AliasStore::beside_executable().context("cannot locate alias file")?,
    };
    debug!(path = %store.path().display(), "using alias file");

    let status = match action {
        None => {
            let record = store.load();
            if output.json {
                print_json(&record)?;
                return Ok(());
            }
            if record.is_empty() {
                println!("No aliases saved. Add one with: prix alias set <name> <command>");
                return Ok(());
            }
            let mut stdout = stdout_for(output.use_color);
            header(&mut stdout, "Saved Aliases")?;
            print_aliases(&record, output.use_color)?;
            Status::Success(format!("Total aliases: {}", record.len()))
        }
        Some(AliasAction::Set {
            force,
            name,
            command,
        }) => {
            let command = command.join(" ");
            if !force && store.load().contains(&name) {
                return Err(AliasError::AlreadyExists(name).into());
            }
            store.set(&name, &command)?;
            Status::Success(format!("Alias '{}' saved: {}", name, command))
        }
        Some(AliasAction::Remove { name }) => {
            store.remove(&name)?;
            Status::Success(format!("Alias '{}' removed", name))
        }
        Some(AliasAction::Clear) => {
            let count = store.clear()?;
            Status::Success(format!("Cleared {} alias(es)", count))
        }
        Some(AliasAction::Run { name }) => {
            let command = store.get(&name)?;
            return run_command(&command, output).await;
        }
    };

    if output.json {
        print_json(&store.load())?;
    } else {
        print_status(&status, output.use_color)?;
    }
    Ok(())
}

/// Run a command through the host shell and report its output.
async fn run_command(command: &str, output: OutputConfig) -> Result<()> {
    if !output.json {
        let mut stdout = stdout_for(output.use_color);
        let mut dim = ColorSpec::new();
        dim.set_dimmed(true);
        stdout.set_color(&dim)?;
        writeln!(stdout, "$ {}", command)?;
        stdout.reset()?;
    }

    let result = CommandRunner::new().run(command).await;
    if output.json {
        print_json(&result)?;
    } else {
        print_command_result(&result, output.use_color)?;
    }

    match result.failure {
        Some(failure) => Err(anyhow::Error::new(failure).context(format!("'{}' failed", command))),
        None => Ok(()),
    }
}

async fn show_history(
    limit: usize,
    search: Option<&str>,
    run: Option<usize>,
    yes: bool,
    output: OutputConfig,
) -> Result<()> {
    let home = dirs::home_dir().ok_or(HistoryError::NoHomeDir)?;
    let entries = load_history(&home, &CommandRunner::new()).await?;

    if let Some(number) = run {
        let command = history::entry(&entries, search, number)?;
        if !confirm(&format!("Run '{}'?", command), yes)? {
            println!("Cancelled.");
            return Ok(());
        }
        return run_command(&command, output).await;
    }

    let shown = query(&entries, search, limit);
    if output.json {
        print_json(&shown)?;
        return Ok(());
    }
    if shown.is_empty() {
        print_status(
            &Status::Success("No matching history entries".into()),
            output.use_color,
        )?;
        return Ok(());
    }

    let mut stdout = stdout_for(output.use_color);
    header(&mut stdout, "Command History")?;
    print_history(&shown, output.use_color)?;
    println!();
    println!("Run an entry with: prix history --run <N>");
    // The newest match carries the match total as its number.
    let total = shown.first().map_or(0, |e| e.number);
    print_status(
        &Status::Success(format!("Total commands: {}", total)),
        output.use_color,
    )?;
    Ok(())
}

fn clean(dir: PathBuf, dry_run: bool, yes: bool, output: OutputConfig) -> Result<()> {
    let candidates = find_candidates(&dir)?;

    if candidates.is_empty() || dry_run {
        let report = cleanup::dry_run(candidates);
        if output.json {
            print_json(&report)?;
        } else if report.candidates.is_empty() {
            print_status(&Status::Success("Nothing to clean".into()), output.use_color)?;
        } else {
            print_candidates(&report.candidates, output.use_color)?;
            print_status(
                &Status::Success("Dry run: nothing deleted".into()),
                output.use_color,
            )?;
        }
        return Ok(());
    }

    if !output.json {
        print_candidates(&candidates, output.use_color)?;
    }
    if !confirm("Delete these directories?", yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let total = candidates.len();
    let report = remove_all(candidates);
    if output.json {
        print_json(&report)?;
        return Ok(());
    }

    print_failures(&report, output.use_color)?;
    let message = format!("Removed {} of {} directories", report.removed.len(), total);
    let status = if report.failures.is_empty() {
        Status::Success(message)
    } else {
        Status::Partial {
            message,
            warnings: report.failures.len(),
        }
    };
    print_status(&status, output.use_color)?;
    Ok(())
}

/// Ask a yes/no question on the terminal. Without a terminal the answer
/// must be given up front with `--yes`.
fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        bail!("confirmation required but stdin is not a terminal (pass --yes)");
    }

    eprint!("{} [y/N] ", prompt);
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// One entry of the command listing.
#[derive(Debug, Serialize)]
struct CommandInfo {
    name: String,
    usage: String,
    about: String,
}

/// Every subcommand of the parser, sorted by name.
fn command_registry() -> Vec<CommandInfo> {
    let cli = Cli::command();
    let mut commands: Vec<CommandInfo> = cli
        .get_subcommands()
        .filter(|c| c.get_name() != "help")
        .map(|c| {
            let mut usage: Vec<String> = c
                .get_arguments()
                .filter(|a| a.is_positional())
                .map(|a| {
                    let name = a.get_id().as_str().to_uppercase();
                    if a.is_required_set() {
                        format!("<{}>", name)
                    } else {
                        format!("[{}]", name)
                    }
                })
                .collect();
            let actions: Vec<&str> = c.get_subcommands().map(|s| s.get_name()).collect();
            if !actions.is_empty() {
                usage.push(format!("[{}]", actions.join("|")));
            }
            CommandInfo {
                name: c.get_name().to_string(),
                usage: usage.join(" "),
                about: c.get_about().map(|a| a.to_string()).unwrap_or_default(),
            }
        })
        .collect();
    commands.sort_by(|a, b| a.name.cmp(&b.name));
    commands
}

fn list(output: OutputConfig) -> Result<()> {
    let commands = command_registry();
    if output.json {
        print_json(&commands)?;
        return Ok(());
    }

    let mut stdout = stdout_for(output.use_color);
    header(&mut stdout, "Available Commands")?;
    let mut name_spec = ColorSpec::new();
    name_spec.set_fg(Some(Color::Cyan)).set_bold(true);
    for info in &commands {
        write!(stdout, "  ")?;
        stdout.set_color(&name_spec)?;
        write!(stdout, "{:<10}", info.name)?;
        stdout.reset()?;
        writeln!(stdout, "{:<28}{}", info.usage, info.about)?;
    }
    print_status(
        &Status::Success(format!("Total: {} commands available", commands.len())),
        output.use_color,
    )?;
    Ok(())
}
