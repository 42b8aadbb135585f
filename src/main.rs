//! makedbg CLI
//!
//! Runs a build plan under the interactive debugger.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use makedbg::{
    BreakpointFlags, CommandRegistry, Config, Debugger, Host, MemoryHost, Outcome, PlanRunner,
};

#[derive(Parser)]
#[command(name = "makedbg")]
#[command(author, version, about = "Interactive debugger for build plans")]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "MAKEDBG_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a plan under the debugger
    Run(RunArgs),

    /// List debugger commands
    Commands,

    /// Initialize .makedbg directory
    Init,

    /// Show current configuration
    Config,
}

#[derive(Args)]
struct RunArgs {
    /// TOML build plan
    plan: PathBuf,

    /// Goal target (default: the plan's goal)
    goal: Option<String>,

    /// Set a breakpoint on a target before starting
    #[arg(long = "break", short = 'b', value_name = "TARGET")]
    breakpoints: Vec<String>,

    /// Stop at the first interception point
    #[arg(long)]
    stop: bool,

    /// Stop at every interception point
    #[arg(long)]
    stop_on_error: bool,

    /// Read plain lines instead of using the line editor
    #[arg(long)]
    no_editing: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load config
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Run(args) => {
            let code = run(config, &args)?;
            std::process::exit(code);
        }

        Commands::Commands => {
            let registry = CommandRegistry::global()?;
            for command in registry.commands() {
                let aliases = registry.aliases_of(command.long_name);
                let aliases = if aliases.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", aliases.join(", "))
                };
                println!(
                    "{:<9} ({}){} -- {}",
                    command.long_name,
                    command.short_code,
                    aliases,
                    command.summary()
                );
            }
        }

        Commands::Init => {
            let path = makedbg::config::init()?;
            println!("Initialized {}", path.display());
        }

        Commands::Config => {
            let text = toml::to_string_pretty(&config).context("serializing configuration")?;
            println!("{}", text);
        }
    }

    Ok(())
}

/// Build `plan` under the debugger until it finishes or the operator quits.
/// Returns the process exit code.
fn run(mut config: Config, args: &RunArgs) -> Result<i32> {
    if args.stop_on_error {
        config.debugger.stop_on_error = true;
    }
    if args.no_editing {
        config.debugger.line_editing = false;
    }

    let mut host = MemoryHost::from_file(&args.plan)
        .with_context(|| format!("reading plan {}", args.plan.display()))?;
    for target in &args.breakpoints {
        host.add_breakpoint(target, BreakpointFlags::all_points())?;
    }

    let mut debugger = Debugger::new(config)?;
    if args.stop {
        debugger.session_mut().stepping = 1;
    }

    loop {
        let outcome = PlanRunner::new(&mut debugger).run(&mut host, args.goal.as_deref())?;
        info!(?outcome, "Run ended");
        match outcome {
            Outcome::Finished => return Ok(0),
            Outcome::Quit(code) => return Ok(code),
            Outcome::Restart => {
                debugger.session_mut().clear_stepping();
                if args.stop {
                    debugger.session_mut().stepping = 1;
                }
            }
        }
    }
}
