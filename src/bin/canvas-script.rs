use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use canvas_script::{ExecutionReport, ManualClock, MemoryDocument, Session, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "canvas-script", version)]
struct Cli {
    /// Log engine activity to stderr (repeat for more detail).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Type-check a script without running it.
    Check(CheckArgs),
    /// Run a script against an in-memory canvas and print the resulting document.
    Run(RunArgs),
    /// Run a script, then print the script generated back from the canvas.
    Export(RunArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input script.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input script.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Session configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Element ids to click after execution, in order.
    #[arg(long = "click")]
    clicks: Vec<String>,

    /// Number of `next slide` steps to take after the clicks.
    #[arg(long, default_value_t = 0)]
    next: usize,

    /// Milliseconds of animation time to simulate at the end.
    #[arg(long, default_value_t = 0)]
    advance_ms: u64,

    /// Print the document as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Run(args) => cmd_run(args, false),
        Command::Export(args) => cmd_run(args, true),
    }
}

fn read_script(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read script '{}'", path.display()))
}

fn read_config(path: Option<&Path>) -> anyhow::Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    SessionConfig::from_json(&s).with_context(|| "parse session config JSON")
}

fn source_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let script = read_script(&args.in_path)?;
    let name = source_name(&args.in_path);
    let session = Session::new(MemoryDocument::new(), ManualClock::new());
    session.check(&script, name.as_deref())?;
    println!("ok");
    Ok(())
}

fn cmd_run(args: RunArgs, export: bool) -> anyhow::Result<()> {
    let script = read_script(&args.in_path)?;
    let config = read_config(args.config.as_deref())?;
    let name = source_name(&args.in_path);

    let mut session = Session::with_config(MemoryDocument::new(), ManualClock::new(), config)?;
    let mut reports = vec![session.execute(&script, name.as_deref())?];

    for id in &args.clicks {
        match session.click_id(id) {
            Some(report) => reports.push(report),
            None => eprintln!("no click handler for '{id}'"),
        }
    }
    for _ in 0..args.next {
        reports.push(session.next_slide());
    }
    if args.advance_ms > 0 {
        session.advance(Duration::from_millis(args.advance_ms));
    }

    for d in reports.iter().flat_map(|r| &r.diagnostics) {
        eprintln!("{d}");
    }
    for notice in session.doc().notices() {
        eprintln!("notice: {notice}");
    }

    if export {
        print!("{}", session.generate_script());
    } else if args.json {
        let out = serde_json::to_string_pretty(&session.doc().dump())
            .with_context(|| "serialize document")?;
        println!("{out}");
    } else {
        print_summary(&session, &reports);
    }
    Ok(())
}

fn print_summary(session: &Session<MemoryDocument, ManualClock>, reports: &[ExecutionReport]) {
    let dump = session.doc().dump();
    let diagnostics: usize = reports.iter().map(|r| r.diagnostics.len()).sum();
    println!(
        "elements={} connections={} diagnostics={}",
        dump.elements.len(),
        dump.connections.len(),
        diagnostics
    );
    if let Some(p) = session.presentation() {
        println!("slide={}/{}", p.current() + 1, p.len());
    }
}
