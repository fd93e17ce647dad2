use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rustyline::{error::ReadlineError, DefaultEditor};
use tracing_subscriber::EnvFilter;

use wholf::{Diagnostic, EvalContext, Interpreter, Value, DEFAULT_MAX_CALL_DEPTH};

#[derive(Parser)]
#[command(author, version, about = "Wholf language interpreter")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Maximum depth of nested function calls
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Emit a trace event for every executed statement
    #[arg(long, global = true)]
    trace: bool,

    /// How diagnostics are written to stderr
    #[arg(long, global = true, value_enum, default_value_t = DiagnosticsFormat::Text)]
    diagnostics: DiagnosticsFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Wholf script file
    Run { script: PathBuf },
    /// Evaluate a snippet of Wholf code and print its value
    Eval { source: String },
    /// Start an interactive REPL session
    Repl,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DiagnosticsFormat {
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.trace);

    let ctx = EvalContext::with_max_call_depth(args.max_call_depth).with_trace(args.trace);
    install_interrupt_handler(&ctx)?;
    let mut interpreter = Interpreter::with_context(ctx);

    match args.command.unwrap_or(Command::Repl) {
        Command::Run { script } => {
            let source = fs::read_to_string(&script)
                .with_context(|| format!("failed to read {}", script.display()))?;
            run_once(&mut interpreter, &source, args.diagnostics, false)
        }
        Command::Eval { source } => run_once(&mut interpreter, &source, args.diagnostics, true),
        Command::Repl => {
            repl(&mut interpreter, args.diagnostics)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// `WHOLF_LOG` wins; otherwise `--trace` turns on the interpreter's trace
/// events and everything else stays at `warn`.
fn init_tracing(trace: bool) {
    let fallback = if trace { "warn,wholf=trace" } else { "warn" };
    let filter = EnvFilter::try_from_env("WHOLF_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Ctrl-C stops the running script with an `interrupted` diagnostic. A
/// second Ctrl-C before evaluation notices the first exits immediately.
fn install_interrupt_handler(ctx: &EvalContext) -> Result<()> {
    let flag = Arc::clone(&ctx.interrupt);
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::Relaxed) {
            std::process::exit(130);
        }
    })
    .context("failed to install Ctrl-C handler")
}

fn run_once(
    interpreter: &mut Interpreter,
    source: &str,
    format: DiagnosticsFormat,
    print_value: bool,
) -> Result<ExitCode> {
    match interpreter.execute(source) {
        Ok(value) => {
            if print_value && !matches!(value, Value::Undefined) {
                println!("{value}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(diagnostics) => {
            report(&diagnostics, format)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report(diagnostics: &[Diagnostic], format: DiagnosticsFormat) -> Result<()> {
    match format {
        DiagnosticsFormat::Text => {
            for diagnostic in diagnostics {
                eprintln!("{diagnostic}");
            }
        }
        DiagnosticsFormat::Json => {
            let json = serde_json::to_string(diagnostics).context("failed to encode diagnostics")?;
            eprintln!("{json}");
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// REPL
// ═══════════════════════════════════════════════════════════════════════

fn repl(interpreter: &mut Interpreter, format: DiagnosticsFormat) -> Result<()> {
    let mut editor = DefaultEditor::new().context("failed to start line editor")?;
    println!("Wholf {} (:quit to exit, :reset to clear bindings)", wholf::VERSION);

    loop {
        match editor.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                match trimmed {
                    "" => continue,
                    ":quit" | ":exit" => break,
                    ":reset" => {
                        interpreter.reset();
                        continue;
                    }
                    _ => {}
                }
                editor.add_history_entry(trimmed).ok();

                match interpreter.execute(trimmed) {
                    Ok(Value::Undefined) => {}
                    Ok(value) => println!("{value:?}"),
                    Err(diagnostics) => report(&diagnostics, format)?,
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("failed to read input"),
        }
    }
    Ok(())
}
