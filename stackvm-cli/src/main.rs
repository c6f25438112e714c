//! stackvm CLI: compile, run and disassemble stack-language programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/decode/compile error
//! - 2: Load error (memory layout or image size)
//! - 3: Runtime fault

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use stackvm_frontend::Language;
use stackvm_vm::layout::{DEFAULT_CALL_STACK, DEFAULT_OPERAND_STACK, DEFAULT_TOTAL};
use stackvm_vm::MemoryLayout;
use tracing_subscriber::{fmt, EnvFilter};

/// Compile FALSE, Brainfuck and arithmetic programs to stackvm bytecode
/// and run them.
#[derive(Parser)]
#[command(name = "stackvm")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source file to a bytecode image
    Compile {
        /// Source file
        input: PathBuf,
        /// Source language (false, bf, arith); inferred from the extension
        #[arg(short, long, value_name = "LANG")]
        lang: Option<Language>,
        /// Output image path [default: input with .svm extension]
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Compile (or load) a program and execute it on stdin/stdout
    Run {
        /// Source file, or image with --image or a .svm extension
        input: PathBuf,
        /// Source language (false, bf, arith); inferred from the extension
        #[arg(short, long, value_name = "LANG")]
        lang: Option<Language>,
        /// Treat the input as a compiled image
        #[arg(long)]
        image: bool,
        /// Total memory cells
        #[arg(short, long, value_name = "CELLS")]
        #[arg(default_value_t = DEFAULT_TOTAL)]
        memory: usize,
        /// Operand stack cells
        #[arg(long = "os", value_name = "CELLS")]
        #[arg(default_value_t = DEFAULT_OPERAND_STACK)]
        operand_stack: usize,
        /// Call stack cells
        #[arg(long = "cs", value_name = "CELLS")]
        #[arg(default_value_t = DEFAULT_CALL_STACK)]
        call_stack: usize,
        /// Dump the disassembly before and the machine state after running
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print the disassembly of an image or a source file
    Disassemble {
        /// Source file, or image with --image or a .svm extension
        input: PathBuf,
        /// Source language (false, bf, arith); inferred from the extension
        #[arg(short, long, value_name = "LANG")]
        lang: Option<Language>,
        /// Treat the input as a compiled image
        #[arg(long)]
        image: bool,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors share exit code 1 with other input errors.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    init_logging(verbose);

    let result = match cli.command {
        Commands::Compile {
            input,
            lang,
            output,
        } => commands::compile(&input, lang, output),
        Commands::Run {
            input,
            lang,
            image,
            memory,
            operand_stack,
            call_stack,
            verbose,
        } => commands::run(
            &input,
            &commands::RunOptions {
                lang,
                image,
                layout: MemoryLayout::new(memory, operand_stack, call_stack),
                verbose,
            },
        ),
        Commands::Disassemble { input, lang, image } => commands::disassemble(&input, lang, image),
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

/// Log to stderr so program output on stdout stays clean.
///
/// `RUST_LOG` overrides the default filter.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
