//! CLI command implementations.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use stackvm_common::Image;
use stackvm_frontend::Language;
use stackvm_vm::{Machine, MemoryLayout};
use tracing::info;

/// File extension for compiled images.
pub const IMAGE_EXTENSION: &str = "svm";

/// Options for [`run`].
pub struct RunOptions {
    pub lang: Option<Language>,
    pub image: bool,
    pub layout: MemoryLayout,
    pub verbose: bool,
}

/// Compile a source file to an image file.
pub fn compile(input: &Path, lang: Option<Language>, output: Option<PathBuf>) -> Result<(), i32> {
    let image = compile_source(input, lang)?;
    let output = output.unwrap_or_else(|| input.with_extension(IMAGE_EXTENSION));

    let bytes = image.encode();
    fs::write(&output, &bytes).map_err(|e| {
        eprintln!("error: cannot write '{}': {e}", output.display());
        1
    })?;

    eprintln!(
        "compiled {} words ({} bytes) -> {}",
        image.len(),
        bytes.len(),
        output.display()
    );
    Ok(())
}

/// Compile or load a program, then execute it against stdin/stdout.
pub fn run(input: &Path, opts: &RunOptions) -> Result<(), i32> {
    let image = load_program(input, opts.lang, opts.image)?;

    if opts.verbose {
        eprint!("{}", stackvm_frontend::disassemble(&image));
    }

    let mut vm = Machine::new(opts.layout).map_err(|e| {
        eprintln!("error: {e}");
        2
    })?;
    vm.load(&image).map_err(|e| {
        eprintln!("error: {e}");
        2
    })?;

    let started = Instant::now();
    let result = vm.run(io::stdin().lock(), io::stdout().lock());
    let elapsed = started.elapsed();

    info!(
        instructions = vm.executed(),
        elapsed_ms = elapsed.as_millis() as u64,
        "program finished"
    );
    if opts.verbose {
        eprintln!("{}", vm.dump());
    }

    result.map_err(|e| {
        eprintln!("runtime error: {e}");
        3
    })
}

/// Print the disassembly of an image or source file.
pub fn disassemble(input: &Path, lang: Option<Language>, image: bool) -> Result<(), i32> {
    let image = load_program(input, lang, image)?;
    print!("{}", stackvm_frontend::disassemble(&image));
    Ok(())
}

/// Read an image file, or compile a source file.
fn load_program(input: &Path, lang: Option<Language>, force_image: bool) -> Result<Image, i32> {
    if force_image || is_image_path(input) {
        read_image(input)
    } else {
        compile_source(input, lang)
    }
}

fn is_image_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == IMAGE_EXTENSION)
}

fn read_image(input: &Path) -> Result<Image, i32> {
    let bytes = fs::read(input).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", input.display());
        1
    })?;
    Image::decode(&bytes).map_err(|e| {
        eprintln!("error: {e}");
        1
    })
}

fn compile_source(input: &Path, lang: Option<Language>) -> Result<Image, i32> {
    let language = lang.or_else(|| Language::from_path(input)).ok_or_else(|| {
        eprintln!(
            "error: cannot infer the language of '{}'; pass --lang (false, bf, arith)",
            input.display()
        );
        1
    })?;

    let source = fs::read_to_string(input).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", input.display());
        1
    })?;

    stackvm_frontend::compile(language, &source).map_err(|e| {
        eprintln!("error: {}: {e}", input.display());
        1
    })
}
