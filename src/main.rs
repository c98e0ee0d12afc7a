// klaro - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::env;
use std::fs;
use std::path::Path;
use std::process;

use klaro_vm::{Vm, disasm};

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    if args.len() == 2 && (args[1] == "--version" || args[1] == "-v") {
        println!("Klaro VM v0.1.0");
        return;
    }

    let result = match args.as_slice() {
        [_, flag, file] if flag == "--disasm" => disassemble_file(file),
        [_, file] => run_file(file),
        _ => {
            eprintln!("Usage: klaro [--disasm] <file.klb>");
            process::exit(64);
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// Read a bytecode image from disk.
fn load_image(file_path: &str) -> Result<Vec<u8>, String> {
    let path = Path::new(file_path);

    match path.extension().and_then(|e| e.to_str()) {
        Some("klb") => {}
        Some(ext) => {
            return Err(format!(
                "Error: unsupported file extension '.{}' for '{}' (expected .klb)",
                ext, file_path
            ));
        }
        None => {
            return Err(format!(
                "Error: file '{}' has no extension (expected .klb)",
                file_path
            ));
        }
    }

    fs::read(path).map_err(|e| format!("Error reading '{}': {}", file_path, e))
}

/// Execute a single bytecode file.
fn run_file(file_path: &str) -> Result<(), String> {
    let image = load_image(file_path)?;
    let mut vm = Vm::new();
    vm.execute(image)
        .map_err(|e| format!("Error in '{}': {}", file_path, e))
}

/// Disassemble a single bytecode file to stdout.
fn disassemble_file(file_path: &str) -> Result<(), String> {
    let image = load_image(file_path)?;
    let text = disasm::disassemble(&image)
        .map_err(|e| format!("Error in '{}': {}", file_path, e))?;
    print!("{}", text);
    Ok(())
}
