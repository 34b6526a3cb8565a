use std::io::Write;
use std::{env, fs, io, process};

use bylox::{Error, VM};

fn main() {
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => repl(),
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: bylox [script]");
            process::exit(64);
        }
    }
}

fn run_file(path: &str) {
    let src = match fs::read_to_string(path) {
        Ok(src) => src,
        Err(err) => {
            eprintln!("Could not read '{}': {}", path, err);
            process::exit(74);
        }
    };
    let mut vm = VM::default();
    match vm.interpret(&src) {
        Ok(()) => {}
        Err(Error::Compile) => process::exit(65),
        Err(Error::Runtime) => process::exit(70),
    }
}

fn repl() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut vm = VM::default();
    let mut buf = String::new();
    loop {
        print!("> ");
        stdout.flush().expect("failed to flush stdout");
        buf.clear();
        match stdin.read_line(&mut buf) {
            Ok(0) => break,
            Ok(_) => {
                // diagnostics were already written to stderr; keep the
                // session going
                let _ = vm.interpret(&buf);
            }
            Err(err) => {
                eprintln!("Could not read input: {}", err);
                break;
            }
        }
    }
}
