// The compiler driver for mini-C code.

use std::io::Read;
use std::process::ExitCode;

use clap::Parser;

use ::minicc::compile;
use ::minicc::front_end::lex;

#[derive(Parser)]
#[command(about = "compile mini-C to three-address code")]
struct Args {
    /// Source file to compile; reads stdin if omitted.
    file: Option<String>,

    /// Print the token stream as JSON and stop.
    #[arg(long)]
    tokens: bool,

    /// Print the concrete syntax tree.
    #[arg(long)]
    cst: bool,

    /// Print the abstract syntax tree as JSON.
    #[arg(long)]
    ast: bool,
}

pub fn main() -> ExitCode {
    let args = Args::parse();

    let code = match read_input(&args.file) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error reading input: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.tokens {
        let output = serde_json::to_string_pretty(&lex(&code)).unwrap();
        println!("{output}");
        return ExitCode::SUCCESS;
    }

    let compilation = match compile(&code) {
        Ok(compilation) => compilation,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if args.cst {
        print!("{}", compilation.cst.render());
    } else if args.ast {
        let output = serde_json::to_string_pretty(&compilation.ast).unwrap();
        println!("{output}");
    } else {
        for inst in &compilation.tac {
            println!("{inst}");
        }
    }

    ExitCode::SUCCESS
}

fn read_input(file: &Option<String>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut code = String::new();
            std::io::stdin().read_to_string(&mut code)?;
            Ok(code)
        }
    }
}
