mod cli_options;

use cli_options::CliOptions;
use rocc_compiler::RoccError;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

fn read_input_file(file: &Path) -> Result<String, RoccError> {
    if file == Path::new("-") {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .map_err(|_| RoccError::Sys("failed to read from stdin".to_string()))?;
        Ok(source)
    } else {
        fs::read_to_string(file)
            .map_err(|_| RoccError::Sys(format!("couldn't find file: '{}'", file.display())))
    }
}

fn write_output(output_path: &Option<PathBuf>, contents: &str) -> Result<(), RoccError> {
    match output_path {
        Some(path) => fs::write(path, contents)
            .map_err(|_| RoccError::Sys(format!("couldn't write to file '{}'", path.display()))),
        None => {
            print!("{}", contents);
            Ok(())
        }
    }
}

fn run(options: &CliOptions) -> Result<(), RoccError> {
    let source = read_input_file(&options.file_path)?;

    if options.tokens_only {
        let tokens = rocc_compiler::tokenize(&options.file_path, &source)?;
        let dump = tokens
            .iter()
            .map(|token| token.dump())
            .collect::<Vec<String>>()
            .join("\n")
            + "\n";
        return write_output(&options.output_path, &dump);
    }

    let asm = rocc_compiler::compile(
        &options.file_path,
        &source,
        options.dump_ast,
        options.no_color,
    )?;
    write_output(&options.output_path, &asm)
}

fn main() {
    // options haven't parsed yet, so cli-errors are always uncolored
    let options = match CliOptions::parse() {
        Ok(options) => options,
        Err(e) => {
            e.print(true);
            process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        e.print(options.no_color);
        process::exit(1);
    }
}
