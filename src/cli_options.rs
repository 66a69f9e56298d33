use rocc_compiler::RoccError;
use std::path::PathBuf;

const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

const USAGE: &str = "\
usage: rocc [-o <file>] [-t] [--dump-ast] [--no-color]
            [-h | --help] [-v] <file>";

const HELP: &str = "usage: rocc [options] <file>
options:
    -o | --output <file>  Specifies the output-file to write to
    -t | --tokens         Stops evaluation after scanning printing the token-stream
         --dump-ast       Displays the AST produced by the parser while also compiling program as usual
         --no-color       Errors are printed without color
    -h                    Prints usage information
    --help                Prints elaborate help information
    -v | --version        Prints version information

file:
    The C source file to be read, '-' reads from stdin";

fn sys_info(msg: &str) -> ! {
    eprintln!("{msg}");
    std::process::exit(0);
}

pub struct CliOptions {
    // required argument specifying file to compile, '-' reads from stdin
    pub file_path: PathBuf,

    // optional argument specifying output-file to write to
    pub output_path: Option<PathBuf>,

    // stops evaluation after scanning printing the token-stream
    pub tokens_only: bool,

    // displays AST while also compiling program as usual
    pub dump_ast: bool,

    // errors are printed without color
    pub no_color: bool,
}
impl CliOptions {
    fn new() -> CliOptions {
        CliOptions {
            file_path: PathBuf::new(),
            output_path: None,
            tokens_only: false,
            dump_ast: false,
            no_color: false,
        }
    }
    pub fn parse() -> Result<CliOptions, RoccError> {
        let mut cli_options = CliOptions::new();
        let mut args = std::env::args().collect::<Vec<String>>().into_iter().skip(1);

        while let Some(arg) = args.next() {
            if arg.starts_with('-') && arg != "-" {
                match arg.as_str() {
                    "-o" | "--output" => {
                        if let Some(file) = args.next() {
                            cli_options.output_path = Some(PathBuf::from(file));
                        } else {
                            return Err(RoccError::Cli(vec![format!(
                                "expected file following '{}' option",
                                arg
                            )]));
                        }
                    }
                    "-t" | "--tokens" => cli_options.tokens_only = true,
                    "--dump-ast" => cli_options.dump_ast = true,
                    "--no-color" => cli_options.no_color = true,
                    "-h" => sys_info(USAGE),
                    "--help" => sys_info(HELP),
                    "-v" | "--version" => sys_info(VERSION),
                    _ => return Err(RoccError::Cli(vec![format!("illegal option '{}'", arg)])),
                }
            } else {
                cli_options.file_path = PathBuf::from(arg);
            }
        }

        if cli_options.file_path.to_string_lossy().is_empty() {
            Err(RoccError::Cli(vec!["no input files given".to_string()]))
        } else if cli_options.file_path == PathBuf::from("-") {
            Ok(cli_options)
        } else if let Some(Some("c")) = cli_options.file_path.extension().map(|s| s.to_str()) {
            Ok(cli_options)
        } else {
            Err(RoccError::Cli(vec![format!(
                "file '{}' is not a valid C source file",
                cli_options.file_path.display()
            )]))
        }
    }
}
