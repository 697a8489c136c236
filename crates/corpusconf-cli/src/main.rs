use std::process::ExitCode;

fn main() -> ExitCode {
    corpusconf_cli::run()
}
