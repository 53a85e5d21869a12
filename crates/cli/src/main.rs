use std::process::ExitCode;

fn main() -> ExitCode {
    pipeshell_cli::run()
}
