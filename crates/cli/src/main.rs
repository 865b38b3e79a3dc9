use std::process::ExitCode;

fn main() -> ExitCode {
    propel_cli::run()
}
