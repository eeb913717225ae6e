use std::process::ExitCode;

fn main() -> ExitCode {
    swipefit_cli::run()
}
