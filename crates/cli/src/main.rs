use std::process::ExitCode;

fn main() -> ExitCode {
    pricedrop_cli::run()
}
