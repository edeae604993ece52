//! The `hookgen` binary.

fn main() {
    std::process::exit(hookgen_cli::run(std::env::args_os()));
}
