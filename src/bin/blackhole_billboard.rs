use std::process::ExitCode;

use gldemos::demos::blackhole::{self, BlackholeDemo};

fn main() -> ExitCode {
    gldemos::main_with(blackhole::config(), BlackholeDemo::new)
}
