use std::process::ExitCode;

use gldemos::demos::bspline::{self, BSplineDemo};

fn main() -> ExitCode {
    gldemos::main_with(bspline::config(), BSplineDemo::new)
}
