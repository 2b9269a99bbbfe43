//! Process exit status
//!
//! A run either succeeded or it did not; there are no finer-grained codes.

use std::process::ExitCode;

pub fn status(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
