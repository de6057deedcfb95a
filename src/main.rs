use std::process::ExitCode;

use ansi_term::Colour::Red;
use bloomlog::{cli::run_cli, error::TrackerError};
use tracing::error;

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error running cli {e:?}");
            match e.downcast_ref::<TrackerError>() {
                Some(TrackerError::Storage(inner)) => eprintln!("{} {inner:?}", Red.paint("Error:")),
                Some(notice) => eprintln!("{}", Red.paint(notice.to_string())),
                None => eprintln!("{} {e:?}", Red.paint("Error:")),
            }
            ExitCode::FAILURE
        }
    }
}
