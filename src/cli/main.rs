use std::process::ExitCode;

use herd_immunity::runner::run_with_args;

fn main() -> ExitCode {
    match run_with_args() {
        Ok(outcome) => {
            println!(
                "The simulation has ended after {} turns.",
                outcome.time_steps
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
