use std::process::ExitCode;

fn main() -> ExitCode {
    scoreboard_reader::run()
}
