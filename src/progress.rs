//! Spinners for long-running external commands.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(80);

/// Start a spinner showing `msg`.
///
/// Hidden when `quiet` is set so scripted runs only see the final result.
pub fn spinner(msg: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg} {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(TICK);
    pb
}

/// Replace the spinner with a success line
pub fn finish_success(pb: &ProgressBar, msg: &str) {
    pb.finish_and_clear();
    if !pb.is_hidden() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Replace the spinner with a failure line
pub fn finish_error(pb: &ProgressBar, msg: &str) {
    pb.finish_and_clear();
    eprintln!("{} {}", "✗".red(), msg);
}

/// Run `f` under a spinner, finishing it according to the result.
pub fn with_spinner<T, E: std::fmt::Display>(
    msg: &str,
    done: &str,
    quiet: bool,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let pb = spinner(msg, quiet);
    let result = f();
    match &result {
        Ok(_) => finish_success(&pb, done),
        Err(e) => finish_error(&pb, &format!("{msg} failed: {e}")),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_spinner_is_hidden() {
        let pb = spinner("Working", true);
        assert!(pb.is_hidden());
        finish_success(&pb, "done");
    }

    #[test]
    fn test_with_spinner_passes_result_through() {
        let ok: Result<u32, String> = with_spinner("Adding", "Added", true, || Ok(2));
        assert_eq!(ok, Ok(2));

        let err: Result<u32, String> =
            with_spinner("Adding", "Added", true, || Err("overflow".to_string()));
        assert_eq!(err, Err("overflow".to_string()));
    }
}
