//! Progress bars for long-running loops.

use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};

/// A bar of `len` steps, hidden when stderr is not a terminal.
pub fn bar(len: u64, prefix: &str) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{prefix} [{elapsed_precise}] {bar:20.cyan/blue} {pos:>6}/{len:6} {msg}")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_prefix(prefix.to_string());
    pb
}
