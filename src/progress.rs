use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for one fetch stage. `{msg}` is left to the caller.
pub fn stage_bar(total: usize, template: &str) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template(template) {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}
