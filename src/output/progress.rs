//! Progress bar utilities for folder scans.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar for scanning the entries of one folder.
pub fn create_scan_progress(total_entries: usize, folder: &str, enabled: bool) -> Option<ProgressBar> {
    if !enabled || total_entries == 0 {
        return None;
    }

    let pb = ProgressBar::new(total_entries as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "[{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} entries - {folder}"
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ "),
    );
    Some(pb)
}

/// Finish a progress bar with a message.
pub fn finish_progress(pb: Option<ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.finish_with_message(message.to_string());
    }
}

/// Increment a progress bar.
pub fn inc_progress(pb: Option<&ProgressBar>) {
    if let Some(pb) = pb {
        pb.inc(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_progress_is_none() {
        assert!(create_scan_progress(10, "imgs", false).is_none());
        assert!(create_scan_progress(0, "imgs", true).is_none());
    }
}
