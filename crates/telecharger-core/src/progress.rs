//! Turns downloader output tokens into progress percentages.
//!
//! Lossy: anything that is not a percentage marker (file names, speeds,
//! ETAs) is dropped. The downloader's output format is not a contract, so an
//! unparseable token is never an error.

/// Percent complete for the active download, in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub percent: f64,
}

impl ProgressUpdate {
    /// Completion as a fraction in `[0.0, 1.0]`.
    pub fn fraction(&self) -> f64 {
        self.percent / 100.0
    }
}

/// Parse one token. Only tokens of the form `<number>%` yield an update.
pub fn parse_progress(token: &str) -> Option<ProgressUpdate> {
    if !token.contains('%') {
        return None;
    }
    let number = token.strip_suffix('%')?;
    let value: f64 = number.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(ProgressUpdate {
        percent: value.clamp(0.0, 100.0),
    })
}
