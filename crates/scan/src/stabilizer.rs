use std::collections::{HashMap, VecDeque};

/// How many recent raw reads are kept.
pub const WINDOW_LEN: usize = 5;

/// How many occurrences inside the window confirm a code.
pub const CONFIRM_COUNT: usize = 3;

/// Debounces a sequential stream of raw scan reads into confirmed codes.
///
/// The stabilizer keeps the last [`WINDOW_LEN`] raw reads and confirms a
/// code once it occurs [`CONFIRM_COUNT`] times within them — unless it is
/// the code confirmed most recently, which suppresses re-confirmation while
/// the scanner keeps reading the same label. Only a *different* code taking
/// over the confirmed slot re-arms the previous one.
///
/// Occurrence counts are recomputed from scratch on every observation. The
/// window length is fixed, so the cost is bounded and constant; keeping
/// incremental counters would buy nothing and could drift from the window.
///
/// One stabilizer serves one scanning session and must be driven by a single
/// sequential stream of reads.
#[derive(Debug, Clone, Default)]
pub struct ScanStabilizer {
    window: VecDeque<String>,
    last_confirmed: Option<String>,
}

impl ScanStabilizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The code most recently confirmed, if any.
    pub fn last_confirmed(&self) -> Option<&str> {
        self.last_confirmed.as_deref()
    }

    /// Feed one raw read; returns the newly confirmed code, if this read
    /// pushed one over the threshold.
    pub fn observe(&mut self, code: &str) -> Option<String> {
        self.window.push_back(code.to_string());
        if self.window.len() > WINDOW_LEN {
            self.window.pop_front();
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for seen in &self.window {
            *counts.entry(seen.as_str()).or_insert(0) += 1;
        }

        // Window order, oldest first: the earliest-seen qualifying code wins.
        // At most one code is confirmed per observation.
        for seen in &self.window {
            if counts[seen.as_str()] >= CONFIRM_COUNT
                && self.last_confirmed.as_deref() != Some(seen.as_str())
            {
                let confirmed = seen.clone();
                self.last_confirmed = Some(confirmed.clone());
                return Some(confirmed);
            }
        }
        None
    }
}
