// Tree scanner - explicit-stack directory walk with throttled progress and cooperative cancellation

use super::{CancellationToken, PathMatcher};
use crate::display::formatters::format_count;
use log::{debug, info};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default minimum wall time between two progress snapshots
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(150);

/// Key used for every path comparison; paths on the target platform are case-insensitive
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Immutable description of one scan
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub root: PathBuf,
    pub matcher: PathMatcher,
    /// Lowercased keys of paths the caller already knows about
    known: HashSet<String>,
    /// File extension to consider, without the dot; `None` considers every file
    pub extension: Option<String>,
    pub cancel: CancellationToken,
}

impl ScanRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            matcher: PathMatcher::default(),
            known: HashSet::new(),
            extension: Some("exe".to_string()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_matcher(mut self, matcher: PathMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_known<I, P>(mut self, known: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.known = known.into_iter().map(|p| path_key(p.as_ref())).collect();
        self
    }

    pub fn with_extension(mut self, extension: Option<&str>) -> Self {
        self.extension = extension.map(|e| e.trim_start_matches('.').to_string());
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_known(&self, path: &Path) -> bool {
        self.known.contains(&path_key(path))
    }

    fn wants_extension(&self, path: &Path) -> bool {
        match &self.extension {
            None => true,
            Some(ext) => path
                .extension()
                .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
                .unwrap_or(false),
        }
    }
}

/// Running counters of one scan; never decrease while the scan runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanProgress {
    pub visited: u64,
    pub matched: u64,
    pub pending_to_add: u64,
}

impl fmt::Display for ScanProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Visited: {} | Matched: {} | To add: {}",
            format_count(self.visited),
            format_count(self.matched),
            format_count(self.pending_to_add)
        )
    }
}

/// How a scan ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The whole tree was walked; `paths` are new, unique and in discovery order
    Completed {
        paths: Vec<PathBuf>,
        progress: ScanProgress,
    },
    /// Stopped early on request; `partial` is whatever had been found
    Cancelled {
        partial: Vec<PathBuf>,
        progress: ScanProgress,
    },
}

impl ScanOutcome {
    pub fn progress(&self) -> ScanProgress {
        match self {
            ScanOutcome::Completed { progress, .. } | ScanOutcome::Cancelled { progress, .. } => {
                *progress
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScanOutcome::Cancelled { .. })
    }

    /// New paths of a completed scan; empty after cancellation
    pub fn into_paths(self) -> Vec<PathBuf> {
        match self {
            ScanOutcome::Completed { paths, .. } => paths,
            ScanOutcome::Cancelled { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Running,
    Finished,
    Cancelled,
}

/// Entry point for scans; holds only tuning knobs
#[derive(Debug, Clone)]
pub struct TreeScanner {
    progress_interval: Duration,
}

impl Default for TreeScanner {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl TreeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Lazy scan over `request`; each call starts a fresh walk
    pub fn scan<'a>(&self, request: &'a ScanRequest) -> Scan<'a> {
        Scan {
            request,
            stack: vec![request.root.clone()],
            files: Vec::new().into_iter(),
            emitted: HashSet::new(),
            progress: ScanProgress::default(),
            stopwatch: Instant::now(),
            interval: self.progress_interval,
            on_progress: None,
            state: ScanState::Running,
        }
    }

    /// Walk the whole tree on the current thread
    pub fn run<'a, F>(&self, request: &'a ScanRequest, on_progress: F) -> ScanOutcome
    where
        F: FnMut(ScanProgress) + 'a,
    {
        info!("Scanning {}", request.root.display());
        let mut scan = self.scan(request).on_progress(on_progress);
        let paths: Vec<PathBuf> = scan.by_ref().collect();
        let progress = scan.progress();

        if scan.was_cancelled() {
            info!("Scan of {} cancelled ({})", request.root.display(), progress);
            ScanOutcome::Cancelled {
                partial: paths,
                progress,
            }
        } else {
            info!("Scan of {} finished ({})", request.root.display(), progress);
            ScanOutcome::Completed { paths, progress }
        }
    }

    /// Walk the tree on a background thread
    pub fn spawn<F>(self, request: ScanRequest, on_progress: F) -> JoinHandle<ScanOutcome>
    where
        F: FnMut(ScanProgress) + Send + 'static,
    {
        thread::spawn(move || self.run(&request, on_progress))
    }
}

/// Iterator over newly discovered paths of one walk
pub struct Scan<'a> {
    request: &'a ScanRequest,
    stack: Vec<PathBuf>,
    files: std::vec::IntoIter<PathBuf>,
    emitted: HashSet<String>,
    progress: ScanProgress,
    stopwatch: Instant,
    interval: Duration,
    on_progress: Option<Box<dyn FnMut(ScanProgress) + 'a>>,
    state: ScanState,
}

impl<'a> Scan<'a> {
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(ScanProgress) + 'a,
    {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn progress(&self) -> ScanProgress {
        self.progress
    }

    pub fn was_cancelled(&self) -> bool {
        self.state == ScanState::Cancelled
    }

    pub fn is_finished(&self) -> bool {
        self.state != ScanState::Running
    }

    /// Returns true when `file` is a new match to hand out
    fn consider(&mut self, file: &Path) -> bool {
        let matches = file
            .file_name()
            .map(|n| self.request.matcher.matches(&n.to_string_lossy()))
            .unwrap_or(false);
        if !matches {
            return false;
        }

        self.progress.matched += 1;
        let key = path_key(file);
        if self.request.known.contains(&key) || !self.emitted.insert(key) {
            return false;
        }
        self.progress.pending_to_add += 1;
        true
    }

    /// Queue subdirectories and candidate files of `dir`; unreadable entries count as absent
    fn expand(&mut self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping unreadable directory {}: {}", dir.display(), e);
                return;
            }
        };

        let mut subdirs = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            // file_type() does not follow links, so linked directories are never entered
            if file_type.is_dir() {
                subdirs.push(path);
            } else if (file_type.is_file() || (file_type.is_symlink() && path.is_file()))
                && self.request.wants_extension(&path)
            {
                files.push(path);
            }
        }

        subdirs.sort();
        files.sort();
        self.stack.extend(subdirs.into_iter().rev());
        self.files = files.into_iter();
    }

    fn emit(&mut self) {
        self.stopwatch = Instant::now();
        if let Some(callback) = self.on_progress.as_mut() {
            callback(self.progress);
        }
    }

    fn maybe_emit(&mut self) {
        if self.stopwatch.elapsed() >= self.interval {
            self.emit();
        }
    }
}

impl Iterator for Scan<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            if self.state != ScanState::Running {
                return None;
            }
            if self.request.cancel.is_cancelled() {
                self.state = ScanState::Cancelled;
                return None;
            }

            if let Some(file) = self.files.next() {
                self.progress.visited += 1;
                let found = self.consider(&file);
                self.maybe_emit();
                if found {
                    return Some(file);
                }
                continue;
            }

            match self.stack.pop() {
                Some(dir) => self.expand(&dir),
                None => {
                    self.state = ScanState::Finished;
                    self.emit();
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_key_ignores_case() {
        assert_eq!(
            path_key(Path::new("C:/Apps/Telegram.exe")),
            path_key(Path::new("c:/apps/TELEGRAM.EXE"))
        );
    }

    #[test]
    fn test_extension_filter() {
        let request = ScanRequest::new("/tmp").with_extension(Some(".EXE"));
        assert!(request.wants_extension(Path::new("a/Telegram.exe")));
        assert!(!request.wants_extension(Path::new("a/Telegram.dll")));

        let any = ScanRequest::new("/tmp").with_extension(None);
        assert!(any.wants_extension(Path::new("a/telegram")));
    }

    #[test]
    fn test_missing_root_completes_empty() {
        let request = ScanRequest::new("/definitely/not/a/real/root/for/e_fleet");
        let outcome = TreeScanner::new().run(&request, |_| {});
        assert_eq!(
            outcome,
            ScanOutcome::Completed {
                paths: Vec::new(),
                progress: ScanProgress::default(),
            }
        );
    }

    #[test]
    fn test_progress_display() {
        let progress = ScanProgress {
            visited: 12345,
            matched: 3,
            pending_to_add: 1,
        };
        assert_eq!(progress.to_string(), "Visited: 12,345 | Matched: 3 | To add: 1");
    }
}
