//! Template expansion passes

use log::{debug, info};
use regex::bytes::{NoExpand, Regex};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, mpsc};
use threadpool::ThreadPool;

use crate::error::ExpandError;
use crate::{DEFAULT_JOBS, OUTPUT_BASE, OUTPUT_EXT, PLACEHOLDER, TEMPLATE_PATH};

// `%` is not a regex metacharacter, the token is matched literally
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER).expect("placeholder is a valid literal pattern"));

/// Replace every placeholder in `line` with the decimal form of `index`
///
/// Matches are taken left to right without overlap, so `%%%` becomes `<i>%`.
/// Bytes outside the matches, line terminators included, are left as they are.
pub fn substitute(line: &[u8], index: usize) -> Cow<'_, [u8]> {
    let digits = index.to_string();
    PLACEHOLDER_RE.replace_all(line, NoExpand(digits.as_bytes()))
}

/// Options for an expansion run
#[derive(Debug, Clone)]
pub struct ExpandOptions {
    /// Worker threads; 0 and 1 both mean a plain sequential loop
    pub jobs: usize,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self { jobs: DEFAULT_JOBS }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default)]
pub struct ExpandReport {
    /// Generated files, in index order
    pub written: Vec<PathBuf>,
    /// Total bytes written across all files
    pub bytes: u64,
}

impl ExpandReport {
    fn record(&mut self, path: PathBuf, bytes: u64) {
        self.written.push(path);
        self.bytes += bytes;
    }
}

/// Expands the template into numbered manifests inside one directory
#[derive(Debug, Clone)]
pub struct Expander {
    dir: PathBuf,
    options: ExpandOptions,
}

impl Expander {
    /// Expander working in `dir` with default options
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_options(dir, ExpandOptions::default())
    }

    pub fn with_options(dir: impl AsRef<Path>, options: ExpandOptions) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            options,
        }
    }

    pub fn template_path(&self) -> PathBuf {
        self.dir.join(TEMPLATE_PATH)
    }

    /// Path of the manifest generated for `index`
    pub fn output_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}-{}.{}", OUTPUT_BASE, index, OUTPUT_EXT))
    }

    /// Run one pass: re-read the template and write the manifest for `index`
    ///
    /// The template is opened before the output, so a missing template never
    /// leaves an empty manifest behind. Returns the number of bytes written.
    pub fn expand(&self, index: usize) -> Result<u64, ExpandError> {
        let template = self.template_path();
        let read_err = |source: std::io::Error| ExpandError::Read {
            path: template.clone(),
            source,
        };
        let mut reader = BufReader::new(File::open(&template).map_err(read_err)?);

        let output = self.output_path(index);
        let write_err = |source: std::io::Error| ExpandError::Write {
            path: output.clone(),
            index,
            source,
        };
        let mut writer = BufWriter::new(File::create(&output).map_err(write_err)?);

        let mut line = Vec::new();
        let mut bytes = 0u64;
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).map_err(read_err)? == 0 {
                break;
            }
            let replaced = substitute(&line, index);
            writer.write_all(&replaced).map_err(write_err)?;
            bytes += replaced.len() as u64;
        }
        writer.flush().map_err(write_err)?;

        debug!("Wrote {} ({} bytes)", output.display(), bytes);
        Ok(bytes)
    }

    /// Run `count` passes, indices `0..count`
    ///
    /// Stops at the first failure. Manifests written before it stay on disk.
    pub fn run(&self, count: usize) -> Result<ExpandReport, ExpandError> {
        let jobs = self.options.jobs.max(1).min(count.max(1));
        info!(
            "Expanding {} into {} manifest(s) with {} job(s)",
            self.template_path().display(),
            count,
            jobs
        );

        let report = if jobs == 1 {
            self.run_sequential(count)?
        } else {
            self.run_pooled(count, jobs)?
        };

        info!("Generated {} manifest(s), {} bytes", report.written.len(), report.bytes);
        Ok(report)
    }

    fn run_sequential(&self, count: usize) -> Result<ExpandReport, ExpandError> {
        let mut report = ExpandReport::default();
        for index in 0..count {
            let bytes = self.expand(index)?;
            report.record(self.output_path(index), bytes);
        }
        Ok(report)
    }

    // Workers claim indices in ascending order and stop claiming once any pass
    // has failed, so at most `jobs - 1` passes finish after the failing one.
    fn run_pooled(&self, count: usize, jobs: usize) -> Result<ExpandReport, ExpandError> {
        let pool = ThreadPool::new(jobs);
        let next = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();

        for _ in 0..jobs {
            let tx = tx.clone();
            let next = Arc::clone(&next);
            let failed = Arc::clone(&failed);
            let expander = self.clone();
            pool.execute(move || {
                while !failed.load(Ordering::SeqCst) {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    if index >= count {
                        break;
                    }
                    let result = expander.expand(index);
                    if result.is_err() {
                        failed.store(true, Ordering::SeqCst);
                    }
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        // Completed passes land in the report in index order; out-of-order
        // ones wait in `pending` until the gap before them closes.
        let mut report = ExpandReport::default();
        let mut pending = BTreeMap::new();
        let mut first_err: Option<(usize, ExpandError)> = None;
        for (index, result) in rx {
            match result {
                Ok(bytes) => {
                    pending.insert(index, bytes);
                    while let Some(bytes) = pending.remove(&report.written.len()) {
                        let done = report.written.len();
                        report.record(self.output_path(done), bytes);
                    }
                }
                Err(e) => {
                    if first_err.as_ref().is_none_or(|(lowest, _)| index < *lowest) {
                        first_err = Some((index, e));
                    }
                }
            }
        }
        pool.join();

        // The report is the contiguous prefix 0..m, so m never exceeds the
        // failing index; a shorter prefix means a worker died mid-pass.
        let limit = first_err.as_ref().map_or(count, |(index, _)| *index);
        if report.written.len() < limit {
            return Err(ExpandError::Worker {
                index: report.written.len(),
            });
        }
        match first_err {
            Some((_, e)) => Err(e),
            None => Ok(report),
        }
    }
}
