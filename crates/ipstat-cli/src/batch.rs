//! Parallel batch processing using Rayon
//!
//! Every line is resolved independently on a dedicated thread pool.
//! Results come back in input order; failures are kept per line.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

use ipstat_cidr::CidrStats;
use ipstat_core::IpStatError;

/// One input line with its 1-based line number
pub type BatchInput = (usize, String);

/// Batch processing result
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub line: usize,
    pub input: String,
    pub result: Result<CidrStats, IpStatError>,
}

/// Read CIDR lines from a file, or stdin when `path` is `-`
///
/// Blank lines and lines starting with `#` are skipped.
pub fn read_inputs(path: &Path) -> Result<Vec<BatchInput>> {
    let content = if path.as_os_str() == "-" {
        debug!("reading batch from stdin");
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        debug!(path = %path.display(), "reading batch file");
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    };

    Ok(parse_lines(&content))
}

fn parse_lines(content: &str) -> Vec<BatchInput> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, ipstat_cidr::trim_ascii(line)))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| (n, line.to_string()))
        .collect()
}

/// Batch processor with parallel execution
pub struct BatchProcessor {
    thread_pool: rayon::ThreadPool,
}

impl BatchProcessor {
    /// Create a new batch processor
    ///
    /// # Arguments
    ///
    /// * `num_threads` - Number of threads (default: CPU cores)
    pub fn new(num_threads: Option<usize>) -> Result<Self> {
        let num_threads = num_threads.unwrap_or_else(num_cpus::get).max(1);

        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()?;

        Ok(Self { thread_pool })
    }

    /// Resolve every input in parallel, preserving input order
    pub fn process(&self, inputs: Vec<BatchInput>) -> Vec<BatchResult> {
        let total = inputs.len();
        let processed = AtomicUsize::new(0);

        self.thread_pool.install(|| {
            inputs
                .into_par_iter()
                .map(|(line, input)| {
                    let result = ipstat_cidr::resolve(&input);

                    let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    if count % 1000 == 0 || count == total {
                        debug!("Processed {}/{} blocks", count, total);
                    }
                    trace!(line, ok = result.is_ok(), "resolved batch line");

                    BatchResult {
                        line,
                        input,
                        result,
                    }
                })
                .collect()
        })
    }

    /// Get thread pool info
    pub fn thread_count(&self) -> usize {
        self.thread_pool.current_num_threads()
    }
}
