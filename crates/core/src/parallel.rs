//! Running independent jobs on a fixed-size worker pool.

use anyhow::{Context, Result, bail};
use log::error;
use rayon::{ThreadPoolBuilder, prelude::*};

/// Result of a batch of independent jobs.
#[derive(Debug)]
pub struct BatchResult<R> {
    /// Outputs of the jobs that succeeded, in input order.
    pub succeeded: Vec<R>,
    pub failed: Vec<anyhow::Error>,
}

impl<R> BatchResult<R> {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn ok_or_bail(&self, operation: &str) -> Result<()> {
        if !self.failed.is_empty() {
            bail!(
                "{operation} failed: {} succeeded, {} failed",
                self.succeeded.len(),
                self.failed.len()
            );
        }
        Ok(())
    }
}

/// Run `op` on every item using `threads` workers.
///
/// With one thread or less the items run in order on the calling thread. A
/// failing job never stops the others; every error is logged and collected.
pub fn process_parallel<T, R, F>(
    label: &str,
    items: Vec<T>,
    threads: usize,
    op: F,
) -> Result<BatchResult<R>>
where
    T: Send,
    R: Send,
    F: Fn(T) -> Result<R> + Sync + Send,
{
    let results: Vec<Result<R>> = if threads <= 1 {
        items.into_iter().map(&op).collect()
    } else {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to create worker pool")?;
        pool.install(|| items.into_par_iter().map(&op).collect())
    };

    let mut batch = BatchResult { succeeded: Vec::new(), failed: Vec::new() };
    for result in results {
        match result {
            Ok(r) => batch.succeeded.push(r),
            Err(e) => {
                error!("{e:?}");
                batch.failed.push(e);
            }
        }
    }

    println!("{label}: {} succeeded, {} failed", batch.succeeded.len(), batch.failed.len());
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    fn job(n: u32) -> Result<u32> {
        if n == 3 { Err(anyhow!("job {n} failed")) } else { Ok(n * 10) }
    }

    #[test]
    fn test_failures_are_isolated() {
        let batch = process_parallel("test", vec![1, 2, 3, 4], 4, job).unwrap();

        assert_eq!(batch.succeeded, vec![10, 20, 40]);
        assert_eq!(batch.failed.len(), 1);
        assert_eq!(batch.total(), 4);
        assert!(!batch.all_succeeded());
        assert!(batch.ok_or_bail("build").is_err());
    }

    #[test]
    fn test_sequential() {
        let batch = process_parallel("test", vec![1, 2], 1, job).unwrap();
        assert_eq!(batch.succeeded, vec![10, 20]);
        assert!(batch.ok_or_bail("build").is_ok());
    }

    #[test]
    fn test_empty_batch() {
        let batch = process_parallel("test", Vec::<u32>::new(), 2, job).unwrap();
        assert_eq!(batch.total(), 0);
    }
}
