use rayon::prelude::*;
use tracing::{info, warn};

use crate::client::{PAGE_SIZE, RecordSource};
use crate::error::Result;
use crate::record::Record;

/// At or below this many pages the fetch runs on one thread.
pub const SEQUENTIAL_PAGE_LIMIT: usize = 10;
/// Concurrency cap for the page-fetch pool.
pub const MAX_FETCH_WORKERS: usize = 5;

#[derive(Debug, Default)]
pub struct FetchSummary {
    /// Collection size reported by the x-total-count header.
    pub total_expected: usize,
    pub pages: usize,
    pub workers: usize,
    /// Rows actually assembled; short of `total_expected` when pages failed.
    pub rows: usize,
    pub failed_pages: Vec<usize>,
}

/// Full extraction run: count, plan pages, fetch. The count query is
/// fatal; individual page failures are skipped and reported in the
/// summary so downstream row-count checks surface the gap.
pub fn fetch_all<S: RecordSource>(source: &S) -> Result<(Vec<Record>, FetchSummary)> {
    let total = source.total_count()?;
    let pages = total.div_ceil(PAGE_SIZE);
    let workers = if pages <= SEQUENTIAL_PAGE_LIMIT {
        1
    } else {
        MAX_FETCH_WORKERS.min(pages)
    };
    info!(total, pages, workers, "starting extraction");

    let (rows, failed_pages) = fetch_pages(source, pages, workers)?;
    if !failed_pages.is_empty() {
        warn!(
            failed = failed_pages.len(),
            "extraction finished with skipped pages"
        );
    }
    let summary = FetchSummary {
        total_expected: total,
        pages,
        workers,
        rows: rows.len(),
        failed_pages,
    };
    Ok((rows, summary))
}

/// One fetch loop for both modes, parameterized by worker count. Rows
/// are assembled in page-index order regardless of completion order.
pub fn fetch_pages<S: RecordSource>(
    source: &S,
    pages: usize,
    workers: usize,
) -> Result<(Vec<Record>, Vec<usize>)> {
    let batches: Vec<Option<Vec<Record>>> = if workers <= 1 {
        (0..pages).map(|page| fetch_one(source, page)).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(std::io::Error::other)?;
        pool.install(|| {
            (0..pages)
                .into_par_iter()
                .map(|page| fetch_one(source, page))
                .collect()
        })
    };

    let mut rows = Vec::new();
    let mut failed_pages = Vec::new();
    for (page, batch) in batches.into_iter().enumerate() {
        match batch {
            Some(batch) => rows.extend(batch),
            None => failed_pages.push(page),
        }
    }
    Ok((rows, failed_pages))
}

fn fetch_one<S: RecordSource>(source: &S, page: usize) -> Option<Vec<Record>> {
    match source.fetch_page(page) {
        Ok(batch) => {
            info!(page, rows = batch.len(), "fetched page");
            Some(batch)
        }
        Err(err) => {
            warn!(page, %err, "page fetch failed, skipping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DcawkError;
    use std::collections::HashSet;

    struct FakeSource {
        total: usize,
        fail: HashSet<usize>,
    }

    impl FakeSource {
        fn new(total: usize) -> Self {
            Self {
                total,
                fail: HashSet::new(),
            }
        }

        fn failing(total: usize, pages: &[usize]) -> Self {
            Self {
                total,
                fail: pages.iter().copied().collect(),
            }
        }
    }

    impl RecordSource for FakeSource {
        fn total_count(&self) -> Result<usize> {
            Ok(self.total)
        }

        fn fetch_page(&self, page: usize) -> Result<Vec<Record>> {
            if self.fail.contains(&page) {
                return Err(DcawkError::Api(format!("page {page} unavailable")));
            }
            let start = page * PAGE_SIZE;
            let end = (start + PAGE_SIZE).min(self.total);
            Ok((start..end)
                .map(|i| Record {
                    filename: format!("f{i}"),
                    ..Default::default()
                })
                .collect())
        }
    }

    fn filenames(rows: &[Record]) -> Vec<&str> {
        rows.iter().map(|r| r.filename.as_str()).collect()
    }

    #[test]
    fn small_collections_fetch_sequentially() {
        let source = FakeSource::new(2_500);
        let (rows, summary) = fetch_all(&source).unwrap();

        assert_eq!(summary.pages, 3);
        assert_eq!(summary.workers, 1);
        assert_eq!(rows.len(), 2_500);
        assert_eq!(rows[0].filename, "f0");
        assert_eq!(rows[2_499].filename, "f2499");
        assert!(summary.failed_pages.is_empty());
    }

    #[test]
    fn large_collections_use_the_bounded_pool() {
        let source = FakeSource::new(12_345);
        let (rows, summary) = fetch_all(&source).unwrap();

        assert_eq!(summary.pages, 13);
        assert_eq!(summary.workers, MAX_FETCH_WORKERS);
        assert_eq!(rows.len(), 12_345);
    }

    #[test]
    fn parallel_rows_come_back_in_page_order() {
        let source = FakeSource::new(8_000);
        let (rows, failed) = fetch_pages(&source, 8, 4).unwrap();

        assert!(failed.is_empty());
        // spot-check page boundaries across the whole run
        for page in 0..8 {
            assert_eq!(rows[page * PAGE_SIZE].filename, format!("f{}", page * PAGE_SIZE));
        }
        assert_eq!(rows.len(), 8_000);
    }

    #[test]
    fn failed_page_is_skipped_not_fatal() {
        let source = FakeSource::failing(3_000, &[1]);
        let (rows, summary) = fetch_all(&source).unwrap();

        assert_eq!(summary.failed_pages, [1]);
        assert_eq!(rows.len(), 2_000);
        let names = filenames(&rows);
        assert_eq!(names[0], "f0");
        // page 2 follows page 0 directly, still in index order
        assert_eq!(names[1_000], "f2000");
    }

    #[test]
    fn failed_pages_in_parallel_mode_keep_order_of_the_rest() {
        let source = FakeSource::failing(15_000, &[0, 7]);
        let (rows, summary) = fetch_all(&source).unwrap();

        assert_eq!(summary.workers, MAX_FETCH_WORKERS);
        assert_eq!(summary.failed_pages, [0, 7]);
        assert_eq!(rows.len(), 13_000);
        assert_eq!(rows[0].filename, "f1000");
    }

    #[test]
    fn empty_collection_yields_no_pages() {
        let source = FakeSource::new(0);
        let (rows, summary) = fetch_all(&source).unwrap();
        assert!(rows.is_empty());
        assert_eq!(summary.pages, 0);
    }
}
