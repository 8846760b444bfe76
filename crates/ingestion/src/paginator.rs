//! Cursor-based pagination over a time-ordered, page-limited source.
//!
//! The source only understands "up to N records with timestamp strictly
//! greater than the cursor, ascending". It cannot express an upper bound, so
//! the walk over-fetches past `end` and trims client-side.

use panel_core::{
    record_id, record_timestamp, EventWindow, RawPage, RawRecord, Result, TimestampSecs,
};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// A remote source of ascending, page-limited records.
pub trait PageSource {
    /// Fetch the page of records with `timestamp > cursor`.
    ///
    /// An empty page means nothing remains beyond the cursor.
    fn fetch_page(&self, cursor: TimestampSecs) -> Result<RawPage>;
}

impl<S: PageSource + ?Sized> PageSource for &S {
    fn fetch_page(&self, cursor: TimestampSecs) -> Result<RawPage> {
        (**self).fetch_page(cursor)
    }
}

/// Lazy walk over every record in `[start, end)`.
///
/// Yields one trimmed, deduplicated batch per page that contributed records.
/// The first error ends the walk. Restart by building a new paginator.
pub struct Paginator<'a, S: PageSource + ?Sized> {
    source: &'a S,
    start: TimestampSecs,
    end: TimestampSecs,
    cursor: TimestampSecs,
    /// Ids already yielded or skipped, for dedup across page boundaries.
    seen: HashSet<String>,
    /// Set after stepping the cursor past a page that brought nothing new.
    nudged: bool,
    finished: bool,
    pages_fetched: usize,
    records_yielded: usize,
}

impl<'a, S: PageSource + ?Sized> Paginator<'a, S> {
    /// Create a paginator over `[start, end)`.
    pub fn new(source: &'a S, start: TimestampSecs, end: TimestampSecs) -> Self {
        Self {
            source,
            start,
            end,
            // Strictly-greater cursor: start - 1 keeps a record at `start`.
            cursor: start - 1,
            seen: HashSet::new(),
            nudged: false,
            finished: start >= end,
            pages_fetched: 0,
            records_yielded: 0,
        }
    }

    /// Create a paginator over an event window.
    pub fn for_window(source: &'a S, window: &EventWindow) -> Self {
        Self::new(source, window.start, window.end)
    }

    /// Number of page requests issued so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Number of in-window records yielded so far.
    pub fn records_yielded(&self) -> usize {
        self.records_yielded
    }

    /// Current cursor value.
    pub fn cursor(&self) -> TimestampSecs {
        self.cursor
    }

    /// Fetch pages until one contributes records or the walk ends.
    fn advance(&mut self) -> Result<Option<Vec<RawRecord>>> {
        while !self.finished {
            let page = self.source.fetch_page(self.cursor)?;
            self.pages_fetched += 1;

            let last_ts = match page.last_timestamp()? {
                Some(ts) => ts,
                None => {
                    debug!(page = self.pages_fetched, cursor = self.cursor, "empty page");
                    self.finish();
                    break;
                }
            };

            let mut batch = Vec::with_capacity(page.len());
            let mut fresh = 0usize;

            for record in page.records {
                let ts = record_timestamp(&record)?;
                if !self.seen.insert(record_id(&record)?.to_owned()) {
                    continue;
                }
                fresh += 1;
                if ts >= self.start && ts < self.end {
                    batch.push(record);
                }
            }

            debug!(
                page = self.pages_fetched,
                cursor = self.cursor,
                last_ts,
                fresh,
                kept = batch.len(),
                "fetched page"
            );

            if last_ts >= self.end {
                self.finish();
            } else if fresh == 0 {
                if self.nudged {
                    warn!(cursor = self.cursor, "source keeps returning known records, stopping walk");
                    self.finish();
                } else {
                    // The source is not honoring the strict cursor; step past the tie.
                    self.cursor = last_ts.max(self.cursor) + 1;
                    self.nudged = true;
                }
            } else {
                self.cursor = last_ts;
                self.nudged = false;
            }

            if !batch.is_empty() {
                self.records_yielded += batch.len();
                return Ok(Some(batch));
            }
        }
        Ok(None)
    }

    fn finish(&mut self) {
        self.finished = true;
        info!(
            start = self.start,
            end = self.end,
            pages = self.pages_fetched,
            records = self.records_yielded,
            "pagination finished"
        );
    }
}

impl<S: PageSource + ?Sized> Iterator for Paginator<'_, S> {
    type Item = Result<Vec<RawRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.advance() {
            Ok(Some(batch)) => Some(Ok(batch)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Collect every record in `[start, end)`, ascending by timestamp.
pub fn fetch_window<S: PageSource + ?Sized>(
    source: &S,
    start: TimestampSecs,
    end: TimestampSecs,
) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for batch in Paginator::new(source, start, end) {
        records.extend(batch?);
    }
    Ok(records)
}
