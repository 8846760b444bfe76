//! Fetch jobs: one paginated, flattened batch per (event, method, venue).

use crate::flattener::flatten;
use crate::paginator::{PageSource, Paginator};
use crate::queries::nested_fields;
use panel_core::{EventWindow, FlatRecord, Method, Result, Venue};
use tracing::info;

/// A single unit of fetch work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    pub window: EventWindow,
    pub method: Method,
    pub venue: Venue,
}

impl FetchJob {
    pub fn new(window: EventWindow, method: Method, venue: Venue) -> Self {
        Self { window, method, venue }
    }

    /// Paginate the window and flatten the result.
    ///
    /// Any transport or schema error aborts the whole job.
    pub fn run<S: PageSource + ?Sized>(&self, source: &S) -> Result<Vec<FlatRecord>> {
        info!(
            event = %self.window.event_name,
            method = %self.method,
            venue = %self.venue,
            start = self.window.start,
            end = self.window.end,
            "fetching batch"
        );

        let mut pages = Paginator::for_window(source, &self.window);
        let mut raw = Vec::new();
        for batch in pages.by_ref() {
            raw.extend(batch?);
        }

        let flat = flatten(raw, nested_fields(self.venue))?;

        info!(
            event = %self.window.event_name,
            method = %self.method,
            venue = %self.venue,
            pages = pages.pages_fetched(),
            records = flat.len(),
            "batch fetched"
        );
        Ok(flat)
    }
}

/// Expand windows x methods x venues into jobs, events outermost, venue innermost.
pub fn plan_jobs(windows: &[EventWindow], methods: &[Method], venues: &[Venue]) -> Vec<FetchJob> {
    let mut jobs = Vec::with_capacity(windows.len() * methods.len() * venues.len());
    for window in windows {
        for &method in methods {
            for &venue in venues {
                jobs.push(FetchJob::new(window.clone(), method, venue));
            }
        }
    }
    jobs
}
