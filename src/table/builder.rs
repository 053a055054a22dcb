//! Builds the attribute table by fetching every configured location.

use futures::{stream, StreamExt};
use indicatif::ProgressBar;

use crate::{
    config::TrackedAttribute,
    fetch::Fetch,
    table::{AttributeRow, AttributeTable, Location},
};

/// Fetches each location once, with at most `concurrency` requests in flight.
///
/// Locations whose fetch fails or lacks a tracked attribute are logged and
/// left out. Rows come back in the order of `locations`, whatever order the
/// fetches complete in.
pub async fn build_table<F: Fetch>(
    fetcher: &F,
    locations: &[Location],
    attributes: &[TrackedAttribute],
    concurrency: usize,
    progress_bar: Option<&ProgressBar>,
) -> AttributeTable {
    let mut results: Vec<(usize, Option<AttributeRow>)> = stream::iter(locations.iter().enumerate())
        .map(|(idx, location)| async move {
            let row = fetch_row(fetcher, location, attributes).await;
            if let Some(pb) = progress_bar {
                pb.inc(1);
            }
            (idx, row)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    results.sort_by_key(|(idx, _)| *idx);
    let rows: Vec<AttributeRow> = results.into_iter().filter_map(|(_, row)| row).collect();

    log::info!("Fetched {} of {} locations", rows.len(), locations.len());

    AttributeTable::from_rows(rows)
}

async fn fetch_row<F: Fetch>(
    fetcher: &F,
    location: &Location,
    attributes: &[TrackedAttribute],
) -> Option<AttributeRow> {
    match fetcher.fetch(location, attributes).await {
        Ok(mut values) => {
            if let Some(missing) = attributes
                .iter()
                .find(|a| !values.get(&a.name).is_some_and(|v| v.is_finite()))
            {
                log::warn!(
                    "Excluding `{}`: missing attribute `{}`",
                    location.name,
                    missing.name
                );
                return None;
            }
            values.retain(|name, _| attributes.iter().any(|a| &a.name == name));

            Some(AttributeRow {
                location: location.clone(),
                values,
            })
        }
        Err(e) => {
            log::warn!("Excluding `{}`: {}", location.name, e);
            None
        }
    }
}

// -- Tests -------------------------------------------------------------------
