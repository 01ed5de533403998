//! DTOs for decoding Discovery API search responses.
//!
//! Only the paging total and the event list are typed; events themselves pass
//! through as raw JSON.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::ports::EventPage;

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponseDto {
    #[serde(default)]
    page: Option<PageDto>,
    #[serde(default, rename = "_embedded")]
    embedded: Option<EmbeddedDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageDto {
    #[serde(default)]
    total_elements: u64,
}

#[derive(Debug, Deserialize)]
struct EmbeddedDto {
    #[serde(default)]
    events: Vec<Value>,
}

impl SearchResponseDto {
    /// A zero total always yields an empty page, whatever `_embedded` holds.
    pub(super) fn into_page(self) -> EventPage {
        let total_count = self.page.map_or(0, |page| page.total_elements);
        if total_count == 0 {
            return EventPage::default();
        }
        EventPage {
            total_count,
            events: self.embedded.map(|e| e.events).unwrap_or_default(),
        }
    }
}
