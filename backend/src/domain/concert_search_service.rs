//! Concert browsing over the ticketing event source.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use mockable::Clock;
use serde_json::Value;

use super::repository_errors::map_event_source_error;
use crate::domain::ports::{ConcertSearch, EventQuery, EventSource, SearchFilters};
use crate::domain::{ConcertId, Error};

/// Search service implementing [`ConcertSearch`].
#[derive(Clone)]
pub struct ConcertSearchService<E> {
    events: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<E> ConcertSearchService<E> {
    pub fn new(events: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self { events, clock }
    }

    fn start_of_today(&self) -> DateTime<Utc> {
        self.clock
            .utc()
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    fn build_query(&self, filters: &SearchFilters) -> EventQuery {
        let onsale_from = filters.onsale_soon.then(|| self.start_of_today());
        EventQuery {
            id: None,
            keyword: filters
                .keyword
                .as_deref()
                .map(str::trim)
                .filter(|keyword| !keyword.is_empty())
                .map(str::to_owned),
            latlong: filters.location.latlong(),
            venue_id: filters.venue_id.clone(),
            start_date_time: filters.start_date.or(onsale_from),
            onsale_start_date_time: onsale_from,
        }
    }
}

#[async_trait]
impl<E> ConcertSearch for ConcertSearchService<E>
where
    E: EventSource,
{
    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Value>, Error> {
        let page = self
            .events
            .search(&self.build_query(filters))
            .await
            .map_err(map_event_source_error)?;
        if page.total_count == 0 {
            return Ok(Vec::new());
        }
        Ok(page.events)
    }

    async fn concert(&self, id: &ConcertId) -> Result<Value, Error> {
        let page = self
            .events
            .search(&EventQuery::by_id(id.clone()))
            .await
            .map_err(map_event_source_error)?;
        page.events
            .into_iter()
            .next()
            .filter(|_| page.total_count > 0)
            .ok_or_else(|| Error::not_found(format!("concert {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{EventPage, EventSourceError, Location, MockEventSource};
    use chrono::TimeZone;
    use mockable::MockClock;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn clock() -> Arc<dyn Clock> {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 14, 17, 45, 12)
            .single()
            .expect("valid timestamp");
        let mut clock = MockClock::new();
        clock.expect_utc().return_const(now);
        Arc::new(clock)
    }

    fn midnight() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn capture(expected: EventQuery, page: EventPage) -> MockEventSource {
        let mut events = MockEventSource::new();
        events
            .expect_search()
            .withf(move |query| *query == expected)
            .times(1)
            .return_once(move |_| Ok(page));
        events
    }

    #[rstest]
    #[tokio::test]
    async fn onsale_soon_starts_at_midnight_today(clock: Arc<dyn Clock>) {
        let expected = EventQuery {
            keyword: Some("drake".into()),
            latlong: Location::Kw.latlong(),
            start_date_time: Some(midnight()),
            onsale_start_date_time: Some(midnight()),
            ..EventQuery::default()
        };
        let page = EventPage {
            total_count: 1,
            events: vec![json!({"id": "G5v"})],
        };
        let service = ConcertSearchService::new(Arc::new(capture(expected, page)), clock);

        let filters = SearchFilters {
            keyword: Some("  drake ".into()),
            location: Location::Kw,
            onsale_soon: true,
            ..SearchFilters::default()
        };
        let found = service.search(&filters).await.expect("search succeeds");
        assert_eq!(found, vec![json!({"id": "G5v"})]);
    }

    #[rstest]
    #[tokio::test]
    async fn explicit_start_date_wins_over_onsale(clock: Arc<dyn Clock>) {
        let start = Utc
            .with_ymd_and_hms(2026, 6, 1, 19, 0, 0)
            .single()
            .expect("valid timestamp");
        let expected = EventQuery {
            venue_id: Some("KovZpZA7AAEA".into()),
            start_date_time: Some(start),
            onsale_start_date_time: Some(midnight()),
            ..EventQuery::default()
        };
        let service =
            ConcertSearchService::new(Arc::new(capture(expected, EventPage::default())), clock);

        let filters = SearchFilters {
            keyword: Some("   ".into()),
            onsale_soon: true,
            venue_id: Some("KovZpZA7AAEA".into()),
            start_date: Some(start),
            ..SearchFilters::default()
        };
        assert!(service.search(&filters).await.expect("search").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn zero_total_is_an_empty_list(clock: Arc<dyn Clock>) {
        let page = EventPage {
            total_count: 0,
            events: vec![json!({"stale": true})],
        };
        let service =
            ConcertSearchService::new(Arc::new(capture(EventQuery::default(), page)), clock);
        let found = service
            .search(&SearchFilters::default())
            .await
            .expect("search succeeds");
        assert!(found.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn upstream_failure_is_service_unavailable(clock: Arc<dyn Clock>) {
        let mut events = MockEventSource::new();
        events
            .expect_search()
            .return_once(|_| Err(EventSourceError::status(500_u16, "boom")));
        let service = ConcertSearchService::new(Arc::new(events), clock);

        let err = service
            .search(&SearchFilters::default())
            .await
            .expect_err("upstream failure");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn concert_lookup_returns_first_event(clock: Arc<dyn Clock>) {
        let id = ConcertId::new("G5v").expect("id");
        let page = EventPage {
            total_count: 1,
            events: vec![json!({"id": "G5v", "name": "Show"})],
        };
        let service =
            ConcertSearchService::new(Arc::new(capture(EventQuery::by_id(id.clone()), page)), clock);
        let event = service.concert(&id).await.expect("found");
        assert_eq!(event["name"], "Show");
    }

    #[rstest]
    #[tokio::test]
    async fn concert_lookup_without_results_is_not_found(clock: Arc<dyn Clock>) {
        let id = ConcertId::new("missing").expect("id");
        let service = ConcertSearchService::new(
            Arc::new(capture(EventQuery::by_id(id.clone()), EventPage::default())),
            clock,
        );
        let err = service.concert(&id).await.expect_err("not found");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
