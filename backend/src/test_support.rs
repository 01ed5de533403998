//! In-memory adapters for integration tests.
//!
//! Compiled behind the `test-support` feature so `tests/` can drive the real
//! domain services and HTTP handlers without PostgreSQL or the ticketing API.
//! Behaviour mirrors the Diesel adapters: favorite links and matching pairs
//! are unique, insertion order is kept.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ports::{
    ConcertRepository, ConcertRepositoryError, EventPage, EventQuery, EventSource,
    EventSourceError, MatchingRepository, MatchingRepositoryError, MemberFavorites, NewAccount,
    StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Account, ConcertId, Decision, Matching, MatchingId, Member, UserId, UserProfile,
};

struct StoredUser {
    account: NewAccount,
}

#[derive(Default)]
struct StoreState {
    users: Vec<StoredUser>,
    concerts: Vec<ConcertId>,
    favorites: Vec<(UserId, ConcertId)>,
    matchings: Vec<Matching>,
}

/// Shared in-memory store implementing every repository port.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every matching record, in creation order.
    pub fn matchings(&self) -> Vec<Matching> {
        self.state().matchings.clone()
    }
}

impl StoredUser {
    fn member(&self) -> Member {
        Member {
            id: self.account.id,
            username: self.account.username.clone(),
            profile: self.account.profile.clone(),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_with_profile(&self, account: &NewAccount) -> Result<(), UserPersistenceError> {
        let mut state = self.state();
        if state
            .users
            .iter()
            .any(|user| user.account.username == account.username)
        {
            return Err(UserPersistenceError::duplicate_username(
                account.username.as_str(),
            ));
        }
        state.users.push(StoredUser {
            account: account.clone(),
        });
        Ok(())
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|user| user.account.username.as_str() == username)
            .map(|user| StoredCredentials {
                user_id: user.account.id,
                password_digest: user.account.password_digest.clone(),
            }))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Member>, UserPersistenceError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|user| user.account.username.as_str() == username)
            .map(StoredUser::member))
    }

    async fn find_account(&self, id: &UserId) -> Result<Option<Account>, UserPersistenceError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|user| user.account.id == *id)
            .map(|user| Account {
                member: user.member(),
                email: user.account.email.clone(),
            }))
    }

    async fn members(&self, ids: &[UserId]) -> Result<Vec<Member>, UserPersistenceError> {
        Ok(self
            .state()
            .users
            .iter()
            .filter(|user| ids.contains(&user.account.id))
            .map(StoredUser::member)
            .collect())
    }

    async fn save_profile(
        &self,
        id: &UserId,
        profile: &UserProfile,
    ) -> Result<bool, UserPersistenceError> {
        let mut state = self.state();
        let Some(user) = state.users.iter_mut().find(|user| user.account.id == *id) else {
            return Ok(false);
        };
        user.account.profile = profile.clone();
        Ok(true)
    }
}

#[async_trait]
impl ConcertRepository for InMemoryStore {
    async fn ensure_concert(&self, concert: &ConcertId) -> Result<(), ConcertRepositoryError> {
        let mut state = self.state();
        if !state.concerts.contains(concert) {
            state.concerts.push(concert.clone());
        }
        Ok(())
    }

    async fn concert_exists(&self, concert: &ConcertId) -> Result<bool, ConcertRepositoryError> {
        Ok(self.state().concerts.contains(concert))
    }

    async fn add_favorite(
        &self,
        user: &UserId,
        concert: &ConcertId,
    ) -> Result<bool, ConcertRepositoryError> {
        let mut state = self.state();
        if !state.concerts.contains(concert) {
            return Err(ConcertRepositoryError::query(format!(
                "foreign key violation: concert {concert}"
            )));
        }
        let link = (*user, concert.clone());
        if state.favorites.contains(&link) {
            return Ok(false);
        }
        state.favorites.push(link);
        Ok(true)
    }

    async fn remove_favorite(
        &self,
        user: &UserId,
        concert: &ConcertId,
    ) -> Result<bool, ConcertRepositoryError> {
        let mut state = self.state();
        let before = state.favorites.len();
        state
            .favorites
            .retain(|(owner, id)| !(owner == user && id == concert));
        Ok(state.favorites.len() != before)
    }

    async fn favorites_of(&self, user: &UserId) -> Result<Vec<ConcertId>, ConcertRepositoryError> {
        Ok(self
            .state()
            .favorites
            .iter()
            .filter(|(owner, _)| owner == user)
            .map(|(_, concert)| concert.clone())
            .collect())
    }

    async fn favorites_of_others(
        &self,
        excluded: &UserId,
    ) -> Result<Vec<MemberFavorites>, ConcertRepositoryError> {
        let state = self.state();
        let mut grouped: Vec<MemberFavorites> = Vec::new();
        for (owner, concert) in state.favorites.iter().filter(|(owner, _)| owner != excluded) {
            match grouped.iter_mut().find(|entry| entry.user_id == *owner) {
                Some(entry) => entry.concerts.push(concert.clone()),
                None => grouped.push(MemberFavorites {
                    user_id: *owner,
                    concerts: vec![concert.clone()],
                }),
            }
        }
        Ok(grouped)
    }
}

#[async_trait]
impl MatchingRepository for InMemoryStore {
    async fn find_pair(
        &self,
        user: &UserId,
        target: &UserId,
    ) -> Result<Option<Matching>, MatchingRepositoryError> {
        Ok(self
            .state()
            .matchings
            .iter()
            .find(|m| m.user_id == *user && m.target_id == *target)
            .cloned())
    }

    async fn upsert_pending(
        &self,
        user: &UserId,
        target: &UserId,
        concerts: &[ConcertId],
    ) -> Result<Option<Matching>, MatchingRepositoryError> {
        let mut state = self.state();
        let existing = state
            .matchings
            .iter_mut()
            .find(|m| m.user_id == *user && m.target_id == *target);
        match existing {
            Some(record) if record.decision.is_decided() => Ok(None),
            Some(record) => {
                record.matched_concerts = concerts.to_vec();
                Ok(Some(record.clone()))
            }
            None => {
                let record = Matching {
                    id: MatchingId::random(),
                    user_id: *user,
                    target_id: *target,
                    decision: Decision::Unknown,
                    matched_concerts: concerts.to_vec(),
                };
                state.matchings.push(record.clone());
                Ok(Some(record))
            }
        }
    }

    async fn find_by_id(
        &self,
        id: &MatchingId,
    ) -> Result<Option<Matching>, MatchingRepositoryError> {
        Ok(self
            .state()
            .matchings
            .iter()
            .find(|m| m.id == *id)
            .cloned())
    }

    async fn record_decision(
        &self,
        id: &MatchingId,
        owner: &UserId,
        decision: Decision,
    ) -> Result<bool, MatchingRepositoryError> {
        let mut state = self.state();
        let Some(record) = state.matchings.iter_mut().find(|m| {
            m.id == *id && m.user_id == *owner && m.decision == Decision::Unknown
        }) else {
            return Ok(false);
        };
        record.decision = decision;
        Ok(true)
    }

    async fn accepted_by(&self, user: &UserId) -> Result<Vec<Matching>, MatchingRepositoryError> {
        Ok(self
            .state()
            .matchings
            .iter()
            .filter(|m| m.user_id == *user && m.decision == Decision::Yes)
            .cloned()
            .collect())
    }

    async fn delete_accepted_pair(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<usize, MatchingRepositoryError> {
        let mut state = self.state();
        let before = state.matchings.len();
        state.matchings.retain(|m| {
            let between = (m.user_id == *a && m.target_id == *b)
                || (m.user_id == *b && m.target_id == *a);
            !(between && m.decision == Decision::Yes)
        });
        Ok(before - state.matchings.len())
    }
}

/// Event source answering from a fixed catalogue keyed by event id.
#[derive(Default)]
pub struct StubEventSource {
    events: HashMap<String, Value>,
    order: Vec<String>,
}

impl StubEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event; its id is read from the `id` field.
    #[must_use]
    pub fn with_event(mut self, event: Value) -> Self {
        if let Some(id) = event.get("id").and_then(Value::as_str) {
            let id = id.to_owned();
            if !self.events.contains_key(&id) {
                self.order.push(id.clone());
            }
            self.events.insert(id, event);
        }
        self
    }
}

#[async_trait]
impl EventSource for StubEventSource {
    async fn search(&self, query: &EventQuery) -> Result<EventPage, EventSourceError> {
        let events: Vec<Value> = match &query.id {
            Some(id) => self.events.get(id.as_str()).cloned().into_iter().collect(),
            None => self
                .order
                .iter()
                .filter_map(|id| self.events.get(id))
                .filter(|event| keyword_matches(event, query.keyword.as_deref()))
                .cloned()
                .collect(),
        };
        Ok(EventPage {
            total_count: events.len() as u64,
            events,
        })
    }
}

fn keyword_matches(event: &Value, keyword: Option<&str>) -> bool {
    let Some(keyword) = keyword else {
        return true;
    };
    event
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| name.to_lowercase().contains(&keyword.to_lowercase()))
}
