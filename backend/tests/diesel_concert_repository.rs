//! Integration tests for `DieselConcertRepository`.
//!
//! Covers lazy concert rows and idempotent favorite links against embedded
//! PostgreSQL.

use encore::domain::ports::ConcertRepository;
use encore::domain::{ConcertId, UserId};
use encore::outbound::persistence::DieselConcertRepository;
use rstest::{fixture, rstest};

mod support;

use support::Database;

struct TestContext {
    db: Database,
    concerts: DieselConcertRepository,
    member: UserId,
}

fn concert(raw: &str) -> ConcertId {
    ConcertId::new(raw).expect("valid concert id")
}

impl TestContext {
    fn favorite(&self, user: &UserId, id: &ConcertId) -> bool {
        self.db.runtime.block_on(async {
            self.concerts.ensure_concert(id).await.expect("concert row");
            self.concerts
                .add_favorite(user, id)
                .await
                .expect("favorite insert")
        })
    }

    fn concert_rows(&self, id: &ConcertId) -> i64 {
        self.db.count(
            "SELECT count(*) FROM concerts WHERE concert_id = $1",
            &[&id.as_str()],
        )
    }
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    let db = support::database()?;
    let member = db.seed_member("favoriter");
    let concerts = DieselConcertRepository::new(db.pool.clone());
    Some(TestContext {
        db,
        concerts,
        member,
    })
}

#[rstest]
fn favoriting_twice_keeps_one_concert_and_one_link(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: favoriting_twice_keeps_one_concert_and_one_link skipped");
        return;
    };
    let id = concert("Z7r9jZ1AdFXkP");

    assert!(context.favorite(&context.member, &id));
    assert!(!context.favorite(&context.member, &id));

    assert_eq!(context.concert_rows(&id), 1);
    assert_eq!(
        context.db.count(
            "SELECT count(*) FROM favorite_concerts WHERE user_id = $1",
            &[context.member.as_uuid()],
        ),
        1
    );
    let exists = context
        .db
        .runtime
        .block_on(context.concerts.concert_exists(&id))
        .expect("exists query");
    assert!(exists);
}

#[rstest]
fn unfavoriting_keeps_the_concert_row(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: unfavoriting_keeps_the_concert_row skipped");
        return;
    };
    let id = concert("Z7r9jZ1AdFXkQ");
    let remove = || {
        context
            .db
            .runtime
            .block_on(context.concerts.remove_favorite(&context.member, &id))
            .expect("delete query")
    };

    assert!(!remove());
    assert!(context.favorite(&context.member, &id));
    assert!(remove());
    assert!(!remove());

    assert_eq!(context.concert_rows(&id), 1);
    let remaining = context
        .db
        .runtime
        .block_on(context.concerts.favorites_of(&context.member))
        .expect("favorites query");
    assert!(remaining.is_empty());
}

#[rstest]
fn favorites_are_listed_oldest_first(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: favorites_are_listed_oldest_first skipped");
        return;
    };
    let ids = [concert("vv1"), concert("vv2"), concert("vv3")];
    for id in &ids {
        assert!(context.favorite(&context.member, id));
    }

    let listed = context
        .db
        .runtime
        .block_on(context.concerts.favorites_of(&context.member))
        .expect("favorites query");
    assert_eq!(listed, ids.to_vec());
}

#[rstest]
fn favorites_of_others_skip_the_caller(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: favorites_of_others_skip_the_caller skipped");
        return;
    };
    let other = context.db.seed_member("neighbour");
    let _idle = context.db.seed_member("idle");
    let shared = concert("shared-1");
    assert!(context.favorite(&context.member, &shared));
    assert!(context.favorite(&other, &shared));
    assert!(context.favorite(&other, &concert("solo-2")));

    let others = context
        .db
        .runtime
        .block_on(context.concerts.favorites_of_others(&context.member))
        .expect("favorites query");

    assert_eq!(others.len(), 1);
    assert_eq!(others[0].user_id, other);
    assert_eq!(others[0].concerts, vec![shared, concert("solo-2")]);
}
