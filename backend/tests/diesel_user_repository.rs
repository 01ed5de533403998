//! Integration tests for `DieselUserRepository`.
//!
//! Checks account creation, username uniqueness and profile round trips
//! against embedded PostgreSQL.

use encore::domain::ports::{NewAccount, UserPersistenceError, UserRepository};
use encore::domain::{EmailAddress, UserId, UserProfile, Username};
use encore::outbound::persistence::DieselUserRepository;
use rstest::{fixture, rstest};

mod support;

use support::Database;

struct TestContext {
    db: Database,
    users: DieselUserRepository,
}

fn account(username: &str) -> NewAccount {
    NewAccount {
        id: UserId::random(),
        username: Username::new(username).expect("valid username"),
        email: EmailAddress::new(format!("{username}@example.com")).expect("valid email"),
        password_digest: "$2b$04$stored.as.given.by.the.hasher".to_owned(),
        profile: UserProfile::default(),
    }
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    let db = support::database()?;
    let users = DieselUserRepository::new(db.pool.clone());
    Some(TestContext { db, users })
}

#[rstest]
fn created_account_has_a_default_profile(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: created_account_has_a_default_profile skipped");
        return;
    };
    let new = account("grace.h");

    let (stored, credentials) = context.db.runtime.block_on(async {
        context
            .users
            .create_with_profile(&new)
            .await
            .expect("account created");
        let stored = context
            .users
            .find_account(&new.id)
            .await
            .expect("lookup succeeds")
            .expect("account exists");
        let credentials = context
            .users
            .find_credentials("grace.h")
            .await
            .expect("lookup succeeds")
            .expect("credentials exist");
        (stored, credentials)
    });

    assert_eq!(stored.member.id, new.id);
    assert_eq!(stored.member.username, new.username);
    assert_eq!(stored.member.profile, UserProfile::default());
    assert_eq!(stored.email, new.email);
    assert_eq!(credentials.user_id, new.id);
    assert_eq!(credentials.password_digest, new.password_digest);
}

#[rstest]
fn duplicate_username_is_reported_and_rolled_back(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_username_is_reported_and_rolled_back skipped");
        return;
    };
    let first = context.db.seed_member("taken");
    let second = account("taken");

    let err = context
        .db
        .runtime
        .block_on(context.users.create_with_profile(&second))
        .expect_err("username already held");

    assert!(matches!(
        err,
        UserPersistenceError::DuplicateUsername { ref username } if username == "taken"
    ));
    assert_eq!(context.db.count("SELECT count(*) FROM users", &[]), 1);
    assert_eq!(
        context.db.count(
            "SELECT count(*) FROM user_profiles WHERE user_id = $1",
            &[first.as_uuid()],
        ),
        1
    );
}

#[rstest]
fn saved_profile_is_visible_to_member_lookups(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: saved_profile_is_visible_to_member_lookups skipped");
        return;
    };
    let id = context.db.seed_member("ada.l");
    let profile = UserProfile {
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        term: "3A".to_owned(),
        faculty: "Mathematics".to_owned(),
        favorite_artists: vec!["Bjork".to_owned(), "Caribou".to_owned()],
        favorite_genres: vec!["Electronic".to_owned()],
        ..UserProfile::default()
    };

    let (saved, by_name, members) = context.db.runtime.block_on(async {
        let saved = context
            .users
            .save_profile(&id, &profile)
            .await
            .expect("update succeeds");
        let by_name = context
            .users
            .find_by_username("ada.l")
            .await
            .expect("lookup succeeds")
            .expect("member exists");
        let members = context
            .users
            .members(&[id, UserId::random()])
            .await
            .expect("lookup succeeds");
        (saved, by_name, members)
    });

    assert!(saved);
    assert_eq!(by_name.profile, profile);
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, id);
}

#[rstest]
fn saving_a_missing_profile_reports_false(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: saving_a_missing_profile_reports_false skipped");
        return;
    };
    let saved = context
        .db
        .runtime
        .block_on(
            context
                .users
                .save_profile(&UserId::random(), &UserProfile::default()),
        )
        .expect("update succeeds");
    assert!(!saved);
}
