//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `ratenextdoor_test`)
//!   `TEST_DB_PASSWORD` (default: `ratenextdoor_test`)
//!   `TEST_DB_NAME` (default: `ratenextdoor_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use ratenextdoor_common::{VoteDirection, VoteState};
use ratenextdoor_db::{
    entities::{forum_post, forum_vote, profile},
    repositories::{ForumPostRepository, ForumVoteRepository, ProfileRepository},
    test_utils::{TestDatabase, TestDbConfig},
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

async fn seed_profile(repo: &ProfileRepository, id: &str) {
    repo.create(profile::ActiveModel {
        id: Set(id.to_string()),
        email: Set(Some(format!("{id}@example.com"))),
        username: Set(None),
        display_name: Set(None),
        full_name: Set(None),
        date_of_birth: Set(None),
        phone: Set(None),
        avatar_url: Set(None),
        is_anonymous: Set(false),
        role: Set(profile::ProfileRole::Member),
        onboarding_completed: Set(false),
        email_verified: Set(true),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    })
    .await
    .unwrap();
}

async fn seed_post(repo: &ForumPostRepository, id: &str, author: &str) {
    let now = Utc::now();
    repo.create(forum_post::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set(author.to_string()),
        parent_post_id: Set(None),
        title: Set("Flood coverage".to_string()),
        slug: Set(Some(format!("flood-coverage-{id}"))),
        content: Set("Does anyone carry separate flood coverage?".to_string()),
        category: Set(Some(forum_post::ForumCategory::Claims)),
        image_urls: Set(serde_json::json!([])),
        upvotes: Set(0),
        downvotes: Set(0),
        view_count: Set(0),
        reply_count: Set(0),
        is_pinned: Set(false),
        is_locked: Set(false),
        is_edited: Set(false),
        edited_at: Set(None),
        created_at: Set(now.into()),
        last_activity_at: Set(now.into()),
        updated_at: Set(None),
    })
    .await
    .unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_vote_sequence_keeps_counters_consistent() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = Arc::new(db.conn.clone());

    let profiles = ProfileRepository::new(conn.clone());
    let posts = ForumPostRepository::new(conn.clone());
    let votes = ForumVoteRepository::new(conn.clone());

    for id in ["author", "alice", "bob"] {
        seed_profile(&profiles, id).await;
    }
    seed_post(&posts, "p1", "author").await;

    // alice: up, up, down. bob: down.
    let mut n = 0;
    for (voter, dir) in [
        ("alice", VoteDirection::Up),
        ("alice", VoteDirection::Up),
        ("alice", VoteDirection::Down),
        ("bob", VoteDirection::Down),
    ] {
        n += 1;
        votes
            .cast_vote(format!("v{n}"), voter, "p1", dir)
            .await
            .unwrap();
    }

    let post = posts.get_by_id("p1").await.unwrap();
    assert_eq!((post.upvotes, post.downvotes), (0, 2));

    let alice = votes.find_by_user_and_post("alice", "p1").await.unwrap();
    let bob = votes.find_by_user_and_post("bob", "p1").await.unwrap();
    assert_eq!(
        VoteState::from(alice.map(|v| VoteDirection::from(v.vote_type))),
        VoteState::Down
    );
    assert_eq!(
        VoteState::from(bob.map(|v| VoteDirection::from(v.vote_type))),
        VoteState::Down
    );

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_votes_serialize_on_post() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = Arc::new(db.conn.clone());

    let profiles = ProfileRepository::new(conn.clone());
    let posts = ForumPostRepository::new(conn.clone());
    let votes = ForumVoteRepository::new(conn.clone());

    seed_profile(&profiles, "author").await;
    let voters: Vec<String> = (0..20).map(|i| format!("voter{i}")).collect();
    for voter in &voters {
        seed_profile(&profiles, voter).await;
    }
    seed_post(&posts, "p1", "author").await;

    let handles: Vec<_> = voters
        .iter()
        .enumerate()
        .map(|(i, voter)| {
            let votes = votes.clone();
            let voter = voter.clone();
            tokio::spawn(async move {
                let dir = if i % 4 == 0 {
                    VoteDirection::Down
                } else {
                    VoteDirection::Up
                };
                votes.cast_vote(format!("cv{i}"), &voter, "p1", dir).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let post = posts.get_by_id("p1").await.unwrap();
    assert_eq!((post.upvotes, post.downvotes), (15, 5));

    db.drop_database().await.unwrap();
}

/// Fire `casts` concurrent same-direction votes from one voter and check the
/// result equals applying them one after another.
async fn same_voter_burst(casts: usize) {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = Arc::new(db.conn.clone());

    let profiles = ProfileRepository::new(conn.clone());
    let posts = ForumPostRepository::new(conn.clone());
    let votes = ForumVoteRepository::new(conn.clone());

    seed_profile(&profiles, "author").await;
    seed_profile(&profiles, "alice").await;
    seed_post(&posts, "p1", "author").await;

    let handles: Vec<_> = (0..casts)
        .map(|i| {
            let votes = votes.clone();
            tokio::spawn(async move {
                votes
                    .cast_vote(format!("sv{i}"), "alice", "p1", VoteDirection::Up)
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Up toggles, so an even number of casts folds back to no vote
    let expected = if casts % 2 == 0 {
        VoteState::None
    } else {
        VoteState::Up
    };
    let alice = votes.find_by_user_and_post("alice", "p1").await.unwrap();
    assert_eq!(
        VoteState::from(alice.map(|v| VoteDirection::from(v.vote_type))),
        expected
    );

    let rows = forum_vote::Entity::find()
        .filter(forum_vote::Column::PostId.eq("p1"))
        .count(conn.as_ref())
        .await
        .unwrap();
    let post = posts.get_by_id("p1").await.unwrap();
    assert!(rows <= 1);
    assert_eq!(i64::from(post.upvotes), i64::try_from(rows).unwrap());
    assert_eq!(post.downvotes, 0);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_same_voter_even_burst_folds_to_none() {
    same_voter_burst(10).await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_same_voter_odd_burst_folds_to_up() {
    same_voter_burst(11).await;
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
