//! Vote endpoints end to end: tokens minted by listings and threads, the
//! `vote`/`unvote` pair, and every way a token can stop being honored.

mod common;

use axum::http::StatusCode;

use common::{comment, json_request, listing_token, submit, test_app, ALICE, BOB};

/// Flips the final hex digit so the authentication tag no longer verifies.
fn corrupt(token: &str) -> String {
    let mut chars: Vec<char> = token.chars().collect();
    let last = chars.last_mut().unwrap();
    *last = if *last == '0' { '1' } else { '0' };
    chars.into_iter().collect()
}

#[tokio::test]
async fn vote_and_unvote_round_trip_through_the_listing() {
    let (app, _store) = test_app().await;
    let story = submit(&app, ALICE, "vote on me").await;
    let token = listing_token(&app, BOB, story).await;

    let (status, body) =
        json_request(&app, "POST", &format!("/vote?tok={token}"), Some(BOB), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entryid"].as_i64(), Some(story));
    assert_eq!(body["userid"], BOB);
    assert_eq!(body["totalvotes"], 1);

    // Double submit from a retried request changes nothing.
    let (status, body) =
        json_request(&app, "POST", &format!("/vote?tok={token}"), Some(BOB), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalvotes"], 1);

    // The listing reflects the vote for the voter.
    let (_, listing) = json_request(&app, "GET", "/entries", Some(BOB), None).await;
    let row = &listing["items"][0];
    assert_eq!(row["votes"], 1);
    assert_eq!(row["viewer_voted"], true);

    let (status, body) =
        json_request(&app, "POST", &format!("/unvote?tok={token}"), Some(BOB), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalvotes"], 0);

    let (_, listing) = json_request(&app, "GET", "/entries", Some(BOB), None).await;
    assert_eq!(listing["items"][0]["viewer_voted"], false);
}

#[tokio::test]
async fn thread_tokens_authorize_votes_too() {
    let (app, _store) = test_app().await;
    let story = submit(&app, ALICE, "threaded").await;
    let reply = comment(&app, BOB, story, "first").await;

    // The thread view mints a token for the comment itself.
    let (_, thread) =
        json_request(&app, "GET", &format!("/entries/{reply}"), Some(ALICE), None).await;
    let token = thread["vote_tok"].as_str().unwrap().to_string();

    let (status, body) =
        json_request(&app, "POST", &format!("/vote?tok={token}"), Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entryid"].as_i64(), Some(reply));
    assert_eq!(body["totalvotes"], 1);
}

#[tokio::test]
async fn missing_and_tampered_tokens_are_rejected() {
    let (app, store) = test_app().await;
    let story = submit(&app, ALICE, "target").await;
    let token = listing_token(&app, BOB, story).await;

    let (status, body) = json_request(&app, "POST", "/vote", Some(BOB), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let bad = corrupt(&token);
    let (status, _) =
        json_request(&app, "POST", &format!("/vote?tok={bad}"), Some(BOB), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Nothing reached the ledger.
    use domains::VoteStore;
    assert_eq!(store.count(story).await.unwrap(), 0);
}

#[tokio::test]
async fn tokens_are_not_transferable_between_identities() {
    let (app, _store) = test_app().await;
    let story = submit(&app, ALICE, "mine to vote on").await;
    let bob_token = listing_token(&app, BOB, story).await;

    // Alice replaying Bob's token.
    let (status, _) = json_request(
        &app,
        "POST",
        &format!("/vote?tok={bob_token}"),
        Some(ALICE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // An anonymous caller replaying it.
    let (status, _) =
        json_request(&app, "POST", &format!("/vote?tok={bob_token}"), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Its rightful holder can still use it.
    let (status, _) =
        json_request(&app, "POST", &format!("/vote?tok={bob_token}"), Some(BOB), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn stale_tokens_die_with_their_entry() {
    let (app, _store) = test_app().await;
    let story = submit(&app, ALICE, "short-lived").await;
    let token = listing_token(&app, BOB, story).await;

    let (status, _) =
        json_request(&app, "DELETE", &format!("/entries/{story}"), Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        json_request(&app, "POST", &format!("/vote?tok={token}"), Some(BOB), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn unvote_without_a_prior_vote_reports_zero() {
    let (app, _store) = test_app().await;
    let story = submit(&app, ALICE, "never voted").await;
    let token = listing_token(&app, BOB, story).await;

    let (status, body) =
        json_request(&app, "POST", &format!("/unvote?tok={token}"), Some(BOB), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalvotes"], 0);
}
