//! E2E tests for tweet endpoints

mod common;

use common::TestServer;
use serde_json::{Value, json};

#[tokio::test]
async fn test_create_tweet() {
    let server = TestServer::new().await;
    let alice = server.signup("alice").await;

    let tweet = server
        .post_tweet(&alice.token, "hello #World and #world2!")
        .await;

    assert_eq!(tweet["content"], "hello #World and #world2!");
    assert_eq!(tweet["hashtags"], json!(["#World", "#world2"]));
    assert_eq!(tweet["likes"], json!([]));
    assert_eq!(tweet["author"], alice.user_id.as_str());
    assert!(tweet["id"].is_string());
    assert!(tweet["date"].is_string());
}

#[tokio::test]
async fn test_create_tweet_errors() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/tweets"))
        .json(&json!({ "content": "no token" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing content or token");

    let response = server
        .client
        .post(server.url("/tweets"))
        .json(&json!({ "content": "bad token", "token": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_list_tweets_newest_first_with_expansion() {
    let server = TestServer::new().await;
    let alice = server.signup("alice").await;
    let bob = server.signup("bob").await;

    let first = server.post_tweet(&alice.token, "first").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    server.post_tweet(&bob.token, "second").await;

    server
        .client
        .put(server.url(&format!("/tweets/like/{}", first["id"].as_str().unwrap())))
        .json(&json!({ "token": bob.token }))
        .send()
        .await
        .unwrap();

    let (status, body) = server.get_json("/tweets").await;
    assert_eq!(status, 200);
    let tweets = body["tweets"].as_array().unwrap();
    assert_eq!(tweets.len(), 2);
    assert_eq!(tweets[0]["content"], "second");
    assert_eq!(tweets[1]["content"], "first");

    assert_eq!(tweets[1]["author"]["username"], "alice");
    assert_eq!(tweets[1]["author"]["email"], "alice@example.com");
    assert_eq!(tweets[1]["likes"][0]["username"], "bob");
}

#[tokio::test]
async fn test_like_toggle() {
    let server = TestServer::new().await;
    let alice = server.signup("alice").await;
    let tweet = server.post_tweet(&alice.token, "like me").await;
    let path = format!("/tweets/like/{}", tweet["id"].as_str().unwrap());

    for expected in [true, false, true] {
        let response = server
            .client
            .put(server.url(&path))
            .json(&json!({ "token": alice.token }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["liked"], expected);
    }

    let (_, body) = server.get_json("/tweets").await;
    assert_eq!(body["tweets"][0]["likes"].as_array().unwrap().len(), 1);

    let response = server
        .client
        .put(server.url("/tweets/like/missing"))
        .json(&json!({ "token": alice.token }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = server
        .client
        .put(server.url(&path))
        .json(&json!({ "token": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_delete_tweet_ownership() {
    let server = TestServer::new().await;
    let alice = server.signup("alice").await;
    let bob = server.signup("bob").await;
    let tweet = server.post_tweet(&alice.token, "mine").await;
    let path = format!("/tweets/{}", tweet["id"].as_str().unwrap());

    let response = server
        .client
        .delete(server.url(&path))
        .json(&json!({ "token": bob.token }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let (_, body) = server.get_json("/tweets").await;
    assert_eq!(body["tweets"].as_array().unwrap().len(), 1);

    let response = server
        .client
        .delete(server.url(&path))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = server
        .client
        .delete(server.url(&path))
        .json(&json!({ "token": alice.token }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "result": true }));

    let response = server
        .client
        .delete(server.url(&path))
        .json(&json!({ "token": alice.token }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_tweets_by_hashtag() {
    let server = TestServer::new().await;
    let alice = server.signup("alice").await;
    server.post_tweet(&alice.token, "learning #rust").await;
    server.post_tweet(&alice.token, "more #Rust").await;

    let (status, body) = server.get_json("/tweets/hashtag/rust").await;
    assert_eq!(status, 200);
    assert_eq!(body["tweets"].as_array().unwrap().len(), 1);
    assert_eq!(body["tweets"][0]["content"], "learning #rust");
    assert!(body.get("message").is_none());

    let (status, body) = server.get_json("/tweets/hashtag/nothing").await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], true);
    assert_eq!(body["tweets"], json!([]));
    assert_eq!(body["message"], "No tweets found with this hashtag");
}

#[tokio::test]
async fn test_trends() {
    let server = TestServer::new().await;
    let alice = server.signup("alice").await;
    server.post_tweet(&alice.token, "#a #b").await;
    server.post_tweet(&alice.token, "#a").await;
    server.post_tweet(&alice.token, "#a #b #b #c").await;

    let (status, body) = server.get_json("/tweets/trends").await;
    assert_eq!(status, 200);
    assert_eq!(
        body["trends"],
        json!([
            { "hashtag": "#a", "count": 3 },
            { "hashtag": "#b", "count": 3 },
            { "hashtag": "#c", "count": 1 },
        ])
    );
}

#[tokio::test]
async fn test_tweets_by_user() {
    let server = TestServer::new().await;
    let alice = server.signup("alice").await;
    let bob = server.signup("bob").await;
    server.post_tweet(&alice.token, "from alice").await;
    server.post_tweet(&bob.token, "from bob").await;

    let (status, body) = server.get_json("/tweets/user/alice").await;
    assert_eq!(status, 200);
    let tweets = body["tweets"].as_array().unwrap();
    assert_eq!(tweets.len(), 1);
    assert_eq!(tweets[0]["author"]["username"], "alice");
    assert_eq!(
        tweets[0]["author"]["avatar"],
        hackatweet::config::DEFAULT_AVATAR_URL
    );
    assert!(tweets[0]["author"].get("email").is_none());

    let (status, body) = server.get_json("/tweets/user/ghost").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "User not found");
}
