mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

// Only the seeded accounts exist in this server: alice, bob. PAGE_SIZE=1.

#[tokio::test]
async fn list_is_paginated() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::access_token(server, "bob", "builder123").await?;

    let (status, body) = common::get_json(&server.url("/users/"), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["next"], "/users/?page=2");
    assert_eq!(body["previous"], serde_json::Value::Null);
    assert_eq!(body["results"][0]["username"], "alice");
    assert_eq!(body["results"].as_array().map(Vec::len), Some(1));

    let (status, body) = common::get_json(&server.url("/users/?page=last"), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["username"], "bob");
    assert_eq!(body["previous"], "/users/");
    Ok(())
}

#[tokio::test]
async fn page_size_can_be_requested() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::access_token(server, "bob", "builder123").await?;

    let (status, body) = common::get_json(&server.url("/users/?page_size=10"), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["next"], serde_json::Value::Null);
    assert_eq!(
        body["results"]
            .as_array()
            .map(|users| users.iter().map(|u| u["username"].clone()).collect::<Vec<_>>()),
        Some(vec![json!("alice"), json!("bob")])
    );
    Ok(())
}

#[tokio::test]
async fn invalid_page_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::access_token(server, "bob", "builder123").await?;

    let (status, body) = common::get_json(&server.url("/users/?page=7"), Some(&token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invalid page.");
    Ok(())
}
