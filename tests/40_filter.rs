mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{question, TestApp};

async fn seeded() -> Result<(TestApp, String)> {
    let app = TestApp::new();
    let (_, token) = app.register("Alice", "alice@example.com").await?;
    let fixtures = [
        ("Amazon", "Arrays", "Easy"),
        ("Amazon", "Graphs", "Hard"),
        ("Amazon", "Arrays", "Medium"),
        ("Google", "Graphs", "Hard"),
        ("Google", "Dynamic Programming", "Medium"),
        ("Netflix", "Caching", "Medium"),
    ];
    for (company, topic, difficulty) in fixtures {
        app.create_question(&token, question(company, topic, difficulty)).await?;
    }
    Ok((app, token))
}

fn items(body: &Value) -> Vec<Value> {
    body["data"].as_array().cloned().unwrap_or_default()
}

#[tokio::test]
async fn unfiltered_list_returns_first_page_of_everything() -> Result<()> {
    let (app, _) = seeded().await?;
    let (status, body) = app.get("/api/questions").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 6);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pages"], 1);
    assert_eq!(items(&body).len(), 6);
    Ok(())
}

#[tokio::test]
async fn count_is_independent_of_page_and_limit() -> Result<()> {
    let (app, _) = seeded().await?;

    let mut seen = Vec::new();
    for page in 1..=3 {
        let (status, body) = app.get(&format!("/api/questions?limit=2&page={}", page)).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 6);
        assert_eq!(body["pages"], 3);
        let page_items = items(&body);
        assert_eq!(page_items.len(), 2);
        seen.extend(page_items.into_iter().map(|q| q["id"].clone()));
    }
    seen.sort_by_key(|id| id.to_string());
    seen.dedup();
    assert_eq!(seen.len(), 6);

    let (_, body) = app.get("/api/questions?limit=2&page=9").await?;
    assert_eq!(body["count"], 6);
    assert!(items(&body).is_empty());
    Ok(())
}

#[tokio::test]
async fn filters_combine() -> Result<()> {
    let (app, _) = seeded().await?;

    let (_, body) = app.get("/api/questions?company=Amazon").await?;
    assert_eq!(body["count"], 3);
    assert!(items(&body).iter().all(|q| q["company"] == "Amazon"));

    let (_, body) = app.get("/api/questions?company=Amazon&topic=Arrays").await?;
    assert_eq!(body["count"], 2);

    let (_, body) = app.get("/api/questions?difficulty=Hard").await?;
    assert_eq!(body["count"], 2);
    assert!(items(&body).iter().all(|q| q["difficulty"] == "Hard"));

    let (_, body) = app.get("/api/questions?company=Nobody").await?;
    assert_eq!(body["count"], 0);
    assert_eq!(body["pages"], 0);
    Ok(())
}

#[tokio::test]
async fn sort_orders() -> Result<()> {
    let (app, _) = seeded().await?;
    let (_, body) = app.get("/api/questions").await?;
    let ids: Vec<String> = items(&body)
        .iter()
        .map(|q| q["id"].as_str().unwrap_or_default().to_string())
        .collect();

    // Give the oldest three a distinct number of votes each
    let mut voters = Vec::new();
    for n in 0..3 {
        voters.push(app.register(&format!("V{}", n), &format!("v{}@example.com", n)).await?.1);
    }
    for (votes, id) in ids.iter().rev().take(3).enumerate() {
        for token in voters.iter().take(votes + 1) {
            app.request("POST", &format!("/api/questions/{}/upvote", id), Some(token), None)
                .await?;
        }
    }

    let (status, body) = app.get("/api/questions?sort=upvotes").await?;
    assert_eq!(status, StatusCode::OK);
    let counts: Vec<i64> = items(&body).iter().filter_map(|q| q["upvotes"].as_i64()).collect();
    assert_eq!(counts.len(), 6);
    assert!(counts.windows(2).all(|w| w[0] >= w[1]), "{:?}", counts);
    assert_eq!(counts[0], 3);

    let (_, latest) = app.get("/api/questions?sort=latest").await?;
    let (_, oldest) = app.get("/api/questions?sort=oldest").await?;
    let created = |body: &Value| -> Vec<chrono::DateTime<chrono::Utc>> {
        items(body)
            .iter()
            .filter_map(|q| q["createdAt"].as_str())
            .filter_map(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&chrono::Utc))
            .collect()
    };
    let latest = created(&latest);
    let oldest = created(&oldest);
    assert_eq!(latest.len(), 6);
    assert!(latest.windows(2).all(|w| w[0] >= w[1]));
    assert!(oldest.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}

#[tokio::test]
async fn bad_parameters_are_rejected() -> Result<()> {
    let (app, _) = seeded().await?;

    let (status, body) = app.get("/api/questions?sort=popular").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["sort"].is_string());

    let (status, body) = app.get("/api/questions?fromDate=yesterday").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["fromDate"].is_string());

    let (status, _) = app.get("/api/questions?page=0").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn date_range_bounds_creation_time() -> Result<()> {
    let (app, _) = seeded().await?;
    let today = chrono::Utc::now().date_naive();
    let tomorrow = today.succ_opt().unwrap_or(today);

    let (_, body) = app.get(&format!("/api/questions?fromDate={}&toDate={}", today, today)).await?;
    assert_eq!(body["count"], 6);

    let (_, body) = app.get(&format!("/api/questions?fromDate={}", tomorrow)).await?;
    assert_eq!(body["count"], 0);
    Ok(())
}

#[tokio::test]
async fn search_is_literal_and_case_insensitive() -> Result<()> {
    let (app, token) = seeded().await?;
    app.create_question(
        &token,
        json!({
            "questionText": "What does the regex a.*b match (and why)?",
            "company": "Stripe",
            "topic": "Strings",
            "role": "SDE",
            "difficulty": "Easy",
        }),
    )
    .await?;

    let (status, body) = app.get("/api/questions/search?q=amazon").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["message"], "Questions fetched successfully");

    let (_, body) = app.get("/api/questions/search?q=GRAPHS").await?;
    assert_eq!(body["count"], 2);

    // Regex metacharacters match themselves only
    let (_, body) = app.get("/api/questions/search?q=a.*b").await?;
    assert_eq!(body["count"], 1);
    assert_eq!(items(&body)[0]["company"], "Stripe");

    let (_, body) = app.get("/api/questions/search?q=.*").await?;
    assert_eq!(body["count"], 1);

    let (status, body) = app.get("/api/questions/search?q=kubernetes").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["message"], "No questions found");
    Ok(())
}

#[tokio::test]
async fn empty_search_is_rejected() -> Result<()> {
    let app = TestApp::new();
    for uri in ["/api/questions/search", "/api/questions/search?q=", "/api/questions/search?q=%20%20"] {
        let (status, body) = app.get(uri).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["errors"]["q"].is_string());
    }
    Ok(())
}

#[tokio::test]
async fn malformed_query_string_gets_error_envelope() -> Result<()> {
    let (app, _) = seeded().await?;

    let (status, body) = app.get("/api/questions?page=1&page=2").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    assert!(body["errors"]["query"].is_string());

    let (status, body) = app.get("/api/questions/search?q=a&q=b").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["query"].is_string());
    Ok(())
}
