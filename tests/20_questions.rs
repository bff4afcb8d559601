mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{question, TestApp};

#[tokio::test]
async fn create_requires_authentication() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app
        .request("POST", "/api/questions", None, Some(question("Amazon", "Arrays", "Easy")))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized");
    Ok(())
}

#[tokio::test]
async fn create_then_fetch_populates_submitter() -> Result<()> {
    let app = TestApp::new();
    let (alice_id, alice) = app.register("Alice", "alice@example.com").await?;

    let created = app.create_question(&alice, question("Amazon", "Arrays", "Easy")).await?;
    assert_eq!(created["upvotes"], 0);
    assert_eq!(created["upvotedBy"], json!([]));
    assert!(created["createdAt"].is_string());

    let id = created["id"].as_str().unwrap_or_default();
    let (status, body) = app.get(&format!("/api/questions/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["submittedBy"]["id"], alice_id.as_str());
    assert_eq!(body["data"]["submittedBy"]["name"], "Alice");
    assert_eq!(body["data"]["company"], "Amazon");
    Ok(())
}

#[tokio::test]
async fn create_validates_body() -> Result<()> {
    let app = TestApp::new();
    let (_, token) = app.register("Alice", "alice@example.com").await?;

    let (status, body) = app
        .request(
            "POST",
            "/api/questions",
            Some(&token),
            Some(json!({
                "questionText": "short",
                "company": "Amazon",
                "topic": "Arrays",
                "role": "SDE",
                "difficulty": "Medium",
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["questionText"], "Question must be at least 10 characters");
    assert!(body["errors"].get("question_text").is_none());

    let (status, body) = app
        .request("POST", "/api/questions", Some(&token), Some(question("Amazon", "Arrays", "Impossible")))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["difficulty"].is_string());
    Ok(())
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.get(&format!("/api/questions/{}", uuid::Uuid::new_v4())).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Question not found");

    let (status, _) = app.get("/api/questions/not-a-uuid").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn only_owner_or_admin_may_update() -> Result<()> {
    let app = TestApp::new();
    let (alice_id, alice) = app.register("Alice", "alice@example.com").await?;
    let (_, bob) = app.register("Bob", "bob@example.com").await?;
    let admin = app.admin().await?;

    let created = app.create_question(&alice, question("Amazon", "Arrays", "Easy")).await?;
    let uri = format!("/api/questions/{}", created["id"].as_str().unwrap_or_default());
    let edit = json!({
        "questionText": "Find the longest increasing subsequence",
        "topic": "Dynamic Programming",
        "difficulty": "Hard",
        "company": "Hijacked",
        "role": "CEO",
    });

    let (status, body) = app.request("PUT", &uri, Some(&bob), Some(edit.clone())).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to update this question");

    let (status, body) = app.request("PUT", &uri, Some(&admin), Some(edit)).await?;
    assert_eq!(status, StatusCode::OK);
    let updated = &body["data"];
    assert_eq!(updated["topic"], "Dynamic Programming");
    assert_eq!(updated["difficulty"], "Hard");
    assert_eq!(updated["company"], "Amazon");
    assert_eq!(updated["role"], "SDE");
    assert_eq!(updated["submittedBy"]["id"], alice_id.as_str());

    let (status, _) = app
        .request("PUT", &uri, Some(&alice), Some(json!({ "topic": "DP" })))
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn only_owner_or_admin_may_delete() -> Result<()> {
    let app = TestApp::new();
    let (_, alice) = app.register("Alice", "alice@example.com").await?;
    let (_, bob) = app.register("Bob", "bob@example.com").await?;

    let created = app.create_question(&alice, question("Google", "Graphs", "Medium")).await?;
    let uri = format!("/api/questions/{}", created["id"].as_str().unwrap_or_default());

    let (status, _) = app.request("DELETE", &uri, Some(&bob), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.request("DELETE", &uri, Some(&alice), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Question deleted");

    let (status, _) = app.get(&uri).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn ownerless_question_is_admin_only() -> Result<()> {
    use interview_qa_api::database::models::NewQuestion;
    use interview_qa_api::database::QuestionStore;
    use interview_qa_api::types::Difficulty;

    let app = TestApp::new();
    let (_, carol) = app.register("Carol", "carol@example.com").await?;
    let admin = app.admin().await?;

    let anonymous = app
        .store
        .insert_question(NewQuestion {
            question_text: "How would you shard a chat service?".into(),
            company: "Discord".into(),
            topic: "System Design".into(),
            role: "Backend".into(),
            difficulty: Difficulty::Hard,
            submitted_by: None,
        })
        .await?;
    let uri = format!("/api/questions/{}", anonymous.id);

    let (status, body) = app.get(&uri).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["submittedBy"].is_null());

    let (status, _) = app.request("PUT", &uri, Some(&carol), Some(json!({ "topic": "Mine" }))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.request("DELETE", &uri, Some(&carol), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request("DELETE", &uri, Some(&admin), None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn categories_list_distinct_values() -> Result<()> {
    let app = TestApp::new();
    let (_, token) = app.register("Alice", "alice@example.com").await?;
    for (company, topic) in [("Netflix", "Caching"), ("Amazon", "Arrays"), ("Netflix", "Arrays")] {
        app.create_question(&token, question(company, topic, "Easy")).await?;
    }

    let (status, body) = app.get("/api/categories").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["companies"], json!(["Amazon", "Netflix"]));
    assert_eq!(body["data"]["topics"], json!(["Arrays", "Caching"]));
    assert_eq!(body["data"]["roles"], json!(["SDE"]));
    Ok(())
}

#[tokio::test]
async fn service_endpoints_and_unknown_routes() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = app.get("/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app.get("/api/nowhere").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route /api/nowhere not found");
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn wrong_method_gets_error_envelope() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.request("POST", "/api/categories", None, Some(json!({}))).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
    Ok(())
}
