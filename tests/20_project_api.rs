mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use common::{project_id, spawn_app};

#[tokio::test]
async fn list_requires_login() -> Result<()> {
    let app = spawn_app().await?;

    let res = app
        .client
        .get(app.url("/project/list?sort=name&order=asc"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn list_clamps_limit_and_offset() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.user("ada@example.org", "ada").await?;
    for i in 0..105 {
        app.create_project(&token, &format!("project {:03}", i), "private").await?;
    }

    let body: Value = app.list(&token, "sort=name&order=asc&limit=500").await?.json().await?;
    assert_eq!(body["rows"].as_array().unwrap().len(), 100);
    assert_eq!(body["total"], 105);

    let negative: Value = app.list(&token, "sort=name&order=asc&limit=10&offset=-5").await?.json().await?;
    let zero: Value = app.list(&token, "sort=name&order=asc&limit=10&offset=0").await?.json().await?;
    assert_eq!(negative["rows"], zero["rows"]);
    assert_eq!(zero["rows"][0]["name"], "project 000");

    Ok(())
}

#[tokio::test]
async fn list_only_shows_own_projects_without_code() -> Result<()> {
    let app = spawn_app().await?;
    let ada = app.user("ada@example.org", "ada").await?;
    let bob = app.user("bob@example.org", "bob").await?;
    app.create_project(&ada, "blink", "private").await?;
    app.create_project(&bob, "servo", "shared").await?;

    let body: Value = app.list(&ada, "sort=modified&order=desc").await?.json().await?;
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "blink");
    assert!(rows[0].get("code").is_none());

    Ok(())
}

#[tokio::test]
async fn list_rejects_bad_sort_parameters() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.user("ada@example.org", "ada").await?;

    for query in ["sort=password&order=asc", "sort=name&order=sideways", "order=asc", "sort=name"] {
        let res = app.list(&token, query).await?;
        assert_eq!(res.status(), StatusCode::NOT_ACCEPTABLE, "query {}", query);
    }

    Ok(())
}

#[tokio::test]
async fn get_checks_existence_then_ownership() -> Result<()> {
    let app = spawn_app().await?;
    let ada = app.user("ada@example.org", "ada").await?;
    let bob = app.user("bob@example.org", "bob").await?;
    let id = project_id(&app.create_project(&ada, "blink", "shared").await?);

    let res = app.client.get(app.url(&format!("/project/get/{}", id))).bearer_auth(&ada).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["name"], "blink");
    assert_eq!(body["yours"], true);

    let res = app.client.get(app.url(&format!("/project/get/{}", id))).bearer_auth(&bob).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.client.get(app.url(&format!("/project/get/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.client.get(app.url("/project/get/999999")).bearer_auth(&ada).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn save_code_updates_instead_of_duplicating() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.user("ada@example.org", "ada").await?;
    let id = project_id(&app.create_project(&token, "blink", "private").await?);

    for version in ["<xml>1</xml>", "<xml>2</xml>"] {
        let res = app
            .client
            .post(app.url("/project/code"))
            .bearer_auth(&token)
            .form(&[("id", id.to_string().as_str()), ("code", version)])
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await?;
        assert_eq!(body["id"], id);
        assert_eq!(body["success"], true);
        assert_eq!(body["new-project"], false);
    }

    let body: Value = app.list(&token, "sort=name&order=asc").await?.json().await?;
    assert_eq!(body["total"], 1);

    let project: Value = app
        .client
        .get(app.url(&format!("/project/get/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(project["code"], "<xml>2</xml>");

    Ok(())
}

#[tokio::test]
async fn save_code_edge_cases() -> Result<()> {
    let app = spawn_app().await?;
    let ada = app.user("ada@example.org", "ada").await?;
    let bob = app.user("bob@example.org", "bob").await?;
    let private = project_id(&app.create_project(&ada, "secret", "private").await?);
    let shared = project_id(&app.create_project(&ada, "demo", "shared").await?);

    let post = |token: &str, id: String| {
        app.client
            .post(app.url("/project/code"))
            .bearer_auth(token)
            .form(&[("id", id), ("code", "<xml/>".to_string())])
            .send()
    };

    assert_eq!(post(&bob, private.to_string()).await?.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(post(&ada, "424242".to_string()).await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(post(&ada, "abc".to_string()).await?.status(), StatusCode::NOT_ACCEPTABLE);

    let res = post(&bob, shared.to_string()).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let fork: Value = res.json().await?;
    assert_eq!(fork["new-project"], true);
    assert_eq!(fork["based-on"], shared);
    assert_ne!(project_id(&fork), shared);

    let anonymous = app
        .client
        .post(app.url("/project/code"))
        .form(&[("id", shared.to_string()), ("code", "x".to_string())])
        .send()
        .await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn save_without_code_keeps_stored_code() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.user("ada@example.org", "ada").await?;
    let id = project_id(&app.create_project(&token, "blink", "private").await?);

    let res = app
        .client
        .post(app.url("/project/code"))
        .bearer_auth(&token)
        .form(&[("id", id.to_string()), ("code", "<xml>precious</xml>".to_string())])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .client
        .post(app.url("/project/code"))
        .bearer_auth(&token)
        .form(&[("id", id.to_string())])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_ACCEPTABLE);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "NOT_ACCEPTABLE");

    let res = app
        .client
        .post(app.url("/project/code-as"))
        .bearer_auth(&token)
        .form(&[("id", id.to_string()), ("name", "copy".to_string()), ("board", "flip".to_string())])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_ACCEPTABLE);

    let project: Value = app
        .client
        .get(app.url(&format!("/project/get/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(project["code"], "<xml>precious</xml>");

    let body: Value = app.list(&token, "sort=name&order=asc").await?.json().await?;
    assert_eq!(body["total"], 1);

    Ok(())
}

#[tokio::test]
async fn non_numeric_parameters_get_json_errors() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.user("ada@example.org", "ada").await?;

    for query in ["sort=name&order=asc&limit=ten", "sort=name&order=asc&offset=first"] {
        let res = app.list(&token, query).await?;
        assert_eq!(res.status(), StatusCode::NOT_ACCEPTABLE, "query {}", query);
        let body: Value = res.json().await?;
        assert_eq!(body["error"], true);
    }

    let res = app.client.get(app.url("/project/get/abc")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_ACCEPTABLE);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "NOT_ACCEPTABLE");

    Ok(())
}

#[tokio::test]
async fn save_code_as_creates_a_copy() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.user("ada@example.org", "ada").await?;
    let id = project_id(&app.create_project(&token, "blink", "private").await?);

    let res = app
        .client
        .post(app.url("/project/code-as"))
        .bearer_auth(&token)
        .form(&[
            ("id", id.to_string().as_str()),
            ("code", "<xml>copy</xml>"),
            ("name", "blink copy"),
            ("board", "flip"),
        ])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["new-project"], true);
    assert_eq!(body["name"], "blink copy");
    assert_eq!(body["board"], "flip");
    assert_eq!(body["based-on"], id);

    let list: Value = app.list(&token, "sort=name&order=asc").await?.json().await?;
    assert_eq!(list["total"], 2);

    Ok(())
}

#[tokio::test]
async fn save_project_updates_metadata_and_validates_type() -> Result<()> {
    let app = spawn_app().await?;
    let ada = app.user("ada@example.org", "ada").await?;
    let bob = app.user("bob@example.org", "bob").await?;
    let id = project_id(&app.create_project(&ada, "blink", "private").await?).to_string();

    let update = |token: &str, project_type: &'static str| {
        app.client
            .post(app.url("/project/"))
            .bearer_auth(token)
            .form(&[
                ("id", id.as_str()),
                ("name", "blink fast"),
                ("sharing", "SHARED"),
                ("type", project_type),
                ("board", "activity-board"),
            ])
            .send()
    };

    let res = update(&ada, "spin").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["new-project"], false);
    assert_eq!(body["name"], "blink fast");
    assert_eq!(body["type"], "SPIN");
    assert_eq!(body["shared"], true);
    assert_eq!(body["private"], false);

    assert_eq!(update(&ada, "python").await?.status(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(update(&bob, "propc").await?.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
