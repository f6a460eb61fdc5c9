mod common;

use reqwest::StatusCode;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0";

#[tokio::test]
async fn gallery_pages_require_sign_in() {
    let app = common::spawn_app().await;
    let browser = app.browser();

    for path in ["/galleries", "/galleries/new"] {
        let resp = browser.get(path).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(common::location(&resp), "/signin");
    }

    common::cleanup(app).await;
}

#[tokio::test]
async fn create_list_show_update_delete() {
    let app = common::spawn_app().await;
    let browser = app.signed_up("bob@example.com", "password123").await;

    let id = browser.create_gallery("Summer Trip").await;

    let (status, index) = browser.get_text("/galleries").await;
    assert_eq!(status, StatusCode::OK);
    assert!(index.contains("Summer Trip"));

    let (status, edit) = browser.get_text(&format!("/galleries/{id}/edit")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(edit.contains(r#"value="Summer Trip""#));

    let resp = browser
        .post_form(&format!("/galleries/{id}"), &[("title", "Winter Trip")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    // Public page, no sign-in needed.
    let (status, show) = app.browser().get_text(&format!("/galleries/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(show.contains("Winter Trip"));

    let resp = browser
        .post_form(&format!("/galleries/{id}/delete"), &[])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&resp), "/galleries");

    let (status, _) = app.browser().get_text(&format!("/galleries/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn blank_title_rerenders_form() {
    let app = common::spawn_app().await;
    let browser = app.signed_up("bob@example.com", "password123").await;

    let resp = browser.post_form("/galleries", &[("title", "   ")]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.text().await.unwrap().contains("Title is required"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn other_users_cannot_edit() {
    let app = common::spawn_app().await;
    let owner = app.signed_up("bob@example.com", "password123").await;
    let intruder = app.signed_up("eve@example.com", "password123").await;

    let id = owner.create_gallery("Private").await;

    let resp = intruder.get(&format!("/galleries/{id}/edit")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = intruder
        .post_form(&format!("/galleries/{id}"), &[("title", "Hacked")])
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = intruder
        .post_form(&format!("/galleries/{id}/delete"), &[])
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = intruder.upload(&id, "cat.png", PNG).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Intruder's own index doesn't list it.
    let (_, index) = intruder.get_text("/galleries").await;
    assert!(!index.contains("Private"));

    let (_, show) = app.browser().get_text(&format!("/galleries/{id}")).await;
    assert!(show.contains("Private"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn unknown_gallery_is_not_found() {
    let app = common::spawn_app().await;
    let browser = app.signed_up("bob@example.com", "password123").await;
    let missing = uuid::Uuid::now_v7();

    let resp = browser.get(&format!("/galleries/{missing}/edit")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Ids that are not UUIDs name no gallery either.
    for path in [
        "/galleries/123",
        "/galleries/123/edit",
        "/galleries/123/images/a.png",
    ] {
        let (status, body) = browser.get_text(path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert!(!body.contains("UUID"), "{path}");
    }
    let resp = browser
        .post_form("/galleries/123", &[("title", "Renamed")])
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn upload_serve_and_delete_image() {
    let app = common::spawn_app().await;
    let browser = app.signed_up("bob@example.com", "password123").await;
    let id = browser.create_gallery("Pets").await;

    let resp = browser.upload(&id, "my cat.png", PNG).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&resp), format!("/galleries/{id}/edit"));

    // Stored under a sanitized name inside the gallery directory.
    let stored = app.images_dir.join(format!("gallery-{id}")).join("my-cat.png");
    assert!(stored.exists());

    let (_, show) = app.browser().get_text(&format!("/galleries/{id}")).await;
    assert!(show.contains(&format!("/galleries/{id}/images/my-cat.png")));

    let resp = app
        .browser()
        .get(&format!("/galleries/{id}/images/my-cat.png"))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "image/png");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), PNG);

    let resp = browser
        .post_form(&format!("/galleries/{id}/images/my-cat.png/delete"), &[])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(!stored.exists());

    let resp = app
        .browser()
        .get(&format!("/galleries/{id}/images/my-cat.png"))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn upload_rejects_non_images() {
    let app = common::spawn_app().await;
    let browser = app.signed_up("bob@example.com", "password123").await;
    let id = browser.create_gallery("Docs").await;

    let resp = browser.upload(&id, "notes.txt", b"hello").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = browser.upload(&id, "fake.png", b"<svg></svg>").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .browser()
        .get(&format!("/galleries/{id}/images/fake.png"))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn deleting_gallery_removes_images() {
    let app = common::spawn_app().await;
    let browser = app.signed_up("bob@example.com", "password123").await;
    let id = browser.create_gallery("Temp").await;
    browser.upload(&id, "a.png", PNG).await;

    let dir = app.images_dir.join(format!("gallery-{id}"));
    assert!(dir.exists());

    browser
        .post_form(&format!("/galleries/{id}/delete"), &[])
        .await;
    assert!(!dir.exists());

    common::cleanup(app).await;
}

#[tokio::test]
async fn bad_file_in_batch_stores_nothing() {
    let app = common::spawn_app().await;
    let browser = app.signed_up("bob@example.com", "password123").await;
    let id = browser.create_gallery("Mixed").await;

    let resp = browser
        .upload_many(&id, &[("good.png", PNG), ("bad.png", b"<svg></svg>")])
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Edit your gallery"));
    assert!(body.contains("Invalid file contents for bad.png"));

    let dir = app.images_dir.join(format!("gallery-{id}"));
    assert!(!dir.join("good.png").exists());

    common::cleanup(app).await;
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = common::spawn_app().await;
    let browser = app.signed_up("bob@example.com", "password123").await;
    let id = browser.create_gallery("Huge").await;

    let mut big = PNG.to_vec();
    big.resize(11 * 1024 * 1024, 0);
    let resp = browser.upload(&id, "big.png", &big).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let dir = app.images_dir.join(format!("gallery-{id}"));
    assert!(!dir.join("big.png").exists());

    common::cleanup(app).await;
}
