//! End-to-end tests of the REST API over a temporary image library and
//! database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use tagallery::config::Settings;
use tagallery::models::Image;
use tagallery::server::{create_router, AppState};

struct TestApp {
    app: Router,
    state: AppState,
    settings: Settings,
    _dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::with_data_dir(dir.path().to_path_buf());
        settings.ensure_directories().unwrap();
        settings.create_db_context().init_schema().await.unwrap();

        let state = AppState::new(&settings);
        Self {
            app: create_router(state.clone()),
            state,
            settings,
            _dir: dir,
        }
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }
}

fn files(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|image| image["file"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn autocategorized_filter_returns_matches_in_insertion_order() {
    let test = TestApp::new().await;

    for i in 0..20 {
        let mut image = Image::new(format!("processed/img_{:02}.jpg", i));
        if [1, 10, 17].contains(&i) {
            image.proposed_categories = vec!["Category 1".to_string(), "Category 2".to_string()];
        } else if i % 2 == 0 {
            image.proposed_categories = vec!["Category 1".to_string()];
        }
        test.state.gallery.upsert_image(image).await.unwrap();
    }

    let (status, body) = test
        .get("/image?status=autocategorized&categories=Category+2")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        files(&body),
        vec![
            "processed/img_01.jpg",
            "processed/img_10.jpg",
            "processed/img_17.jpg"
        ]
    );

    // Order and duplicates of the requested names are irrelevant
    let (_, body) = test
        .get("/image?status=autocategorized&categories=Category+2&categories=Category+1&categories=Category+2")
        .await;
    assert_eq!(files(&body).len(), 3);

    // Without categories: everything with any proposed category
    let (_, body) = test.get("/image?status=autocategorized&count=50").await;
    assert_eq!(files(&body).len(), 3 + 9);

    // Cursor resumes after the given stored image
    let (_, body) = test
        .get("/image?status=autocategorized&categories=Category+2&lastImage=processed%2Fimg_01.jpg&count=1")
        .await;
    assert_eq!(files(&body), vec!["processed/img_10.jpg"]);
}

#[tokio::test]
async fn unprocessed_cursor_pages_through_sorted_files() {
    let test = TestApp::new().await;
    let unprocessed = test.settings.image_library().unprocessed_dir();

    // Written in reverse to show sorting does not rely on creation order
    for i in (0..20).rev() {
        std::fs::write(unprocessed.join(format!("photo_{:02}.jpg", i)), b"").unwrap();
    }
    std::fs::create_dir(unprocessed.join("photo_05_dir")).unwrap();

    let (status, body) = test
        .get("/image?status=unprocessed&count=5&lastImage=photo_05.jpg")
        .await;
    assert_eq!(status, StatusCode::OK);
    let expected: Vec<String> = (6..=10)
        .map(|i| format!("unprocessed/photo_{:02}.jpg", i))
        .collect();
    assert_eq!(files(&body), expected);
    assert!(body.as_array().unwrap().iter().all(|image| {
        image["assignedCategories"] == json!([])
            && image["proposedCategories"] == json!([])
            && image["starredCategory"].is_null()
    }));

    let (_, body) = test.get("/image?status=unprocessed&count=3").await;
    assert_eq!(
        files(&body),
        vec![
            "unprocessed/photo_00.jpg",
            "unprocessed/photo_01.jpg",
            "unprocessed/photo_02.jpg"
        ]
    );

    let (_, body) = test
        .get("/image?status=unprocessed&lastImage=missing.jpg")
        .await;
    assert!(files(&body).is_empty());
}

#[tokio::test]
async fn posting_unprocessed_image_moves_file_and_detects_collision() {
    let test = TestApp::new().await;
    let library = test.settings.image_library();
    std::fs::write(library.unprocessed_dir().join("beach.jpg"), b"first").unwrap();

    let (status, body) = test
        .post(
            "/image",
            json!({"file": "unprocessed/beach.jpg", "assignedCategories": ["Sea"]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["file"], "processed/beach.jpg");
    assert!(library.processed_dir().join("beach.jpg").exists());
    assert!(!library.unprocessed_dir().join("beach.jpg").exists());

    std::fs::write(library.unprocessed_dir().join("beach.jpg"), b"second").unwrap();
    let (status, body) = test
        .post("/image", json!({"file": "unprocessed/beach.jpg"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    assert_eq!(
        std::fs::read(library.processed_dir().join("beach.jpg")).unwrap(),
        b"first"
    );
    assert!(library.unprocessed_dir().join("beach.jpg").exists());

    let (_, listed) = test.get("/image?categories=Sea").await;
    assert_eq!(files(&listed), vec!["processed/beach.jpg"]);
}

#[tokio::test]
async fn starred_category_is_added_to_assigned() {
    let test = TestApp::new().await;

    let (status, body) = test
        .post(
            "/image",
            json!({
                "file": "processed/cat.jpg",
                "assignedCategories": ["Animals"],
                "starredCategory": "Cats"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assignedCategories"], json!(["Animals", "Cats"]));

    let (_, listed) = test.get("/image?categories=Cats&starred=Cats").await;
    assert_eq!(files(&listed), vec!["processed/cat.jpg"]);
    assert_eq!(listed[0]["starredCategory"], "Cats");
}

#[tokio::test]
async fn uncategorized_lists_only_untouched_images() {
    let test = TestApp::new().await;

    let images = [
        json!({"file": "processed/a.jpg"}),
        json!({"file": "processed/b.jpg", "proposedCategories": ["X"]}),
        json!({"file": "processed/c.jpg", "assignedCategories": null, "proposedCategories": null}),
        json!({"file": "processed/d.jpg", "starredCategory": "Y"}),
    ];
    for image in images {
        let (status, _) = test.post("/image", image).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = test.get("/image?status=uncategorized").await;
    assert_eq!(files(&body), vec!["processed/a.jpg", "processed/c.jpg"]);
}

#[tokio::test]
async fn invalid_category_id_is_rejected_without_mutation() {
    let test = TestApp::new().await;

    let (status, created) = test
        .post("/category", json!({"name": "Birds", "description": ""}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = test
        .post(
            "/category",
            json!({"id": "zzz", "name": "Fish", "description": "wet"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = test
        .post("/category", json!({"name": "birds", "description": "updated"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);

    let (_, list) = test.get("/category").await;
    assert_eq!(
        list,
        json!([{"id": created["id"], "name": "birds", "description": "updated"}])
    );
}
