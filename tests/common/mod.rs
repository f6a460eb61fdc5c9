use std::net::SocketAddr;
use std::path::PathBuf;

use regex::Regex;
use reqwest::{Client, StatusCode};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use picturebook::config::{Config, CsrfConfig};
use picturebook::state::SharedState;

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub db_name: String,
    pub images_dir: PathBuf,
    pub state: SharedState,
}

/// A browser-like client: keeps cookies, does not follow redirects.
pub struct Browser {
    pub client: Client,
    base: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn browser(&self) -> Browser {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();
        Browser {
            client,
            base: format!("http://{}", self.addr),
        }
    }

    /// New browser with a freshly signed-up account.
    pub async fn signed_up(&self, email: &str, password: &str) -> Browser {
        let browser = self.browser();
        let resp = browser.signup(email, password).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "signup failed");
        browser
    }
}

impl Browser {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed")
    }

    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let resp = self.get(path).await;
        let status = resp.status();
        (status, resp.text().await.unwrap())
    }

    /// Fetch a page carrying forms and pull the CSRF token out of it.
    pub async fn csrf_token(&self) -> String {
        let (_, html) = self.get_text("/signin").await;
        extract_csrf(&html).expect("no csrf token on page")
    }

    /// POST a urlencoded form with a valid CSRF token.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        let token = self.csrf_token().await;
        let mut form: Vec<(&str, &str)> = vec![("csrf_token", token.as_str())];
        form.extend_from_slice(fields);
        self.client
            .post(self.url(path))
            .form(&form)
            .send()
            .await
            .expect("post request failed")
    }

    pub async fn signup(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_form("/users", &[("email", email), ("password", password)])
            .await
    }

    pub async fn signin(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_form("/signin", &[("email", email), ("password", password)])
            .await
    }

    /// Create a gallery and return its id.
    pub async fn create_gallery(&self, title: &str) -> String {
        let resp = self.post_form("/galleries", &[("title", title)]).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "create gallery failed");
        let location = location(&resp);
        location
            .strip_prefix("/galleries/")
            .and_then(|rest| rest.strip_suffix("/edit"))
            .expect("unexpected redirect after create")
            .to_string()
    }

    pub async fn upload(&self, gallery_id: &str, filename: &str, bytes: &[u8]) -> reqwest::Response {
        self.upload_many(gallery_id, &[(filename, bytes)]).await
    }

    /// Upload several files in one multipart request.
    pub async fn upload_many(&self, gallery_id: &str, files: &[(&str, &[u8])]) -> reqwest::Response {
        let token = self.csrf_token().await;
        let mut form = reqwest::multipart::Form::new().text("csrf_token", token);
        for (filename, bytes) in files {
            let part = reqwest::multipart::Part::bytes(bytes.to_vec())
                .file_name(filename.to_string())
                .mime_str("application/octet-stream")
                .unwrap();
            form = form.part("images", part);
        }
        self.client
            .post(self.url(&format!("/galleries/{gallery_id}/images")))
            .multipart(form)
            .send()
            .await
            .expect("upload request failed")
    }
}

pub fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get("location")
        .expect("missing location header")
        .to_str()
        .unwrap()
        .to_string()
}

pub fn extract_csrf(html: &str) -> Option<String> {
    let re = Regex::new(r#"name="csrf_token" value="([^"]+)""#).unwrap();
    re.captures(html).map(|c| c[1].to_string())
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!(
        "picturebook_test_{}",
        Uuid::now_v7().to_string().replace('-', "")
    );

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let images_dir = std::env::temp_dir().join(&db_name);

    let config = Config {
        database_url: test_url,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:0".to_string(),
        csrf: CsrfConfig {
            key: "test-csrf-key-that-is-long-enough-0123".to_string(),
            secure: false,
        },
        max_body_size: 10 * 1024 * 1024,
        images_dir: images_dir.clone(),
        reset_ttl_minutes: 60,
        log_level: "warn".to_string(),
        smtp: None,
    };

    let (app, state) = picturebook::build_app(pool.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        pool,
        db_name,
        images_dir,
        state,
    }
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Drop the test database and image directory after a test completes.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;
    let _ = tokio::fs::remove_dir_all(&app.images_dir).await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
