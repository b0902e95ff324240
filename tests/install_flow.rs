mod common;

use axum::http::{StatusCode, header};
use sqlx::Row;

use common::{body_string, config_in, cookie_pair, get, installer, post_form, post_form_with};
use tracklet::config::MAIN_CONNECTION;
use tracklet::db::{BackendConfig, ConnectionRegistry};
use tracklet::install::artifact;

const DB_FORM: &str = "type=sqlite&path=test.db&prefix=tracklet_";
const ADMIN_FORM: &str = "username=admin&name=Site+Admin&password=secret&email=admin%40example.com";

async fn scalar(registry: &ConnectionRegistry, sql: &str) -> i64 {
    let conn = registry.require(MAIN_CONNECTION).expect("main open");
    let row = sqlx::query(sql)
        .fetch_one(conn.pool())
        .await
        .expect("query");
    row.try_get::<i64, _>(0).expect("integer column")
}

async fn text(registry: &ConnectionRegistry, sql: &str) -> String {
    let conn = registry.require(MAIN_CONNECTION).expect("main open");
    let row = sqlx::query(sql)
        .fetch_one(conn.pool())
        .await
        .expect("query");
    row.try_get::<String, _>(0).expect("text column")
}

#[tokio::test]
async fn sqlite_install_writes_artifact_and_seeds_accounts() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("config")).expect("config dir");
    let cfg = config_in(dir.path());
    let artifact_file = cfg.install.artifact_file();
    let app = installer(cfg.clone());

    let resp = get(&app, "/", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("License Agreement"));

    let resp = post_form(&app, "/step/1", "", None).await;
    assert!(body_string(resp).await.contains("Step 1 - Database Details"));

    let resp = post_form(&app, "/step/2", DB_FORM, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let session = cookie_pair(&resp, "tracklet_install").expect("install session cookie");
    assert!(body_string(resp).await.contains("Step 2 - Admin Account"));

    let resp = post_form(&app, "/step/3", ADMIN_FORM, Some(&session)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_string(resp).await;
    assert!(page.contains("Installation complete"), "{page}");

    let content = std::fs::read_to_string(&artifact_file).expect("artifact written");
    assert!(content.contains(r#"driver = "sqlx""#));
    assert!(content.contains(r#"type = "sqlite""#));
    assert!(content.contains("$APP_ROOT/test.db"));

    let db = artifact::load(&artifact_file, dir.path()).expect("artifact parses");
    let BackendConfig::Sqlite { path } = &db.backend else {
        panic!("expected a sqlite artifact, got {db:?}");
    };
    assert!(path.ends_with("test.db"));
    assert_eq!(path, &dir.path().join("test.db"));

    let mut registry = ConnectionRegistry::new(1);
    registry.open(&db, MAIN_CONNECTION).await.expect("open installed db");
    assert_eq!(scalar(&registry, "SELECT COUNT(*) FROM tracklet_users").await, 2);
    assert_eq!(scalar(&registry, "SELECT COUNT(*) FROM tracklet_settings").await, 4);
    assert_eq!(
        scalar(&registry, "SELECT COUNT(*) FROM tracklet_users WHERE username = 'admin' AND group_id = 1").await,
        1
    );

    let conn = registry.require(MAIN_CONNECTION).expect("main open");
    let row = sqlx::query("SELECT value FROM tracklet_settings WHERE setting = 'notification_from_email'")
        .fetch_one(conn.pool())
        .await
        .expect("notification setting");
    // No Host header was sent.
    assert_eq!(row.try_get::<String, _>("value").expect("value"), "noreply@localhost");
}

#[tokio::test]
async fn installer_halts_once_artifact_exists() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = config_in(dir.path());
    std::fs::create_dir_all(dir.path().join("config")).expect("config dir");
    std::fs::write(cfg.install.artifact_file(), "# existing\n").expect("write artifact");
    let app = installer(cfg.clone());

    for (method, uri) in [("GET", "/"), ("POST", "/step/1"), ("POST", "/step/2"), ("POST", "/step/3")] {
        let resp = if method == "GET" {
            get(&app, uri, None).await
        } else {
            post_form(&app, uri, DB_FORM, None).await
        };
        assert_eq!(resp.status(), StatusCode::CONFLICT, "{method} {uri}");
        assert!(body_string(resp).await.contains("Config file already exists."));
    }
    assert!(!dir.path().join("test.db").exists());
    assert_eq!(
        std::fs::read_to_string(cfg.install.artifact_file()).expect("artifact"),
        "# existing\n"
    );
}

#[tokio::test]
async fn missing_database_fields_are_reported_by_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = installer(config_in(dir.path()));

    let resp = post_form(&app, "/step/2", "type=mysql&host=db.local", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(cookie_pair(&resp, "tracklet_install").is_none());
    let page = body_string(resp).await;
    assert!(page.contains("Step 1 - Database Details"));
    assert!(page.contains(r#"<li data-field="username">username is missing</li>"#));
    assert!(page.contains(r#"<li data-field="database">database is missing</li>"#));
    assert!(!page.contains(r#"data-field="host""#));

    let resp = post_form(&app, "/step/2", "type=oracle", None).await;
    assert!(body_string(resp).await.contains(r#"<li data-field="type">type is invalid</li>"#));
}

#[tokio::test]
async fn final_step_requires_the_install_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = installer(config_in(dir.path()));

    let resp = post_form(&app, "/step/3", ADMIN_FORM, None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // A cookie sealed with another key is as good as none.
    let other = installer(config_in(dir.path()));
    let resp = post_form(&other, "/step/2", DB_FORM, None).await;
    let foreign = cookie_pair(&resp, "tracklet_install").expect("cookie");
    let resp = post_form(&app, "/step/3", ADMIN_FORM, Some(&foreign)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(!dir.path().join("test.db").exists());
}

#[tokio::test]
async fn incomplete_admin_form_keeps_the_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = installer(config_in(dir.path()));

    let resp = post_form(&app, "/step/2", DB_FORM, None).await;
    let session = cookie_pair(&resp, "tracklet_install").expect("cookie");

    let resp = post_form(&app, "/step/3", "username=admin&name=Admin", Some(&session)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(cookie_pair(&resp, "tracklet_install").is_none());
    let page = body_string(resp).await;
    assert!(page.contains("Step 2 - Admin Account"));
    assert!(page.contains(r#"data-field="password""#));
    assert!(page.contains(r#"data-field="email""#));
    assert!(!dir.path().join("test.db").exists());
}

#[tokio::test]
async fn unwritable_artifact_is_shown_for_manual_placement() {
    let dir = tempfile::tempdir().expect("tempdir");
    // No config/ directory, so the artifact cannot be written.
    let cfg = config_in(dir.path());
    let app = installer(cfg.clone());

    let resp = post_form(&app, "/step/2", DB_FORM, None).await;
    let session = cookie_pair(&resp, "tracklet_install").expect("cookie");
    let resp = post_form(&app, "/step/3", ADMIN_FORM, Some(&session)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_string(resp).await;
    assert!(page.contains("Config File"));
    assert!(page.contains(r#"<pre id="config_code">"#));
    assert!(page.contains("$APP_ROOT/test.db"));
    assert!(!cfg.install.artifact_file().exists());
    assert!(dir.path().join("test.db").exists());
}

#[tokio::test]
async fn failing_statement_rolls_back_and_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("config")).expect("config dir");
    let script = dir.path().join("broken.sql");
    std::fs::write(
        &script,
        "CREATE TABLE tracklet_settings (setting varchar(191) PRIMARY KEY, value text);\n\
         CREATE TABLE tracklet_broken (id integer,, oops);\n",
    )
    .expect("write script");

    let mut cfg = config_in(dir.path());
    cfg.install.sql_path = Some(script);
    let app = installer(cfg.clone());

    let resp = post_form(&app, "/step/2", DB_FORM, None).await;
    let session = cookie_pair(&resp, "tracklet_install").expect("cookie");
    let resp = post_form(&app, "/step/3", ADMIN_FORM, Some(&session)).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let page = body_string(resp).await;
    assert!(page.contains("The following SQL query failed"));
    assert!(page.contains("CREATE TABLE tracklet_broken"));
    assert!(!cfg.install.artifact_file().exists());

    let db = common::sqlite_connection(&cfg, "test.db");
    let mut registry = ConnectionRegistry::new(1);
    registry.open(&db, MAIN_CONNECTION).await.expect("open");
    let conn = registry.require(MAIN_CONNECTION).expect("main open");
    let tables = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' AND name LIKE 'tracklet_%'")
        .fetch_all(conn.pool())
        .await
        .expect("list tables");
    assert!(tables.is_empty());
}

#[tokio::test]
async fn seeded_addresses_use_the_request_host_without_port() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = config_in(dir.path());
    let app = installer(cfg.clone());

    let resp = post_form(&app, "/step/2", DB_FORM, None).await;
    let session = cookie_pair(&resp, "tracklet_install").expect("cookie");
    let resp = post_form_with(
        &app,
        "/step/3",
        ADMIN_FORM,
        &[
            (header::COOKIE, session.as_str()),
            (header::HOST, "tracker.example:8080"),
        ],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let db = common::sqlite_connection(&cfg, "test.db");
    let mut registry = ConnectionRegistry::new(1);
    registry.open(&db, MAIN_CONNECTION).await.expect("open");

    assert_eq!(
        text(&registry, "SELECT value FROM tracklet_settings WHERE setting = 'notification_from_email'").await,
        "noreply@tracker.example"
    );
    let email = text(&registry, "SELECT email FROM tracklet_users WHERE username = 'Anonymous'").await;
    let (local, domain) = email.split_once('@').expect("address");
    assert_eq!(domain, "tracker.example");
    let tag = local.strip_prefix("anonymous.").expect("anonymous. prefix");
    assert_eq!(tag.len(), 8);
    assert!(tag.chars().all(|c| c.is_ascii_hexdigit()), "{email}");
}

#[tokio::test]
async fn sqlite_file_names_with_url_characters_are_kept() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("config")).expect("config dir");
    let cfg = config_in(dir.path());
    let app = installer(cfg.clone());

    let resp = post_form(&app, "/step/2", "type=sqlite&path=my%3Fdb+%2541%23.db&prefix=tl_", None).await;
    let session = cookie_pair(&resp, "tracklet_install").expect("cookie");
    let resp = post_form(&app, "/step/3", ADMIN_FORM, Some(&session)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("Installation complete"));

    let mut files: Vec<String> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".db"))
        .collect();
    files.sort();
    assert_eq!(files, vec!["my?db %41#.db".to_string()]);

    let db = artifact::load(&cfg.install.artifact_file(), dir.path()).expect("artifact parses");
    assert_eq!(
        db.backend,
        BackendConfig::Sqlite {
            path: dir.path().join("my?db %41#.db")
        }
    );
}

#[tokio::test]
async fn existing_install_check_reads_without_creating() {
    let dir = tempfile::tempdir().expect("tempdir");
    // No config/ directory: the artifact is never written, so the installer stays open.
    let mut cfg = config_in(dir.path());
    cfg.install.check_existing_install = true;
    let app = installer(cfg);

    let resp = post_form(&app, "/step/2", "type=sqlite&path=fresh.db&prefix=tracklet_", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("Step 2 - Admin Account"));
    assert!(!dir.path().join("fresh.db").exists());

    let resp = post_form(&app, "/step/2", DB_FORM, None).await;
    let session = cookie_pair(&resp, "tracklet_install").expect("cookie");
    let resp = post_form(&app, "/step/3", ADMIN_FORM, Some(&session)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(dir.path().join("test.db").exists());

    let resp = post_form(&app, "/step/2", DB_FORM, None).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert!(cookie_pair(&resp, "tracklet_install").is_none());
    assert!(body_string(resp).await.contains("Tracklet is already installed."));

    let resp = post_form(&app, "/step/2", "type=sqlite&path=test.db&prefix=other_", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(cookie_pair(&resp, "tracklet_install").is_some());
}

#[tokio::test]
async fn admin_named_like_the_anonymous_user_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = installer(config_in(dir.path()));

    let resp = post_form(&app, "/step/2", DB_FORM, None).await;
    let session = cookie_pair(&resp, "tracklet_install").expect("cookie");
    let resp = post_form(
        &app,
        "/step/3",
        "username=anonymous&name=Admin&password=x&email=a%40b.com",
        Some(&session),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_string(resp).await;
    assert!(page.contains(r#"<li data-field="username">username is invalid</li>"#), "{page}");
    assert!(!dir.path().join("test.db").exists());
}
