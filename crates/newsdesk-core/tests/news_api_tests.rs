//! News API tests
//!
//! Cover login, envelope handling and the local response cache on top of the
//! interceptor pipeline.

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use newsdesk_core::models::{NewNews, NewsUpdate};
use newsdesk_core::{
    CacheManager, ClientConfig, ErrorKind, HttpClient, MemoryNotifier, NewsApi, NewsQuery,
    SessionContext, SessionData,
};

struct Harness {
    server: MockServer,
    session: SessionContext,
    notifier: MemoryNotifier,
    api: NewsApi,
    _cache_dir: TempDir,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let session = SessionContext::new();
    let notifier = MemoryNotifier::new();
    let config = ClientConfig::default().with_base_url(server.uri());
    let http = HttpClient::new(config, session.clone(), Arc::new(notifier.clone()))
        .expect("Failed to build client");

    let cache_dir = TempDir::new().unwrap();
    let cache = CacheManager::new(cache_dir.path().to_path_buf()).unwrap();
    let api = NewsApi::new(http).with_cache(cache);

    Harness {
        server,
        session,
        notifier,
        api,
        _cache_dir: cache_dir,
    }
}

fn news_page() -> serde_json::Value {
    json!({
        "code": 200,
        "data": {
            "list": [
                {"id": 1, "title": "Campus opens", "content": "...", "category_id": 1,
                 "publish_time": "2024-03-01T08:30:00"},
                {"id": 2, "title": "Library hours", "content": "...", "category_id": 1,
                 "author": "admin", "publish_time": null}
            ],
            "total": 2
        },
        "from_cache": false
    })
}

#[tokio::test]
async fn test_login_stores_token_and_attaches_it() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .and(body_json(json!({"username": "alice", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "message": "ok", "data": {"token": "abc123"}
        })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/news/list"))
        .and(header("Authorization", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_page()))
        .expect(1)
        .mount(&h.server)
        .await;

    let data = h.api.login("alice", "secret").await.expect("login should succeed");
    assert_eq!(data.token, "abc123");
    assert_eq!(h.session.token().as_deref(), Some("abc123"));

    let page = h.api.list_news(NewsQuery::default(), false).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.list[1].author.as_deref(), Some("admin"));
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_failed_login_stays_anonymous() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "bad password"})),
        )
        .mount(&h.server)
        .await;

    let err = h.api.login("alice", "wrong").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthExpired);
    assert!(!h.session.is_authenticated());
    assert_eq!(h.notifier.messages().len(), 1);
}

#[tokio::test]
async fn test_envelope_error_code_is_classified() {
    let h = harness().await;
    h.session.login(SessionData::new("abc123", "alice")).unwrap();
    Mock::given(method("GET"))
        .and(path("/api/news/detail"))
        .and(query_param("id", "99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 404, "message": "新闻不存在"
        })))
        .mount(&h.server)
        .await;

    let err = h.api.news_detail(99, true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(h.notifier.messages(), vec!["requested resource not found"]);
    assert!(h.session.is_authenticated());
}

#[tokio::test]
async fn test_envelope_401_logs_out() {
    let h = harness().await;
    h.session.login(SessionData::new("abc123", "alice")).unwrap();
    Mock::given(method("GET"))
        .and(path("/api/news/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 401, "message": "token expired"
        })))
        .mount(&h.server)
        .await;

    let err = h.api.categories(false).await.unwrap_err();
    assert!(err.is_auth_expired());
    assert!(!h.session.is_authenticated());
    assert_eq!(h.notifier.messages(), vec!["session expired, please log in again"]);
}

#[tokio::test]
async fn test_envelope_other_code_shows_server_message() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/news/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 400, "message": "分类不存在"
        })))
        .mount(&h.server)
        .await;

    let news = NewNews {
        title: "t".to_string(),
        content: "c".to_string(),
        category_id: 42,
        author: None,
    };
    let err = h.api.add_news(&news).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OtherHttp);
    assert_eq!(h.notifier.messages(), vec!["分类不存在"]);
}

#[tokio::test]
async fn test_missing_data_is_invalid_response() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/news/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200})))
        .mount(&h.server)
        .await;

    let err = h.api.list_news(NewsQuery::default(), false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    assert_eq!(h.notifier.messages().len(), 1);
}

#[tokio::test]
async fn test_list_is_cached_until_delete() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/news/list"))
        .and(query_param("category_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_page()))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/news/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "message": "删除成功"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let query = NewsQuery::default();
    let first = h.api.list_news(query, true).await.unwrap();
    let second = h.api.list_news(query, true).await.unwrap();
    assert_eq!(first, second);

    h.api.delete_news(2).await.unwrap();
    h.api.list_news(query, true).await.unwrap();

    h.server.verify().await;
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_no_cache_always_hits_server() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/news/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_page()))
        .expect(2)
        .mount(&h.server)
        .await;

    h.api.list_news(NewsQuery::default(), false).await.unwrap();
    h.api.list_news(NewsQuery::default(), false).await.unwrap();
    h.server.verify().await;
}

#[tokio::test]
async fn test_add_invalidates_only_its_category() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/news/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_page()))
        .expect(3)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/news/add"))
        .and(body_json(json!({"title": "New", "content": "Body", "category_id": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "message": "创建成功", "data": {"id": 3}
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let cat1 = NewsQuery::default();
    let cat2 = NewsQuery {
        category_id: 2,
        ..cat1
    };
    h.api.list_news(cat1, true).await.unwrap();
    h.api.list_news(cat2, true).await.unwrap();

    let created = h
        .api
        .add_news(&NewNews {
            title: "New".to_string(),
            content: "Body".to_string(),
            category_id: 1,
            author: None,
        })
        .await
        .unwrap();
    assert_eq!(created.id, 3);

    // Category 1 refetches, category 2 is still cached
    h.api.list_news(cat1, true).await.unwrap();
    h.api.list_news(cat2, true).await.unwrap();
    h.server.verify().await;
}

#[tokio::test]
async fn test_update_sends_only_set_fields() {
    let h = harness().await;
    Mock::given(method("PUT"))
        .and(path("/api/news/7"))
        .and(body_json(json!({"title": "Renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "message": "更新成功"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let update = NewsUpdate {
        title: Some("Renamed".to_string()),
        ..Default::default()
    };
    h.api.update_news(7, &update).await.unwrap();
    h.server.verify().await;
}

#[tokio::test]
async fn test_logout_drops_token() {
    let h = harness().await;
    h.session.login(SessionData::new("abc123", "alice")).unwrap();
    Mock::given(method("GET"))
        .and(path("/api/news/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "data": [{"id": 1, "name": "校园新闻"}]
        })))
        .mount(&h.server)
        .await;

    h.api.logout().unwrap();
    let categories = h.api.categories(false).await.unwrap();
    assert_eq!(categories[0].name, "校园新闻");

    let requests = h.server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_envelope_without_code_is_success() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/news/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 2, "name": "通知公告"}]
        })))
        .mount(&h.server)
        .await;

    let categories = h.api.categories(false).await.unwrap();
    assert_eq!(categories[0].id, 2);
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_clear_server_cache_sends_pattern() {
    let h = harness().await;
    h.session.login(SessionData::new("abc123", "admin")).unwrap();
    Mock::given(method("POST"))
        .and(path("/api/cache/clear"))
        .and(query_param("pattern", "news:*"))
        .and(header("Authorization", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "message": "已清除 3 个缓存", "pattern": "news:*"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let summary = h.api.clear_server_cache("news:*").await.unwrap();
    assert_eq!(summary, "已清除 3 个缓存");
    assert!(h.notifier.messages().is_empty());
    h.server.verify().await;
}

#[tokio::test]
async fn test_clear_server_cache_failure_shows_server_error() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/cache/clear"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 500, "message": "清除缓存失败: timeout"
        })))
        .mount(&h.server)
        .await;

    let err = h.api.clear_server_cache("*").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerError);
    assert_eq!(h.notifier.messages(), vec!["server error, please try again later"]);
}

#[tokio::test]
async fn test_cache_status_connected() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/cache/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "status": "connected",
            "redis_version": "7.2.4",
            "used_memory": "1.02M",
            "connected_clients": 3
        })))
        .mount(&h.server)
        .await;

    let status = h.api.cache_status().await.unwrap();
    assert!(status.is_connected());
    assert_eq!(status.used_memory.as_deref(), Some("1.02M"));
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_cache_status_disconnected_is_reported_once() {
    let h = harness().await;
    h.session.login(SessionData::new("abc123", "admin")).unwrap();
    Mock::given(method("GET"))
        .and(path("/api/cache/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 500, "status": "disconnected", "error": "Connection refused"
        })))
        .mount(&h.server)
        .await;

    let err = h.api.cache_status().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerError);
    assert_eq!(h.notifier.messages(), vec!["server error, please try again later"]);
    assert!(h.session.is_authenticated());
}
