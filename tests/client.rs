//! HTTP-level client tests against a mock server
//!
//! Pin the wire behavior of the access layer: envelope parsing, error
//! mapping, retry counts, cache composition and default-parameter merging.

use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use serde_json::json;

use boletines::cache::{ApiCache, TtlTiers};
use boletines::client::{BoletinApi, BoletinClient, NewsApi, NewsClient, RetryPolicy};
use boletines::config::NewsConfig;
use boletines::error::{ApiError, Error};
use boletines::models::{BoletinChanges, NewBoletin, Plazo};

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        initial_delay: Duration::from_millis(1),
    }
}

fn boletin_json(id: i64, estado: &str) -> serde_json::Value {
    json!({
        "id": id,
        "titulo": "Riego",
        "temas": ["Sequía"],
        "plazo": "3_meses",
        "comentarios": "test",
        "estado": estado,
        "fecha_registro": "2026-07-27T12:00:00Z"
    })
}

fn news_config(base_url: &str) -> NewsConfig {
    NewsConfig {
        base_url: base_url.to_string(),
        api_key: Some("test-key".to_string()),
        lang: "es".to_string(),
        countries: "CL,ES,MX,AR,CO,PE".to_string(),
        page_size: 20,
        timeout_secs: 5,
    }
}

// ============================================================================
// Bulletin client
// ============================================================================

#[tokio::test]
async fn test_list_parses_envelope_data() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/boletines")
        .with_status(200)
        .with_body(
            json!({
                "status": "success",
                "data": [{
                    "id": 1,
                    "titulo": "Riego",
                    "temas": ["Sequía"],
                    "fecha": "27/07/2026",
                    "estado": "Registrado"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = BoletinClient::new(server.url(), fast_policy()).unwrap();
    let rows = client.list().await.unwrap();

    mock.assert_async().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].titulo, "Riego");
}

#[tokio::test]
async fn test_not_found_maps_server_message_without_retry() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/boletines/9")
        .expect(1)
        .with_status(404)
        .with_body(
            json!({
                "status": "error",
                "message": "No se encontró un boletín con el ID 9"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = BoletinClient::new(server.url(), fast_policy()).unwrap();
    let err = client.get(9).await.unwrap_err();

    // 404 is not retry-eligible: exactly one request went out
    mock.assert_async().await;
    match err {
        Error::Api(ApiError::NotFound(msg)) => {
            assert_eq!(msg, "No se encontró un boletín con el ID 9")
        }
        other => panic!("expected NotFound, got {}", other),
    }
}

#[tokio::test]
async fn test_server_errors_retried_until_exhaustion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/boletines")
        .expect(3)
        .with_status(500)
        .with_body(json!({ "status": "error", "message": "db down" }).to_string())
        .create_async()
        .await;

    let client = BoletinClient::new(server.url(), fast_policy()).unwrap();
    let err = client.list().await.unwrap_err();

    // max_retries = 2 means three attempts total
    mock.assert_async().await;
    match err {
        Error::RetriesExhausted { attempts, message } => {
            assert_eq!(attempts, 3);
            assert!(message.contains("db down"));
        }
        other => panic!("expected RetriesExhausted, got {}", other),
    }
}

#[tokio::test]
async fn test_create_posts_payload_and_returns_record() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/boletines")
        .match_body(Matcher::PartialJson(json!({
            "titulo": "Riego",
            "temas": ["Sequía"],
            "plazo": "3_meses"
        })))
        .with_status(201)
        .with_body(
            json!({
                "status": "success",
                "message": "Boletín creado correctamente",
                "data": boletin_json(1, "Registrado")
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = BoletinClient::new(server.url(), fast_policy()).unwrap();
    let created = client
        .create(&NewBoletin {
            titulo: "Riego".to_string(),
            temas: vec!["Sequía".to_string()],
            plazo: Plazo::TresMeses,
            comentarios: "test".to_string(),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(created.id, 1);
    assert_eq!(created.estado, "Registrado");
}

#[tokio::test]
async fn test_cached_list_second_call_skips_http() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/boletines")
        .expect(1)
        .with_status(200)
        .with_body(json!({ "status": "success", "data": [] }).to_string())
        .create_async()
        .await;

    let cache = Arc::new(ApiCache::default());
    let client = BoletinClient::new(server.url(), fast_policy())
        .unwrap()
        .with_cache(cache, TtlTiers::default());

    client.list().await.unwrap();
    client.list().await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_mutation_invalidates_cached_reads() {
    let mut server = mockito::Server::new_async().await;
    let list_mock = server
        .mock("GET", "/boletines")
        .expect(2)
        .with_status(200)
        .with_body(json!({ "status": "success", "data": [] }).to_string())
        .create_async()
        .await;
    let update_mock = server
        .mock("PUT", "/boletines/1")
        .with_status(200)
        .with_body(
            json!({
                "status": "success",
                "message": "Boletín actualizado correctamente",
                "data": boletin_json(1, "Completado")
            })
            .to_string(),
        )
        .create_async()
        .await;

    let cache = Arc::new(ApiCache::default());
    let client = BoletinClient::new(server.url(), fast_policy())
        .unwrap()
        .with_cache(cache, TtlTiers::default());

    client.list().await.unwrap();

    let updated = client
        .update(
            1,
            &BoletinChanges {
                estado: Some("Completado".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.estado, "Completado");

    // The update dropped the cached list, so this goes back to the wire
    client.list().await.unwrap();

    list_mock.assert_async().await;
    update_mock.assert_async().await;
}

// ============================================================================
// News client
// ============================================================================

#[tokio::test]
async fn test_search_sends_api_key_and_default_params() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_header("x-api-key", "test-key")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "sequía".into()),
            Matcher::UrlEncoded("lang".into(), "es".into()),
            Matcher::UrlEncoded("countries".into(), "CL,ES,MX,AR,CO,PE".into()),
            Matcher::UrlEncoded("page_size".into(), "20".into()),
        ]))
        .with_status(200)
        .with_body(json!({ "status": "ok", "articles": [] }).to_string())
        .create_async()
        .await;

    let client = NewsClient::new(&news_config(&server.url())).unwrap();
    let response = client.search("sequía", &[]).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.status, "ok");
}

#[tokio::test]
async fn test_search_caller_params_override_defaults() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "riego".into()),
            Matcher::UrlEncoded("lang".into(), "en".into()),
            Matcher::UrlEncoded("page_size".into(), "5".into()),
        ]))
        .with_status(200)
        .with_body(json!({ "status": "ok", "articles": [] }).to_string())
        .create_async()
        .await;

    let client = NewsClient::new(&news_config(&server.url())).unwrap();
    client
        .search("riego", &[("lang", "en"), ("page_size", "5")])
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_surfaces_as_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body("{}")
        .create_async()
        .await;

    let client = NewsClient::new(&news_config(&server.url())).unwrap();
    let err = client.search("x", &[]).await.unwrap_err();

    assert!(matches!(err, Error::Api(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_sources_endpoint_skips_locale_defaults() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/sources")
        .match_query(Matcher::UrlEncoded("topic".into(), "agriculture".into()))
        .with_status(200)
        .with_body(json!({ "sources": ["fao.org", "inia.cl"] }).to_string())
        .create_async()
        .await;

    let client = NewsClient::new(&news_config(&server.url())).unwrap();
    let response = client.sources(&[("topic", "agriculture")]).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.sources.len(), 2);
}
