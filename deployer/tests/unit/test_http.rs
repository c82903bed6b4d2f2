//! HTTP client tests against a local server

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use url::Url;

use render_deployer::app::inputs::Inputs;
use render_deployer::app::options::AppOptions;
use render_deployer::app::run::{run, DeployResult};
use render_deployer::errors::DeployError;
use render_deployer::http::client::HttpClient;
use render_deployer::http::deploys::DeployApi;
use render_deployer::models::deploy::{ClearCache, CreateDeployRequest};

const API_KEY: &str = "rnd_test_key";

/// Requests seen by the server, as `METHOD path auth body`
#[derive(Clone, Default)]
struct Recorder {
    requests: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn push(&self, entry: String) {
        self.requests.lock().unwrap().push(entry);
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn auth(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none")
        .to_string()
}

async fn create_deploy(
    State(recorder): State<Recorder>,
    Path(service_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    recorder.push(format!(
        "POST {} {} {}",
        service_id,
        auth(&headers),
        body
    ));

    match service_id.as_str() {
        "srv-broken" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"id": "internal", "message": "upstream exploded"})),
        ),
        "srv-noid" => (StatusCode::CREATED, Json(json!({"status": "created"}))),
        "srv-ok-but-200" => (StatusCode::OK, Json(json!({"id": "dep-x"}))),
        _ => (
            StatusCode::CREATED,
            Json(json!({"id": "dep-1", "status": "created"})),
        ),
    }
}

async fn retrieve_deploy(
    State(recorder): State<Recorder>,
    Path((service_id, deploy_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let auth = auth(&headers);
    recorder.push(format!("GET {}/{} {}", service_id, deploy_id, auth));

    if auth != format!("Bearer {}", API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "unauthorized"})),
        );
    }
    if service_id == "srv-nostatus" {
        return (StatusCode::OK, Json(json!({"id": deploy_id})));
    }
    (
        StatusCode::OK,
        Json(json!({"id": deploy_id, "status": "live"})),
    )
}

async fn deploy_hook(
    State(recorder): State<Recorder>,
    Path(service_id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    recorder.push(format!(
        "HOOK {} {} key={} img={}",
        service_id,
        auth(&headers),
        query.get("key").map(String::as_str).unwrap_or(""),
        query.get("imgURL").map(String::as_str).unwrap_or("")
    ));

    match service_id.as_str() {
        "srv-missing" => (StatusCode::NOT_FOUND, "Not Found".to_string()),
        "srv-empty" => (StatusCode::OK, "{}".to_string()),
        _ => (
            StatusCode::OK,
            json!({"deploy": {"id": "dep-hook"}}).to_string(),
        ),
    }
}

async fn serve(recorder: Recorder) -> String {
    let app = Router::new()
        .route("/v1/services/{service_id}/deploys", post(create_deploy))
        .route(
            "/v1/services/{service_id}/deploys/{deploy_id}",
            get(retrieve_deploy),
        )
        .route("/deploy/{service_id}", get(deploy_hook))
        .with_state(recorder);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client(base_url: &str) -> HttpClient {
    let key = SecretString::from(API_KEY.to_string());
    HttpClient::with_api_key(base_url, Duration::from_secs(5), &key).unwrap()
}

fn request(image: &str) -> CreateDeployRequest {
    CreateDeployRequest {
        image_url: image.to_string(),
        clear_cache: ClearCache::DoNotClear,
    }
}

#[tokio::test]
async fn test_create_deploy() {
    let recorder = Recorder::default();
    let base_url = serve(recorder.clone()).await;

    let deploy = client(&base_url)
        .create_deploy("srv-1", &request("docker.io/acme/api:1"))
        .await
        .unwrap();

    assert_eq!(deploy.id, "dep-1");
    assert_eq!(deploy.status.as_str(), "created");
    assert_eq!(
        recorder.requests(),
        vec![format!(
            "POST srv-1 Bearer {} {}",
            API_KEY,
            json!({"imageUrl": "docker.io/acme/api:1", "clearCache": "do_not_clear"})
        )]
    );
}

#[tokio::test]
async fn test_create_deploy_server_error() {
    let base_url = serve(Recorder::default()).await;

    let err = client(&base_url)
        .create_deploy("srv-broken", &request("api:1"))
        .await
        .unwrap_err();

    match err {
        DeployError::Trigger { status, message } => {
            assert_eq!(status, Some(500));
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_deploy_requires_created() {
    let base_url = serve(Recorder::default()).await;

    let err = client(&base_url)
        .create_deploy("srv-ok-but-200", &request("api:1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DeployError::Trigger {
            status: Some(200),
            ..
        }
    ));
}

#[tokio::test]
async fn test_create_deploy_without_id() {
    let base_url = serve(Recorder::default()).await;

    let err = client(&base_url)
        .create_deploy("srv-noid", &request("api:1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_create_deploy_transport_failure() {
    let err = client("http://127.0.0.1:1")
        .create_deploy("srv-1", &request("api:1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::Trigger { status: None, .. }));
}

#[tokio::test]
async fn test_trigger_hook_is_unauthenticated() {
    let recorder = Recorder::default();
    let base_url = serve(recorder.clone()).await;
    let hook = Url::parse(&format!("{}/deploy/srv-hook?key=s3cr3t", base_url)).unwrap();

    let deploy = client(&base_url)
        .trigger_hook(&hook, "ghcr.io/acme/api:1.0")
        .await
        .unwrap();

    assert_eq!(deploy.id, "dep-hook");
    assert_eq!(
        recorder.requests(),
        vec!["HOOK srv-hook none key=s3cr3t img=ghcr.io/acme/api:1.0".to_string()]
    );
}

#[tokio::test]
async fn test_trigger_hook_transport_failure_hides_key() {
    let api = HttpClient::new("http://127.0.0.1:1", Duration::from_secs(5)).unwrap();
    let hook = Url::parse("http://127.0.0.1:1/deploy/srv-1?key=TOPSECRET").unwrap();

    let err = api.trigger_hook(&hook, "api:1").await.unwrap_err();

    assert!(matches!(err, DeployError::Trigger { status: None, .. }));
    assert!(!err.to_string().contains("TOPSECRET"), "{}", err);
    assert!(!format!("{:?}", err).contains("TOPSECRET"));
}

#[tokio::test]
async fn test_trigger_hook_failures() {
    let base_url = serve(Recorder::default()).await;
    let api = client(&base_url);

    let hook = Url::parse(&format!("{}/deploy/srv-missing?key=k", base_url)).unwrap();
    let err = api.trigger_hook(&hook, "api:1").await.unwrap_err();
    match err {
        DeployError::Trigger { status, message } => {
            assert_eq!(status, Some(404));
            assert_eq!(message, "Not Found");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let hook = Url::parse(&format!("{}/deploy/srv-empty?key=k", base_url)).unwrap();
    let err = api.trigger_hook(&hook, "api:1").await.unwrap_err();
    assert!(matches!(err, DeployError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_retrieve_deploy() {
    let base_url = serve(Recorder::default()).await;

    let deploy = client(&base_url)
        .retrieve_deploy("srv-1", "dep-1")
        .await
        .unwrap();
    assert_eq!(deploy.id, "dep-1");
    assert!(deploy.status.is_live());
}

#[tokio::test]
async fn test_retrieve_deploy_ids_are_single_segments() {
    let recorder = Recorder::default();
    let base_url = serve(recorder.clone()).await;

    let deploy = client(&base_url)
        .retrieve_deploy("srv-1", "dep/1?x=y")
        .await
        .unwrap();

    assert_eq!(deploy.id, "dep/1?x=y");
    assert_eq!(
        recorder.requests(),
        vec![format!("GET srv-1/dep/1?x=y Bearer {}", API_KEY)]
    );
}

#[tokio::test]
async fn test_retrieve_deploy_without_status() {
    let base_url = serve(Recorder::default()).await;

    let err = client(&base_url)
        .retrieve_deploy("srv-nostatus", "dep-1")
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_retrieve_deploy_unauthorized() {
    let base_url = serve(Recorder::default()).await;
    let anonymous = HttpClient::new(&base_url, Duration::from_secs(5)).unwrap();

    let err = anonymous.retrieve_deploy("srv-1", "dep-1").await.unwrap_err();
    match err {
        DeployError::QueryFailed { status, message } => {
            assert_eq!(status, Some(401));
            assert_eq!(message, "unauthorized");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_run_end_to_end() {
    let recorder = Recorder::default();
    let base_url = serve(recorder.clone()).await;

    let options = AppOptions {
        api_base_url: base_url,
        ..Default::default()
    };
    let inputs = Inputs {
        service_id: Some("srv-1".to_string()),
        render_api_key: Some(API_KEY.to_string()),
        docker_repo_prefix: Some("docker.io/acme".to_string()),
        image_url: Some("api:3".to_string()),
        wait_for_deployment: Some("true".to_string()),
        clear_cache: Some("true".to_string()),
        ..Default::default()
    };

    let result = run(&inputs, &options).await;

    match result {
        DeployResult::Success { deploy } => {
            assert_eq!(deploy.id, "dep-1");
            assert!(deploy.status.is_live());
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let requests = recorder.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].contains(r#""imageUrl":"docker.io/acme/api:3""#));
    assert!(requests[0].contains(r#""clearCache":"clear""#));
    assert_eq!(requests[1], format!("GET srv-1/dep-1 Bearer {}", API_KEY));
}
