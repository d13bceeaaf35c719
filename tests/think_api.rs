//! HTTP integration tests for the submit/poll API.

mod test_helpers;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use eyre::{WrapErr, eyre};
use mockable::DefaultClock;
use reqwest::{Client, StatusCode};
use rstest::rstest;
use serde_json::{Value, json};
use test_helpers::GatedGenerator;
use thinkwell::api;
use thinkwell::invocation::adapters::ScriptedChatModel;
use thinkwell::invocation::domain::{ChatCompletion, ToolCallRequest};
use thinkwell::invocation::services::ToolInvocationLoop;
use thinkwell::job::adapters::InMemoryJobStore;
use thinkwell::job::ports::ReplyGenerator;
use thinkwell::job::services::ThinkService;
use thinkwell::tool_session::adapters::memory::{
    InMemoryToolServerConnector, StaticToolServerRegistry,
};
use thinkwell::tool_session::domain::{
    BackoffPolicy, ToolDescriptor, ToolInputSchema, ToolServerEntry, ToolServerName,
};
use thinkwell::tool_session::services::ToolSessionManager;
use tokio::net::TcpListener;

async fn serve<G>(generator: G) -> eyre::Result<SocketAddr>
where
    G: ReplyGenerator + 'static,
{
    let service = Arc::new(ThinkService::new(
        Arc::new(InMemoryJobStore::new()),
        Arc::new(generator),
        Arc::new(DefaultClock),
    ));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, api::router(service)).await;
    });
    Ok(address)
}

async fn post_think(address: SocketAddr, body: Value) -> eyre::Result<(StatusCode, Value)> {
    let response = Client::new()
        .post(format!("http://{address}/think"))
        .json(&body)
        .send()
        .await
        .wrap_err("request should reach the server")?;
    let status = response.status();
    let payload = response.json::<Value>().await.wrap_err("body should be JSON")?;
    Ok((status, payload))
}

async fn submit(address: SocketAddr, query: &str) -> eyre::Result<String> {
    let (status, body) = post_think(address, json!({"user_query": query, "history": []})).await?;
    assert_eq!(status, StatusCode::ACCEPTED);
    body.get("id")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| eyre!("submission should return an id, got {body}"))
}

async fn poll_until_ready(address: SocketAddr, id: &str) -> eyre::Result<String> {
    for _ in 0..100 {
        let (status, body) = post_think(address, json!({"id": id})).await?;
        assert_eq!(status, StatusCode::OK);
        let reply = body
            .get("reply")
            .and_then(Value::as_str)
            .ok_or_else(|| eyre!("poll should return a reply, got {body}"))?;
        if reply != api::NOT_READY_REPLY {
            return Ok(reply.to_owned());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    Err(eyre!("job {id} never completed"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submit_poll_and_expire() -> eyre::Result<()> {
    let generator = GatedGenerator::answering("Paris");
    let address = serve(generator.clone()).await?;

    let id = submit(address, "capital of France").await?;
    let (status, body) = post_think(address, json!({"id": id})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"reply": "not ready"}));

    generator.release();
    assert_eq!(
        poll_until_ready(address, &id).await?,
        "Paris (capital of France)"
    );

    let (expired_status, expired_body) = post_think(address, json!({"id": id})).await?;
    assert_eq!(expired_status, StatusCode::NOT_FOUND);
    assert_eq!(expired_body, json!({"detail": api::UNKNOWN_JOB_DETAIL}));
    Ok(())
}

#[rstest]
#[case(json!({}))]
#[case(json!({"history": [{"role": "user", "content": "hi"}]}))]
#[tokio::test(flavor = "multi_thread")]
async fn rejects_requests_without_query_or_id(#[case] body: Value) -> eyre::Result<()> {
    let address = serve(GatedGenerator::answering("unused")).await?;
    let (status, payload) = post_think(address, body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload, json!({"detail": api::INVALID_REQUEST_DETAIL}));
    Ok(())
}

#[rstest]
#[case("not-a-uuid")]
#[case("6f1c1f7e-8f7a-4d55-9a44-8d7b7d1f0c2a")]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_ids_are_not_found(#[case] id: &str) -> eyre::Result<()> {
    let address = serve(GatedGenerator::answering("unused")).await?;
    let (status, payload) = post_think(address, json!({"id": id})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload, json!({"detail": api::UNKNOWN_JOB_DETAIL}));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn query_takes_precedence_over_id() -> eyre::Result<()> {
    let address = serve(GatedGenerator::answering("unused")).await?;
    let (status, body) = post_think(
        address,
        json!({"id": "6f1c1f7e-8f7a-4d55-9a44-8d7b7d1f0c2a", "user_query": "hello"}),
    )
    .await?;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body.get("id").is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_endpoint_reports_ok() -> eyre::Result<()> {
    let address = serve(GatedGenerator::answering("unused")).await?;
    let body = Client::new()
        .get(format!("http://{address}/healthz"))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(body, json!({"status": "ok"}));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn answers_through_connected_tools() -> eyre::Result<()> {
    let connector = Arc::new(InMemoryToolServerConnector::new());
    connector.add_server(
        ToolServerName::new("date")?,
        vec![ToolDescriptor::new(
            "now",
            "Current date",
            ToolInputSchema::Absent,
        )?],
    );
    let manager = Arc::new(ToolSessionManager::new(
        Arc::new(StaticToolServerRegistry::new(vec![ToolServerEntry::new(
            "date",
            "http://tools.local/date/mcp",
        )])),
        Arc::clone(&connector),
        Arc::new(DefaultClock),
        BackoffPolicy::new(0, Duration::from_millis(10), Duration::from_millis(10))?,
    ));
    let model = ScriptedChatModel::with_completions([
        ChatCompletion::tool_calls(vec![ToolCallRequest::new(
            Some("call-1".to_owned()),
            "date__now",
            json!({}),
        )]),
        ChatCompletion::text("It is Monday."),
    ]);
    let invocation = ToolInvocationLoop::new(Arc::new(model), Arc::clone(&manager), 5);
    let address = serve(invocation).await?;

    let id = submit(address, "what day is it?").await?;
    let reply = poll_until_ready(address, &id).await?;

    assert!(reply.starts_with("It is Monday.\n\n#Technical details\n\n1 tool calls used"));
    assert_eq!(connector.calls().len(), 1);
    let report = manager.close().await;
    assert!(report.failures().is_empty());
    Ok(())
}
