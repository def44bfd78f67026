//! HTTP client integration tests
//!
//! These tests use wiremock to simulate the chat completions and search APIs,
//! so no real services are needed.

use serde_json::json;
use web_researcher::core::{ChatMessage, Config, ToolCall, ToolDefinition};
use web_researcher::llm::{LLMProvider, OpenAIClient, ToolChoice};
use web_researcher::tools::{TavilySearchTool, Tool};
use web_researcher::{ResearchError, WebResearcher};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(message: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{ "index": 0, "message": message, "finish_reason": "stop" }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
    }))
}

fn route_reply(next: &str) -> ResponseTemplate {
    completion(json!({
        "role": "assistant",
        "content": null,
        "tool_calls": [{
            "id": "call_route",
            "type": "function",
            "function": { "name": "route", "arguments": json!({ "next": next }).to_string() }
        }]
    }))
}

fn route_tool() -> ToolDefinition {
    ToolDefinition::function(
        "route",
        "Select the next role.",
        json!({
            "type": "object",
            "properties": { "next": { "anyOf": [{ "enum": ["FINISH", "Researcher"] }] } },
            "required": ["next"]
        }),
    )
}

// ---------------------------------------------------------------------------
// Chat completions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_chat_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(completion(json!({ "role": "assistant", "content": "Hello!" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAIClient::new(server.uri(), "sk-test").unwrap();
    let response = client
        .chat("gpt-4o-mini", &[ChatMessage::user("Hi")], None)
        .await
        .unwrap();

    assert_eq!(response.content, "Hello!");
    assert!(response.tool_calls.is_empty());
    assert_eq!(response.usage.unwrap().total_tokens, 17);
}

#[tokio::test]
async fn test_forced_route_call_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "tool_choice": { "type": "function", "function": { "name": "route" } }
        })))
        .respond_with(route_reply("Researcher"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAIClient::new(format!("{}/", server.uri()), "sk-test").unwrap();
    let response = client
        .chat_with_tools(
            "gpt-4o-mini",
            &[ChatMessage::system("pick"), ChatMessage::user("question")],
            &[route_tool()],
            ToolChoice::Function("route".into()),
            None,
        )
        .await
        .unwrap();

    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].name, "route");
    assert_eq!(
        response.tool_calls[0].get_string("next").as_deref(),
        Some("Researcher")
    );
}

#[tokio::test]
async fn test_tool_history_is_sent_in_wire_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "user", "content": "question" },
                {
                    "role": "assistant",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "tavily_search_results_json", "arguments": "{\"query\":\"ebikes\"}" }
                    }]
                },
                { "role": "tool", "content": "[]", "tool_call_id": "call_1" }
            ],
            "tool_choice": "auto"
        })))
        .respond_with(completion(json!({ "role": "assistant", "content": "# Report" })))
        .expect(1)
        .mount(&server)
        .await;

    let call = ToolCall::new("call_1", "tavily_search_results_json", json!({ "query": "ebikes" }));
    let client = OpenAIClient::new(server.uri(), "sk-test").unwrap();
    let response = client
        .chat_with_tools(
            "gpt-4o",
            &[
                ChatMessage::user("question"),
                ChatMessage::assistant_tool_calls("", vec![call]),
                ChatMessage::tool_result("call_1", "[]"),
            ],
            &[route_tool()],
            ToolChoice::Auto,
            None,
        )
        .await
        .unwrap();

    assert_eq!(response.content, "# Report");
}

#[tokio::test]
async fn test_api_error_status_is_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let client = OpenAIClient::new(server.uri(), "bad-key").unwrap();
    let err = client
        .chat("gpt-4o", &[ChatMessage::user("Hi")], None)
        .await
        .unwrap_err();

    match err {
        ResearchError::Llm(msg) => {
            assert!(msg.contains("401"));
            assert!(msg.contains("invalid api key"));
        }
        other => panic!("expected an LLM error, got {other}"),
    }
}

#[tokio::test]
async fn test_malformed_arguments_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(json!({
            "role": "assistant",
            "tool_calls": [{
                "id": "call_route",
                "type": "function",
                "function": { "name": "route", "arguments": "{not json" }
            }]
        })))
        .mount(&server)
        .await;

    let client = OpenAIClient::new(server.uri(), "sk-test").unwrap();
    let err = client
        .chat_with_tools(
            "gpt-4o-mini",
            &[ChatMessage::user("q")],
            &[route_tool()],
            ToolChoice::Function("route".into()),
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ResearchError::Llm(_)));
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_search_returns_url_and_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({
            "api_key": "tvly-test",
            "query": "e-bike market Netherlands",
            "max_results": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "e-bike market Netherlands",
            "results": [
                { "title": "E-bikes", "url": "https://example.com/a", "content": "Sales grew", "score": 0.9 },
                { "title": "Cycling", "url": "https://example.com/b", "content": "Dutch market", "score": 0.7 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = TavilySearchTool::new(server.uri(), "tvly-test", 5).unwrap();
    let output = tool
        .execute(&ToolCall::new(
            "call_1",
            tool.name(),
            json!({ "query": "e-bike market Netherlands" }),
        ))
        .await
        .unwrap();

    let hits: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(
        hits,
        json!([
            { "url": "https://example.com/a", "content": "Sales grew" },
            { "url": "https://example.com/b", "content": "Dutch market" }
        ])
    );
}

#[tokio::test]
async fn test_search_error_is_tool_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let tool = TavilySearchTool::new(server.uri(), "tvly-test", 5).unwrap();
    let err = tool
        .execute(&ToolCall::new("call_1", tool.name(), json!({ "query": "q" })))
        .await
        .unwrap_err();

    assert!(matches!(err, ResearchError::Tool(ref msg) if msg.contains("upstream down")));
}

#[tokio::test]
async fn test_search_requires_query() {
    let tool = TavilySearchTool::new("http://127.0.0.1:9", "tvly-test", 5).unwrap();
    let err = tool
        .execute(&ToolCall::new("call_1", tool.name(), json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, ResearchError::Tool(_)));
}

// ---------------------------------------------------------------------------
// Full run against mocked services
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_research_run_against_mock_services() {
    let server = MockServer::start().await;

    let forced_route = json!({
        "tool_choice": { "type": "function", "function": { "name": "route" } }
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(forced_route.clone()))
        .respond_with(route_reply("Researcher"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(forced_route))
        .respond_with(route_reply("FINISH"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "tool_choice": "auto" })))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": "# E-bike market in the Netherlands"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.openai.base_url = server.uri();
    config.openai.api_key = Some("sk-test".into());
    config.search.base_url = server.uri();
    config.search.api_key = Some("tvly-test".into());

    let report = WebResearcher::from_config(&config)
        .unwrap()
        .perform_research("Perform market research on e-bikes in the Netherlands")
        .await
        .unwrap();

    assert_eq!(report, "# E-bike market in the Netherlands");
}
