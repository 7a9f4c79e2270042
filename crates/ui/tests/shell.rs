use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zova::app::ChatShell;
use zova::chat::{CONNECTIVITY_FAILURE_TEXT, Sender, TYPING_TEXT, TerminalView};
use zova_llm::{BackendConfig, create_backend};

type PlainShell = ChatShell<TerminalView<Vec<u8>>>;

fn shell(base_url: &str) -> PlainShell {
    let backend = create_backend(BackendConfig::new(base_url)).expect("backend");
    ChatShell::new(backend, TerminalView::new(Vec::new(), false))
}

fn transcript(shell: PlainShell) -> (Vec<(Sender, Option<String>)>, String) {
    let controller = shell.into_controller();
    let messages = controller
        .conversation()
        .messages()
        .iter()
        .map(|message| (message.sender, message.text.clone()))
        .collect();
    let output = String::from_utf8_lossy(controller.view().writer()).into_owned();
    (messages, output)
}

#[tokio::test]
async fn text_line_round_trips_through_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "hi" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut shell = shell(&server.uri());
    shell.run(&b"  hello  \n"[..]).await;
    assert!(!shell.controller().is_awaiting_reply());

    let (messages, output) = transcript(shell);
    assert_eq!(
        messages,
        vec![
            (Sender::User, Some("hello".to_string())),
            (Sender::Bot, Some("hi".to_string())),
        ]
    );
    assert_eq!(output, format!("you > hello\n{TYPING_TEXT}\nbot > hi\n"));
}

#[tokio::test]
async fn backend_failure_is_shown_as_error_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-text"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .mount(&server)
        .await;

    let mut shell = shell(&server.uri());
    shell.run(&b"hello\n"[..]).await;

    let (messages, _) = transcript(shell);
    assert_eq!(messages[1], (Sender::Bot, Some("Error: boom".to_string())));
}

#[tokio::test]
async fn staged_image_is_uploaded_without_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-image"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "reply": "a cat", "success": true })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("cat.png");
    std::fs::write(&image, b"\x89PNG fake").expect("write image");

    let mut shell = shell(&server.uri());
    let input = format!("/attach {}\n/send\n", image.display());
    shell.run(input.as_bytes()).await;

    let requests = server.received_requests().await.expect("recorded requests");
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("filename=\"cat.png\""));
    assert!(body.contains("name=\"message\""));

    let (messages, output) = transcript(shell);
    assert_eq!(messages[0], (Sender::User, None));
    assert_eq!(messages[1], (Sender::Bot, Some("a cat".to_string())));
    assert!(output.starts_with("staged 🖼️ cat.png\n"));
    assert!(output.contains("📎 cat.png (9 Bytes)"));
}

#[tokio::test]
async fn unreachable_backend_reports_connectivity_failure() {
    let mut shell = shell("http://127.0.0.1:9");
    shell.run(&b"hello\n"[..]).await;

    let (messages, output) = transcript(shell);
    assert_eq!(
        messages[1],
        (Sender::Bot, Some(CONNECTIVITY_FAILURE_TEXT.to_string()))
    );
    assert!(output.ends_with(&format!("bot > {CONNECTIVITY_FAILURE_TEXT}\n")));
}

#[tokio::test]
async fn blank_lines_send_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "hi" })))
        .expect(0)
        .mount(&server)
        .await;

    let mut shell = shell(&server.uri());
    shell.run(&b"\n   \n"[..]).await;

    let (messages, output) = transcript(shell);
    assert!(messages.is_empty());
    assert!(output.is_empty());
}

#[tokio::test]
async fn draft_kept_back_while_busy_is_sent_at_end_of_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "ok" })))
        .expect(2)
        .mount(&server)
        .await;

    let mut shell = shell(&server.uri());
    shell.run(&b"a\nb\n"[..]).await;
    assert!(!shell.controller().is_awaiting_reply());
    assert!(shell.controller().composer().is_empty());

    let (messages, _) = transcript(shell);
    assert_eq!(
        messages,
        vec![
            (Sender::User, Some("a".to_string())),
            (Sender::Bot, Some("ok".to_string())),
            (Sender::User, Some("b".to_string())),
            (Sender::Bot, Some("ok".to_string())),
        ]
    );
}

#[tokio::test]
async fn double_slash_line_is_sent_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-text"))
        .and(body_json(json!({ "message": "/etc/hosts is what?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "a file" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut shell = shell(&server.uri());
    shell.run(&b"//etc/hosts is what?\n"[..]).await;

    let (messages, _) = transcript(shell);
    assert_eq!(messages[0], (Sender::User, Some("/etc/hosts is what?".to_string())));
    assert_eq!(messages[1], (Sender::Bot, Some("a file".to_string())));
}
