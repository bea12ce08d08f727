//! HTTP client for the chat service

use async_stream::stream;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    credentials::{ACCESS_TOKEN_KEY, CredentialStore, USER_INFO_KEY},
    error::{Error, Result},
    stream::{ResponseEventStream, StreamEvent, StreamSession, body_events},
    types::{
        ChatHistory, ChatIdResponse, ChatRequest, ChatSummary, DEFAULT_DEVICE, ErrorBody,
        Feedback, HistoryMessage, RegisterRequest, StreamRequest, TokenResponse, UserChats,
        UserInfo,
    },
};

/// Client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root, e.g. "http://localhost:8000"
    pub base_url: String,
    /// Device tag sent with streaming requests
    pub device: String,
    /// Whole-request timeout for non-streaming calls
    pub timeout: Option<Duration>,
    /// Longest pause between reads; the only limit on a streamed reply
    pub read_timeout: Option<Duration>,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            device: DEFAULT_DEVICE.to_string(),
            timeout: Some(Duration::from_secs(120)),
            read_timeout: Some(Duration::from_secs(120)),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

/// Chat service client
pub struct ChatClient {
    client: reqwest::Client,
    config: ClientConfig,
    credentials: Arc<dyn CredentialStore>,
}

impl ChatClient {
    /// Create a new client
    pub fn new(config: ClientConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(Error::InvalidConfig(format!(
                "base URL must start with http:// or https://, got {:?}",
                config.base_url
            )));
        }

        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(read_timeout) = config.read_timeout {
            builder = builder.read_timeout(read_timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Attach the bearer token when one is stored
    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials.get(ACCESS_TOKEN_KEY) {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        }
    }

    /// Apply the whole-request timeout. Streamed replies skip this and are
    /// bounded only by the read timeout.
    fn bounded(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .bounded(self.authorized(self.client.get(self.url(path))))
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Stream a reply to `query` as delta events.
    ///
    /// The returned stream always ends with exactly one `Done` or `Failed`.
    /// A non-success status produces `Failed` without any deltas. The reply
    /// may take as long as it keeps sending; only a stall longer than
    /// `read_timeout` fails it.
    pub fn stream_events(&self, query: &str, conversation_id: Option<&str>) -> ResponseEventStream {
        let request = StreamRequest::new(query)
            .with_chat_id(conversation_id.map(str::to_string))
            .with_device(&self.config.device);
        let session = StreamSession::new(query, request.chat_id.clone());
        let builder = self
            .authorized(self.client.post(self.url("/chat/stream")))
            .json(&request);

        Box::pin(stream! {
            tracing::debug!("Opening stream (chat_id: {:?})", session.conversation_id());

            let response = match builder.send().await {
                Ok(response) => response,
                Err(e) => {
                    let error = Error::from(e);
                    tracing::warn!("Stream request failed: {}", error);
                    yield StreamEvent::Failed { error };
                    return;
                }
            };

            let response = match check_status(response).await {
                Ok(response) => response,
                Err(error) => {
                    tracing::warn!("Stream rejected: {}", error);
                    yield StreamEvent::Failed { error };
                    return;
                }
            };

            let mut events = Box::pin(body_events(session, response.bytes_stream()));
            while let Some(event) = events.next().await {
                yield event;
            }
        })
    }

    /// Stream a reply to `query`, reporting progress through callbacks.
    ///
    /// `on_delta` receives each newly arrived, non-empty piece of text.
    /// `on_complete` fires exactly once: with the full text on success, or
    /// with an empty string on failure, after which the error is returned.
    pub async fn stream_chat<D, C>(
        &self,
        query: &str,
        conversation_id: Option<&str>,
        mut on_delta: D,
        on_complete: C,
    ) -> Result<String>
    where
        D: FnMut(&str),
        C: FnOnce(&str),
    {
        let mut events = self.stream_events(query, conversation_id);

        while let Some(event) = events.next().await {
            match event {
                StreamEvent::Delta { delta } => on_delta(&delta),
                StreamEvent::Done { text } => {
                    on_complete(&text);
                    return Ok(text);
                }
                StreamEvent::Failed { error } => {
                    on_complete("");
                    return Err(error);
                }
            }
        }

        on_complete("");
        Err(Error::UnexpectedResponse(
            "stream ended without completing".to_string(),
        ))
    }

    /// Send a message and wait for the whole reply (`POST /chat`)
    pub async fn send_message(
        &self,
        query: &str,
        chat_id: Option<&str>,
    ) -> Result<serde_json::Value> {
        let request = ChatRequest {
            query: query.to_string(),
            chat_id: chat_id.map(str::to_string),
        };
        let response = self
            .bounded(self.authorized(self.client.post(self.url("/chat"))))
            .json(&request)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Prior messages of a conversation
    pub async fn chat_history(&self, chat_id: &str) -> Result<Vec<HistoryMessage>> {
        let history: ChatHistory = self
            .get_json(&format!("/api/chat-history/{}", chat_id))
            .await?;
        Ok(history.messages)
    }

    /// Ask the server for a fresh conversation id
    pub async fn new_conversation_id(&self) -> Result<String> {
        let response: ChatIdResponse = self.get_json("/idmobile").await?;
        if response.chat_id.is_empty() {
            return Err(Error::UnexpectedResponse(
                "server returned an empty chat id".to_string(),
            ));
        }
        Ok(response.chat_id)
    }

    /// The signed-in user's conversations
    pub async fn user_chats(&self) -> Result<Vec<ChatSummary>> {
        let chats: UserChats = self.get_json("/api/user-chats").await?;
        if !chats.success {
            return Err(Error::UnexpectedResponse(
                chats
                    .error
                    .unwrap_or_else(|| "Failed to load chats".to_string()),
            ));
        }
        Ok(chats.chats)
    }

    /// Rate an answer
    pub async fn submit_feedback(&self, feedback: &Feedback) -> Result<serde_json::Value> {
        let response = self
            .bounded(self.authorized(self.client.post(self.url("/api/feedback"))))
            .json(feedback)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Exchange email and password for a bearer token and cache the profile.
    ///
    /// When `/auth/me` is unavailable a basic profile is derived from the
    /// email address.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserInfo> {
        let response = self
            .bounded(self.client.post(self.url("/auth/token")))
            .form(&[("username", email), ("password", password)])
            .send()
            .await?;
        let token: TokenResponse = check_status(response).await?.json().await?;

        if token.access_token.is_empty() {
            return Err(Error::Auth("server returned an empty access token".to_string()));
        }
        self.credentials.set(ACCESS_TOKEN_KEY, &token.access_token)?;

        let info = match self.fetch_profile().await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!("Failed to fetch user profile: {}", e);
                UserInfo::from_email(email)
            }
        };
        self.save_user_info(&info)?;

        Ok(info)
    }

    async fn fetch_profile(&self) -> Result<UserInfo> {
        self.get_json("/auth/me").await
    }

    /// Create an account (`POST /register`)
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<serde_json::Value> {
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        let response = self
            .bounded(self.client.post(self.url("/register")))
            .json(&request)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Forget the token and cached profile
    pub fn logout(&self) -> Result<()> {
        self.credentials.remove(ACCESS_TOKEN_KEY)?;
        self.credentials.remove(USER_INFO_KEY)?;
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.credentials
            .get(ACCESS_TOKEN_KEY)
            .is_some_and(|token| !token.is_empty())
    }

    /// Cached user profile
    pub fn user_info(&self) -> Option<UserInfo> {
        let raw = self.credentials.get(USER_INFO_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!("Ignoring malformed cached user info: {}", e);
                None
            }
        }
    }

    fn save_user_info(&self, info: &UserInfo) -> Result<()> {
        let raw = serde_json::to_string(info)?;
        self.credentials.set(USER_INFO_KEY, &raw)?;
        Ok(())
    }
}

/// Turn a non-success response into `Error::Server`, keeping its detail
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::server(status.as_u16(), ErrorBody::detail_from(&body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Accept connections and answer each with the next canned response.
    /// Resolves to the raw requests that were received.
    async fn serve(responses: Vec<String>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut socket).await);
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
            requests
        });
        (format!("http://{}", addr), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut tmp = [0u8; 4096];
        loop {
            let n = socket.read(&mut tmp).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&tmp[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn chunked(parts: &[&str]) -> String {
        let mut out = String::from(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
        );
        for part in parts {
            out.push_str(&format!("{:x}\r\n{}\r\n", part.len(), part));
        }
        out.push_str("0\r\n\r\n");
        out
    }

    fn json_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    fn client(base_url: &str, store: Arc<MemoryCredentialStore>) -> ChatClient {
        let config = ClientConfig::default()
            .with_base_url(base_url)
            .with_timeout(Some(Duration::from_secs(5)));
        ChatClient::new(config, store).unwrap()
    }

    #[test]
    fn test_rejects_base_url_without_scheme() {
        let config = ClientConfig::default().with_base_url("localhost:8000");
        let result = ChatClient::new(config, Arc::new(MemoryCredentialStore::new()));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_stream_chat_delivers_full_text() {
        let (base_url, server) = serve(vec![chunked(&["Hi", " there", "!"])]).await;
        let store = Arc::new(MemoryCredentialStore::with_token("tok-1"));
        let client = client(&base_url, store);

        let mut deltas = Vec::new();
        let mut completions = Vec::new();
        let text = client
            .stream_chat(
                "hello",
                Some("c-1"),
                |d| deltas.push(d.to_string()),
                |full| completions.push(full.to_string()),
            )
            .await
            .unwrap();

        assert_eq!(text, "Hi there!");
        assert!(deltas.iter().all(|d| !d.is_empty()));
        assert_eq!(deltas.concat(), "Hi there!");
        assert_eq!(completions, vec!["Hi there!".to_string()]);

        let requests = server.await.unwrap();
        let request = requests[0].to_lowercase();
        assert!(request.starts_with("post /chat/stream "));
        assert!(request.contains("authorization: bearer tok-1"));
        assert!(requests[0].contains(r#""query":"hello""#));
        assert!(requests[0].contains(r#""chat_id":"c-1""#));
        assert!(requests[0].contains(r#""device":"mobile""#));
    }

    #[tokio::test]
    async fn test_stream_without_token_has_no_auth_header() {
        let (base_url, server) = serve(vec![chunked(&["ok"])]).await;
        let client = client(&base_url, Arc::new(MemoryCredentialStore::new()));

        client
            .stream_chat("hello", None, |_| {}, |_| {})
            .await
            .unwrap();

        let requests = server.await.unwrap();
        assert!(!requests[0].to_lowercase().contains("authorization:"));
        assert!(!requests[0].contains("chat_id"));
    }

    #[tokio::test]
    async fn test_stream_empty_body_completes_with_empty_text() {
        let (base_url, _server) = serve(vec![chunked(&[])]).await;
        let client = client(&base_url, Arc::new(MemoryCredentialStore::new()));

        let mut delta_count = 0;
        let mut completions = Vec::new();
        let text = client
            .stream_chat(
                "hello",
                None,
                |_| delta_count += 1,
                |full| completions.push(full.to_string()),
            )
            .await
            .unwrap();

        assert_eq!(text, "");
        assert_eq!(delta_count, 0);
        assert_eq!(completions, vec![String::new()]);
    }

    #[tokio::test]
    async fn test_stream_server_error() {
        let (base_url, _server) = serve(vec![json_response(
            "500 Internal Server Error",
            r#"{"detail":"model unavailable"}"#,
        )])
        .await;
        let client = client(&base_url, Arc::new(MemoryCredentialStore::new()));

        let mut delta_count = 0;
        let mut completions = Vec::new();
        let err = client
            .stream_chat(
                "hello",
                None,
                |_| delta_count += 1,
                |full| completions.push(full.to_string()),
            )
            .await
            .unwrap_err();

        assert_eq!(delta_count, 0);
        assert_eq!(completions, vec![String::new()]);
        match err {
            Error::Server { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail.as_deref(), Some("model unavailable"));
            }
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stream_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(
            &format!("http://{}", addr),
            Arc::new(MemoryCredentialStore::new()),
        );

        let mut completions = Vec::new();
        let err = client
            .stream_chat("hello", None, |_| {}, |full| completions.push(full.to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network(_)), "got {:?}", err);
        assert_eq!(completions, vec![String::new()]);
    }

    #[tokio::test]
    async fn test_stream_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let config = ClientConfig::default()
            .with_base_url(format!("http://{}", addr))
            .with_read_timeout(Some(Duration::from_millis(200)));
        let client = ChatClient::new(config, Arc::new(MemoryCredentialStore::new())).unwrap();

        let mut completions = Vec::new();
        let err = client
            .stream_chat("hello", None, |_| {}, |full| completions.push(full.to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout), "got {:?}", err);
        assert_eq!(completions, vec![String::new()]);
    }

    #[tokio::test]
    async fn test_slow_stream_outlives_request_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            for _ in 0..8 {
                tokio::time::sleep(Duration::from_millis(100)).await;
                socket.write_all(b"2\r\nab\r\n").await.unwrap();
            }
            socket.write_all(b"0\r\n\r\n").await.unwrap();
            let _ = socket.shutdown().await;
        });

        let config = ClientConfig::default()
            .with_base_url(format!("http://{}", addr))
            .with_timeout(Some(Duration::from_millis(300)))
            .with_read_timeout(Some(Duration::from_millis(300)));
        let client = ChatClient::new(config, Arc::new(MemoryCredentialStore::new())).unwrap();

        let mut deltas = String::new();
        let text = client
            .stream_chat("hello", None, |d| deltas.push_str(d), |_| {})
            .await
            .unwrap();

        assert_eq!(text, "ab".repeat(8));
        assert_eq!(deltas, text);
    }

    #[tokio::test]
    async fn test_send_message() {
        let (base_url, server) = serve(vec![
            json_response("200 OK", r#"{"response":"Salom!"}"#),
            json_response("200 OK", r#"{"response":"Yana salom"}"#),
        ])
        .await;
        let client = client(&base_url, Arc::new(MemoryCredentialStore::with_token("tok-2")));

        let reply = client.send_message("hi", Some("c-5")).await.unwrap();
        assert_eq!(reply["response"], "Salom!");
        let reply = client.send_message("again", None).await.unwrap();
        assert_eq!(reply["response"], "Yana salom");

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /chat "));
        assert!(requests[0].to_lowercase().contains("authorization: bearer tok-2"));
        assert!(requests[0].contains(r#"{"query":"hi","chat_id":"c-5"}"#));
        assert!(requests[1].starts_with("POST /chat "));
        assert!(requests[1].contains(r#"{"query":"again"}"#));
        assert!(!requests[1].contains("chat_id"));
    }

    #[tokio::test]
    async fn test_login_stores_token_and_profile() {
        let (base_url, server) = serve(vec![
            json_response("200 OK", r#"{"access_token":"tok-9","token_type":"bearer"}"#),
            json_response("200 OK", r#"{"id":"7","name":"Aziza","email":"aziza@example.com"}"#),
        ])
        .await;
        let store = Arc::new(MemoryCredentialStore::new());
        let client = client(&base_url, store.clone());

        let info = client.login("aziza@example.com", "pw").await.unwrap();
        assert_eq!(info.name, "Aziza");
        assert!(client.is_logged_in());
        assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("tok-9"));
        assert_eq!(client.user_info(), Some(info));

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /auth/token "));
        assert!(requests[0].contains("username=aziza%40example.com&password=pw"));
        assert!(requests[1].starts_with("GET /auth/me "));
        assert!(requests[1].to_lowercase().contains("authorization: bearer tok-9"));
    }

    #[tokio::test]
    async fn test_login_falls_back_to_email_profile() {
        let (base_url, _server) = serve(vec![
            json_response("200 OK", r#"{"access_token":"tok-9"}"#),
            json_response("404 Not Found", r#"{"detail":"Not Found"}"#),
        ])
        .await;
        let client = client(&base_url, Arc::new(MemoryCredentialStore::new()));

        let info = client.login("bobur@example.com", "pw").await.unwrap();
        assert_eq!(info, UserInfo::from_email("bobur@example.com"));
        assert_eq!(client.user_info(), Some(info));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let (base_url, _server) = serve(vec![json_response(
            "401 Unauthorized",
            r#"{"detail":"Incorrect username or password"}"#,
        )])
        .await;
        let client = client(&base_url, Arc::new(MemoryCredentialStore::new()));

        let err = client.login("a@b.c", "wrong").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.detail(), Some("Incorrect username or password"));
        assert!(!client.is_logged_in());
    }

    #[test]
    fn test_logout_clears_credentials() {
        let store = Arc::new(MemoryCredentialStore::with_token("tok"));
        store.set(USER_INFO_KEY, r#"{"name":"a","email":"a@b.c"}"#).unwrap();
        let client = client("http://localhost:1", store.clone());

        assert!(client.is_logged_in());
        assert!(client.user_info().is_some());
        client.logout().unwrap();
        assert!(!client.is_logged_in());
        assert!(client.user_info().is_none());
    }

    #[tokio::test]
    async fn test_history_and_listing_endpoints() {
        let (base_url, server) = serve(vec![
            json_response("200 OK", r#"{"chat_id":"new-chat"}"#),
            json_response(
                "200 OK",
                r#"{"messages":[{"role":"user","content":"hi"},{"role":"assistant","text":"hello"}]}"#,
            ),
            json_response(
                "200 OK",
                r#"{"success":true,"chats":[{"id":"c1","name":"First","created_at":"2024-01-01T00:00:00"}]}"#,
            ),
        ])
        .await;
        let client = client(&base_url, Arc::new(MemoryCredentialStore::new()));

        assert_eq!(client.new_conversation_id().await.unwrap(), "new-chat");

        let history = client.chat_history("new-chat").await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].is_user());
        assert_eq!(history[1].body(), "hello");

        let chats = client.user_chats().await.unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].title(), "First");

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /idmobile "));
        assert!(requests[1].starts_with("GET /api/chat-history/new-chat "));
        assert!(requests[2].starts_with("GET /api/user-chats "));
    }

    #[tokio::test]
    async fn test_user_chats_unsuccessful() {
        let (base_url, _server) = serve(vec![json_response(
            "200 OK",
            r#"{"success":false,"error":"Login required"}"#,
        )])
        .await;
        let client = client(&base_url, Arc::new(MemoryCredentialStore::new()));

        let err = client.user_chats().await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(ref m) if m == "Login required"));
    }
}
