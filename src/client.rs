use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors raised while talking to the speech server.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid server URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("server returned {0}")]
    Status(StatusCode),

    #[error("request task ended without a reply")]
    Aborted,

    #[error("response body is null")]
    NullBody,
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub text: String,
    pub voice: String,
}

/// Parsed answer of `POST /generate`.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateReply {
    Generated {
        audio_url: String,
        filename: String,
        message: String,
    },
    /// Falsy `success`, a non-2xx status, or a success reply missing its audio reference.
    Rejected {
        status: StatusCode,
        error: Option<String>,
    },
}

/// Answer of `GET /model-status`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelStatus {
    pub model_loaded: bool,
    #[serde(default)]
    pub voices_available: usize,
    #[serde(default)]
    pub voices: Vec<String>,
}

#[derive(Deserialize)]
struct VoicesReply {
    voices: Vec<String>,
}

/// JSON truthiness: null, false, 0, "" are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String field of a reply object; absent, non-string or non-object reads as `None`.
fn str_field(reply: &Value, key: &str) -> Option<String> {
    reply.get(key).and_then(Value::as_str).map(String::from)
}

/// Classify a `/generate` body. Any JSON shape is accepted except `null`.
fn interpret_reply(status: StatusCode, body: &str) -> Result<GenerateReply, ClientError> {
    let reply: Value = serde_json::from_str(body)?;
    if reply.is_null() {
        return Err(ClientError::NullBody);
    }

    let error = str_field(&reply, "error").filter(|e| !e.is_empty());
    let success = reply.get("success").map(is_truthy).unwrap_or(false);

    if status.is_success() && success {
        if let (Some(audio_url), Some(filename)) =
            (str_field(&reply, "audio_url"), str_field(&reply, "filename"))
        {
            return Ok(GenerateReply::Generated {
                audio_url,
                filename,
                message: str_field(&reply, "message").unwrap_or_default(),
            });
        }
        log::warn!("Generation reply is missing audio_url or filename");
    }

    Ok(GenerateReply::Rejected { status, error })
}

/// HTTP client bound to one speech server.
#[derive(Debug, Clone)]
pub struct SpeechClient {
    http: reqwest::Client,
    base: Url,
}

impl SpeechClient {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: server_url.to_string(),
            reason,
        };

        // Keep a trailing slash so endpoints join under any base path.
        let mut normalized = server_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base = Url::parse(&normalized).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a base URL".into()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve a server-supplied reference such as `/static/audio/x.wav`.
    pub fn resolve(&self, reference: &str) -> Result<Url, ClientError> {
        self.base.join(reference).map_err(|e| ClientError::InvalidUrl {
            url: reference.to_string(),
            reason: e.to_string(),
        })
    }

    /// `GET /download/{filename}`, with the filename as one path segment.
    pub fn download_url(&self, filename: &str) -> Result<Url, ClientError> {
        let mut url = self.resolve("download/")?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl {
                url: self.base.to_string(),
                reason: "not a base URL".into(),
            })?
            .pop_if_empty()
            .push(filename);
        Ok(url)
    }

    /// Ask the server to synthesize `request.text` with `request.voice`.
    ///
    /// The body is parsed whatever the status code; a server-side `error`
    /// field is kept for both falsy-`success` and non-2xx answers. Only a body
    /// that is not JSON ([`ClientError::Decode`]) or is `null` fails.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateReply, ClientError> {
        let url = self.resolve("generate")?;
        log::info!(
            "POST {url} (text length {}, voice {})",
            request.text.chars().count(),
            request.voice
        );

        let resp = self.http.post(url).json(request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        interpret_reply(status, &body)
    }

    /// `GET /voices`
    pub async fn voices(&self) -> Result<Vec<String>, ClientError> {
        let resp = self.http.get(self.resolve("voices")?).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status(resp.status()));
        }
        let reply: VoicesReply = resp.json().await?;
        Ok(reply.voices)
    }

    /// `GET /model-status`
    pub async fn model_status(&self) -> Result<ModelStatus, ClientError> {
        let resp = self.http.get(self.resolve("model-status")?).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn request(text: &str, voice: &str) -> GenerateRequest {
        GenerateRequest {
            text: text.into(),
            voice: voice.into(),
        }
    }

    #[test]
    fn truthiness_follows_json_semantics() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn resolves_references_against_server() {
        let client = SpeechClient::new("http://localhost:5050").unwrap();
        assert_eq!(
            client.resolve("/static/audio/a.wav").unwrap().as_str(),
            "http://localhost:5050/static/audio/a.wav"
        );
        assert_eq!(
            client.resolve("http://cdn.test/a.wav").unwrap().as_str(),
            "http://cdn.test/a.wav"
        );
    }

    #[test]
    fn download_url_keeps_filename_as_one_segment() {
        let client = SpeechClient::new("http://localhost:5050/tts").unwrap();
        assert_eq!(
            client.download_url("speech_1.wav").unwrap().as_str(),
            "http://localhost:5050/tts/download/speech_1.wav"
        );
        assert_eq!(
            client.download_url("a b.wav").unwrap().as_str(),
            "http://localhost:5050/tts/download/a%20b.wav"
        );
    }

    #[test]
    fn rejects_unusable_server_url() {
        assert!(matches!(
            SpeechClient::new("not a url"),
            Err(ClientError::InvalidUrl { .. })
        ));
        assert!(matches!(
            SpeechClient::new("mailto:someone@example.com"),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn generate_posts_text_and_voice() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/generate")
                    .json_body(json!({"text": "hello", "voice": "expr-voice-3-f"}));
                then.status(200).json_body(json!({
                    "success": true,
                    "audio_url": "/static/audio/a.wav",
                    "filename": "a.wav",
                    "message": "done"
                }));
            })
            .await;

        let client = SpeechClient::new(&server.base_url()).unwrap();
        let reply = client
            .generate(&request("hello", "expr-voice-3-f"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            reply,
            GenerateReply::Generated {
                audio_url: "/static/audio/a.wav".into(),
                filename: "a.wav".into(),
                message: "done".into(),
            }
        );
    }

    #[tokio::test]
    async fn generate_keeps_server_error_on_failure_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/generate");
                then.status(500)
                    .json_body(json!({"error": "model not loaded"}));
            })
            .await;

        let client = SpeechClient::new(&server.base_url()).unwrap();
        let reply = client.generate(&request("hi", "v")).await.unwrap();

        assert_eq!(
            reply,
            GenerateReply::Rejected {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: Some("model not loaded".into()),
            }
        );
    }

    #[tokio::test]
    async fn generate_treats_ok_status_with_falsy_success_as_rejection() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/generate");
                then.status(200).json_body(json!({"success": 0}));
            })
            .await;

        let client = SpeechClient::new(&server.base_url()).unwrap();
        let reply = client.generate(&request("hi", "v")).await.unwrap();

        assert_eq!(
            reply,
            GenerateReply::Rejected {
                status: StatusCode::OK,
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn generate_rejects_success_without_audio_reference() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/generate");
                then.status(200).json_body(json!({"success": true, "message": "?"}));
            })
            .await;

        let client = SpeechClient::new(&server.base_url()).unwrap();
        let reply = client.generate(&request("hi", "v")).await.unwrap();
        assert!(matches!(reply, GenerateReply::Rejected { error: None, .. }));
    }

    #[tokio::test]
    async fn generate_fails_to_decode_non_json_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/generate");
                then.status(502).body("<html>Bad Gateway</html>");
            })
            .await;

        let client = SpeechClient::new(&server.base_url()).unwrap();
        let err = client.generate(&request("hi", "v")).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    async fn generate_against(
        status: u16,
        body: serde_json::Value,
    ) -> Result<GenerateReply, ClientError> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/generate");
                then.status(status).json_body(body);
            })
            .await;

        let client = SpeechClient::new(&server.base_url()).unwrap();
        client.generate(&request("hi", "v")).await
    }

    #[tokio::test]
    async fn generate_treats_structured_error_as_rejection() {
        let body = json!({"success": false, "error": {"detail": "bad voice"}});
        let reply = generate_against(400, body).await.unwrap();
        assert_eq!(
            reply,
            GenerateReply::Rejected {
                status: StatusCode::BAD_REQUEST,
                error: None,
            }
        );

        let reply = generate_against(200, json!({"success": false, "error": 42}))
            .await
            .unwrap();
        assert_eq!(
            reply,
            GenerateReply::Rejected {
                status: StatusCode::OK,
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn generate_treats_non_object_body_as_rejection() {
        let reply = generate_against(200, json!(["speech.wav"])).await.unwrap();
        assert!(matches!(reply, GenerateReply::Rejected { error: None, .. }));

        let reply = generate_against(500, json!("Internal Server Error")).await.unwrap();
        assert!(matches!(
            reply,
            GenerateReply::Rejected {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: None
            }
        ));
    }

    #[tokio::test]
    async fn generate_rejects_non_string_audio_reference() {
        let reply = generate_against(
            200,
            json!({"success": true, "audio_url": 7, "filename": "a.wav", "error": "odd reply"}),
        )
        .await
        .unwrap();
        assert_eq!(
            reply,
            GenerateReply::Rejected {
                status: StatusCode::OK,
                error: Some("odd reply".into()),
            }
        );
    }

    #[tokio::test]
    async fn generate_fails_on_null_body() {
        let err = generate_against(200, json!(null)).await.unwrap_err();
        assert!(matches!(err, ClientError::NullBody));
    }

    #[tokio::test]
    async fn generate_reports_unreachable_server_as_transport_error() {
        // Nothing listens on the discard port.
        let client = SpeechClient::new("http://127.0.0.1:9").unwrap();
        let err = client.generate(&request("hi", "v")).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn fetches_voice_catalog_and_model_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/voices");
                then.status(200)
                    .json_body(json!({"voices": ["expr-voice-2-m", "expr-voice-2-f"]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/model-status");
                then.status(200).json_body(json!({
                    "model_loaded": false,
                    "voices_available": 2,
                    "voices": ["expr-voice-2-m", "expr-voice-2-f"]
                }));
            })
            .await;

        let client = SpeechClient::new(&server.base_url()).unwrap();
        assert_eq!(
            client.voices().await.unwrap(),
            vec!["expr-voice-2-m".to_string(), "expr-voice-2-f".to_string()]
        );

        let status = client.model_status().await.unwrap();
        assert!(!status.model_loaded);
        assert_eq!(status.voices_available, 2);
    }

    #[tokio::test]
    async fn voices_surfaces_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/voices");
                then.status(404);
            })
            .await;

        let client = SpeechClient::new(&server.base_url()).unwrap();
        let err = client.voices().await.unwrap_err();
        assert!(matches!(err, ClientError::Status(StatusCode::NOT_FOUND)));
    }
}
