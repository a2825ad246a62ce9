//! Client for the language model that turns freeform text into a bit.
//!
//! The model is given a single `create_bit` tool and forced to call it, so a
//! well-formed reply always carries the bit as the tool's input.
use log::{debug, error, info};
use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::{json, Value};

use crate::{BitDraft, BitError, Config, Result};

pub const TOOL_NAME: &str = "create_bit";
const API_VERSION: &str = "2023-06-01";

/// Asks the messages API to structure text into a [`BitDraft`]
pub struct Structurer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl Structurer {
    pub fn new(api_key: String, config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    /// Sends `text` to the model and returns the bit it produced
    pub async fn structure(&self, text: &str) -> Result<BitDraft> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = request_body(&self.model, self.max_tokens, text);
        info!("Requesting structured bit from {} ({})", url, self.model);

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Messages API returned {}", status);
            return Err(BitError::StructuringFailed {
                message: format!("API returned {}: {}", status, body),
            });
        }

        let reply: Value = resp.json().await?;
        debug!("Messages API reply: {}", reply);
        draft_from_reply(&reply)
    }
}

/// JSON schema of the `create_bit` tool
pub fn tool_definition() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": "Create a structured bit object from freeform text",
        "input_schema": {
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "A concise, descriptive title for the bit (not too long)"
                },
                "url": {
                    "type": "string",
                    "description": "The URL mentioned in the text, or empty if there is none."
                },
                "content": {
                    "type": "string",
                    "description": "The user's commentary or description. May be empty when the title says it all."
                },
                "tags": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "A few short tags, lowercase and hyphenated when multi-word"
                },
                "via": {
                    "type": "string",
                    "description": "Where the link was found (e.g. 'Hacker News'), or empty if not mentioned."
                }
            },
            "required": ["title"]
        }
    })
}

/// Full request body for one structuring call
pub fn request_body(model: &str, max_tokens: u32, text: &str) -> Value {
    let prompt = format!(
        "Turn the following freeform text into a bit, a short link-blog entry.\n\
         Extract or write:\n\
         - a concise title\n\
         - the URL, if there is one\n\
         - any commentary or thoughts, as content\n\
         - a few relevant tags\n\
         - the source (via), if one is mentioned\n\
         \n\
         Text:\n{}",
        text
    );

    json!({
        "model": model,
        "max_tokens": max_tokens,
        "tools": [tool_definition()],
        "tool_choice": { "type": "tool", "name": TOOL_NAME },
        "messages": [
            { "role": "user", "content": prompt }
        ]
    })
}

/// Pulls the bit out of the first `tool_use` block of a reply
pub fn draft_from_reply(reply: &Value) -> Result<BitDraft> {
    let input = reply
        .get("content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|block| block.get("type").and_then(Value::as_str) == Some("tool_use"))
        .and_then(|block| block.get("input"))
        .ok_or_else(|| BitError::StructuringFailed {
            message: "the model did not return structured output".to_string(),
        })?;

    BitDraft::from_value(input.clone()).map_err(|e| BitError::StructuringFailed {
        message: format!("the model returned an unusable bit: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io::{Read, Write},
        net::TcpListener,
        thread,
    };

    /// Answers exactly one HTTP request with `status` and a JSON `body`,
    /// returning the base URL to point a [`Structurer`] at
    fn serve_once(status: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            // Read the whole request so the client never sees a reset
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let len = head
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + len {
                        break;
                    }
                }
            }

            stream.write_all(response.as_bytes()).unwrap();
        });

        format!("http://{}", addr)
    }

    fn structurer_at(base_url: String) -> Structurer {
        let config = Config {
            api_base_url: base_url,
            ..Config::default()
        };
        Structurer::new("sk-test".to_string(), &config)
    }

    #[test]
    fn request_forces_the_tool() {
        let body = request_body("claude-test", 512, "a link https://x.dev");
        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(body["tool_choice"]["type"], "tool");
        assert_eq!(body["tool_choice"]["name"], TOOL_NAME);
        assert_eq!(body["tools"][0]["name"], TOOL_NAME);
        assert_eq!(body["tools"][0]["input_schema"]["required"], json!(["title"]));

        let prompt = body["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.ends_with("Text:\na link https://x.dev"));
    }

    #[test]
    fn schema_lists_every_field() {
        let tool = tool_definition();
        let properties = tool["input_schema"]["properties"].as_object().unwrap();
        for key in ["title", "url", "content", "tags", "via"] {
            assert!(properties.contains_key(key), "missing {key}");
        }
        assert_eq!(properties["tags"]["type"], "array");
    }

    #[test]
    fn reply_tool_input_becomes_draft() {
        let reply = json!({
            "id": "msg_01",
            "type": "message",
            "content": [
                { "type": "text", "text": "Sure." },
                {
                    "type": "tool_use",
                    "id": "toolu_01",
                    "name": "create_bit",
                    "input": {
                        "title": "Example",
                        "url": "http://x",
                        "tags": ["a"]
                    }
                }
            ],
            "stop_reason": "tool_use"
        });

        let draft = draft_from_reply(&reply).unwrap();
        assert_eq!(draft.title, "Example");
        assert_eq!(draft.url.as_deref(), Some("http://x"));
        assert_eq!(draft.tags, Some(vec!["a".to_string()]));
        assert_eq!(draft.content, None);
    }

    #[test]
    fn reply_without_tool_use_fails() {
        let reply = json!({
            "content": [{ "type": "text", "text": "Here is your bit: ..." }]
        });
        assert!(matches!(
            draft_from_reply(&reply),
            Err(BitError::StructuringFailed { .. })
        ));
        assert!(draft_from_reply(&json!({})).is_err());
    }

    #[test]
    fn reply_with_blank_title_fails() {
        let reply = json!({
            "content": [{ "type": "tool_use", "input": { "title": "" } }]
        });
        assert!(matches!(
            draft_from_reply(&reply),
            Err(BitError::StructuringFailed { .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_api_is_an_error() {
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let structurer = Structurer::new("sk-test".to_string(), &config);
        assert!(structurer.structure("hello").await.is_err());
    }

    #[tokio::test]
    async fn error_status_reports_status_and_body() {
        let base_url = serve_once(
            "401 Unauthorized",
            r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
        );

        let message = match structurer_at(base_url).structure("hello").await {
            Err(BitError::StructuringFailed { message }) => message,
            other => panic!("expected a structuring failure, got {other:?}"),
        };
        assert!(message.contains("401"), "{message}");
        assert!(message.contains("invalid x-api-key"), "{message}");
    }

    #[tokio::test]
    async fn successful_reply_is_structured() {
        let reply = json!({
            "content": [{
                "type": "tool_use",
                "name": TOOL_NAME,
                "input": { "title": "Served", "via": "HN" }
            }]
        });
        let base_url = serve_once("200 OK", &reply.to_string());

        let draft = structurer_at(base_url).structure("hello").await.unwrap();
        assert_eq!(draft.title, "Served");
        assert_eq!(draft.via.as_deref(), Some("HN"));
    }
}
