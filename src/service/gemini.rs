//! HTTPS client for the Gemini REST API.
//!
//! Implements [`GenerationService`] over `reqwest`'s blocking client. Response
//! parsing is split into free functions so it can be tested without a network.

use super::{
    AspectRatio, Caption, GenerationService, GroundedAnswer, ImageSize, Source, VideoOperation,
    VideoParams,
};
use crate::model::GenerationError;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Default API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const CAPTION_MODEL: &str = "gemini-2.5-flash-lite";
const SEARCH_MODEL: &str = "gemini-3-flash-preview";
const IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
const ANALYSIS_MODEL: &str = "gemini-3-pro-preview";
const VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

const SEARCH_INSTRUCTION: &str = "You are a social media research assistant. Provide concise, \
trending, and factual information based on web search. Use bullet points for readability. \
Always prioritize recent events.";

/// Per-request timeout. Video jobs are polled, so no single call is long.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const API_KEY_HEADER: &str = "x-goog-api-key";

// ===== Wire types =====

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

// ===== Parsing =====

fn parse_content(body: &str) -> Result<GenerateContentResponse, GenerationError> {
    serde_json::from_str(body).map_err(|e| GenerationError::MalformedResponse(e.to_string()))
}

/// Concatenated text of the first candidate, if any.
fn response_text(response: &GenerateContentResponse) -> Option<String> {
    let parts = &response.candidates.first()?.content.as_ref()?.parts;
    let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
    (!text.is_empty()).then_some(text)
}

pub(crate) fn parse_caption(body: &str) -> Result<Caption, GenerationError> {
    let response = parse_content(body)?;
    let text = response_text(&response)
        .ok_or_else(|| GenerationError::MalformedResponse("caption response has no text".into()))?;
    serde_json::from_str(&text).map_err(|e| GenerationError::MalformedResponse(e.to_string()))
}

pub(crate) fn parse_grounded(body: &str) -> Result<GroundedAnswer, GenerationError> {
    let response = parse_content(body)?;
    let sources = response
        .candidates
        .first()
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|meta| {
            meta.grounding_chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref())
                .filter_map(|web| {
                    Some(Source {
                        title: web.title.clone().unwrap_or_else(|| "Web Source".to_string()),
                        uri: web.uri.clone()?,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(GroundedAnswer {
        text: response_text(&response).unwrap_or_default(),
        sources,
    })
}

/// First inline image as a `data:` URI.
pub(crate) fn parse_image(body: &str) -> Result<Option<String>, GenerationError> {
    let response = parse_content(body)?;
    let uri = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|content| content.parts.iter().find_map(|p| p.inline_data.as_ref()))
        .map(|inline| {
            let mime = inline.mime_type.as_deref().unwrap_or("image/png");
            format!("data:{mime};base64,{}", inline.data)
        });
    Ok(uri)
}

pub(crate) fn parse_text(body: &str) -> Result<Option<String>, GenerationError> {
    Ok(response_text(&parse_content(body)?))
}

/// Long-running operation status.
pub(crate) fn parse_operation(body: &str) -> Result<VideoOperation, GenerationError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    if let Some(message) = value.pointer("/error/message").and_then(Value::as_str) {
        return Err(GenerationError::from_service_message(200, message));
    }
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| GenerationError::MalformedResponse("operation has no name".into()))?
        .to_string();
    let done = value.get("done").and_then(Value::as_bool).unwrap_or(false);
    let uri = value
        .pointer("/response/generateVideoResponse/generatedSamples/0/video/uri")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(VideoOperation { name, done, uri })
}

/// Append the credential to a download URI as an encoded `key` parameter.
pub fn with_key(uri: &str, api_key: &str) -> Result<String, GenerationError> {
    let mut url = Url::parse(uri)
        .map_err(|e| GenerationError::MalformedResponse(format!("download uri {uri:?}: {e}")))?;
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url.into())
}

// ===== Client =====

/// Blocking Gemini API client.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Client for `base_url`. Fails on a blank key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, GenerationError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenerationError::MissingCredential);
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn generate(&self, model: &str, body: &Value) -> Result<String, GenerationError> {
        let url = format!("{}/models/{model}:generateContent", self.base_url);
        self.post(&url, body)
    }

    fn post(&self, url: &str, body: &Value) -> Result<String, GenerationError> {
        debug!(url, "POST");
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        read_body(response)
    }

    fn get(&self, url: &str) -> Result<String, GenerationError> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        read_body(response)
    }
}

fn read_body(response: Response) -> Result<String, GenerationError> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| GenerationError::Network(e.to_string()))?;
    if status.is_success() {
        return Ok(body);
    }
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);
    warn!(status = status.as_u16(), %message, "service error");
    Err(GenerationError::from_service_message(status.as_u16(), message))
}

impl GenerationService for GeminiClient {
    fn caption(&self, topic: &str) -> Result<Caption, GenerationError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": format!(
                "Generate a short-video caption and hashtags for a video about: {topic}. \
                 Format: {{ \"caption\": \"...\", \"tags\": [\"tag1\", \"tag2\"] }}"
            ) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "caption": { "type": "STRING" },
                        "tags": { "type": "ARRAY", "items": { "type": "STRING" } }
                    },
                    "required": ["caption", "tags"]
                }
            }
        });
        parse_caption(&self.generate(CAPTION_MODEL, &body)?)
    }

    fn search(&self, query: &str) -> Result<GroundedAnswer, GenerationError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": query }] }],
            "systemInstruction": { "parts": [{ "text": SEARCH_INSTRUCTION }] },
            "tools": [{ "google_search": {} }]
        });
        parse_grounded(&self.generate(SEARCH_MODEL, &body)?)
    }

    fn generate_image(
        &self,
        prompt: &str,
        size: ImageSize,
        aspect: AspectRatio,
    ) -> Result<Option<String>, GenerationError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "imageConfig": {
                    "aspectRatio": aspect.as_str(),
                    "imageSize": size.as_str()
                }
            }
        });
        parse_image(&self.generate(IMAGE_MODEL, &body)?)
    }

    fn analyze(&self, media_uri: &str, prompt: &str) -> Result<Option<String>, GenerationError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": format!(
                "Analyze this video content (Context: {media_uri}). Prompt: {prompt}"
            ) }] }]
        });
        parse_text(&self.generate(ANALYSIS_MODEL, &body)?)
    }

    fn submit_video(
        &self,
        prompt: &str,
        params: &VideoParams,
    ) -> Result<VideoOperation, GenerationError> {
        let url = format!("{}/models/{VIDEO_MODEL}:predictLongRunning", self.base_url);
        let body = json!({
            "instances": [{ "prompt": prompt }],
            "parameters": {
                "aspectRatio": params.aspect.as_str(),
                "resolution": params.resolution,
                "sampleCount": 1
            }
        });
        parse_operation(&self.post(&url, &body)?)
    }

    fn check_video(&self, operation: &VideoOperation) -> Result<VideoOperation, GenerationError> {
        let url = format!("{}/{}", self.base_url, operation.name);
        let mut next = parse_operation(&self.get(&url)?)?;
        if let Some(uri) = next.uri.take() {
            next.uri = Some(with_key(&uri, &self.api_key)?);
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_is_read_from_json_text_part() {
        let body = r##"{"candidates":[{"content":{"parts":[{"text":"{\"caption\":\"Lights\",\"tags\":[\"city\"]}"}]}}]}"##;
        let caption = parse_caption(body).unwrap();
        assert_eq!(caption.caption, "Lights");
        assert_eq!(caption.tags, vec!["city"]);
    }

    #[test]
    fn caption_without_text_is_malformed() {
        let err = parse_caption(r#"{"candidates":[]}"#).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[test]
    fn grounded_answer_collects_web_sources() {
        let body = r#"{"candidates":[{
            "content":{"parts":[{"text":"- point one"}]},
            "groundingMetadata":{"groundingChunks":[
                {"web":{"uri":"https://a.example","title":"A"}},
                {"web":{"uri":"https://b.example"}},
                {"retrievedContext":{}}
            ]}
        }]}"#;
        let answer = parse_grounded(body).unwrap();
        assert_eq!(answer.text, "- point one");
        assert_eq!(answer.sources.len(), 2);
        assert_eq!(answer.sources[1].title, "Web Source");
    }

    #[test]
    fn image_becomes_data_uri() {
        let body = r#"{"candidates":[{"content":{"parts":[
            {"text":"here you go"},
            {"inlineData":{"mimeType":"image/png","data":"AAAA"}}
        ]}}]}"#;
        assert_eq!(
            parse_image(body).unwrap().as_deref(),
            Some("data:image/png;base64,AAAA")
        );
        assert_eq!(parse_image(r#"{"candidates":[]}"#).unwrap(), None);
    }

    #[test]
    fn operation_status_is_parsed() {
        let pending = parse_operation(r#"{"name":"models/veo/operations/42"}"#).unwrap();
        assert!(!pending.done);
        assert_eq!(pending.uri, None);

        let done = parse_operation(
            r#"{"name":"op","done":true,"response":{"generateVideoResponse":
                {"generatedSamples":[{"video":{"uri":"https://files/v?alt=media"}}]}}}"#,
        )
        .unwrap();
        assert!(done.done);
        assert_eq!(done.uri.as_deref(), Some("https://files/v?alt=media"));
    }

    #[test]
    fn operation_error_maps_entity_not_found() {
        let err = parse_operation(
            r#"{"name":"op","done":true,"error":{"code":404,"message":"Requested entity was not found."}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::EntityNotFound));
    }

    #[test]
    fn key_is_appended_with_correct_separator() {
        assert_eq!(
            with_key("https://f/v?alt=media", "k").unwrap(),
            "https://f/v?alt=media&key=k"
        );
        assert_eq!(with_key("https://f/v", "k").unwrap(), "https://f/v?key=k");
    }

    #[test]
    fn key_with_reserved_characters_is_encoded() {
        let uri = with_key("https://f/v?alt=media", "a&b+c=d").unwrap();
        assert_eq!(uri, "https://f/v?alt=media&key=a%26b%2Bc%3Dd");
        let url = Url::parse(&uri).unwrap();
        let key = url.query_pairs().find(|(k, _)| k == "key").map(|(_, v)| v.into_owned());
        assert_eq!(key.as_deref(), Some("a&b+c=d"));
    }

    #[test]
    fn unparseable_download_uri_is_malformed() {
        assert!(matches!(
            with_key("not a url", "k"),
            Err(GenerationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn empty_key_is_missing_credential() {
        assert!(matches!(
            GeminiClient::new(DEFAULT_API_BASE_URL, "  "),
            Err(GenerationError::MissingCredential)
        ));
    }
}
