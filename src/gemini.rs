use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::activity::{self, Kind};
use crate::analysis::{ClassificationStatus, DrugAnalysis};
use crate::config::GeminiConfig;

macro_rules! debug_eprintln {
    ($($arg:tt)*) => {
        if std::env::var("DRUGCHECK_DEBUG").is_ok() {
            eprintln!($($arg)*);
        }
    };
}

const GENERIC_FAILURE: &str = "Unable to analyze drug status. Please try again.";

const SYSTEM_INSTRUCTION: &str = "You are an expert regulatory compliance officer for a drug law enforcement agency.
Your job is to identify if a drug is \"CONTROLLED\" (strictly regulated, potential for abuse, scheduled narcotics/psychotropics),
\"PRESCRIPTION_ONLY\" (Rx only, but not necessarily a scheduled narcotic),
or \"OTC\" (over the counter / not controlled).
Be conservative and prioritize safety. If a drug has multiple names or is a slang term, identify the active ingredient.";

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("no API key configured (set {0})")]
    MissingApiKey(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("No response from AI")]
    EmptyResponse,
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ClassificationError {
    fn from(e: reqwest::Error) -> Self {
        ClassificationError::Transport(e.to_string())
    }
}

impl ClassificationError {
    /// Text safe to show the user. Parse and transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            ClassificationError::MissingApiKey(var) => {
                format!("No API key configured. Set {} and restart.", var)
            }
            ClassificationError::EmptyResponse => "No response from AI".to_string(),
            ClassificationError::Transport(_) | ClassificationError::MalformedResponse(_) => {
                GENERIC_FAILURE.to_string()
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

pub fn build_prompt(drug_name: &str) -> String {
    format!(
        "Analyze the drug \"{}\". Determine if it is a controlled substance (narcotic, psychotropic, or precursor) under general international standards (like NDLEA, DEA, WHO). Differentiate between strictly controlled/banned substances, prescription-only medications, and over-the-counter drugs.",
        drug_name
    )
}

fn response_schema() -> Value {
    let statuses: Vec<&str> = ClassificationStatus::ALL.iter().map(|s| s.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "drugName": { "type": "STRING", "description": "Standardized name of the drug" },
            "scientificName": { "type": "STRING", "description": "Chemical or generic name" },
            "status": {
                "type": "STRING",
                "enum": statuses,
                "description": "The regulatory status of the drug."
            },
            "classification": { "type": "STRING", "description": "e.g., 'Schedule II Opioid', 'NSAID', 'Benzodiazepine'" },
            "reason": { "type": "STRING", "description": "Short explanation of why it has this status." },
            "legalImplications": { "type": "STRING", "description": "Brief legal note (e.g., 'Possession without prescription is illegal')." },
            "commonUses": { "type": "ARRAY", "items": { "type": "STRING" } },
            "safetyWarnings": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["drugName", "status", "classification", "reason", "legalImplications", "safetyWarnings"]
    })
}

fn build_request(drug_name: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part { text: Some(SYSTEM_INSTRUCTION.to_string()) }],
        },
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part { text: Some(build_prompt(drug_name)) }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: response_schema(),
        },
    }
}

/// Text of the first candidate, with all parts joined. `None` when blank.
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.trim().is_empty() { None } else { Some(text) }
}

// Strip a ```json ... ``` fence if the model wrapped its output in one
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let mut content = trimmed.trim_start_matches("```");
    content = content.strip_prefix("json").unwrap_or(content);
    if let Some(pos) = content.rfind("```") {
        content = &content[..pos];
    }
    content.trim()
}

/// Parse and validate a provider payload. Any violation fails the whole result.
pub fn parse_analysis(text: &str) -> Result<DrugAnalysis, ClassificationError> {
    let payload = strip_code_fence(text);
    if payload.is_empty() {
        return Err(ClassificationError::EmptyResponse);
    }

    let analysis: DrugAnalysis = serde_json::from_str(payload)
        .map_err(|e| ClassificationError::MalformedResponse(e.to_string()))?;
    analysis
        .validate()
        .map_err(ClassificationError::MalformedResponse)?;

    Ok(analysis)
}

pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn with_config(config: &GeminiConfig) -> Self {
        GeminiClient {
            base_url: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.resolve_api_key(),
            api_key_env: config.api_key_env.clone(),
            client: reqwest::Client::new(),
        }
    }

    pub fn get_model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Classify one drug name with a single provider call.
    pub async fn classify(&self, drug_name: &str) -> Result<DrugAnalysis, ClassificationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ClassificationError::MissingApiKey(self.api_key_env.clone()))?;

        let request = build_request(drug_name);
        activity::log_with(Kind::Http, format!("POST {} ({})", self.model, drug_name));
        debug_eprintln!("Request to {}: {}", self.endpoint(), serde_json::to_string(&request).unwrap_or_default());

        let response = self.client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug_eprintln!("Gemini API error {}: {}", status, body);
            return Err(ClassificationError::Transport(format!("Gemini API error: {}", status)));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ClassificationError::MalformedResponse(e.to_string()))?;

        let text = extract_text(body).ok_or(ClassificationError::EmptyResponse)?;
        debug_eprintln!("Gemini payload: {}", text);

        let analysis = parse_analysis(&text)?;
        activity::log_with(
            Kind::Http,
            format!("{} -> {}", analysis.subject_name, analysis.status.as_str()),
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const TRAMADOL: &str = r#"{"drugName":"Tramadol","scientificName":"Tramadol hydrochloride","status":"PRESCRIPTION_ONLY","classification":"Opioid Analgesic","reason":"Weak mu-opioid agonist","legalImplications":"Requires a prescription","commonUses":["Moderate to severe pain"],"safetyWarnings":["Risk of dependence"]}"#;

    fn gemini_body(text: &str) -> String {
        json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let lower = l.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(status_line: &str, body: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let status_line = status_line.to_string();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (format!("http://{}", addr), handle)
    }

    fn client_for(host: String, api_key: Option<&str>) -> GeminiClient {
        GeminiClient::with_config(&GeminiConfig {
            host,
            model: "gemini-test".to_string(),
            api_key: api_key.map(str::to_string),
            api_key_env: "DRUGCHECK_TEST_UNSET_KEY".to_string(),
        })
    }

    #[test]
    fn test_prompt_embeds_query() {
        let prompt = build_prompt("Lean");
        assert!(prompt.contains("\"Lean\""));
        assert!(prompt.contains("controlled substance"));
        assert!(prompt.contains("over-the-counter"));
    }

    #[test]
    fn test_request_shape() {
        let value = serde_json::to_value(build_request("Codeine")).unwrap();

        let system = value["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(system.contains("regulatory compliance officer"));
        assert!(system.contains("conservative"));
        assert!(system.contains("slang"));

        assert_eq!(value["contents"][0]["role"], "user");
        assert!(value["contents"][0]["parts"][0]["text"].as_str().unwrap().contains("Codeine"));

        let config = &value["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(
            config["responseSchema"]["properties"]["status"]["enum"],
            json!(["CONTROLLED", "PRESCRIPTION_ONLY", "OTC", "UNKNOWN"])
        );
        assert_eq!(
            config["responseSchema"]["required"],
            json!(["drugName", "status", "classification", "reason", "legalImplications", "safetyWarnings"])
        );
    }

    #[test]
    fn test_parse_analysis_ok() {
        let analysis = parse_analysis(TRAMADOL).unwrap();
        assert_eq!(analysis.subject_name, "Tramadol");
        assert_eq!(analysis.status, ClassificationStatus::PrescriptionOnly);
        assert_eq!(analysis.classification, "Opioid Analgesic");
    }

    #[test]
    fn test_parse_analysis_fenced() {
        let fenced = format!("```json\n{}\n```", TRAMADOL);
        assert_eq!(parse_analysis(&fenced).unwrap().subject_name, "Tramadol");
    }

    #[test]
    fn test_parse_analysis_failures() {
        assert!(matches!(parse_analysis("   "), Err(ClassificationError::EmptyResponse)));
        assert!(matches!(
            parse_analysis("Tramadol is prescription only."),
            Err(ClassificationError::MalformedResponse(_))
        ));

        let missing_warnings = TRAMADOL.replace(r#","safetyWarnings":["Risk of dependence"]"#, "");
        assert!(matches!(
            parse_analysis(&missing_warnings),
            Err(ClassificationError::MalformedResponse(_))
        ));

        let bad_status = TRAMADOL.replace("PRESCRIPTION_ONLY", "SCHEDULE_IV");
        assert!(matches!(
            parse_analysis(&bad_status),
            Err(ClassificationError::MalformedResponse(_))
        ));

        let blank_reason = TRAMADOL.replace("Weak mu-opioid agonist", "");
        assert!(matches!(
            parse_analysis(&blank_reason),
            Err(ClassificationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_user_message_hides_details() {
        let err = ClassificationError::MalformedResponse("expected value at line 1 column 1".to_string());
        assert_eq!(err.user_message(), GENERIC_FAILURE);
        assert!(err.to_string().contains("line 1"));

        let err = ClassificationError::Transport("connection refused".to_string());
        assert_eq!(err.user_message(), GENERIC_FAILURE);

        assert_eq!(ClassificationError::EmptyResponse.user_message(), "No response from AI");
        assert!(ClassificationError::MissingApiKey("GEMINI_API_KEY".to_string())
            .user_message()
            .contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        }))
        .unwrap();
        assert_eq!(extract_text(response).as_deref(), Some("{\"a\":1}"));

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(extract_text(empty).is_none());

        let no_parts: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] })).unwrap();
        assert!(extract_text(no_parts).is_none());
    }

    #[tokio::test]
    async fn test_classify_success() {
        let (host, server) = serve_once("200 OK", gemini_body(TRAMADOL)).await;
        let client = client_for(host, Some("test-key"));

        let analysis = client.classify("Tramadol").await.unwrap();
        assert_eq!(analysis.status, ClassificationStatus::PrescriptionOnly);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1beta/models/gemini-test:generateContent"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
        assert!(request.contains("Tramadol"));
    }

    #[tokio::test]
    async fn test_classify_http_error_is_transport() {
        let (host, server) = serve_once("429 Too Many Requests", "{}".to_string()).await;
        let client = client_for(host, Some("test-key"));

        let err = client.classify("Codeine").await.unwrap_err();
        assert!(matches!(err, ClassificationError::Transport(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_classify_empty_candidates() {
        let (host, server) = serve_once("200 OK", json!({ "candidates": [] }).to_string()).await;
        let client = client_for(host, Some("test-key"));

        let err = client.classify("Codeine").await.unwrap_err();
        assert!(matches!(err, ClassificationError::EmptyResponse));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_classify_without_key_makes_no_call() {
        let mut client = client_for("http://127.0.0.1:9".to_string(), None);
        client.api_key = None;
        let err = client.classify("Codeine").await.unwrap_err();
        assert!(matches!(err, ClassificationError::MissingApiKey(ref v) if v == "DRUGCHECK_TEST_UNSET_KEY"));
    }
}
