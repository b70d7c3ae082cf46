use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{GenerationParams, ModelDescriptor};
use crate::error::{SummarizeError, SummarizeResult};
use crate::infra::config::InferenceConfig;
use crate::llm::backend::{Generator, ModelLoader};

pub const TOKEN_ENV: &str = "BRIEFLY_HF_TOKEN";

/// Loads models against the hosted inference API.
///
/// Loading checks the checkpoint exists on the hub; the weights themselves live
/// behind the inference endpoint.
#[derive(Debug, Clone)]
pub struct HubLoader {
    client: reqwest::Client,
    hub_url: String,
    inference_url: String,
    token: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct HubGenerator {
    client: reqwest::Client,
    model: String,
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
}

#[derive(Deserialize)]
struct HubModelInfo {
    #[serde(default)]
    pipeline_tag: Option<String>,
}

#[derive(Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: RequestParameters,
    options: RequestOptions,
}

#[derive(Serialize)]
struct RequestParameters {
    max_length: usize,
    min_length: usize,
    do_sample: bool,
    truncation: &'static str,
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
    use_cache: bool,
}

#[derive(Deserialize)]
struct SummarizationOutput {
    summary_text: String,
}

#[derive(Deserialize)]
struct ApiError {
    error: String,
}

impl HubLoader {
    pub fn new(config: &InferenceConfig) -> Self {
        let token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty());

        Self {
            client: reqwest::Client::new(),
            hub_url: config.hub_url.trim_end_matches('/').to_string(),
            inference_url: config.inference_url.trim_end_matches('/').to_string(),
            token,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ModelLoader for HubLoader {
    async fn load(&self, descriptor: &ModelDescriptor) -> SummarizeResult<Arc<dyn Generator>> {
        let model = &descriptor.canonical_name;
        let url = format!("{}/api/models/{}", self.hub_url, model);

        let response = self
            .authorize(self.client.get(&url))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SummarizeError::model_load(model, format!("hub unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::model_load(model, describe_status(status, &body)));
        }

        let info: HubModelInfo = response
            .json()
            .await
            .map_err(|e| SummarizeError::model_load(model, format!("bad hub metadata: {e}")))?;

        if let Some(tag) = info.pipeline_tag.as_deref() {
            if tag != "summarization" && tag != "text2text-generation" {
                tracing::warn!(model = %model, pipeline_tag = %tag, "model is not tagged for summarization");
            }
        }

        Ok(Arc::new(HubGenerator {
            client: self.client.clone(),
            model: model.clone(),
            endpoint: format!("{}/models/{}", self.inference_url, model),
            token: self.token.clone(),
            timeout: self.timeout,
        }))
    }
}

#[async_trait]
impl Generator for HubGenerator {
    async fn generate(&self, input: &str, params: &GenerationParams) -> SummarizeResult<String> {
        let request = SummarizationRequest {
            inputs: input,
            parameters: RequestParameters {
                max_length: params.max_length,
                min_length: params.min_length,
                do_sample: params.do_sample,
                truncation: "only_first",
            },
            options: RequestOptions {
                wait_for_model: true,
                // Repeated sampled requests must not be served from the API cache
                use_cache: false,
            },
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SummarizeError::generation(&self.model, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::generation(
                &self.model,
                describe_status(status, &body),
            ));
        }

        let outputs: Vec<SummarizationOutput> = response.json().await.map_err(|e| {
            SummarizeError::generation(&self.model, format!("unexpected response: {e}"))
        })?;

        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text.trim().to_string())
            .ok_or_else(|| SummarizeError::generation(&self.model, "no summary in response"))
    }
}

fn describe_status(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.trim().to_string());

    match status.as_u16() {
        401 | 403 => format!("Access denied. Check {TOKEN_ENV}"),
        404 => "Model not found on the hub".to_string(),
        429 => "Rate limit exceeded. Please try again later".to_string(),
        500..=599 if detail.is_empty() => {
            format!("Inference server error ({status}). Please try again later")
        }
        _ if detail.is_empty() => format!("API error ({status})"),
        _ => format!("API error ({status}): {detail}"),
    }
}
