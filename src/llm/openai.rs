use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
};

use super::{GenerateRequest, GenerateResponse, Provider};

const GOOGLE_OPENAI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Any chat-completions compatible endpoint: OpenAI itself, Gemini's
/// compatibility layer, or a local Ollama.
pub struct OpenAIProvider {
    client: Client<OpenAIConfig>,
    provider_name: &'static str,
}

impl OpenAIProvider {
    fn with_config(config: OpenAIConfig, provider_name: &'static str) -> Self {
        Self {
            client: Client::with_config(config),
            provider_name,
        }
    }

    pub fn new(api_key: &str) -> Self {
        Self::with_config(OpenAIConfig::new().with_api_key(api_key), "openai")
    }

    pub fn new_google(api_key: &str) -> Self {
        Self::with_config(
            OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(GOOGLE_OPENAI_BASE),
            "google",
        )
    }

    pub fn new_ollama(base_url: &str) -> Self {
        Self::with_config(
            OpenAIConfig::new()
                .with_api_key("ollama")
                .with_api_base(format!("{}/v1", base_url.trim_end_matches('/'))),
            "ollama",
        )
    }
}

fn to_messages(req: &GenerateRequest) -> Vec<ChatCompletionRequestMessage> {
    let mut messages = Vec::with_capacity(2);
    if !req.system.is_empty() {
        messages.push(ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(req.system.clone()),
                name: None,
            },
        ));
    }
    messages.push(ChatCompletionRequestMessage::User(
        ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(req.prompt.clone()),
            name: None,
        },
    ));
    messages
}

#[async_trait::async_trait]
impl Provider for OpenAIProvider {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        #[allow(deprecated)]
        let request = CreateChatCompletionRequest {
            model: req.model.clone(),
            messages: to_messages(req),
            temperature: Some(req.temperature),
            max_completion_tokens: Some(req.max_tokens),
            ..Default::default()
        };

        let response = self.client.chat().create(request).await?;
        let choice = response.choices.first();

        let content = choice
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        let finish_reason = choice
            .and_then(|c| c.finish_reason)
            .map(|r| format!("{r:?}").to_lowercase())
            .unwrap_or_default();
        let (input_tokens, output_tokens) = response
            .usage
            .as_ref()
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        Ok(GenerateResponse {
            content,
            model: response.model,
            input_tokens,
            output_tokens,
            finish_reason,
            provider: String::new(),
        })
    }

    fn name(&self) -> &str {
        self.provider_name
    }
}
