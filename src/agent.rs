use log::{ debug, error, info, warn };
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::cli::Args;
use crate::config::prompt::{ self, PromptConfig };
use crate::error::ChatError;
use crate::history::InteractionLogger;
use crate::llm::LlmConfig;
use crate::llm::chat::{ new_client as new_chat_client, ChatClient, GenerationRequest, LlmError };
use crate::models::{ ChatRequest, ChatResponse, EventCandidate, UserProfile };
use crate::response::{ merge, parse_generated_payload };
use crate::store::{ create_store, EventStore };

/// Steps of one chat request, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    ValidatingInput,
    LookingUpProfile,
    FetchingCandidates,
    BuildingPrompt,
    Generating,
    ParsingResponse,
    Merging,
    Logging,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::ValidatingInput => "validating-input",
            PipelineStage::LookingUpProfile => "looking-up-profile",
            PipelineStage::FetchingCandidates => "fetching-candidates",
            PipelineStage::BuildingPrompt => "building-prompt",
            PipelineStage::Generating => "generating",
            PipelineStage::ParsingResponse => "parsing-response",
            PipelineStage::Merging => "merging",
            PipelineStage::Logging => "logging",
            PipelineStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSettings {
    pub max_tokens: u32,
    pub temperature: f32,
    pub generation_timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: 0.7,
            generation_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&Args> for AgentSettings {
    fn from(args: &Args) -> Self {
        Self {
            max_tokens: args.chat_max_tokens,
            temperature: args.chat_temperature,
            generation_timeout: Duration::from_secs(args.generation_timeout_secs),
        }
    }
}

/// Stateless chat pipeline; one instance is shared by all requests.
#[derive(Clone)]
pub struct ChatAgent {
    store: Arc<dyn EventStore>,
    chat_client: Arc<dyn ChatClient>,
    prompt_config: Arc<PromptConfig>,
    logger: InteractionLogger,
    settings: AgentSettings,
}

impl ChatAgent {
    pub fn new(
        store: Arc<dyn EventStore>,
        chat_client: Arc<dyn ChatClient>,
        prompt_config: PromptConfig,
        settings: AgentSettings
    ) -> Self {
        let logger = InteractionLogger::new(Arc::clone(&store));
        Self {
            store,
            chat_client,
            prompt_config: Arc::new(prompt_config),
            logger,
            settings,
        }
    }

    pub async fn from_args(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let chat_config = LlmConfig {
            llm_type: args.chat_llm_type.parse()?,
            base_url: args.chat_base_url.clone(),
            api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
            completion_model: args.chat_model.clone(),
        };
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Type={}, Model={}, BaseURL={:?}",
            chat_config.llm_type,
            chat_client.get_model(),
            chat_client.get_base_url()
        );

        let prompt_config = match &args.prompts_path {
            Some(path) => {
                let config = prompt::load_prompts(path).map_err(|e|
                    format!("Failed to load prompts file '{}': {}", path, e)
                )?;
                info!("Loaded prompt overrides from: {}", path);
                config
            }
            None => PromptConfig::default(),
        };

        let store = create_store(args).await?;

        Ok(Self::new(store, chat_client, prompt_config, AgentSettings::from(args)))
    }

    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    pub async fn process_chat(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let request_id = Uuid::new_v4();
        let result = self.run_pipeline(request_id, request).await;
        if let Err(e) = &result {
            match e {
                ChatError::InvalidInput(_) | ChatError::ProfileNotFound(_) =>
                    warn!("[{}] chat request rejected: {}", request_id, e),
                _ => error!("[{}] chat request failed: {}", request_id, e),
            }
        }
        result
    }

    async fn run_pipeline(
        &self,
        request_id: Uuid,
        request: ChatRequest
    ) -> Result<ChatResponse, ChatError> {
        enter(request_id, PipelineStage::ValidatingInput);
        let (user_id, query) = validate_input(request)?;
        info!("[{}] chat request from user {}", request_id, user_id);

        enter(request_id, PipelineStage::LookingUpProfile);
        let profile = self.fetch_profile(&user_id).await?;

        enter(request_id, PipelineStage::FetchingCandidates);
        let candidates = self.fetch_candidates(&profile).await?;

        enter(request_id, PipelineStage::BuildingPrompt);
        let generation_request = GenerationRequest {
            system_instruction: self.prompt_config.system_instruction.clone(),
            prompt: self.prompt_config.build_prompt(&query, &profile.location),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        enter(request_id, PipelineStage::Generating);
        let raw = self.generate(&generation_request).await?;
        debug!("[{}] raw generation output: {}", request_id, raw);

        enter(request_id, PipelineStage::ParsingResponse);
        let payload = parse_generated_payload(&raw).map_err(|e| {
            error!("[{}] generation output rejected ({}): {}", request_id, e.reason(), e.raw());
            e
        })?;

        enter(request_id, PipelineStage::Merging);
        let response = merge(&payload, &candidates);

        enter(request_id, PipelineStage::Logging);
        self.logger.record(&user_id, &query, &response);

        enter(request_id, PipelineStage::Done);
        info!(
            "[{}] answered with {} suggestions and {} preference events",
            request_id,
            response.events.len(),
            response.use_preference_event.len()
        );
        Ok(response)
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, ChatError> {
        self.store
            .get_user_profile(user_id).await?
            .ok_or_else(|| ChatError::ProfileNotFound(user_id.to_string()))
    }

    async fn fetch_candidates(&self, profile: &UserProfile) -> Result<Vec<EventCandidate>, ChatError> {
        if profile.preferences.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.get_events_by_categories(&profile.preferences).await?)
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ChatError> {
        let timeout = self.settings.generation_timeout;
        match tokio::time::timeout(timeout, self.chat_client.complete(request)).await {
            Ok(Ok(completion)) => Ok(completion.response),
            Ok(Err(e)) => Err(ChatError::GenerationUnavailable(e)),
            Err(_) => Err(ChatError::GenerationUnavailable(LlmError::Timeout(timeout))),
        }
    }
}

fn enter(request_id: Uuid, stage: PipelineStage) {
    debug!("[{}] stage: {}", request_id, stage);
}

fn validate_input(request: ChatRequest) -> Result<(String, String), ChatError> {
    let user_id = request.user_id
        .as_ref()
        .and_then(|id| id.as_key())
        .ok_or_else(|| ChatError::InvalidInput("User ID and query are required".to_string()))?;

    let query = request.query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ChatError::InvalidInput("User ID and query are required".to_string()))?;

    Ok((user_id, query))
}
