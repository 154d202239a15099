//! Hosted-agent chat API used as the automated side's brain.
//!
//! The engine only needs [`Oracle::suggest_move`]. [`AgentOracle`] implements
//! it over two HTTP calls:
//!
//! ```text
//! POST {base}/create-agent  {instructions, agent_name}  -> {agent_id}
//! POST {base}/chat          {agent_id, message}         -> {response}
//! ```

use async_trait::async_trait;
use checkers_core::notation::{AGENT_NAME, CONVERSATION_INSTRUCTIONS};
use checkers_core::OracleError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Free-text move source for the automated side.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Ask for a move. The reply is opaque text.
    async fn suggest_move(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Handle to a conversation on the agent service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationId(pub String);

#[derive(Serialize)]
struct CreateAgentRequest<'a> {
    instructions: &'a str,
    agent_name: &'a str,
}

#[derive(Deserialize)]
struct CreateAgentResponse {
    agent_id: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    agent_id: &'a str,
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

/// Thin JSON client for the agent service.
#[derive(Clone, Debug)]
pub struct AgentClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl AgentClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Create a conversation primed with `instructions`.
    pub async fn create_conversation(
        &self,
        instructions: &str,
    ) -> Result<ConversationId, OracleError> {
        let response: CreateAgentResponse = self
            .call(
                "create-agent",
                &CreateAgentRequest {
                    instructions,
                    agent_name: AGENT_NAME,
                },
            )
            .await?;
        Ok(ConversationId(response.agent_id))
    }

    /// Send one message and return the agent's reply text.
    pub async fn send(
        &self,
        conversation: &ConversationId,
        text: &str,
    ) -> Result<String, OracleError> {
        let response: ChatResponse = self
            .call(
                "chat",
                &ChatRequest {
                    agent_id: &conversation.0,
                    message: text,
                },
            )
            .await?;
        Ok(response.response)
    }

    async fn call<B, R>(&self, endpoint: &str, body: &B) -> Result<R, OracleError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, "agent request");

        let mut request = self.http.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status.as_u16()));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| OracleError::Decode(e.to_string()))
    }
}

/// [`Oracle`] backed by one agent conversation per process.
///
/// The conversation is created on first use. If that fails the turn is lost
/// and creation is attempted again on the next turn.
pub struct AgentOracle {
    client: AgentClient,
    conversation: Mutex<Option<ConversationId>>,
}

impl AgentOracle {
    pub fn new(client: AgentClient) -> Self {
        Self {
            client,
            conversation: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Oracle for AgentOracle {
    async fn suggest_move(&self, prompt: &str) -> Result<String, OracleError> {
        // Held through bootstrap only; chats do not queue behind each other.
        let id = {
            let mut conversation = self.conversation.lock().await;
            match conversation.as_ref() {
                Some(id) => id.clone(),
                None => {
                    let id = self
                        .client
                        .create_conversation(CONVERSATION_INSTRUCTIONS)
                        .await
                        .map_err(|e| OracleError::Bootstrap(e.to_string()))?;
                    info!(conversation = %id.0, "agent conversation created");
                    *conversation = Some(id.clone());
                    id
                }
            }
        };
        self.client.send(&id, prompt).await
    }
}
