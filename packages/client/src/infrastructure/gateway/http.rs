//! reqwest を使った BarGateway 実装
//!
//! Every request carries the application's Basic-auth credentials and a
//! JSON body. A request that exceeds the configured timeout is reported as
//! [`GatewayError::Timeout`], which callers treat like any transport failure.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::{
    config::{ClientConfig, Credentials},
    domain::{
        AnonymousId, BarGateway, ChatReply, ChatRequest, GatewayError, OnboardingRequest,
        OnboardingVerdict, SessionOpened,
    },
    infrastructure::dto::http::{
        ErrorResponseDto, MessageRequestDto, MessageResponseDto, OnboardRequestDto,
        OnboardResponseDto, SessionStartRequestDto, SessionStartResponseDto,
    },
};

const ONBOARD_PATH: &str = "api/onboard";
const SESSION_START_PATH: &str = "session/start";
const MESSAGE_PATH: &str = "message";

pub struct HttpBarGateway {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl HttpBarGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            credentials: config.credentials.clone(),
        })
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, GatewayError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        tracing::info!("POST {}", url);

        let response = self
            .client
            .post(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = http_error(status, &body);
            tracing::warn!("POST {} failed: {}", path, error);
            return Err(error);
        }

        response.json::<Resp>().await.map_err(|e| {
            tracing::warn!("POST {} returned an unreadable body: {}", path, e);
            GatewayError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl BarGateway for HttpBarGateway {
    async fn onboard(&self, request: OnboardingRequest) -> Result<OnboardingVerdict, GatewayError> {
        let body = OnboardRequestDto::from(request);
        let dto: OnboardResponseDto = self.post_json(ONBOARD_PATH, &body).await?;
        Ok(dto.into())
    }

    async fn start_session(
        &self,
        anonymous_id: AnonymousId,
    ) -> Result<SessionOpened, GatewayError> {
        let body = SessionStartRequestDto {
            anonymous_id: anonymous_id.into_string(),
        };
        let dto: SessionStartResponseDto = self.post_json(SESSION_START_PATH, &body).await?;
        SessionOpened::try_from(dto)
    }

    async fn send_message(&self, request: ChatRequest) -> Result<ChatReply, GatewayError> {
        let body = MessageRequestDto::from(request);
        let dto: MessageResponseDto = self.post_json(MESSAGE_PATH, &body).await?;
        Ok(dto.into())
    }
}

fn map_reqwest_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_decode() {
        GatewayError::Decode(error.to_string())
    } else {
        GatewayError::Transport(error.to_string())
    }
}

/// Build the error for a non-success response from its raw body.
fn http_error(status: StatusCode, body: &str) -> GatewayError {
    let detail = serde_json::from_str::<ErrorResponseDto>(body)
        .ok()
        .and_then(|dto| dto.detail_text());
    GatewayError::Http {
        status: status.as_u16(),
        detail,
    }
}
