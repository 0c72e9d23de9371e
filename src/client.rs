//! # GenerativeClient — A Capacidade de Geração de Texto
//!
//! O pipeline consome a geração de texto como uma **capacidade abstrata**
//! injetada: [`GenerativeClient::generate`] recebe o prompt e devolve o
//! texto bruto do modelo. O core trata essa capacidade como caixa-preta —
//! pode devolver JSON válido embrulhado em prosa, JSON malformado, ou
//! falhar — e **nunca** tenta de novo por conta própria: qualquer falha
//! vira rota de fallback no orquestrador.
//!
//! ## Implementações
//!
//! | Tipo | Uso |
//! |------|-----|
//! | [`GeminiClient`] | Transporte real (API generativa do Google) |
//! | [`OfflineClient`] | Sem chave de API — falha sempre, forçando o fallback |
//!
//! Retry com backoff, se desejado, é responsabilidade do transporte — não
//! deste módulo nem do orquestrador.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Endpoint da API generativa (modelo interpolado na URL).
const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Modelo default quando nenhum é configurado.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Timeout do transporte HTTP — geração de roteiro é lenta, mas não tanto.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Falhas da capacidade generativa, do ponto de vista do core.
///
/// O orquestrador converte qualquer uma delas em invocação do gerador de
/// fallback — nenhuma chega crua à camada de apresentação.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Falha de transporte (DNS, conexão, timeout, corpo ilegível).
    #[error("falha de rede ao chamar o serviço generativo: {0}")]
    Network(String),

    /// O serviço respondeu, mas com status de erro.
    #[error("o serviço generativo respondeu com status {0}")]
    Upstream(u16),
}

/// Capacidade abstrata de geração de texto a partir de um prompt.
///
/// Implementações devem ser `Send + Sync` — o orquestrador as compartilha
/// entre chamadas concorrentes via `Arc`.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Gera texto livre a partir do prompt. O chamador não assume nada
    /// sobre o formato do retorno — o parser é quem dá forma.
    async fn generate(&self, prompt: &str) -> Result<String, ClientError>;
}

/// Cliente HTTP da API generativa do Google (`generateContent`).
///
/// A chave vai no header `x-goog-api-key`; o corpo segue o formato
/// `{"contents": [{"parts": [{"text": prompt}]}]}` e o texto do modelo
/// sai de `candidates[0].content.parts[0].text`.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Cria o cliente com o modelo default.
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    /// Cria o cliente com um modelo específico (ex: variante mais barata).
    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ClientError> {
        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model);
        let body = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        debug!(model = %self.model, prompt_chars = prompt.len(), "Chamando serviço generativo");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Serviço generativo respondeu com erro");
            return Err(ClientError::Upstream(status.as_u16()));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        // Caminho feliz: texto do primeiro candidato. Se o shape vier
        // diferente, devolvemos o corpo inteiro — o parser sabe se virar
        // com texto arbitrário (e o fallback cobre o resto).
        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .unwrap_or_else(|| payload.to_string());

        debug!(response_chars = text.len(), "Resposta do serviço generativo recebida");
        Ok(text)
    }
}

/// Cliente de modo offline — falha em toda chamada.
///
/// Usado quando não há `GEMINI_API_KEY` configurada: o orquestrador trata
/// a falha como qualquer outra e entrega o roteiro determinístico do
/// gerador de fallback. Útil também em testes.
pub struct OfflineClient;

#[async_trait]
impl GenerativeClient for OfflineClient {
    async fn generate(&self, _prompt: &str) -> Result<String, ClientError> {
        Err(ClientError::Network(
            "modo offline: nenhuma chave de API configurada".to_string(),
        ))
    }
}
