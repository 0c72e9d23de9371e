//! # Orquestrador — O Coração do Gerador de Rolês
//!
//! O [`Orchestrator`] é o **coração do pipeline** — compõe prompt, cache,
//! chamada generativa, parser, fallback e enriquecimento de imagens em uma
//! única operação: [`generate_role`](Orchestrator::generate_role).
//!
//! ## Máquina de Estados (por chamada)
//!
//! ```text
//! CacheCheck ── hit ──▶ Return
//!   │ miss
//!   ▼
//! Prompting ─▶ Calling ── ok ──▶ Parsing ─▶ Enriching ─▶ Caching ─▶ Return
//!                │ falha                        ▲
//!                └────────▶ Fallback ───────────┘
//! ```
//!
//! Estados terminais: `Return` (sempre, em operação normal) ou um
//! [`GenerationError`] propagado — só possível com a tabela de destinos
//! vazia, ou seja, configuração quebrada.
//!
//! ## Política de Falhas
//!
//! | Falha | Tratamento |
//! |-------|------------|
//! | Rede/upstream na chamada generativa | Fallback direto (sem parse) |
//! | JSON malformado / shape errado | Fallback dentro do parser |
//! | Busca de imagem | Placeholder por item, nunca propaga |
//! | Tabela de destinos vazia | [`GenerationError`] ao chamador |
//!
//! Nenhuma falha transitória chega à camada de apresentação — o contrato
//! é "sempre sai *algo* utilizável".
//!
//! ## Estado do Serviço (sem globals)
//!
//! O orquestrador é um objeto de serviço: cache e mapa de chamadas em
//! andamento vivem **dentro** dele, não em estado de módulo. O mapa de
//! chamadas em andamento coalesce pedidos concorrentes com o mesmo
//! fingerprint: o segundo chamador espera o primeiro terminar e então
//! encontra o resultado já no cache — no máximo uma chamada ao vivo por
//! chave por vez.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::cache::ResponseCache;
use crate::client::GenerativeClient;
use crate::core::{Suggestion, TripRequest};
use crate::fallback::{FallbackGenerator, GenerationError};
use crate::images::{ImageLookup, PLACEHOLDER_IMAGE};
use crate::parser::ResponseParser;
use crate::prompt::build_prompt;

/// Serviço de geração de rolês — um por sessão/aplicação.
///
/// Compartilhável entre chamadas concorrentes (`&self` em tudo); as
/// capacidades externas chegam injetadas via `Arc<dyn ...>`, o que deixa
/// os testes trocarem transporte real por mocks.
pub struct Orchestrator {
    /// Capacidade generativa injetada (caixa-preta).
    client: Arc<dyn GenerativeClient>,
    /// Busca de imagem injetada (melhor-esforço).
    images: Arc<dyn ImageLookup>,
    /// Parser estrito-então-fallback da resposta ao vivo.
    parser: ResponseParser,
    /// Gerador determinístico offline.
    fallback: FallbackGenerator,
    /// Cache de sessão por fingerprint.
    cache: ResponseCache,
    /// Locks por chave para coalescer chamadas concorrentes iguais.
    in_flight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl Orchestrator {
    /// Cria o serviço com parser, fallback e cache default.
    pub fn new(client: Arc<dyn GenerativeClient>, images: Arc<dyn ImageLookup>) -> Self {
        Self {
            client,
            images,
            parser: ResponseParser::new(),
            fallback: FallbackGenerator::new(),
            cache: ResponseCache::new(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Substitui o gerador de fallback (outra tabela de destinos).
    pub fn with_fallback(mut self, fallback: FallbackGenerator) -> Self {
        self.fallback = fallback;
        self
    }

    /// Substitui o cache (ex: TTL curta em testes).
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = cache;
        self
    }

    /// Gera (ou reaproveita) a lista de sugestões para um pedido.
    ///
    /// Resolve mesmo quando a chamada ao vivo falha — o fallback cobre
    /// qualquer falha transitória. A lista volta como `Arc` porque pode
    /// ser a mesma alocação servida do cache para vários chamadores:
    /// trate como imutável.
    ///
    /// # Erros
    ///
    /// [`GenerationError`] apenas se o próprio fallback não consegue
    /// produzir saída (tabela de destinos vazia).
    pub async fn generate_role(
        &self,
        request: &TripRequest,
    ) -> Result<Arc<Vec<Suggestion>>, GenerationError> {
        let prompt = build_prompt(request);
        let key = ResponseCache::make_key(&prompt, request);

        // Caminho rápido: hit direto, sem suspender.
        if let Some(hit) = self.cache.get(&key) {
            info!(key = %key, "Cache hit, sem chamada ao vivo");
            return Ok(hit);
        }

        // Coalescência: um lock por chave. Quem chegar enquanto a chave
        // está em voo espera aqui e revalida o cache ao acordar.
        let key_lock = {
            let mut map = self.in_flight.lock();
            map.entry(key.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let _guard = key_lock.lock().await;

        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, "Cache preenchido por chamada coalescida");
            return Ok(hit);
        }

        let generated = match self.client.generate(&prompt).await {
            Ok(raw_text) => self.parser.parse(&raw_text, request, &self.fallback),
            Err(e) => {
                // Falha de transporte pula o parser: fallback direto.
                warn!(error = %e, "Chamada generativa falhou, gerando offline");
                self.fallback.generate(request)
            }
        };
        let suggestions = match generated {
            Ok(suggestions) => suggestions,
            Err(e) => {
                // Erro estrutural também libera a chave em voo.
                self.in_flight.lock().remove(&key);
                return Err(e);
            }
        };

        let suggestions = self.enrich_images(suggestions).await;

        let shared = Arc::new(suggestions);
        self.cache.set(key.clone(), shared.clone());
        self.in_flight.lock().remove(&key);

        info!(count = shared.len(), "Geração concluída");
        Ok(shared)
    }

    /// Enriquecimento de imagens: fan-out concorrente, join único.
    ///
    /// As buscas são independentes e insensíveis à ordem; cada uma degrada
    /// individualmente para o placeholder — uma busca lenta ou quebrada
    /// não derruba nem atrasa a atribuição das demais além do join.
    async fn enrich_images(&self, mut suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
        let lookups = suggestions.iter().map(|s| {
            let query = s
                .stops
                .first()
                .map(|stop| stop.name.clone())
                .unwrap_or_else(|| s.title.clone());
            async move {
                match self.images.fetch(&query).await {
                    Ok(url) => url,
                    Err(e) => {
                        warn!(error = %e, query = %query, "Busca de imagem falhou, usando placeholder");
                        PLACEHOLDER_IMAGE.to_string()
                    }
                }
            }
        });

        let urls = join_all(lookups).await;
        for (suggestion, url) in suggestions.iter_mut().zip(urls) {
            suggestion.image_url = Some(url);
        }
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::core::{RawTripRequest, Tier};
    use crate::fallback::destinations::DestinationTable;
    use crate::images::ImageLookupError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Cliente de mentira: conta chamadas e devolve payload fixo ou falha.
    struct MockClient {
        calls: AtomicUsize,
        payload: Option<String>,
        delay: Option<Duration>,
    }

    impl MockClient {
        fn ok(payload: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                payload: Some(payload.to_string()),
                delay: None,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                payload: None,
                delay: None,
            }
        }

        fn slow(payload: &str, delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                payload: Some(payload.to_string()),
                delay: Some(delay),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeClient for MockClient {
        async fn generate(&self, _prompt: &str) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.payload {
                Some(p) => Ok(p.clone()),
                None => Err(ClientError::Network("mock".to_string())),
            }
        }
    }

    /// Busca de imagem fixa — sempre a mesma URL.
    struct FixedLookup;

    #[async_trait]
    impl ImageLookup for FixedLookup {
        async fn fetch(&self, _query: &str) -> Result<String, ImageLookupError> {
            Ok("https://img.exemplo/fixa.jpg".to_string())
        }
    }

    /// Busca de imagem quebrada — falha sempre.
    struct BrokenLookup;

    #[async_trait]
    impl ImageLookup for BrokenLookup {
        async fn fetch(&self, _query: &str) -> Result<String, ImageLookupError> {
            Err(ImageLookupError("mock quebrado".to_string()))
        }
    }

    fn request_exemplo() -> TripRequest {
        TripRequest::from_raw(&RawTripRequest {
            endereco_partida: Some("Penha, SP".into()),
            horario_saida: Some("08:00".into()),
            horario_volta: Some("18:00".into()),
            tanque_litros: Some(17.0),
            consumo_km_l: Some(22.0),
            perfil: Some("moderado".into()),
            experiencia_desejada: Some("café da manhã".into()),
            orcamento_brl: None,
        })
        .unwrap()
    }

    const PAYLOAD_VALIDO: &str =
        r#"Segue o roteiro: {"sugestoes":[{"nome":"Holambra","endereco":"Portal de Entrada","porquePerfeito":"opção econômica"}]}"#;

    /// Caminho feliz: parse da resposta ao vivo + imagem atribuída.
    #[tokio::test]
    async fn test_caminho_feliz_parse_e_imagem() {
        let client = Arc::new(MockClient::ok(PAYLOAD_VALIDO));
        let orch = Orchestrator::new(client.clone(), Arc::new(FixedLookup));
        let result = orch.generate_role(&request_exemplo()).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Holambra");
        assert_eq!(result[0].tier, Tier::Economic);
        assert_eq!(
            result[0].image_url.as_deref(),
            Some("https://img.exemplo/fixa.jpg")
        );
    }

    /// Dentro da TTL, o mesmo pedido chama o cliente no máximo uma vez.
    #[tokio::test]
    async fn test_cache_evita_segunda_chamada() {
        let client = Arc::new(MockClient::ok(PAYLOAD_VALIDO));
        let orch = Orchestrator::new(client.clone(), Arc::new(FixedLookup));
        let req = request_exemplo();

        let primeira = orch.generate_role(&req).await.unwrap();
        let segunda = orch.generate_role(&req).await.unwrap();

        assert_eq!(client.call_count(), 1);
        // Mesma alocação compartilhada, não uma cópia.
        assert!(Arc::ptr_eq(&primeira, &segunda));
    }

    /// Com a TTL zerada toda entrada nasce vencida: a expiração faz o
    /// pedido voltar ao cliente em vez de reaproveitar o cache.
    #[tokio::test]
    async fn test_ttl_expirada_reinvoca_cliente() {
        let client = Arc::new(MockClient::ok(PAYLOAD_VALIDO));
        let orch = Orchestrator::new(client.clone(), Arc::new(FixedLookup))
            .with_cache(ResponseCache::with_ttl(Duration::ZERO));
        let req = request_exemplo();

        let _ = orch.generate_role(&req).await.unwrap();
        let _ = orch.generate_role(&req).await.unwrap();
        assert_eq!(client.call_count(), 2);
    }

    /// Falha de rede: fallback direto (parser nem é consultado), e o
    /// resultado ainda é cacheado sob a chave do pedido.
    #[tokio::test]
    async fn test_falha_de_rede_usa_fallback_e_cacheia() {
        let client = Arc::new(MockClient::failing());
        let orch = Orchestrator::new(client.clone(), Arc::new(FixedLookup));
        let req = request_exemplo();

        let result = orch.generate_role(&req).await.unwrap();
        assert_eq!(result.len(), 3);
        let tiers: Vec<Tier> = result.iter().map(|s| s.tier).collect();
        assert_eq!(tiers, vec![Tier::Economic, Tier::Balanced, Tier::Premium]);

        // Segunda chamada vem do cache: o cliente quebrado não é re-tentado.
        let _ = orch.generate_role(&req).await.unwrap();
        assert_eq!(client.call_count(), 1);
    }

    /// Busca de imagem quebrada degrada para o placeholder, por item.
    #[tokio::test]
    async fn test_imagem_quebrada_vira_placeholder() {
        let client = Arc::new(MockClient::failing());
        let orch = Orchestrator::new(client, Arc::new(BrokenLookup));
        let result = orch.generate_role(&request_exemplo()).await.unwrap();

        for s in result.iter() {
            assert_eq!(s.image_url.as_deref(), Some(PLACEHOLDER_IMAGE));
        }
    }

    /// Tabela de destinos vazia + chamada ao vivo quebrada: o único caso
    /// em que o erro chega ao chamador.
    #[tokio::test]
    async fn test_tabela_vazia_propaga_erro() {
        let orch = Orchestrator::new(Arc::new(MockClient::failing()), Arc::new(FixedLookup))
            .with_fallback(FallbackGenerator::with_table(DestinationTable::empty()));
        let err = orch.generate_role(&request_exemplo()).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyDestinationTable(_)));
    }

    /// Dois pedidos idênticos em voo ao mesmo tempo coalescem: uma única
    /// chamada ao vivo, o segundo chamador encontra o cache preenchido.
    #[tokio::test]
    async fn test_chamadas_concorrentes_coalescem() {
        let client = Arc::new(MockClient::slow(PAYLOAD_VALIDO, Duration::from_millis(50)));
        let orch = Orchestrator::new(client.clone(), Arc::new(FixedLookup));
        let req = request_exemplo();

        let (a, b) = tokio::join!(orch.generate_role(&req), orch.generate_role(&req));
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(client.call_count(), 1);
    }
}
