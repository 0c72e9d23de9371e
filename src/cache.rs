//! # ResponseCache — Cache de Sessão por Fingerprint
//!
//! Cache em memória que evita repetir a chamada generativa quando o mesmo
//! pedido volta dentro da janela de validade (30 minutos). Vive só
//! enquanto o processo vive — nada é persistido.
//!
//! ## O Fingerprint
//!
//! A chave é derivada de um prefixo do prompt mais três campos do pedido
//! (endereço de partida, experiência desejada, orçamento), codificada em
//! base64 e **truncada em 20 caracteres**. É uma impressão digital
//! heurística, não um hash resistente a colisões: dois pedidos distintos
//! podem colidir. Aceitável — no pior caso o usuário recebe um roteiro
//! "requentado" de outro pedido parecido, limitado pela TTL de 30 minutos
//! e sem nenhuma consequência além dessa.
//!
//! ## Expiração
//!
//! A TTL é checada **na leitura** (lazy): entrada vencida é removida e o
//! lookup vira miss. Não há varredura proativa nem limite de capacidade —
//! o mapa vive uma sessão e morre com o processo.
//!
//! Os métodos `*_at` recebem o instante explicitamente para que os testes
//! reproduzam os cenários de 29/31 minutos sem dormir de verdade.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::RwLock;
use tracing::debug;

use crate::core::{Suggestion, TripRequest};

/// Janela de validade de uma entrada do cache.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Tamanho do prefixo do prompt que entra no fingerprint, em caracteres.
const PROMPT_PREFIX_CHARS: usize = 40;

/// Tamanho final da chave após o truncamento do base64.
const KEY_CHARS: usize = 20;

/// Uma entrada armazenada: a lista compartilhável e o instante da escrita.
struct CacheEntry {
    suggestions: Arc<Vec<Suggestion>>,
    stored_at: Instant,
}

/// Cache de sugestões por fingerprint do pedido.
///
/// Interior mutability via `RwLock` — o orquestrador compartilha o cache
/// entre chamadas concorrentes sem `&mut`.
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    /// Cria o cache com a TTL padrão de 30 minutos.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Cria o cache com TTL customizada (testes, tuning).
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Deriva o fingerprint de um pedido + prompt.
    ///
    /// Prefixo do prompt (40 chars) + partida + experiência + orçamento,
    /// base64, truncado em 20 caracteres. Determinístico; colisões
    /// possíveis e aceitas (ver doc do módulo).
    pub fn make_key(prompt: &str, request: &TripRequest) -> String {
        let prefix: String = prompt.chars().take(PROMPT_PREFIX_CHARS).collect();
        let budget = match request.budget_brl {
            Some(b) => format!("{:.0}", b),
            None => "sem-orcamento".to_string(),
        };
        let raw = format!(
            "{}|{}|{}|{}",
            prefix, request.start_address, request.desired_experience, budget
        );
        BASE64.encode(raw.as_bytes()).chars().take(KEY_CHARS).collect()
    }

    /// Lookup com o relógio de verdade.
    pub fn get(&self, key: &str) -> Option<Arc<Vec<Suggestion>>> {
        self.get_at(key, Instant::now())
    }

    /// Lookup com instante explícito — entrada vencida é removida (lazy)
    /// e o resultado é miss.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<Arc<Vec<Suggestion>>> {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.stored_at) < self.ttl => {
                debug!(key, "Cache hit");
                Some(entry.suggestions.clone())
            }
            Some(_) => {
                debug!(key, "Cache expirado, removendo");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Armazena com o relógio de verdade.
    pub fn set(&self, key: String, suggestions: Arc<Vec<Suggestion>>) {
        self.set_at(key, suggestions, Instant::now());
    }

    /// Armazena com instante explícito. No máximo uma entrada por chave —
    /// escrita nova substitui a anterior.
    pub fn set_at(&self, key: String, suggestions: Arc<Vec<Suggestion>>, now: Instant) {
        self.entries.write().insert(
            key,
            CacheEntry {
                suggestions,
                stored_at: now,
            },
        );
    }

    /// Quantidade de entradas vivas ou vencidas ainda não varridas.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// `true` se o cache não tem nenhuma entrada.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
