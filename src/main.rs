#![allow(dead_code, unused_imports)]
#![allow(rustdoc::broken_intra_doc_links, rustdoc::invalid_html_tags)]
//! # Gerador de Rolês — Roteiros de Moto com IA
//!
//! **Ponto de entrada** do gerador de roteiros de moto ("rolês") para a
//! região de São Paulo.
//!
//! O binário é uma demonstração de linha de comando do pipeline: recebe um
//! pedido em JSON, gera as sugestões (ao vivo via API generativa, ou
//! offline via fallback determinístico) e imprime o resultado em JSON. A
//! renderização dos cards é responsabilidade de outra camada — aqui só
//! existe o pipeline.
//!
//! ## Fluxo de Execução
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging (RUST_LOG)
//!   ├── Lê o pedido: stdin (JSON) ou --exemplo (embutido)
//!   ├── Valida/normaliza → TripRequest
//!   ├── Escolhe o transporte:
//!   │   ├── GEMINI_API_KEY presente → GeminiClient (geração ao vivo)
//!   │   └── ausente → OfflineClient (só fallback determinístico)
//!   ├── Monta o Orchestrator (parser + fallback + cache + imagens)
//!   └── generate_role() → imprime Vec<Suggestion> em JSON
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Com o pedido de exemplo embutido, modo offline
//! cargo run -- --exemplo
//!
//! # Com geração ao vivo e logs detalhados
//! GEMINI_API_KEY=... RUST_LOG=debug cargo run -- --exemplo
//!
//! # Com um pedido próprio via stdin
//! cat pedido.json | cargo run
//! ```

// Declaração dos módulos da aplicação.
// Cada módulo corresponde a uma camada do pipeline:

/// Módulo `core` — tipos fundamentais: TripRequest, Suggestion, Stop, Costs.
mod core;

/// Módulo `prompt` — renderização determinística do prompt generativo.
mod prompt;

/// Módulo `client` — capacidade generativa abstrata e transportes (Gemini/offline).
mod client;

/// Módulo `images` — busca de imagem melhor-esforço para os cards.
mod images;

/// Módulo `parser` — parse estrito-então-fallback da resposta ao vivo.
mod parser;

/// Módulo `fallback` — geração determinística offline (3 tiers).
mod fallback;

/// Módulo `cache` — cache de sessão por fingerprint com TTL.
mod cache;

/// Módulo `orchestrator` — compõe tudo em `generate_role`.
mod orchestrator;

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::client::{GeminiClient, GenerativeClient, OfflineClient};
use crate::core::{RawTripRequest, TripRequest};
use crate::images::UnsplashLookup;
use crate::orchestrator::Orchestrator;

/// Função principal do Gerador de Rolês.
///
/// Lê um pedido, monta o orquestrador com o transporte disponível e
/// imprime as sugestões geradas. O processo sai com erro apenas para
/// pedido inválido ([`RequestIncomplete`](crate::core::RequestIncomplete))
/// ou configuração quebrada — falha da API generativa degrada para o
/// roteiro offline, nunca derruba a execução.
#[tokio::main]
async fn main() -> Result<()> {
    // Configura o sistema de logging/tracing.
    // Aceita a variável de ambiente RUST_LOG para configurar o nível.
    // Exemplo: RUST_LOG=debug cargo run
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🏍️ Gerador de Rolês — Starting...");

    // Pedido: exemplo embutido ou JSON da entrada padrão.
    let raw: RawTripRequest = if std::env::args().any(|arg| arg == "--exemplo") {
        sample_request()
    } else {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Falha ao ler o pedido da entrada padrão")?;
        serde_json::from_str(&input).context("A entrada não é um pedido em JSON válido")?
    };

    // Valida e normaliza — pedido incompleto volta como erro direto.
    let request = TripRequest::from_raw(&raw)?;
    tracing::info!(
        partida = %request.start_address,
        horas = request.available_hours(),
        autonomia_km = request.range_km(),
        "Pedido validado"
    );

    // Transporte: ao vivo com chave de API, offline sem ela. No modo
    // offline toda geração vem do fallback determinístico — o contrato
    // "sempre sai algo" continua valendo.
    let client: Arc<dyn GenerativeClient> = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            tracing::info!("Chave de API encontrada — geração ao vivo habilitada");
            Arc::new(GeminiClient::new(key))
        }
        _ => {
            tracing::warn!("GEMINI_API_KEY ausente — modo offline (somente fallback)");
            Arc::new(OfflineClient)
        }
    };

    let orchestrator = Orchestrator::new(client, Arc::new(UnsplashLookup));
    let suggestions = orchestrator.generate_role(&request).await?;

    tracing::info!(count = suggestions.len(), "✅ Rolês gerados!");
    println!("{}", serde_json::to_string_pretty(&*suggestions)?);

    Ok(())
}

/// Pedido de exemplo embutido — o clássico sábado de sol saindo da Penha.
fn sample_request() -> RawTripRequest {
    RawTripRequest {
        endereco_partida: Some("Penha, São Paulo - SP".to_string()),
        horario_saida: Some("08:00".to_string()),
        horario_volta: Some("18:00".to_string()),
        tanque_litros: Some(17.0),
        consumo_km_l: Some(22.0),
        perfil: Some("moderado".to_string()),
        experiencia_desejada: Some("café da manhã na serra e estrada de curvas".to_string()),
        orcamento_brl: Some(300.0),
    }
}
