//! # Módulo Core — Tipos Fundamentais do Domínio
//!
//! Este módulo agrupa os **tipos fundamentais** do Gerador de Rolês.
//! Todo o pipeline gira em torno deles:
//!
//! - [`TripRequest`] — pedido de rolê validado e imutável (entrada)
//! - [`RawTripRequest`] — entrada bruta do formulário, ainda sem validação
//! - [`RidingProfile`] — perfil de pilotagem (sabor narrativo do prompt)
//! - [`Suggestion`] — registro canônico de um rolê sugerido (saída)
//! - [`Stop`] — uma parada dentro do roteiro
//! - [`Costs`] — decomposição de custos com total derivado por construção
//! - [`Tier`] / [`Difficulty`] — classificações de custo e de trajeto
//!
//! ## Ciclo de Vida
//!
//! ```text
//! formulário → RawTripRequest ──from_raw──▶ TripRequest (imutável)
//!                                               │
//!                                               ▼ pipeline de geração
//!                                  Vec<Suggestion> (imutável, cacheável)
//! ```
//!
//! Um [`TripRequest`] nasce por submissão do usuário e não muda mais.
//! As [`Suggestion`]s nascem uma vez por geração (ao vivo ou fallback) e
//! podem ser devolvidas por referência várias vezes pelo cache — nunca
//! mutadas depois de prontas.

/// Sub-módulo com [`TripRequest`], [`RawTripRequest`] e a validação do formulário.
pub mod request;

/// Sub-módulo com [`Suggestion`], [`Stop`], [`Costs`], [`Tier`] e [`Difficulty`].
pub mod suggestion;

// Re-exports para conveniência — permite usar `crate::core::TripRequest` diretamente.
pub use request::{RawTripRequest, RequestIncomplete, RidingProfile, TripRequest};
pub use suggestion::{Costs, Difficulty, Stop, Suggestion, Tier};
