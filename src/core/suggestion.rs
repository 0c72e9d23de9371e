//! # Suggestion — O Registro Canônico de um Rolê
//!
//! Tipos que formam a **saída** do pipeline: cada geração (ao vivo ou
//! fallback) produz uma lista de [`Suggestion`], a unidade que a camada de
//! apresentação renderiza como card.
//!
//! ## Os Três Tiers
//!
//! Toda sugestão carrega um [`Tier`] — classificação de custo/qualidade:
//!
//! | Tier | Rótulo | Caráter |
//! |------|--------|---------|
//! | `Economic` | Econômico | Perto de casa, gasto mínimo |
//! | `Balanced` | Equilibrado | Meio-termo distância/custo |
//! | `Premium` | Premium | Destino marcante, gasto maior |
//!
//! ## Invariante de Custos
//!
//! [`Costs`] só pode ser construído via [`Costs::new`], que **recalcula**
//! o total como `fuel + food + entry_fees + other`. Assim o invariante
//! `total == soma das partes` vale por construção, independente da origem
//! (parser ou fallback).
//!
//! ## Imutabilidade
//!
//! Sugestões são construídas uma única vez por geração e compartilhadas
//! por referência (`Arc`) enquanto viverem no cache — quem recebe a lista
//! não deve (e, sem `mut`, não consegue) alterá-la.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classificação de custo/qualidade de uma sugestão.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Rolê barato e próximo.
    Economic,
    /// Meio-termo — o default quando a origem não declara tier.
    Balanced,
    /// Destino marcante, custo mais alto.
    Premium,
}

impl Tier {
    /// Os três tiers na ordem canônica de exibição.
    pub const ALL: [Tier; 3] = [Tier::Economic, Tier::Balanced, Tier::Premium];

    /// Rótulo em PT-BR para títulos e textos voltados ao usuário.
    pub fn rotulo(&self) -> &'static str {
        match self {
            Tier::Economic => "Econômico",
            Tier::Balanced => "Equilibrado",
            Tier::Premium => "Premium",
        }
    }
}

/// Dificuldade estimada do trajeto (distância, serra, tempo de sela).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    /// Trajeto curto, urbano ou rodovia tranquila.
    Easy,
    /// Exige alguma experiência — distância média ou trechos de serra.
    Moderate,
    /// Longa distância e/ou estrada exigente.
    Hard,
}

impl Difficulty {
    /// Deriva a dificuldade da distância total do rolê.
    ///
    /// Faixas: `< 100 km` → Easy, `≤ 200 km` → Moderate, acima → Hard.
    pub fn from_distance_km(distance_km: f64) -> Self {
        if distance_km < 100.0 {
            Difficulty::Easy
        } else if distance_km <= 200.0 {
            Difficulty::Moderate
        } else {
            Difficulty::Hard
        }
    }
}

/// Decomposição de custos de um rolê, tudo em reais (BRL).
///
/// Construa sempre via [`Costs::new`] — o `total` é derivado, nunca
/// informado de fora.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Costs {
    /// Combustível estimado.
    pub fuel: f64,
    /// Alimentação (refeição ou lanche, conforme a janela de tempo).
    pub food: f64,
    /// Entradas/ingressos de atrações.
    pub entry_fees: f64,
    /// Outros (pedágio, serviços extras).
    pub other: f64,
    /// Soma das quatro componentes — derivado em [`Costs::new`].
    pub total: f64,
}

impl Costs {
    /// Constrói o registro de custos recalculando o total.
    pub fn new(fuel: f64, food: f64, entry_fees: f64, other: f64) -> Self {
        Self {
            fuel,
            food,
            entry_fees,
            other,
            total: fuel + food + entry_fees + other,
        }
    }

    /// Verifica o invariante `total == fuel + food + entry_fees + other`
    /// com tolerância de ponto flutuante.
    pub fn is_consistent(&self) -> bool {
        (self.total - (self.fuel + self.food + self.entry_fees + self.other)).abs() < 1e-6
    }
}

/// Uma parada dentro do roteiro sugerido.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stop {
    /// Nome do lugar (ex: "Paranapiacaba").
    pub name: String,
    /// Endereço ou referência de chegada.
    pub address: String,
    /// Distância desde a parada anterior (ou desde a partida), em km.
    pub distance_from_prev_km: f64,
    /// Horário estimado de chegada.
    pub arrival_time: NaiveTime,
    /// Tempo planejado de permanência, em minutos.
    pub dwell_minutes: u32,
    /// Descrição curta do que fazer ali.
    pub description: String,
    /// Gasto estimado na parada, em reais.
    pub estimated_cost_brl: f64,
    /// Dicas específicas para quem chega de moto.
    pub rider_tips: Vec<String>,
}

/// Registro canônico de uma sugestão de rolê — a unidade renderizada.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Suggestion {
    /// Identificador estável do card (v4, gerado na construção).
    pub id: Uuid,
    /// Classificação de custo/qualidade.
    pub tier: Tier,
    /// Título do card (ex: "Rolê Premium: Campos do Jordão").
    pub title: String,
    /// Resumo de uma ou duas frases do porquê do roteiro.
    pub summary: String,
    /// Distância total somando todas as pernas, em km.
    pub total_distance_km: f64,
    /// Duração total estimada (deslocamento + permanências), em horas.
    pub total_duration_hours: f64,
    /// Dificuldade estimada do trajeto.
    pub difficulty: Difficulty,
    /// Paradas em ordem de visita — nunca vazio.
    pub stops: Vec<Stop>,
    /// Decomposição de custos com total derivado.
    pub costs: Costs,
    /// Observações condicionais (casaco na serra etc.) — no máximo 4.
    pub notes: Vec<String>,
    /// Imagem do destino, preenchida pelo enriquecimento pós-geração.
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// O total é sempre a soma das quatro componentes.
    #[test]
    fn test_costs_total_derivado() {
        let c = Costs::new(45.0, 70.0, 25.0, 30.0);
        assert!((c.total - 170.0).abs() < 1e-9);
        assert!(c.is_consistent());
    }

    /// Componentes zeradas continuam consistentes (null vira 0 no parser).
    #[test]
    fn test_costs_zerados() {
        let c = Costs::new(0.0, 0.0, 0.0, 0.0);
        assert!((c.total - 0.0).abs() < 1e-9);
        assert!(c.is_consistent());
    }

    /// Faixas de dificuldade por distância.
    #[test]
    fn test_difficulty_faixas() {
        assert_eq!(Difficulty::from_distance_km(40.0), Difficulty::Easy);
        assert_eq!(Difficulty::from_distance_km(150.0), Difficulty::Moderate);
        assert_eq!(Difficulty::from_distance_km(260.0), Difficulty::Hard);
    }

    /// Tier serializa nos nomes canônicos em caixa alta.
    #[test]
    fn test_tier_serializacao() {
        assert_eq!(serde_json::to_string(&Tier::Economic).unwrap(), "\"ECONOMIC\"");
        assert_eq!(serde_json::to_string(&Tier::Balanced).unwrap(), "\"BALANCED\"");
        assert_eq!(serde_json::to_string(&Tier::Premium).unwrap(), "\"PREMIUM\"");
    }
}
