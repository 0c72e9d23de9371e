//! # FallbackGenerator — Geração Determinística Offline
//!
//! O plano B do pipeline: quando a chamada generativa falha ou devolve
//! texto inutilizável, este módulo sintetiza **exatamente 3 sugestões**
//! (uma por [`Tier`]) a partir da tabela estática de destinos — sem rede,
//! sem aleatoriedade, mesmo pedido produz o mesmo roteiro.
//!
//! ## Pipeline de Síntese (por tier)
//!
//! ```text
//! tabela do tier
//!   ├── 1. Partição estável: destinos cujas tags casam com a
//!   │      experiência desejada vêm primeiro (ordem original preservada
//!   │      dentro de cada grupo — não é ordenação completa)
//!   ├── 2. Corte pela janela de tempo: ≤4h → 1 parada, ≤6h → 2,
//!   │      ≤8h → 3, acima → todas as do tier
//!   ├── 3. Agenda: relógio caminha da saída somando deslocamento
//!   │      (60 km/h, minutos arredondados para cima) + permanência
//!   ├── 4. Custos: síntese por fórmula (combustível, comida por tier,
//!   │      entradas condicionais, pedágio acima de 150 km)
//!   └── 5. Observações condicionais (serra, litoral, horários, janela)
//! ```
//!
//! ## Garantia Central
//!
//! [`FallbackGenerator::generate`] só falha se a tabela de destinos do
//! tier estiver **vazia** — erro de configuração, não de execução. Com a
//! tabela default embutida, a geração sempre sucede; é isso que permite ao
//! parser e ao orquestrador prometerem "nunca lista vazia" ao chamador.

/// Sub-módulo com a tabela estática de destinos e distâncias entre pares.
pub mod destinations;

use chrono::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::core::{Costs, Difficulty, Stop, Suggestion, Tier, TripRequest};
use destinations::{distance_between, Destination, DestinationTable};

/// Preço do litro de gasolina assumido na síntese de custos, em reais.
const FUEL_PRICE_PER_LITER: f64 = 6.60;

/// Consumo assumido quando o valor do pedido não é utilizável, em km/L.
const DEFAULT_FUEL_ECONOMY: f64 = 22.0;

/// Base de alimentação para janelas longas (refeição completa), em reais.
const FULL_MEAL_BASE: f64 = 70.0;

/// Base de alimentação para janelas curtas (lanche), em reais.
const SNACK_BASE: f64 = 25.0;

/// Pedágio estimado para roteiros acima de 150 km, em reais.
const TOLL_SURCHARGE: f64 = 30.0;

/// Sobretaxa de serviços premium (estacionamento, reserva), em reais.
const PREMIUM_SERVICE_SURCHARGE: f64 = 60.0;

/// Velocidade de cruzeiro assumida para estimar deslocamentos, em km/h.
const CRUISE_SPEED_KMH: f64 = 60.0;

/// Palavras da experiência que indicam disposição a pagar entradas.
const PAID_ATTRACTION_KEYWORDS: &[&str] = &["turismo", "aventura", "paisagem"];

/// Falha estrutural da geração — a única que o orquestrador propaga.
///
/// Só acontece com tabela de destinos vazia para algum tier, ou seja,
/// configuração quebrada. Com a tabela default é inalcançável.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// A tabela de destinos não tem nenhuma entrada para o tier.
    #[error("tabela de destinos vazia para o tier {0:?}")]
    EmptyDestinationTable(Tier),
}

/// Gerador determinístico de sugestões a partir da tabela estática.
pub struct FallbackGenerator {
    table: DestinationTable,
}

impl FallbackGenerator {
    /// Cria o gerador com a tabela de destinos embutida.
    pub fn new() -> Self {
        Self::with_table(DestinationTable::default())
    }

    /// Cria o gerador com uma tabela customizada (testes, outra região).
    pub fn with_table(table: DestinationTable) -> Self {
        Self { table }
    }

    /// Sintetiza as 3 sugestões canônicas — uma por tier, nessa ordem.
    ///
    /// Determinístico dado o mesmo pedido e a mesma tabela (os `id`s das
    /// sugestões são a única parte gerada, e não participam de nenhuma
    /// decisão do pipeline).
    ///
    /// # Erros
    ///
    /// [`GenerationError::EmptyDestinationTable`] se algum tier da tabela
    /// estiver vazio.
    pub fn generate(&self, request: &TripRequest) -> Result<Vec<Suggestion>, GenerationError> {
        Tier::ALL
            .iter()
            .map(|tier| self.build_tier(request, *tier))
            .collect()
    }

    /// Monta a sugestão de um tier: seleção, agenda, custos e observações.
    fn build_tier(&self, request: &TripRequest, tier: Tier) -> Result<Suggestion, GenerationError> {
        let entries = self.table.for_tier(tier);
        if entries.is_empty() {
            return Err(GenerationError::EmptyDestinationTable(tier));
        }

        let experience = request.experience_lowercase();
        let ordered = partition_by_experience(entries, &experience);
        let count = stop_count_for_hours(request.available_hours(), ordered.len());
        let selected = &ordered[..count];

        debug!(
            tier = ?tier,
            stops = count,
            first = selected[0].name,
            "Fallback: destinos selecionados"
        );

        // Agenda: o relógio caminha da saída, somando deslocamento e permanência.
        let mut stops = Vec::with_capacity(selected.len());
        let mut clock = request.departure_time;
        let mut elapsed_minutes: i64 = 0;
        let mut total_km = 0.0;
        let mut previous: Option<&Destination> = None;

        for &dest in selected {
            let leg_km = match previous {
                None => dest.distance_from_origin_km,
                Some(prev) => distance_between(prev.name, dest.name),
            };
            let travel_min = travel_minutes(leg_km);
            clock = clock + Duration::minutes(travel_min);
            elapsed_minutes += travel_min;
            total_km += leg_km;

            stops.push(Stop {
                name: dest.name.to_string(),
                address: dest.address.to_string(),
                distance_from_prev_km: leg_km,
                arrival_time: clock,
                dwell_minutes: dest.dwell_minutes,
                description: dest.blurb.to_string(),
                estimated_cost_brl: dest.entry_cost_brl,
                rider_tips: dest.rider_tips.iter().map(|t| t.to_string()).collect(),
            });

            clock = clock + Duration::minutes(dest.dwell_minutes as i64);
            elapsed_minutes += dest.dwell_minutes as i64;
            previous = Some(dest);
        }

        let costs = smart_costs(request, tier, total_km);
        let notes = build_notes(request, selected);
        let first = selected[0];

        Ok(Suggestion {
            id: Uuid::new_v4(),
            tier,
            title: format!("Rolê {}: {}", tier.rotulo(), first.name),
            summary: format!(
                "Roteiro {} com {} parada(s) saindo de {}, montado em torno de \"{}\".",
                tier.rotulo().to_lowercase(),
                stops.len(),
                request.start_address,
                request.desired_experience
            ),
            total_distance_km: total_km,
            total_duration_hours: elapsed_minutes as f64 / 60.0,
            difficulty: Difficulty::from_distance_km(total_km),
            stops,
            costs,
            notes,
            image_url: None,
        })
    }
}

impl Default for FallbackGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Partição **estável** dos destinos pela experiência desejada.
///
/// Destinos com alguma tag que case (substring, nas duas direções) vêm
/// primeiro; os demais vêm depois. A ordem relativa original é preservada
/// dentro de cada grupo — não é uma ordenação completa por relevância.
fn partition_by_experience<'a>(
    entries: &'a [Destination],
    experience_lowercase: &str,
) -> Vec<&'a Destination> {
    let matches = |dest: &&Destination| {
        !experience_lowercase.is_empty()
            && dest.experience_tags.iter().any(|tag| {
                experience_lowercase.contains(tag) || tag.contains(experience_lowercase)
            })
    };

    let mut ordered: Vec<&Destination> = entries.iter().filter(|d| matches(d)).collect();
    ordered.extend(entries.iter().filter(|d| !matches(d)));
    ordered
}

/// Quantidade de paradas permitida pela janela de tempo.
///
/// Faixas: ≤4h → 1, ≤6h → 2, ≤8h → 3, acima → todas as disponíveis.
fn stop_count_for_hours(available_hours: f64, available_entries: usize) -> usize {
    let cap = if available_hours <= 4.0 {
        1
    } else if available_hours <= 6.0 {
        2
    } else if available_hours <= 8.0 {
        3
    } else {
        available_entries
    };
    cap.min(available_entries).max(1)
}

/// Minutos de deslocamento a 60 km/h, arredondados para cima.
fn travel_minutes(distance_km: f64) -> i64 {
    (distance_km / CRUISE_SPEED_KMH * 60.0).ceil() as i64
}

/// Síntese de custos por fórmula — também usada pelo parser quando os
/// custos da resposta ao vivo não são numéricos.
///
/// ```text
/// fuel  = round(km / consumo * 6.60)       consumo inválido → 22 km/L
/// food  = round(base × multiplicador)      base: ≥8h refeição, senão lanche
///                                          mult: 0.7 / 1.0 / 1.8 por tier
/// entry = 0 / 25 / 80 por tier             só se a experiência menciona
///                                          turismo/aventura/paisagem
/// other = pedágio (km > 150) + sobretaxa premium
/// total = soma (garantido por Costs::new)
/// ```
pub fn smart_costs(request: &TripRequest, tier: Tier, distance_km: f64) -> Costs {
    let economy = if request.fuel_economy_km_per_liter > 0.0 {
        request.fuel_economy_km_per_liter
    } else {
        DEFAULT_FUEL_ECONOMY
    };
    let fuel = (distance_km / economy * FUEL_PRICE_PER_LITER).round();

    let food_base = if request.available_hours() >= 8.0 {
        FULL_MEAL_BASE
    } else {
        SNACK_BASE
    };
    let food_multiplier = match tier {
        Tier::Economic => 0.7,
        Tier::Balanced => 1.0,
        Tier::Premium => 1.8,
    };
    let food = (food_base * food_multiplier).round();

    let experience = request.experience_lowercase();
    let wants_paid_attractions = PAID_ATTRACTION_KEYWORDS
        .iter()
        .any(|kw| experience.contains(kw));
    let entry_fees = if wants_paid_attractions {
        match tier {
            Tier::Economic => 0.0,
            Tier::Balanced => 25.0,
            Tier::Premium => 80.0,
        }
    } else {
        0.0
    };

    let mut other = 0.0;
    if distance_km > 150.0 {
        other += TOLL_SURCHARGE;
    }
    if tier == Tier::Premium {
        other += PREMIUM_SERVICE_SURCHARGE;
    }

    Costs::new(fuel, food, entry_fees, other)
}

/// Observações condicionais do roteiro — no máximo 4.
fn build_notes(request: &TripRequest, selected: &[&Destination]) -> Vec<String> {
    let mut notes = Vec::new();

    let has_tag = |wanted: &[&str]| {
        selected.iter().any(|d| {
            d.experience_tags
                .iter()
                .any(|tag| wanted.contains(tag))
        })
    };

    if has_tag(&["montanha", "serra"]) {
        notes.push(
            "Leve um casaco: na serra a temperatura costuma ficar uns 10°C abaixo da capital."
                .to_string(),
        );
    }
    if has_tag(&["praia", "litoral"]) {
        notes.push(
            "Protetor solar e atenção à maresia: lave a moto quando voltar do litoral."
                .to_string(),
        );
    }

    notes.push(format!(
        "Confirme os horários de funcionamento de {} antes de sair.",
        selected[0].name
    ));

    let hours = request.available_hours();
    if hours <= 6.0 {
        notes.push(
            "Janela apertada: siga o roteiro sem desvios para voltar no horário.".to_string(),
        );
    } else if hours >= 10.0 {
        notes.push(
            "Janela folgada: dá para esticar em um mirante ou café no caminho.".to_string(),
        );
    }

    notes.truncate(4);
    notes
}
