//! # TripRequest — Pedido de Rolê Normalizado
//!
//! Este módulo transforma a entrada bruta do formulário ([`RawTripRequest`])
//! em um pedido **validado e imutável** ([`TripRequest`]), pronto para
//! alimentar o restante do pipeline de geração.
//!
//! ## Fluxo de Normalização
//!
//! ```text
//! RawTripRequest (campos opcionais, texto livre)
//!   ├── 1. Trim + NFC normalize (Unicode) nos textos
//!   ├── 2. Validar campos obrigatórios → RequestIncomplete se faltar
//!   ├── 3. Parsear horários HH:MM (NaiveTime)
//!   ├── 4. Normalizar perfil de pilotagem (default: Moderate)
//!   └── 5. Congelar em TripRequest (imutável)
//! ```
//!
//! ## Campos Obrigatórios vs Opcionais
//!
//! | Campo | Obrigatório? | Observação |
//! |-------|--------------|------------|
//! | `endereco_partida` | Sim | Texto livre |
//! | `horario_saida` / `horario_volta` | Sim | Formato HH:MM |
//! | `tanque_litros` / `consumo_km_l` | Sim | Devem ser > 0 |
//! | `experiencia_desejada` | Sim | Guia a seleção de destinos |
//! | `perfil` | Não | Default: moderado |
//! | `orcamento_brl` | Não | `None` = sem limite |
//!
//! Um pedido incompleto pode existir como [`RawTripRequest`] (ex: preview
//! durante digitação), mas a conversão para [`TripRequest`] rejeita
//! qualquer campo obrigatório ausente com [`RequestIncomplete`].
//!
//! ## Derivados
//!
//! - `available_hours()` — janela de tempo em horas, com **wrap após a
//!   meia-noite**: saída 22:00 e volta 02:00 resultam em 4h, nunca negativo.
//! - `range_km()` — autonomia do tanque: `tanque_litros × consumo_km_l`.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Minutos em um dia — usado para o wrap da janela de tempo após a meia-noite.
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Erro de validação: campos obrigatórios ausentes ou inválidos no envio.
///
/// Retornado por [`TripRequest::from_raw`] quando o formulário é submetido
/// incompleto. Lista **todos** os campos problemáticos de uma vez, para que
/// a camada de apresentação possa destacá-los em conjunto.
///
/// Este erro nunca é "absorvido" pelo pipeline — diferente das falhas do
/// serviço generativo, um pedido incompleto volta direto para quem chamou.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("pedido incompleto — campos obrigatórios ausentes ou inválidos: {}", missing.join(", "))]
pub struct RequestIncomplete {
    /// Nomes dos campos ausentes/inválidos, na ordem do formulário.
    pub missing: Vec<&'static str>,
}

/// Perfil de pilotagem declarado pelo usuário.
///
/// Influencia apenas o **tom narrativo** do prompt (ritmo sugerido, paradas
/// mais ou menos frequentes) — nenhuma fórmula de custo depende dele.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RidingProfile {
    /// Pilotagem tranquila, prioriza paradas e paisagem.
    Conservative,
    /// Meio-termo — o default quando o campo vem vazio ou irreconhecível.
    Moderate,
    /// Ritmo esportivo, curvas e estrada acima de tudo.
    Sporty,
}

impl RidingProfile {
    /// Normaliza o texto do formulário para um perfil.
    ///
    /// Aceita os nomes em português do formulário original e os nomes
    /// canônicos em inglês. Qualquer outro valor (inclusive vazio) cai no
    /// default [`Moderate`](RidingProfile::Moderate) — o perfil é sabor
    /// narrativo, não vale a pena rejeitar o pedido por causa dele.
    pub fn from_form(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("conservador" | "conservative" | "tranquilo") => Self::Conservative,
            Some("esportivo" | "sporty" | "agressivo") => Self::Sporty,
            _ => Self::Moderate,
        }
    }

    /// Descrição curta em PT-BR, usada no prompt.
    pub fn descricao(&self) -> &'static str {
        match self {
            Self::Conservative => "conservador (ritmo tranquilo, mais paradas)",
            Self::Moderate => "moderado (equilíbrio entre estrada e paradas)",
            Self::Sporty => "esportivo (prioriza curvas e ritmo de estrada)",
        }
    }
}

/// Entrada bruta do formulário — tudo opcional, nada validado.
///
/// Espelha o que a camada de formulário envia: strings livres e números
/// possivelmente ausentes. Serve também de formato de entrada JSON do
/// binário de demonstração.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawTripRequest {
    /// Endereço/bairro de partida (texto livre).
    pub endereco_partida: Option<String>,
    /// Horário de saída no formato HH:MM.
    pub horario_saida: Option<String>,
    /// Horário de volta no formato HH:MM.
    pub horario_volta: Option<String>,
    /// Capacidade do tanque em litros.
    pub tanque_litros: Option<f64>,
    /// Consumo médio em km por litro.
    pub consumo_km_l: Option<f64>,
    /// Perfil de pilotagem ("conservador", "moderado", "esportivo").
    pub perfil: Option<String>,
    /// O que o usuário quer viver no rolê (texto livre, guia os destinos).
    pub experiencia_desejada: Option<String>,
    /// Orçamento total em reais, se houver.
    pub orcamento_brl: Option<f64>,
}

/// Pedido de rolê validado e imutável — a unidade de entrada do pipeline.
///
/// Construído exclusivamente via [`TripRequest::from_raw`]. Uma vez
/// construído não muda mais: o orquestrador, o prompt e o gerador de
/// fallback leem os mesmos valores durante toda a geração.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TripRequest {
    /// Endereço de partida, já com trim e normalização Unicode NFC.
    pub start_address: String,
    /// Horário de saída.
    pub departure_time: NaiveTime,
    /// Horário de volta (pode ser "antes" da saída — madrugada do dia seguinte).
    pub return_time: NaiveTime,
    /// Capacidade do tanque em litros (> 0).
    pub tank_capacity_liters: f64,
    /// Consumo em km/L (> 0).
    pub fuel_economy_km_per_liter: f64,
    /// Perfil de pilotagem normalizado.
    pub riding_profile: RidingProfile,
    /// Experiência desejada, normalizada (NFC + trim). Nunca vazia.
    pub desired_experience: String,
    /// Orçamento em reais; `None` significa sem limite declarado.
    pub budget_brl: Option<f64>,
}

impl TripRequest {
    /// Valida e normaliza a entrada bruta do formulário.
    ///
    /// ## Regras
    ///
    /// - Textos passam por trim + normalização Unicode NFC — garante que
    ///   "café" digitado com acento decomposto case igual ao acento
    ///   pré-composto na tabela de destinos.
    /// - Horários devem parsear como `HH:MM` (aceita `HH:MM:SS`).
    /// - Tanque e consumo devem ser números **positivos**.
    /// - Perfil irreconhecível vira [`RidingProfile::Moderate`].
    ///
    /// # Erros
    ///
    /// [`RequestIncomplete`] com a lista completa de campos faltantes —
    /// a validação não para no primeiro problema.
    pub fn from_raw(raw: &RawTripRequest) -> Result<Self, RequestIncomplete> {
        let mut missing: Vec<&'static str> = Vec::new();

        let start_address = normalize_text(raw.endereco_partida.as_deref());
        if start_address.is_empty() {
            missing.push("endereco_partida");
        }

        let departure_time = parse_time(raw.horario_saida.as_deref());
        if departure_time.is_none() {
            missing.push("horario_saida");
        }
        let return_time = parse_time(raw.horario_volta.as_deref());
        if return_time.is_none() {
            missing.push("horario_volta");
        }

        let tank = raw.tanque_litros.filter(|v| *v > 0.0);
        if tank.is_none() {
            missing.push("tanque_litros");
        }
        let economy = raw.consumo_km_l.filter(|v| *v > 0.0);
        if economy.is_none() {
            missing.push("consumo_km_l");
        }

        let desired_experience = normalize_text(raw.experiencia_desejada.as_deref());
        if desired_experience.is_empty() {
            missing.push("experiencia_desejada");
        }

        if !missing.is_empty() {
            return Err(RequestIncomplete { missing });
        }

        Ok(Self {
            start_address,
            departure_time: departure_time.unwrap(),
            return_time: return_time.unwrap(),
            tank_capacity_liters: tank.unwrap(),
            fuel_economy_km_per_liter: economy.unwrap(),
            riding_profile: RidingProfile::from_form(raw.perfil.as_deref()),
            desired_experience,
            budget_brl: raw.orcamento_brl.filter(|v| *v > 0.0),
        })
    }

    /// Janela de tempo disponível, em horas.
    ///
    /// Calculada como `volta − saída`; se negativa, o rolê atravessa a
    /// meia-noite e somamos 24h:
    ///
    /// ```text
    /// saída 08:00, volta 18:00 → 10.0h
    /// saída 22:00, volta 02:00 → 4.0h (wrap, nunca negativo)
    /// ```
    pub fn available_hours(&self) -> f64 {
        let mut minutes = (self.return_time - self.departure_time).num_minutes();
        if minutes < 0 {
            minutes += MINUTES_PER_DAY;
        }
        minutes as f64 / 60.0
    }

    /// Autonomia estimada do tanque em km: `litros × km/L`.
    pub fn range_km(&self) -> f64 {
        self.tank_capacity_liters * self.fuel_economy_km_per_liter
    }

    /// Experiência desejada em minúsculas — forma usada pelos matchers
    /// de palavras-chave (destinos, custos de entrada).
    pub fn experience_lowercase(&self) -> String {
        self.desired_experience.to_lowercase()
    }
}

/// Trim + normalização Unicode NFC de um campo de texto livre.
fn normalize_text(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().nfc().collect()
}

/// Parseia um horário `HH:MM` (ou `HH:MM:SS`) do formulário.
fn parse_time(value: Option<&str>) -> Option<NaiveTime> {
    let value = value?.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Formulário completo de referência usado nos testes.
    fn raw_completo() -> RawTripRequest {
        RawTripRequest {
            endereco_partida: Some("Penha, SP".into()),
            horario_saida: Some("08:00".into()),
            horario_volta: Some("18:00".into()),
            tanque_litros: Some(17.0),
            consumo_km_l: Some(22.0),
            perfil: Some("moderado".into()),
            experiencia_desejada: Some("café da manhã".into()),
            orcamento_brl: None,
        }
    }

    /// Pedido completo normaliza sem erro e deriva janela/autonomia corretas.
    #[test]
    fn test_from_raw_completo() {
        let req = TripRequest::from_raw(&raw_completo()).unwrap();
        assert_eq!(req.start_address, "Penha, SP");
        assert!((req.available_hours() - 10.0).abs() < 1e-9);
        assert!((req.range_km() - 374.0).abs() < 1e-9);
        assert_eq!(req.riding_profile, RidingProfile::Moderate);
        assert!(req.budget_brl.is_none());
    }

    /// Todos os campos obrigatórios ausentes são reportados de uma vez.
    #[test]
    fn test_from_raw_vazio_lista_todos_os_campos() {
        let err = TripRequest::from_raw(&RawTripRequest::default()).unwrap_err();
        assert_eq!(
            err.missing,
            vec![
                "endereco_partida",
                "horario_saida",
                "horario_volta",
                "tanque_litros",
                "consumo_km_l",
                "experiencia_desejada",
            ]
        );
    }

    /// Tanque zero ou negativo conta como campo inválido.
    #[test]
    fn test_tanque_nao_positivo_rejeitado() {
        let mut raw = raw_completo();
        raw.tanque_litros = Some(0.0);
        let err = TripRequest::from_raw(&raw).unwrap_err();
        assert_eq!(err.missing, vec!["tanque_litros"]);
    }

    /// Janela atravessando a meia-noite: 22:00 → 02:00 são 4 horas.
    #[test]
    fn test_available_hours_wrap_meia_noite() {
        let mut raw = raw_completo();
        raw.horario_saida = Some("22:00".into());
        raw.horario_volta = Some("02:00".into());
        let req = TripRequest::from_raw(&raw).unwrap();
        assert!((req.available_hours() - 4.0).abs() < 1e-9);
    }

    /// Perfil irreconhecível não derruba a validação — vira Moderate.
    #[test]
    fn test_perfil_irreconhecivel_vira_moderate() {
        let mut raw = raw_completo();
        raw.perfil = Some("turbo ludicrous".into());
        let req = TripRequest::from_raw(&raw).unwrap();
        assert_eq!(req.riding_profile, RidingProfile::Moderate);
    }

    /// Texto com acento decomposto (NFD) é normalizado para NFC.
    #[test]
    fn test_normalizacao_nfc() {
        let mut raw = raw_completo();
        // "café" com e + combining acute (U+0301)
        raw.experiencia_desejada = Some("cafe\u{0301} da manha\u{0303}".into());
        let req = TripRequest::from_raw(&raw).unwrap();
        assert_eq!(req.desired_experience, "café da manhã");
    }
}
