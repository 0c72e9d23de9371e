//! # ResponseParser — Do Texto Bruto ao Registro Canônico
//!
//! O serviço generativo devolve texto: às vezes JSON limpo, às vezes JSON
//! embrulhado em prosa, às vezes lixo. Este módulo transforma qualquer um
//! desses casos em uma lista **utilizável** de [`Suggestion`] — é a peça
//! central da promessa "o usuário nunca vê erro de geração".
//!
//! ## Parse em Duas Camadas (estrito → fallback)
//!
//! ```text
//! texto bruto
//!   ├── 1. Localizar o primeiro trecho {...} (regex gulosa \{[\s\S]*\})
//!   │      └── não achou → fallback
//!   ├── 2. serde_json no trecho extraído
//!   │      └── malformado → fallback
//!   ├── 3. Exigir campo "sugestoes" (array) e mapear cada item
//!   │      ├── campos ausentes recebem defaults explícitos
//!   │      │   (nunca ficam "vazios por acidente")
//!   │      ├── tier inferido do texto livre (infer_tier, isolada)
//!   │      └── custos: recomputados se numéricos, senão fórmula
//!   └── 4. Fallback: FallbackGenerator.generate — sempre 3 sugestões
//! ```
//!
//! O contrato do [`parse`](ResponseParser::parse): **nunca** entra em
//! pânico e **nunca** devolve lista vazia; a única falha possível é a do
//! próprio fallback (tabela de destinos vazia, erro de configuração).
//!
//! ## Defaults Documentados
//!
//! | Campo ausente | Valor aplicado |
//! |---------------|----------------|
//! | `nome` | `"Destino"` |
//! | `endereco` | `"Endereço a confirmar"` |
//! | `distancia` | 30.0 km |
//! | `tempoViagem` | deslocamento a 60 km/h + permanência |
//! | `custos` (não numéricos) | fórmula de [`smart_costs`] |
//! | `dicas_motociclista` | 3 dicas genéricas de segurança |

use chrono::Duration;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::{Costs, Difficulty, Stop, Suggestion, Tier, TripRequest};
use crate::fallback::{smart_costs, FallbackGenerator, GenerationError};

/// Distância assumida quando a resposta não traz um número utilizável.
const DEFAULT_DISTANCE_KM: f64 = 30.0;

/// Permanência assumida para a parada vinda da resposta ao vivo.
const DEFAULT_DWELL_MINUTES: u32 = 90;

/// Dicas genéricas aplicadas quando a resposta não traz nenhuma.
const GENERIC_RIDER_TIPS: &[&str] = &[
    "Use capacete e luvas mesmo em trajetos curtos",
    "Revise pneus e freios antes de pegar a estrada",
    "Saia com o tanque cheio e documento em dia",
];

/// Infere o tier a partir do texto livre "por que é perfeito".
///
/// Heurística por substring, isolada aqui de propósito: se um dia um
/// classificador melhor substituir o matching de palavras, o resto do
/// pipeline não muda. Ambíguo ou vazio → [`Tier::Balanced`].
pub fn infer_tier(free_text: &str) -> Tier {
    let text = free_text.to_lowercase();
    if text.contains("econôm") || text.contains("econom") {
        Tier::Economic
    } else if text.contains("premium") {
        Tier::Premium
    } else {
        Tier::Balanced
    }
}

/// Parser da resposta do serviço generativo.
///
/// As regexes são compiladas uma única vez na construção e reutilizadas
/// em todas as chamadas.
pub struct ResponseParser {
    /// Regex gulosa que captura do primeiro `{` ao último `}`.
    json_span_re: Regex,
    /// Regex de número (aceita vírgula decimal PT-BR).
    number_re: Regex,
}

impl ResponseParser {
    /// Cria o parser com as regexes compiladas.
    pub fn new() -> Self {
        Self {
            json_span_re: Regex::new(r"\{[\s\S]*\}").unwrap(),
            number_re: Regex::new(r"-?\d+(?:[.,]\d+)?").unwrap(),
        }
    }

    /// Converte o texto bruto em uma lista utilizável de sugestões.
    ///
    /// Nunca entra em pânico com entrada arbitrária; qualquer falha
    /// estrutural desvia para o gerador de fallback, que devolve as 3
    /// sugestões determinísticas.
    ///
    /// # Erros
    ///
    /// Apenas [`GenerationError`] vindo do próprio fallback (tabela de
    /// destinos vazia) — inalcançável com a tabela default.
    pub fn parse(
        &self,
        raw_text: &str,
        request: &TripRequest,
        fallback: &FallbackGenerator,
    ) -> Result<Vec<Suggestion>, GenerationError> {
        match self.extract_suggestions(raw_text, request) {
            Some(suggestions) if !suggestions.is_empty() => {
                debug!(count = suggestions.len(), "Resposta ao vivo parseada");
                Ok(suggestions)
            }
            _ => {
                warn!(
                    raw_chars = raw_text.len(),
                    "Resposta inutilizável, desviando para o gerador de fallback"
                );
                fallback.generate(request)
            }
        }
    }

    /// Caminho estrito: extrai o trecho JSON, valida o shape e mapeia.
    ///
    /// `None` em qualquer falha estrutural — quem decide o que fazer é o
    /// [`parse`](ResponseParser::parse).
    fn extract_suggestions(&self, raw_text: &str, request: &TripRequest) -> Option<Vec<Suggestion>> {
        let span = self.json_span_re.find(raw_text)?.as_str();
        let value: Value = serde_json::from_str(span).ok()?;
        let items = value.get("sugestoes")?.as_array()?;
        Some(
            items
                .iter()
                .map(|item| self.map_item(item, request))
                .collect(),
        )
    }

    /// Mapeia um item do array `sugestoes` para o registro canônico,
    /// aplicando os defaults documentados no cabeçalho do módulo.
    fn map_item(&self, item: &Value, request: &TripRequest) -> Suggestion {
        let nome = str_field(item, "nome").unwrap_or_else(|| "Destino".to_string());
        let endereco =
            str_field(item, "endereco").unwrap_or_else(|| "Endereço a confirmar".to_string());
        let experiencia = str_field(item, "experiencia");
        let logistica = str_field(item, "logistica");
        let porque_perfeito = str_field(item, "porquePerfeito");

        let tier = infer_tier(
            porque_perfeito
                .as_deref()
                .or(experiencia.as_deref())
                .unwrap_or(""),
        );

        let distancia = self
            .parse_number(item.get("distancia"))
            .unwrap_or(DEFAULT_DISTANCE_KM);

        // Agenda mínima: uma parada, chegada estimada a 60 km/h.
        let travel_min = (distancia / 60.0 * 60.0).ceil() as i64;
        let arrival_time = request.departure_time + Duration::minutes(travel_min);
        let total_duration_hours = self
            .parse_number(item.get("tempoViagem"))
            .unwrap_or((travel_min + DEFAULT_DWELL_MINUTES as i64) as f64 / 60.0);

        let costs = self.map_costs(item.get("custos"), request, tier, distancia);
        let estimated_cost_brl = item
            .get("custos")
            .and_then(|c| self.parse_number(c.get("local")))
            .unwrap_or(0.0);

        let rider_tips = item
            .get("dicas_motociclista")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|tips| !tips.is_empty())
            .unwrap_or_else(|| GENERIC_RIDER_TIPS.iter().map(|t| t.to_string()).collect());

        let stop = Stop {
            name: nome.clone(),
            address: endereco,
            distance_from_prev_km: distancia,
            arrival_time,
            dwell_minutes: DEFAULT_DWELL_MINUTES,
            description: logistica
                .or_else(|| experiencia.clone())
                .unwrap_or_else(|| "Roteiro sugerido pelo gerador".to_string()),
            estimated_cost_brl,
            rider_tips,
        };

        Suggestion {
            id: Uuid::new_v4(),
            tier,
            title: nome,
            summary: porque_perfeito
                .or(experiencia)
                .unwrap_or_else(|| "Rolê montado a partir da experiência desejada".to_string()),
            total_distance_km: distancia,
            total_duration_hours,
            difficulty: Difficulty::from_distance_km(distancia),
            stops: vec![stop],
            costs,
            notes: Vec::new(),
            image_url: None,
        }
    }

    /// Custos da resposta: recomputa o total quando as quatro componentes
    /// do objeto `custos` são numéricas; senão usa a fórmula do fallback.
    ///
    /// Mapeamento do schema ao canônico: `gasolina` → combustível,
    /// `local` → alimentação, `pedagio` → outros (o schema ao vivo não tem
    /// componente dedicada de entradas).
    fn map_costs(
        &self,
        custos: Option<&Value>,
        request: &TripRequest,
        tier: Tier,
        distancia_km: f64,
    ) -> Costs {
        if let Some(c) = custos {
            let gasolina = self.parse_number(c.get("gasolina"));
            let pedagio = self.parse_number(c.get("pedagio"));
            let local = self.parse_number(c.get("local"));
            let total = self.parse_number(c.get("total"));
            if let (Some(gasolina), Some(pedagio), Some(local), Some(_)) =
                (gasolina, pedagio, local, total)
            {
                // Total declarado é ignorado de propósito: recomputar
                // mantém o invariante mesmo quando o modelo erra a soma.
                return Costs::new(gasolina, local, 0.0, pedagio);
            }
        }
        smart_costs(request, tier, distancia_km)
    }

    /// Extrai um número de um `Value` que pode ser número ou texto
    /// ("85", "85 km", "R$ 45,00").
    fn parse_number(&self, value: Option<&Value>) -> Option<f64> {
        match value? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let m = self.number_re.find(s)?;
                m.as_str().replace(',', ".").parse().ok()
            }
            _ => None,
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Campo string de um objeto JSON, ignorando null e vazio.
fn str_field(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RawTripRequest;
    use chrono::NaiveTime;

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

    /// Entradas degeneradas nunca derrubam o parse nem devolvem lista
    /// vazia — tudo desvia para as 3 sugestões do fallback.
    #[test]
    fn test_nunca_vazio_para_entradas_degeneradas() {
        let parser = ResponseParser::new();
        let fallback = FallbackGenerator::new();
        let req = request_exemplo();

        for raw in [
            "",
            "sem json nenhum aqui",
            "{ json: quebrado,,, }",
            "{\"shape\": \"errado\"}",
            "{\"sugestoes\": \"não é array\"}",
            "{\"sugestoes\": []}",
        ] {
            let result = parser.parse(raw, &req, &fallback).unwrap();
            assert_eq!(result.len(), 3, "entrada: {:?}", raw);
        }
    }

    /// JSON embrulhado em prosa: extrai o trecho e mapeia com os defaults
    /// documentados — nenhum campo fica "vazio por acidente".
    #[test]
    fn test_json_embrulhado_em_prosa() {
        let parser = ResponseParser::new();
        let fallback = FallbackGenerator::new();
        let req = request_exemplo();

        let raw = "Here is your trip: {\"sugestoes\":[{\"nome\":\"X\",\"endereco\":\"Y\"}]}";
        let result = parser.parse(raw, &req, &fallback).unwrap();

        assert_eq!(result.len(), 1);
        let s = &result[0];
        assert_eq!(s.title, "X");
        assert_eq!(s.stops[0].address, "Y");
        assert_eq!(s.total_distance_km, DEFAULT_DISTANCE_KM);
        assert_eq!(s.stops[0].dwell_minutes, DEFAULT_DWELL_MINUTES);
        assert_eq!(s.stops[0].rider_tips.len(), 3);
        assert_eq!(s.tier, Tier::Balanced);
        assert!(s.costs.is_consistent());
    }

    /// Payload completo: valores numéricos passam direto e o total é
    /// recomputado a partir das componentes, não copiado do modelo.
    #[test]
    fn test_payload_completo_recomputa_total() {
        let parser = ResponseParser::new();
        let fallback = FallbackGenerator::new();
        let req = request_exemplo();

        let raw = r#"{"sugestoes":[{
            "nome": "Campos do Jordão",
            "endereco": "Vila Capivari",
            "experiencia": "montanha e café",
            "distancia": 180,
            "tempoViagem": 3.5,
            "custos": {"gasolina": 54, "pedagio": 30, "local": 120, "total": 999},
            "logistica": "Suba pela SP-123 e estacione na entrada da vila",
            "porquePerfeito": "Experiência premium de serra"
        }]}"#;
        let result = parser.parse(raw, &req, &fallback).unwrap();

        let s = &result[0];
        assert_eq!(s.tier, Tier::Premium);
        assert_eq!(s.total_distance_km, 180.0);
        assert_eq!(s.total_duration_hours, 3.5);
        assert_eq!(s.costs, Costs::new(54.0, 120.0, 0.0, 30.0));
        assert_eq!(s.stops[0].arrival_time, NaiveTime::from_hms_opt(11, 0, 0).unwrap());
    }

    /// Custos em texto ("R$ 45,00") ainda contam como numéricos.
    #[test]
    fn test_custos_em_texto() {
        let parser = ResponseParser::new();
        let fallback = FallbackGenerator::new();
        let req = request_exemplo();

        let raw = r#"{"sugestoes":[{
            "nome": "Santos",
            "custos": {"gasolina": "R$ 22,50", "pedagio": "0", "local": "R$ 45", "total": "R$ 67,50"}
        }]}"#;
        let result = parser.parse(raw, &req, &fallback).unwrap();
        assert_eq!(result[0].costs, Costs::new(22.5, 45.0, 0.0, 0.0));
    }

    /// Custos não numéricos caem na fórmula do fallback — e o invariante
    /// de soma continua valendo.
    #[test]
    fn test_custos_nao_numericos_usam_formula() {
        let parser = ResponseParser::new();
        let fallback = FallbackGenerator::new();
        let req = request_exemplo();

        let raw = r#"{"sugestoes":[{
            "nome": "Ilhabela",
            "distancia": 210,
            "custos": {"gasolina": "depende", "pedagio": null, "local": "uns trocados"}
        }]}"#;
        let result = parser.parse(raw, &req, &fallback).unwrap();
        let s = &result[0];
        assert_eq!(s.costs, smart_costs(&req, Tier::Balanced, 210.0));
        assert!(s.costs.is_consistent());
    }

    /// A heurística de tier: substring econômico/premium, default Balanced.
    #[test]
    fn test_infer_tier() {
        assert_eq!(infer_tier("opção bem econômica para o bolso"), Tier::Economic);
        assert_eq!(infer_tier("roteiro economico e rapido"), Tier::Economic);
        assert_eq!(infer_tier("experiência PREMIUM de serra"), Tier::Premium);
        assert_eq!(infer_tier("um passeio agradável"), Tier::Balanced);
        assert_eq!(infer_tier(""), Tier::Balanced);
    }

    /// Dicas vindas do modelo são preservadas; lista vazia recebe as
    /// genéricas.
    #[test]
    fn test_dicas_preservadas_ou_genericas() {
        let parser = ResponseParser::new();
        let fallback = FallbackGenerator::new();
        let req = request_exemplo();

        let raw = r#"{"sugestoes":[
            {"nome": "A", "dicas_motociclista": ["Cuidado com a neblina"]},
            {"nome": "B", "dicas_motociclista": []}
        ]}"#;
        let result = parser.parse(raw, &req, &fallback).unwrap();
        assert_eq!(result[0].stops[0].rider_tips, vec!["Cuidado com a neblina"]);
        assert_eq!(result[1].stops[0].rider_tips.len(), 3);
    }
}
