//! # Tabela Estática de Destinos
//!
//! Base de dados offline do gerador de fallback: destinos reais da região
//! de São Paulo, organizados por [`Tier`], cada um com tags de experiência
//! para o casamento com o texto livre do usuário.
//!
//! ## Nota sobre a Curadoria
//!
//! A tabela é pequena de propósito (3 destinos por tier) — o fallback
//! existe para **nunca deixar o usuário sem resposta**, não para competir
//! com a geração ao vivo. As tags são minúsculas e sem pontuação, porque o
//! matcher compara por substring case-insensitive contra a experiência
//! digitada.
//!
//! A tabela é carregada uma vez e nunca mutada pelo pipeline.

use crate::core::Tier;

/// Uma entrada da tabela de destinos.
///
/// Campos `&'static` — os dados vivem no binário, a tabela só é clonada
/// quando um teste quer uma variação dela.
#[derive(Clone, Copy, Debug)]
pub struct Destination {
    /// Nome do destino como aparece no card.
    pub name: &'static str,
    /// Endereço ou referência de chegada.
    pub address: &'static str,
    /// Descrição curta usada como texto da parada no card.
    pub blurb: &'static str,
    /// Distância aproximada desde a zona de partida típica, em km.
    pub distance_from_origin_km: f64,
    /// Custo de entrada/ingresso, em reais (0 = gratuito).
    pub entry_cost_brl: f64,
    /// Permanência planejada, em minutos.
    pub dwell_minutes: u32,
    /// Palavras-chave de experiência para o casamento com o pedido.
    pub experience_tags: &'static [&'static str],
    /// Dicas específicas para quem chega de moto.
    pub rider_tips: &'static [&'static str],
}

/// Destinos do tier econômico — perto, barato, meia diária resolve.
const ECONOMIC: &[Destination] = &[
    Destination {
        name: "Represa de Guarapiranga",
        address: "Av. Atlântica, zona sul de São Paulo - SP",
        blurb: "Orla tranquila para ver o pôr do sol da sela, com quiosques na beira da represa.",
        distance_from_origin_km: 25.0,
        entry_cost_brl: 0.0,
        dwell_minutes: 90,
        experience_tags: &["natureza", "paisagem", "pôr do sol", "tranquilidade"],
        rider_tips: &[
            "A orla tem trechos de paralelepípedo, reduza na chegada",
            "Estacionamento gratuito perto dos quiosques",
        ],
    },
    Destination {
        name: "Embu das Artes",
        address: "Centro Histórico, Embu das Artes - SP",
        blurb: "Centro histórico com feira de artesanato, cafés e restaurantes de comida de fazenda.",
        distance_from_origin_km: 30.0,
        entry_cost_brl: 0.0,
        dwell_minutes: 120,
        experience_tags: &["cultura", "feira", "gastronomia", "café da manhã", "compras"],
        rider_tips: &[
            "Aos domingos o centro fecha para a feira, estacione na borda",
            "Ruas de pedra no centro histórico, cuidado com chuva",
        ],
    },
    Destination {
        name: "São Roque - Estrada do Vinho",
        address: "Estrada do Vinho, São Roque - SP",
        blurb: "Sequência de vinícolas e empórios na estrada, com degustações e café colonial.",
        distance_from_origin_km: 60.0,
        entry_cost_brl: 10.0,
        dwell_minutes: 120,
        experience_tags: &["vinho", "gastronomia", "café da manhã", "estrada"],
        rider_tips: &[
            "A Raposo Tavares tem trechos de neblina pela manhã",
            "As vinícolas cobram entrada avulsa, leve dinheiro",
        ],
    },
];

/// Destinos do tier equilibrado — bate-volta clássico de um dia.
const BALANCED: &[Destination] = &[
    Destination {
        name: "Paranapiacaba",
        address: "Vila de Paranapiacaba, Santo André - SP",
        blurb: "Vila ferroviária inglesa encravada na serra, museus e neblina cinematográfica.",
        distance_from_origin_km: 50.0,
        entry_cost_brl: 0.0,
        dwell_minutes: 120,
        experience_tags: &["história", "cultura", "serra", "neblina", "trem"],
        rider_tips: &[
            "Neblina fecha a serra à tarde, prefira chegar cedo",
            "Piso de paralelepípedo molhado exige pneu bom",
        ],
    },
    Destination {
        name: "Santos - Orla da Praia",
        address: "Av. Presidente Wilson, Santos - SP",
        blurb: "Descida da serra pela Anchieta e orla com jardim de praia mais extenso do mundo.",
        distance_from_origin_km: 75.0,
        entry_cost_brl: 0.0,
        dwell_minutes: 120,
        experience_tags: &["praia", "litoral", "paisagem"],
        rider_tips: &[
            "Motos descem a serra pela pista da direita da Anchieta",
            "Maresia ataca o cromado, lave a moto na volta",
        ],
    },
    Destination {
        name: "Holambra",
        address: "Portal de Entrada, Holambra - SP",
        blurb: "Cidade das flores: campos coloridos, moinho holandês e café colonial reforçado.",
        distance_from_origin_km: 130.0,
        entry_cost_brl: 20.0,
        dwell_minutes: 150,
        experience_tags: &["flores", "turismo", "café da manhã", "paisagem"],
        rider_tips: &[
            "A Bandeirantes tem pedágio, leve tag ou dinheiro",
            "O café colonial enche aos fins de semana, reserve",
        ],
    },
];

/// Destinos do tier premium — dia inteiro de estrada, destino marcante.
const PREMIUM: &[Destination] = &[
    Destination {
        name: "Campos do Jordão",
        address: "Vila Capivari, Campos do Jordão - SP",
        blurb: "Clima de montanha, gastronomia de inverno e o Capivari para fechar o passeio.",
        distance_from_origin_km: 180.0,
        entry_cost_brl: 40.0,
        dwell_minutes: 180,
        experience_tags: &["montanha", "serra", "gastronomia", "café da manhã", "frio"],
        rider_tips: &[
            "A subida da SP-123 tem curvas fechadas e piso frio",
            "Na alta temporada o Capivari lota, estacione na entrada da vila",
        ],
    },
    Destination {
        name: "Ilhabela",
        address: "Balsa de São Sebastião, Ilhabela - SP",
        blurb: "Travessia de balsa e volta pela costa da ilha, praias e cachoeiras à beira da estrada.",
        distance_from_origin_km: 210.0,
        entry_cost_brl: 30.0,
        dwell_minutes: 180,
        experience_tags: &["praia", "litoral", "aventura", "paisagem"],
        rider_tips: &[
            "A balsa cobra por moto e a fila cresce depois das 10h",
            "Rio-Santos tem trechos sem acostamento, tanque cheio antes",
        ],
    },
    Destination {
        name: "Santo Antônio do Pinhal",
        address: "Centro, Santo Antônio do Pinhal - SP",
        blurb: "Mirantes da Mantiqueira sem o movimento de Campos, estradinhas de montanha.",
        distance_from_origin_km: 170.0,
        entry_cost_brl: 25.0,
        dwell_minutes: 150,
        experience_tags: &["montanha", "serra", "paisagem", "tranquilidade"],
        rider_tips: &[
            "Estrada de acesso estreita, atenção a ônibus de turismo",
            "Posto escasso na região alta, abasteça em São José",
        ],
    },
];

/// Distâncias conhecidas entre pares de destinos, em km.
///
/// Consultada nos roteiros com mais de uma parada. Par ausente usa
/// [`DEFAULT_LEG_KM`] — chute conservador, não um erro.
const PAIR_DISTANCES: &[(&str, &str, f64)] = &[
    ("Embu das Artes", "Represa de Guarapiranga", 18.0),
    ("Embu das Artes", "São Roque - Estrada do Vinho", 45.0),
    ("Represa de Guarapiranga", "São Roque - Estrada do Vinho", 70.0),
    ("Paranapiacaba", "Santos - Orla da Praia", 55.0),
    ("Campos do Jordão", "Santo Antônio do Pinhal", 25.0),
];

/// Distância assumida quando o par de cidades não está na tabela.
pub const DEFAULT_LEG_KM: f64 = 30.0;

/// Tabela de destinos por tier — imutável depois de construída.
///
/// A tabela default embute os destinos curados acima; testes podem montar
/// variações (inclusive vazias, para exercitar o erro de configuração).
#[derive(Clone, Debug)]
pub struct DestinationTable {
    economic: Vec<Destination>,
    balanced: Vec<Destination>,
    premium: Vec<Destination>,
}

impl DestinationTable {
    /// Tabela vazia — só faz sentido em teste de erro de configuração.
    pub fn empty() -> Self {
        Self {
            economic: Vec::new(),
            balanced: Vec::new(),
            premium: Vec::new(),
        }
    }

    /// Destinos do tier, na ordem de curadoria.
    pub fn for_tier(&self, tier: Tier) -> &[Destination] {
        match tier {
            Tier::Economic => &self.economic,
            Tier::Balanced => &self.balanced,
            Tier::Premium => &self.premium,
        }
    }
}

impl Default for DestinationTable {
    fn default() -> Self {
        Self {
            economic: ECONOMIC.to_vec(),
            balanced: BALANCED.to_vec(),
            premium: PREMIUM.to_vec(),
        }
    }
}

/// Distância entre dois destinos conhecidos, em qualquer ordem.
///
/// Retorna [`DEFAULT_LEG_KM`] quando o par não consta na tabela.
pub fn distance_between(from: &str, to: &str) -> f64 {
    PAIR_DISTANCES
        .iter()
        .find(|(a, b, _)| (*a == from && *b == to) || (*a == to && *b == from))
        .map(|(_, _, km)| *km)
        .unwrap_or(DEFAULT_LEG_KM)
}
