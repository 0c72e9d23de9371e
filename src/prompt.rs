//! # PromptBuilder — Renderização Determinística do Prompt
//!
//! Constrói a instrução em linguagem natural enviada ao serviço generativo
//! a partir de um [`TripRequest`]. É uma **função pura**: sem I/O, sem
//! relógio, sem aleatoriedade — o mesmo pedido produz sempre o mesmo
//! prompt (o que também torna estável o fingerprint do cache, derivado do
//! prefixo do prompt).
//!
//! ## Classe do Veículo
//!
//! O consumo declarado classifica a moto em uma faixa de cilindrada —
//! **apenas sabor narrativo** para o modelo contextualizar o roteiro;
//! nenhuma fórmula de custo usa essa classificação:
//!
//! | Consumo (km/L) | Classe narrada |
//! |----------------|----------------|
//! | ≤ 18 | 1000cc+ |
//! | ≤ 25 | 600-800cc |
//! | ≤ 35 | 250-400cc |
//! | > 35 | 125-150cc |
//!
//! ## Contrato de Schema
//!
//! O prompt instrui o modelo a responder **somente** com JSON no formato
//! `{"sugestoes": [{nome, endereco, experiencia, distancia, tempoViagem,
//! custos: {gasolina, pedagio, local, total}, logistica, porquePerfeito}]}`
//! com exatamente 3 sugestões. O texto ao redor é escolha de redação; o
//! schema é contrato — o [`ResponseParser`](crate::parser::ResponseParser)
//! depende dele.

use crate::core::TripRequest;

/// Classifica a moto numa faixa de cilindrada pelo consumo declarado.
///
/// Motos grandes bebem mais (km/L baixo); motos pequenas rendem mais.
/// A classificação é grosseira de propósito — serve só de contexto
/// narrativo no prompt.
pub fn vehicle_class(fuel_economy_km_per_liter: f64) -> &'static str {
    if fuel_economy_km_per_liter <= 18.0 {
        "1000cc+"
    } else if fuel_economy_km_per_liter <= 25.0 {
        "600-800cc"
    } else if fuel_economy_km_per_liter <= 35.0 {
        "250-400cc"
    } else {
        "125-150cc"
    }
}

/// Renderiza o prompt completo para um pedido de rolê.
///
/// Determinístico: embute a janela de horas calculada, a autonomia do
/// tanque, a classe do veículo e a experiência desejada, e fecha com a
/// instrução de schema JSON fixo com 3 sugestões.
pub fn build_prompt(request: &TripRequest) -> String {
    let hours = request.available_hours();
    let class = vehicle_class(request.fuel_economy_km_per_liter);
    let budget = match request.budget_brl {
        Some(b) => format!("R$ {:.0}", b),
        None => "sem limite declarado".to_string(),
    };

    format!(
        "Você é um guia especialista em rolês de moto na região de São Paulo.\n\
         Monte 3 sugestões de rolê saindo de {partida}, com saída às {saida} e \
         volta às {volta} ({horas:.1} horas disponíveis).\n\
         A moto é classe {classe} (tanque de {tanque:.0} L, {consumo:.0} km/L, \
         autonomia de ~{autonomia:.0} km). Perfil de pilotagem: {perfil}.\n\
         O que o motociclista quer viver: \"{experiencia}\". Orçamento: {orcamento}.\n\
         Uma sugestão deve ser econômica, uma equilibrada e uma premium.\n\
         Responda SOMENTE com JSON válido, sem texto fora do objeto, no formato:\n\
         {{\"sugestoes\": [{{\"nome\": \"...\", \"endereco\": \"...\", \
         \"experiencia\": \"...\", \"distancia\": 0, \"tempoViagem\": 0, \
         \"custos\": {{\"gasolina\": 0, \"pedagio\": 0, \"local\": 0, \"total\": 0}}, \
         \"logistica\": \"...\", \"porquePerfeito\": \"...\"}}]}} \
         com exatamente 3 itens em \"sugestoes\".",
        partida = request.start_address,
        saida = request.departure_time.format("%H:%M"),
        volta = request.return_time.format("%H:%M"),
        horas = hours,
        classe = class,
        tanque = request.tank_capacity_liters,
        consumo = request.fuel_economy_km_per_liter,
        autonomia = request.range_km(),
        perfil = request.riding_profile.descricao(),
        experiencia = request.desired_experience,
        orcamento = budget,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RawTripRequest;

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

    /// As quatro faixas de classe por consumo.
    #[test]
    fn test_vehicle_class_faixas() {
        assert_eq!(vehicle_class(15.0), "1000cc+");
        assert_eq!(vehicle_class(22.0), "600-800cc");
        assert_eq!(vehicle_class(30.0), "250-400cc");
        assert_eq!(vehicle_class(40.0), "125-150cc");
    }

    /// Mesmo pedido → mesmo prompt, byte a byte (função pura).
    #[test]
    fn test_build_prompt_deterministico() {
        let req = request_exemplo();
        assert_eq!(build_prompt(&req), build_prompt(&req));
    }

    /// O prompt embute os campos computados e o contrato de schema.
    #[test]
    fn test_build_prompt_conteudo() {
        let prompt = build_prompt(&request_exemplo());
        assert!(prompt.contains("10.0 horas"));
        assert!(prompt.contains("classe 600-800cc"));
        assert!(prompt.contains("café da manhã"));
        assert!(prompt.contains("\"sugestoes\""));
        assert!(prompt.contains("porquePerfeito"));
    }
}
