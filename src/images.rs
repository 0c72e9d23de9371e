//! # ImageLookup — Enriquecimento Visual dos Cards
//!
//! Depois que as sugestões existem (ao vivo ou fallback), o orquestrador
//! busca uma imagem para cada destino. É um passo **melhor-esforço**:
//! falha de uma busca nunca derruba a geração — o item degrada para a
//! imagem placeholder e segue o baile.
//!
//! As buscas das várias sugestões rodam em paralelo (fan-out com join) já
//! que são independentes; uma busca lenta não atrasa as demais além do
//! join final.

use async_trait::async_trait;
use thiserror::Error;

/// Imagem usada quando a busca falha ou não retorna nada utilizável.
pub const PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1558981806-ec527fa84c39?w=800&q=60";

/// Falha de uma busca de imagem individual.
///
/// Capturada por item no orquestrador e convertida em placeholder —
/// jamais propagada ao chamador.
#[derive(Debug, Clone, Error)]
#[error("falha na busca de imagem: {0}")]
pub struct ImageLookupError(pub String);

/// Capacidade abstrata de busca de imagem por palavra-chave.
#[async_trait]
pub trait ImageLookup: Send + Sync {
    /// Retorna a URL de uma imagem para a consulta dada.
    async fn fetch(&self, query: &str) -> Result<String, ImageLookupError>;
}

/// Busca via Unsplash Source — monta a URL de imagem destacada por
/// palavras-chave, sem chamada de rede (o próprio `<img>` resolve).
pub struct UnsplashLookup;

impl UnsplashLookup {
    /// Reduz a consulta a palavras-chave seguras para URL: minúsculas,
    /// só alfanuméricos, separadas por vírgula.
    fn keywords(query: &str) -> String {
        query
            .to_lowercase()
            .split_whitespace()
            .map(|word| {
                word.chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<String>()
            })
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[async_trait]
impl ImageLookup for UnsplashLookup {
    async fn fetch(&self, query: &str) -> Result<String, ImageLookupError> {
        let keywords = Self::keywords(query);
        if keywords.is_empty() {
            return Err(ImageLookupError("consulta vazia".to_string()));
        }
        Ok(format!(
            "https://source.unsplash.com/featured/800x600/?moto,{}",
            keywords
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Consulta com acentos e espaços vira palavras-chave limpas.
    #[tokio::test]
    async fn test_unsplash_keywords() {
        let url = UnsplashLookup.fetch("Campos do Jordão").await.unwrap();
        assert_eq!(
            url,
            "https://source.unsplash.com/featured/800x600/?moto,campos,do,jordão"
        );
    }

    /// Consulta vazia é erro — o orquestrador converte em placeholder.
    #[tokio::test]
    async fn test_unsplash_consulta_vazia() {
        assert!(UnsplashLookup.fetch("  ").await.is_err());
    }
}
