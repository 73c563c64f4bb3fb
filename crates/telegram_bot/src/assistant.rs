//! Gemini-backed financial assistant.
//!
//! The whole exchange is a single prompt: system instructions, the current
//! financial snapshot as JSON, then the user's question. The model signals
//! charts and actions through bracketed tags at the start of its reply;
//! both tag sets are closed and matched literally.

use api_types::summary::FinancialSummary;
use reqwest::header;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const GENERATE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "\
Você é um assistente financeiro pessoal. Responda em português de forma clara e concisa.
Use os dados financeiros fornecidos para responder perguntas sobre contas, saldos, transações e gastos.
Formate valores em Reais (R$). Seja direto e útil. Não use markdown, apenas texto simples com quebras de linha.

IMPORTANTE: Quando o usuário pedir gráficos, visualizações ou análises visuais, você DEVE incluir um comando especial no início da sua resposta:
- Para gráfico de pizza (gastos por categoria): comece com [CHART:PIE]
- Para gráfico de barras (gastos diários): comece com [CHART:BAR]
- Para gráfico de resumo (receitas x despesas x saldo): comece com [CHART:SUMMARY]
- Para gráfico de progresso do orçamento: comece com [CHART:BUDGET]
- Para gráfico de histórico de faturas: comece com [CHART:INVOICE]
- Para gráfico de comparação mensal: comece com [CHART:COMPARISON]

Exemplos de quando usar gráficos:
- \"mostra um gráfico dos meus gastos\" → [CHART:PIE]
- \"gráfico de categorias\" → [CHART:PIE]
- \"gastos por dia\" ou \"gráfico diário\" → [CHART:BAR]
- \"resumo visual\" ou \"gráfico de receitas e despesas\" → [CHART:SUMMARY]
- \"progresso do orçamento\" → [CHART:BUDGET]
- \"histórico de faturas\" → [CHART:INVOICE]
- \"comparar com mês passado\" → [CHART:COMPARISON]

Se o usuário não pedir gráfico especificamente, responda apenas com texto.

CAPACIDADES DE AÇÃO:
Você também pode sugerir ações quando apropriado. Use comandos especiais:
- [ACTION:CREATE_EXPENSE] - Quando usuário quer registrar gasto
- [ACTION:CREATE_INCOME] - Quando usuário quer registrar receita
- [ACTION:CREATE_TRANSFER] - Quando usuário quer transferir entre contas
- [ACTION:CREATE_CATEGORY] - Quando usuário quer criar categoria
- [ACTION:SET_BUDGET] - Quando usuário quer definir meta de orçamento

Exemplo:
Usuário: \"registrar gasto de 50 reais com almoço\"
Você: \"[ACTION:CREATE_EXPENSE] Vou registrar um gasto de R$ 50,00 com almoço. Qual categoria deseja usar?\"";

#[derive(Debug, Error)]
pub enum AssistantError {
    /// Transport failure. The message never includes the API key; it travels
    /// in a sensitive header, not in the URL.
    #[error("assistant request failed")]
    Http(#[from] reqwest::Error),
    #[error("assistant returned status {status}")]
    Api { status: reqwest::StatusCode },
    #[error("assistant returned an empty response")]
    Empty,
    #[error("failed to encode financial context")]
    Context(#[from] serde_json::Error),
    #[error("invalid characters in assistant credentials")]
    Credentials,
}

/// Chart the assistant asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar,
    Summary,
    Budget,
    Invoice,
    Comparison,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Pie,
        ChartKind::Bar,
        ChartKind::Summary,
        ChartKind::Budget,
        ChartKind::Invoice,
        ChartKind::Comparison,
    ];

    fn tag(self) -> &'static str {
        match self {
            ChartKind::Pie => "[CHART:PIE]",
            ChartKind::Bar => "[CHART:BAR]",
            ChartKind::Summary => "[CHART:SUMMARY]",
            ChartKind::Budget => "[CHART:BUDGET]",
            ChartKind::Invoice => "[CHART:INVOICE]",
            ChartKind::Comparison => "[CHART:COMPARISON]",
        }
    }
}

/// Action the assistant suggested. Suggestions are logged, never executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    CreateExpense,
    CreateIncome,
    CreateTransfer,
    CreateCategory,
    SetBudget,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::CreateExpense,
        ActionKind::CreateIncome,
        ActionKind::CreateTransfer,
        ActionKind::CreateCategory,
        ActionKind::SetBudget,
    ];

    fn tag(self) -> &'static str {
        match self {
            ActionKind::CreateExpense => "[ACTION:CREATE_EXPENSE]",
            ActionKind::CreateIncome => "[ACTION:CREATE_INCOME]",
            ActionKind::CreateTransfer => "[ACTION:CREATE_TRANSFER]",
            ActionKind::CreateCategory => "[ACTION:CREATE_CATEGORY]",
            ActionKind::SetBudget => "[ACTION:SET_BUDGET]",
        }
    }
}

pub fn extract_chart_command(response: &str) -> Option<ChartKind> {
    ChartKind::ALL
        .into_iter()
        .find(|kind| response.contains(kind.tag()))
}

pub fn extract_action_command(response: &str) -> Option<ActionKind> {
    ActionKind::ALL
        .into_iter()
        .find(|kind| response.contains(kind.tag()))
}

/// Removes every chart and action tag from the reply.
pub fn strip_command_tags(response: &str) -> String {
    let mut text = response.to_string();
    for kind in ChartKind::ALL {
        text = text.replace(kind.tag(), "");
    }
    for kind in ActionKind::ALL {
        text = text.replace(kind.tag(), "");
    }
    text.trim().to_string()
}

#[derive(Clone)]
pub struct Assistant {
    http: reqwest::Client,
    model: String,
}

impl Assistant {
    pub fn new(api_key: &str, model: &str) -> Result<Self, AssistantError> {
        let mut key = header::HeaderValue::try_from(api_key)
            .map_err(|_| AssistantError::Credentials)?;
        key.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert("x-goog-api-key", key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            model: model.to_string(),
        })
    }

    /// Asks the model about the user's finances.
    pub async fn ask(
        &self,
        question: &str,
        context: &FinancialSummary,
    ) -> Result<String, AssistantError> {
        let context_json = serde_json::to_string_pretty(context)?;
        let prompt = format!(
            "{SYSTEM_PROMPT}\n\nDados financeiros atuais:\n{context_json}\n\nPergunta do usuário: {question}"
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let url = format!("{GENERATE_URL}/{}:generateContent", self.model);
        let response = self.http.post(url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(%status, "assistant request rejected");
            return Err(AssistantError::Api { status });
        }

        let body: GenerateResponse = response.json().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AssistantError::Empty);
        }
        Ok(text)
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_tags_are_extracted() {
        let response = "[CHART:PIE] Aqui estão seus gastos por categoria.";
        assert_eq!(extract_chart_command(response), Some(ChartKind::Pie));
        assert_eq!(extract_action_command(response), None);
    }

    #[test]
    fn plain_text_has_no_commands() {
        let response = "Seu saldo total é R$ 1.000,00.";
        assert_eq!(extract_chart_command(response), None);
        assert_eq!(extract_action_command(response), None);
    }

    #[test]
    fn unknown_tags_are_ignored() {
        assert_eq!(extract_chart_command("[CHART:RADAR] oi"), None);
        assert_eq!(extract_action_command("[ACTION:DELETE_ALL] oi"), None);
    }

    #[test]
    fn action_tags_are_extracted() {
        let response = "[ACTION:CREATE_EXPENSE] Vou registrar um gasto de R$ 50,00.";
        assert_eq!(
            extract_action_command(response),
            Some(ActionKind::CreateExpense)
        );
    }

    #[test]
    fn stripping_removes_every_tag_and_trims() {
        let response = "[CHART:BAR] [ACTION:SET_BUDGET] Segue o gráfico.";
        assert_eq!(strip_command_tags(response), "Segue o gráfico.");
    }

    #[test]
    fn candidate_text_is_joined() {
        let body: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "Olá"}, {"text": ", tudo bem?"}]}
            }]
        }))
        .unwrap();
        let text: String = body.candidates[0]
            .content
            .parts
            .iter()
            .map(|part| part.text.as_str())
            .collect();
        assert_eq!(text, "Olá, tudo bem?");
    }
}
