use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::America::Sao_Paulo;
use teloxide::{
    prelude::*,
    types::{ChatAction, InputFile},
    utils::command::BotCommands,
};

use api_types::invoice::InvoiceQuery;
use organizze::{ApiError, get_financial_context};

use crate::{
    ConfigParameters,
    assistant::{ChartKind, extract_action_command, extract_chart_command, strip_command_tags},
    charts, commands,
};

/// Telegram hard limit on message length, in characters.
const MESSAGE_LIMIT: usize = 4096;
/// Telegram hard limit on photo captions, in characters.
const CAPTION_LIMIT: usize = 1024;

const GENERIC_ERROR: &str =
    "❌ Desculpe, ocorreu um erro ao processar sua mensagem. Tente novamente.";
const ASSISTANT_ERROR: &str = "Desculpe, não consegui processar sua pergunta. Tente novamente.";
const CHART_ERROR: &str = "Desculpe, não consegui gerar o gráfico. Dados insuficientes.";

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if !cfg.allow_list.is_authorized(chat_id) {
        tracing::warn!(chat_id = chat_id.0, "unauthorized access attempt");
        bot.send_message(chat_id, unauthorized_text(chat_id)).await?;
        return Ok(());
    }

    // Quick commands expand to natural-language questions; /start and /help
    // are answered directly. Anything else goes to the assistant verbatim.
    let question = match commands::Command::parse(text, "") {
        Ok(cmd) => match cmd.question() {
            Some(question) => question.to_string(),
            None => {
                bot.send_message(chat_id, commands::help_text()).await?;
                return Ok(());
            }
        },
        Err(_) => text.to_string(),
    };

    bot.send_chat_action(chat_id, ChatAction::Typing).await?;

    let today = Utc::now().with_timezone(&Sao_Paulo).date_naive();
    let summary = match get_financial_context(&cfg.api, today).await {
        Ok(summary) => summary,
        Err(err) => {
            bot.send_message(chat_id, user_message_for_api_error(&err))
                .await?;
            return Ok(());
        }
    };

    let response = match cfg.assistant.ask(&question, &summary).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!("assistant request failed: {err}");
            bot.send_message(chat_id, ASSISTANT_ERROR).await?;
            return Ok(());
        }
    };

    if let Some(action) = extract_action_command(&response) {
        tracing::info!(?action, "assistant suggested an action");
    }

    let clean = strip_command_tags(&response);

    if let Some(kind) = extract_chart_command(&response) {
        match render_chart(&cfg, kind, &summary, today).await {
            Some(png) => {
                bot.send_photo(chat_id, InputFile::memory(png).file_name("chart.png"))
                    .caption(truncate_caption(&clean))
                    .await?;
            }
            None => {
                bot.send_message(chat_id, CHART_ERROR).await?;
            }
        }
        return Ok(());
    }

    for chunk in split_message(&clean, MESSAGE_LIMIT) {
        bot.send_message(chat_id, chunk).await?;
    }
    Ok(())
}

async fn render_chart(
    cfg: &ConfigParameters,
    kind: ChartKind,
    summary: &api_types::summary::FinancialSummary,
    today: NaiveDate,
) -> Option<Vec<u8>> {
    match kind {
        ChartKind::Pie => charts::pie_chart(&summary.recent_transactions),
        ChartKind::Bar => charts::daily_bar_chart(&summary.recent_transactions),
        ChartKind::Summary => charts::summary_chart(summary),
        ChartKind::Budget => charts::budget_progress_chart(&summary.budgets),
        ChartKind::Invoice => {
            let card = summary.credit_cards.first()?;
            let query = InvoiceQuery {
                year: Some(today.year()),
                ..InvoiceQuery::default()
            };
            match cfg.api.invoices(card.id, &query).await {
                Ok(invoices) => charts::invoice_history_chart(&invoices),
                Err(err) => {
                    tracing::error!("failed to fetch invoices for chart: {err}");
                    None
                }
            }
        }
        ChartKind::Comparison => {
            let previous_month_end = today.with_day(1).and_then(|first| first.pred_opt())?;
            match get_financial_context(&cfg.api, previous_month_end).await {
                Ok(previous) => charts::month_comparison_chart(summary, &previous),
                Err(err) => {
                    tracing::error!("failed to fetch previous month for chart: {err}");
                    None
                }
            }
        }
    }
}

fn unauthorized_text(chat_id: ChatId) -> String {
    format!(
        "⛔ Acesso não autorizado. Seu Chat ID: {}\n\n\
         Entre em contato com o administrador para liberar acesso.",
        chat_id.0
    )
}

/// What the user sees for each failure kind. Credentials and raw upstream
/// messages never reach the chat.
fn user_message_for_api_error(err: &ApiError) -> String {
    match err {
        ApiError::Auth => {
            tracing::error!("organizze credentials rejected, check the configuration");
            "⚠️ Credenciais da Organizze inválidas. Avise o administrador.".to_string()
        }
        ApiError::Validation { errors } => {
            let mut text = String::from("❌ Dados inválidos:\n");
            for (field, messages) in errors {
                for message in messages {
                    text.push_str(&format!("• {field}: {message}\n"));
                }
            }
            text.trim_end().to_string()
        }
        ApiError::Api { .. } => {
            tracing::error!("organizze request failed: {err}");
            GENERIC_ERROR.to_string()
        }
    }
}

/// Splits a long reply into chunks under `max_chars`, preferring newline
/// boundaries.
fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text.trim();
    while rest.chars().count() > max_chars {
        let cut = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let split = match rest[..cut].rfind('\n') {
            Some(pos) if pos > 0 => pos,
            _ => cut,
        };
        chunks.push(rest[..split].to_string());
        rest = rest[split..].trim_start();
    }
    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

fn truncate_caption(text: &str) -> String {
    if text.chars().count() <= CAPTION_LIMIT {
        return text.to_string();
    }
    let truncated: String = text.chars().take(CAPTION_LIMIT - 3).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::field_error;

    #[test]
    fn short_messages_pass_through_whole() {
        assert_eq!(split_message("oi", 4096), vec!["oi".to_string()]);
        assert!(split_message("", 4096).is_empty());
    }

    #[test]
    fn long_messages_split_at_newlines() {
        let text = format!("{}\n{}", "a".repeat(30), "b".repeat(30));
        let chunks = split_message(&text, 40);
        assert_eq!(chunks, vec!["a".repeat(30), "b".repeat(30)]);
    }

    #[test]
    fn messages_without_newlines_split_hard() {
        let text = "x".repeat(100);
        let chunks = split_message(&text, 40);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 40);
        assert_eq!(chunks[2].len(), 20);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn splitting_is_char_boundary_safe() {
        let text = "ação".repeat(30);
        let chunks = split_message(&text, 41);
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 41));
    }

    #[test]
    fn captions_are_truncated_with_ellipsis() {
        let short = "legenda curta";
        assert_eq!(truncate_caption(short), short);

        let long = "y".repeat(2000);
        let caption = truncate_caption(&long);
        assert_eq!(caption.chars().count(), 1024);
        assert!(caption.ends_with("..."));
    }

    #[test]
    fn validation_errors_list_each_field() {
        let err = ApiError::Validation {
            errors: field_error("name", "can't be blank"),
        };
        let text = user_message_for_api_error(&err);
        assert!(text.contains("Dados inválidos"));
        assert!(text.contains("• name: can't be blank"));
    }

    #[test]
    fn auth_and_api_errors_stay_generic() {
        let text = user_message_for_api_error(&ApiError::Auth);
        assert!(text.contains("Credenciais"));

        let err = ApiError::Api {
            status: None,
            message: "request timeout".to_string(),
        };
        assert_eq!(user_message_for_api_error(&err), GENERIC_ERROR);
    }
}
