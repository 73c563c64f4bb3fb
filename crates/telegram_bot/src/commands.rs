//! Quick commands.
//!
//! Each command is shorthand for a natural-language question; the handler
//! expands it and sends the question through the assistant like any other
//! message.

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case")]
pub enum Command {
    Start,
    Help,
    // Charts
    GastosCategoria,
    GastosDiarios,
    ResumoVisual,
    // Queries
    Saldo,
    Extrato,
    Resumo,
    // Credit cards
    Cartoes,
    Fatura,
    Faturas,
    // Budget
    Orcamento,
    Metas,
}

impl Command {
    /// The question the command stands for. `None` for `/start` and `/help`,
    /// which are answered directly.
    pub fn question(self) -> Option<&'static str> {
        match self {
            Command::Start | Command::Help => None,
            Command::GastosCategoria => {
                Some("Mostre um gráfico de pizza dos meus gastos por categoria")
            }
            Command::GastosDiarios => {
                Some("Mostre um gráfico de barras dos meus gastos diários")
            }
            Command::ResumoVisual => {
                Some("Mostre um gráfico de resumo com receitas, despesas e saldo")
            }
            Command::Saldo => Some("Qual é o saldo total de todas as minhas contas?"),
            Command::Extrato => Some("Mostre minhas últimas transações"),
            Command::Resumo => Some("Faça um resumo das minhas finanças deste mês"),
            Command::Cartoes => Some("Quais são meus cartões de crédito e seus limites?"),
            Command::Fatura => Some("Mostre a fatura atual do meu cartão de crédito"),
            Command::Faturas => Some("Mostre o histórico de faturas do cartão"),
            Command::Orcamento => Some("Mostre o progresso do meu orçamento mensal"),
            Command::Metas => Some("Quais são minhas metas de gastos por categoria?"),
        }
    }
}

pub fn help_text() -> &'static str {
    "🤖 Organizze Bot com IA\n\n\
     Pergunte qualquer coisa sobre suas finanças ou use os comandos rápidos:\n\n\
     📊 Gráficos\n\
     /gastos_categoria - Gráfico de pizza por categoria\n\
     /gastos_diarios - Gráfico de barras diário\n\
     /resumo_visual - Resumo receitas x despesas\n\n\
     💰 Consultas\n\
     /saldo - Saldo total das contas\n\
     /extrato - Últimas transações\n\
     /resumo - Resumo financeiro do mês\n\n\
     💳 Cartões de Crédito\n\
     /cartoes - Info dos cartões de crédito\n\
     /fatura - Fatura atual do cartão\n\
     /faturas - Histórico de faturas\n\n\
     📈 Orçamento\n\
     /orcamento - Ver progresso do orçamento mensal\n\
     /metas - Metas por categoria\n\n\
     ❓ Ou pergunte naturalmente:\n\
     \"Quanto gastei com alimentação?\"\n\
     \"Qual meu saldo no Nubank?\"\n\
     \"Mostre um gráfico dos meus gastos\"\n\
     \"Registre um gasto de 50 reais com almoço\""
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_commands_expand_to_questions() {
        let cmd = Command::parse("/saldo", "").unwrap();
        assert_eq!(
            cmd.question(),
            Some("Qual é o saldo total de todas as minhas contas?")
        );

        let cmd = Command::parse("/gastos_categoria", "").unwrap();
        assert_eq!(
            cmd.question(),
            Some("Mostre um gráfico de pizza dos meus gastos por categoria")
        );
    }

    #[test]
    fn start_and_help_have_no_question() {
        assert_eq!(Command::parse("/start", "").unwrap().question(), None);
        assert_eq!(Command::parse("/help", "").unwrap().question(), None);
    }

    #[test]
    fn free_text_is_not_a_command() {
        assert!(Command::parse("quanto gastei esse mês?", "").is_err());
    }
}
