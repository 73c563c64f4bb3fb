//! Chart rendering.
//!
//! Every renderer takes already-aggregated summary data and returns an
//! encoded PNG, or `None` when there is nothing to plot. Rendering failures
//! are logged and reported as `None`; a broken chart never takes the reply
//! down with it.

use std::collections::HashMap;
use std::error::Error;

use api_types::{
    invoice::Invoice,
    summary::{BudgetSummary, FinancialSummary, TransactionSummary},
};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;

const WIDTH: u32 = 900;
const HEIGHT: u32 = 600;

const EXPENSE_RED: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);
const INCOME_GREEN: RGBColor = RGBColor(0x27, 0xae, 0x60);
const BALANCE_BLUE: RGBColor = RGBColor(0x34, 0x98, 0xdb);
const GOAL_GRAY: RGBColor = RGBColor(0xec, 0xf0, 0xf1);

const PALETTE: [RGBColor; 8] = [
    RGBColor(0x8d, 0xd3, 0xc7),
    RGBColor(0xff, 0xed, 0x6f),
    RGBColor(0xbe, 0xba, 0xda),
    RGBColor(0xfb, 0x80, 0x72),
    RGBColor(0x80, 0xb1, 0xd3),
    RGBColor(0xfd, 0xb4, 0x62),
    RGBColor(0xb3, 0xde, 0x69),
    RGBColor(0xfc, 0xcd, 0xe5),
];

/// At most this many pie slices; smaller categories fold into "Outros".
const PIE_SLICES: usize = 8;
/// At most this many budget rows.
const BUDGET_ROWS: usize = 10;

type ChartRoot<'b> = DrawingArea<BitMapBackend<'b>, Shift>;
type DrawResult = Result<(), Box<dyn Error>>;

/// Pie chart of expenses by category.
pub fn pie_chart(transactions: &[TransactionSummary]) -> Option<Vec<u8>> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for tx in transactions {
        if tx.amount < 0.0 {
            *totals.entry(tx.category.as_str()).or_insert(0.0) += tx.amount.abs();
        }
    }
    if totals.is_empty() {
        return None;
    }

    let mut sorted: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(name, total)| (name.to_string(), total))
        .collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    if sorted.len() > PIE_SLICES {
        let others: f64 = sorted[PIE_SLICES - 1..].iter().map(|(_, v)| v).sum();
        sorted.truncate(PIE_SLICES - 1);
        sorted.push(("Outros".to_string(), others));
    }

    render(|root| {
        let labels: Vec<String> = sorted
            .iter()
            .map(|(name, total)| format!("{name} (R${total:.0})"))
            .collect();
        let sizes: Vec<f64> = sorted.iter().map(|(_, total)| *total).collect();
        let colors: Vec<RGBColor> = PALETTE.iter().copied().take(sizes.len()).collect();

        let area = root.titled("Gastos por Categoria", ("sans-serif", 30))?;
        let center = (WIDTH as i32 / 2, HEIGHT as i32 / 2 + 15);
        let radius = f64::from(HEIGHT) / 2.0 - 80.0;
        let pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        area.draw(&pie)?;
        Ok(())
    })
}

/// Bar chart of daily spending.
pub fn daily_bar_chart(transactions: &[TransactionSummary]) -> Option<Vec<u8>> {
    let mut totals: HashMap<chrono::NaiveDate, f64> = HashMap::new();
    for tx in transactions {
        if tx.amount < 0.0 {
            *totals.entry(tx.date).or_insert(0.0) += tx.amount.abs();
        }
    }
    if totals.is_empty() {
        return None;
    }

    let mut days: Vec<(chrono::NaiveDate, f64)> = totals.into_iter().collect();
    days.sort_by_key(|(date, _)| *date);
    let labels: Vec<String> = days
        .iter()
        .map(|(date, _)| date.format("%d/%m").to_string())
        .collect();
    let max = days.iter().map(|(_, v)| *v).fold(0.0, f64::max);

    render(|root| {
        let mut chart = ChartBuilder::on(root)
            .caption("Gastos Diários", ("sans-serif", 30))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..days.len() as f64, 0f64..max * 1.1)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(days.len())
            .x_label_formatter(&|x| {
                labels
                    .get(x.floor() as usize)
                    .cloned()
                    .unwrap_or_default()
            })
            .y_desc("Gastos (R$)")
            .draw()?;

        chart.draw_series(days.iter().enumerate().map(|(i, (_, total))| {
            Rectangle::new(
                [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, *total)],
                EXPENSE_RED.filled(),
            )
        }))?;
        Ok(())
    })
}

/// Income vs expenses vs balance for the reporting month.
pub fn summary_chart(summary: &FinancialSummary) -> Option<Vec<u8>> {
    let bars = [
        ("Receitas", summary.income, INCOME_GREEN),
        ("Despesas", summary.expenses, EXPENSE_RED),
        (
            "Saldo",
            summary.balance,
            if summary.balance >= 0.0 {
                BALANCE_BLUE
            } else {
                EXPENSE_RED
            },
        ),
    ];
    if summary.income == 0.0 && summary.expenses == 0.0 {
        return None;
    }

    let top = bars.iter().map(|(_, v, _)| *v).fold(0.0, f64::max) * 1.15;
    let bottom = bars.iter().map(|(_, v, _)| *v).fold(0.0, f64::min).min(0.0) * 1.15;
    let title = format!("Resumo Financeiro - {}", capitalize(&summary.month));

    render(move |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 30))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d(0f64..3.0, bottom..top)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(3)
            .x_label_formatter(&|x| {
                bars.get(x.floor() as usize)
                    .map(|(name, _, _)| (*name).to_string())
                    .unwrap_or_default()
            })
            .y_desc("Valor (R$)")
            .draw()?;

        chart.draw_series(bars.iter().enumerate().map(|(i, (_, value, color))| {
            Rectangle::new(
                [(i as f64 + 0.2, 0.0), (i as f64 + 0.8, *value)],
                color.filled(),
            )
        }))?;
        Ok(())
    })
}

/// Horizontal bars: budget goal per category with actual spend on top.
pub fn budget_progress_chart(budgets: &[BudgetSummary]) -> Option<Vec<u8>> {
    let rows: Vec<&BudgetSummary> = budgets.iter().take(BUDGET_ROWS).collect();
    if rows.is_empty() {
        return None;
    }

    let max = rows
        .iter()
        .map(|budget| budget.amount.max(budget.actual))
        .fold(0.0, f64::max);
    if max <= 0.0 {
        return None;
    }

    render(move |root| {
        let mut chart = ChartBuilder::on(root)
            .caption("Progresso do Orçamento por Categoria", ("sans-serif", 30))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(160)
            .build_cartesian_2d(0f64..max * 1.15, 0f64..rows.len() as f64)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(rows.len())
            .y_label_formatter(&|y| {
                rows.get(y.floor() as usize)
                    .map(|budget| budget.category.clone())
                    .unwrap_or_default()
            })
            .x_desc("Valor (R$)")
            .draw()?;

        chart.draw_series(rows.iter().enumerate().map(|(i, budget)| {
            Rectangle::new(
                [(0.0, i as f64 + 0.15), (budget.amount, i as f64 + 0.85)],
                GOAL_GRAY.filled(),
            )
        }))?;
        chart.draw_series(rows.iter().enumerate().map(|(i, budget)| {
            let color = if budget.amount > 0.0 && budget.actual > budget.amount {
                EXPENSE_RED
            } else {
                INCOME_GREEN
            };
            Rectangle::new(
                [(0.0, i as f64 + 0.15), (budget.actual, i as f64 + 0.85)],
                color.filled(),
            )
        }))?;
        Ok(())
    })
}

/// Line chart of invoice totals over time.
pub fn invoice_history_chart(invoices: &[Invoice]) -> Option<Vec<u8>> {
    if invoices.is_empty() {
        return None;
    }

    let mut sorted: Vec<&Invoice> = invoices.iter().collect();
    sorted.sort_by_key(|invoice| invoice.date);
    let labels: Vec<String> = sorted
        .iter()
        .map(|invoice| invoice.date.format("%m/%Y").to_string())
        .collect();
    let amounts: Vec<f64> = sorted
        .iter()
        .map(|invoice| invoice.amount.major().abs())
        .collect();
    let max = amounts.iter().copied().fold(0.0, f64::max);

    render(move |root| {
        let mut chart = ChartBuilder::on(root)
            .caption("Histórico de Faturas do Cartão", ("sans-serif", 30))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d(0f64..(amounts.len() as f64 - 1.0).max(1.0), 0f64..max * 1.1)?;

        chart
            .configure_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&|x| {
                labels
                    .get(x.round() as usize)
                    .cloned()
                    .unwrap_or_default()
            })
            .y_desc("Valor da Fatura (R$)")
            .draw()?;

        chart.draw_series(LineSeries::new(
            amounts
                .iter()
                .enumerate()
                .map(|(i, amount)| (i as f64, *amount)),
            BALANCE_BLUE.stroke_width(2),
        ))?;
        chart.draw_series(
            amounts
                .iter()
                .enumerate()
                .map(|(i, amount)| Circle::new((i as f64, *amount), 4, BALANCE_BLUE.filled())),
        )?;
        Ok(())
    })
}

/// Side-by-side bars for the current and the previous month.
pub fn month_comparison_chart(
    current: &FinancialSummary,
    previous: &FinancialSummary,
) -> Option<Vec<u8>> {
    let groups = [
        ("Receitas", current.income, previous.income),
        ("Despesas", current.expenses, previous.expenses),
        ("Saldo", current.balance, previous.balance),
    ];
    let values: Vec<f64> = groups
        .iter()
        .flat_map(|(_, cur, prev)| [*cur, *prev])
        .collect();
    if values.iter().all(|value| *value == 0.0) {
        return None;
    }

    let top = values.iter().copied().fold(0.0, f64::max) * 1.15;
    let bottom = values.iter().copied().fold(0.0, f64::min).min(0.0) * 1.15;
    let title = format!(
        "Comparação: {} x {}",
        capitalize(&previous.month),
        capitalize(&current.month)
    );
    let previous_color = RGBColor(0x95, 0xa5, 0xa6);

    render(move |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 30))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d(0f64..3.0, bottom..top)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(3)
            .x_label_formatter(&|x| {
                groups
                    .get(x.floor() as usize)
                    .map(|(name, _, _)| (*name).to_string())
                    .unwrap_or_default()
            })
            .y_desc("Valor (R$)")
            .draw()?;

        chart.draw_series(groups.iter().enumerate().map(|(i, (_, _, prev))| {
            Rectangle::new(
                [(i as f64 + 0.1, 0.0), (i as f64 + 0.45, *prev)],
                previous_color.filled(),
            )
        }))?;
        chart.draw_series(groups.iter().enumerate().map(|(i, (_, cur, _))| {
            Rectangle::new(
                [(i as f64 + 0.55, 0.0), (i as f64 + 0.9, *cur)],
                BALANCE_BLUE.filled(),
            )
        }))?;
        Ok(())
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn render(draw: impl FnOnce(&ChartRoot<'_>) -> DrawResult) -> Option<Vec<u8>> {
    let mut pixels = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (WIDTH, HEIGHT)).into_drawing_area();
        if root.fill(&WHITE).is_err() {
            return None;
        }
        if let Err(err) = draw(&root) {
            tracing::warn!("failed to render chart: {err}");
            return None;
        }
        if root.present().is_err() {
            return None;
        }
    }
    encode_png(pixels)
}

fn encode_png(pixels: Vec<u8>) -> Option<Vec<u8>> {
    let img = image::RgbImage::from_raw(WIDTH, HEIGHT, pixels)?;
    let mut png = Vec::new();
    if let Err(err) = img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png) {
        tracing::warn!("failed to encode chart png: {err}");
        return None;
    }
    Some(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(category: &str, date: &str, amount: f64) -> TransactionSummary {
        TransactionSummary {
            id: 1,
            description: "x".to_string(),
            amount,
            date: date.parse().unwrap(),
            category: category.to_string(),
            category_id: None,
            tags: Vec::new(),
            notes: None,
            paid: true,
        }
    }

    #[test]
    fn pie_needs_at_least_one_expense() {
        assert!(pie_chart(&[]).is_none());
        assert!(pie_chart(&[expense("Salário", "2025-02-01", 5000.0)]).is_none());

        let png = pie_chart(&[
            expense("Mercado", "2025-02-01", -120.0),
            expense("Transporte", "2025-02-02", -40.0),
        ])
        .unwrap();
        // PNG magic bytes.
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn bar_chart_skips_income_only_data() {
        assert!(daily_bar_chart(&[expense("Salário", "2025-02-01", 5000.0)]).is_none());
        assert!(daily_bar_chart(&[expense("Mercado", "2025-02-01", -10.0)]).is_some());
    }

    #[test]
    fn empty_budgets_render_nothing() {
        assert!(budget_progress_chart(&[]).is_none());
        let png = budget_progress_chart(&[BudgetSummary {
            category_id: 1,
            category: "Mercado".to_string(),
            amount: 1000.0,
            predicted: 800.0,
            actual: 250.0,
        }]);
        assert!(png.is_some());
    }

    #[test]
    fn invoice_history_needs_data() {
        assert!(invoice_history_chart(&[]).is_none());
        let invoice: Invoice = serde_json::from_value(serde_json::json!({
            "id": 9,
            "date": "2025-02-10",
            "starting_date": "2025-01-11",
            "closing_date": "2025-02-10",
            "amount_cents": -123_400,
        }))
        .unwrap();
        assert!(invoice_history_chart(&[invoice]).is_some());
    }

    #[test]
    fn capitalize_handles_unicode() {
        assert_eq!(capitalize("fevereiro"), "Fevereiro");
        assert_eq!(capitalize("água"), "Água");
        assert_eq!(capitalize(""), "");
    }
}
