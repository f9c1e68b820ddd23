//! Terminal rendering for query results and the watchlist.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use senado_core::SituacaoAtual;
use senado_store::{HistoryEvent, Watchlist};

const MAX_CELL_CHARS: usize = 60;

// ── Tables ──

/// Print a result table, shortening long cells such as `ementa`.
pub fn print_table(batch: &RecordBatch) -> anyhow::Result<()> {
    if batch.num_rows() == 0 {
        println!("(no results)");
        return Ok(());
    }
    let shortened = shorten_cells(batch, MAX_CELL_CHARS)?;
    println!("{}", pretty_format_batches(&[shortened])?);
    println!("{} row(s)", batch.num_rows());
    Ok(())
}

fn shorten(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let head: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}

/// Copy of `batch` with every Utf8 cell cut to `max` characters.
fn shorten_cells(batch: &RecordBatch, max: usize) -> anyhow::Result<RecordBatch> {
    let columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| match col.as_any().downcast_ref::<StringArray>() {
            Some(strings) => {
                let cut: StringArray = (0..strings.len())
                    .map(|i| (!strings.is_null(i)).then(|| shorten(strings.value(i), max)))
                    .collect();
                Arc::new(cut) as ArrayRef
            }
            None => col.clone(),
        })
        .collect();
    Ok(RecordBatch::try_new(batch.schema(), columns)?)
}

// ── Status card ──

pub fn print_status_card(status: &SituacaoAtual) {
    println!("=== {} ===", status.codigo);
    print_field("descricao", &status.descricao);
    print_field("data", &status.data);
    print_field("orgao", &status.orgao);
}

fn print_field(name: &str, value: &str) {
    if value.is_empty() {
        println!("  {:<26} -", name);
    } else {
        println!("  {:<26} {}", name, value);
    }
}

// ── Watchlist ──

pub fn print_watchlist(watchlist: &Watchlist) {
    if watchlist.itens.is_empty() {
        println!("(watchlist is empty)");
        return;
    }
    for (codigo, item) in &watchlist.itens {
        let label = item.label();
        if label.is_empty() {
            println!("{codigo}");
        } else {
            println!("{codigo}  {label}");
        }
        if !item.ementa.is_empty() {
            println!("    {}", shorten(&item.ementa, 76));
        }
        if let Some(situacao) = &item.ultima_situacao {
            println!("    situacao: {situacao}");
        }
        if let Some(nota) = &item.nota {
            println!("    nota: {nota}");
        }
    }
}

pub fn print_history<'a>(events: impl Iterator<Item = &'a HistoryEvent>) {
    let mut any = false;
    for e in events {
        any = true;
        print!("{}  {:<10} {:<18}", e.quando, e.codigo, e.acao.to_string());
        if !e.detalhe.is_empty() {
            print!(" {}", e.detalhe);
        }
        println!();
    }
    if !any {
        println!("(no history)");
    }
}
