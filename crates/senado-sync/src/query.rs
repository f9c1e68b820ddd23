//! Bill queries: search by filters, current status, recently updated.
//!
//! Each query is a thin adapter over a [`Fetcher`] and the normaliser. When
//! the fetcher yields nothing, the query yields an empty table (or `None`);
//! the fetcher's own notification is the only failure signal.

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use senado_core::normalize::{current_status, search_results, updated_results};
use senado_core::schema::senado;
use senado_core::{Materia, MateriaAtualizada, SituacaoAtual, TableRow};
use senado_store::Watchlist;
use tracing::{debug, error, info, warn};

use crate::fetch::Fetcher;

pub const SEARCH_PATH: &str = "/materia/pesquisa/lista";
pub const UPDATED_PATH: &str = "/materia/atualizadas";

/// Path of the current-status endpoint for one bill.
///
/// Bill codes are numeric identifiers; anything that is not a non-empty run
/// of ASCII alphanumerics would change the request path and yields `None`.
pub fn status_path(codigo: &str) -> Option<String> {
    let codigo = codigo.trim();
    if codigo.is_empty() || !codigo.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!("/materia/situacaoatual/{codigo}"))
}

/// Optional filters for `/materia/pesquisa/lista`. Only present values are
/// sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    /// Bill-type code, e.g. `PL`, `PEC`, `PLS`, `PLC`.
    pub sigla: Option<String>,
    pub ano: Option<i32>,
    /// Free text matched against summary and subjects.
    pub palavra_chave: Option<String>,
    pub codigo_situacao: Option<String>,
    pub tramitando: Option<bool>,
    pub indicador_situacao_atual: Option<bool>,
}

fn flag(value: bool) -> String {
    let token = if value { "S" } else { "N" };
    token.to_string()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl SearchFilters {
    /// Query parameters under the service's own names.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(sigla) = non_empty(&self.sigla) {
            params.push(("sigla", sigla));
        }
        if let Some(ano) = self.ano.filter(|a| *a != 0) {
            params.push(("ano", ano.to_string()));
        }
        if let Some(palavra) = non_empty(&self.palavra_chave) {
            params.push(("palavraChave", palavra));
        }
        if let Some(codigo) = non_empty(&self.codigo_situacao) {
            params.push(("codigoSituacao", codigo));
        }
        if let Some(t) = self.tramitando {
            params.push(("tramitando", flag(t)));
        }
        if let Some(i) = self.indicador_situacao_atual {
            params.push(("indicadorSituacaoAtual", flag(i)));
        }
        params
    }
}

/// Reindex rows onto `schema`, falling back to an empty table.
fn table<R: TableRow>(schema: SchemaRef, rows: &[R]) -> RecordBatch {
    senado::reindex(schema.clone(), rows)
        .inspect_err(|e| error!(error = %e, "building result table"))
        .unwrap_or_else(|_| RecordBatch::new_empty(schema))
}

/// Search bills, returning typed rows.
pub async fn buscar_materias<F: Fetcher + ?Sized>(fetcher: &F, filters: &SearchFilters) -> Vec<Materia> {
    let params = filters.to_params();
    let Some(doc) = fetcher.fetch(SEARCH_PATH, &params).await else {
        return Vec::new();
    };
    let rows = search_results(&doc);
    info!(count = rows.len(), "search returned bills");
    rows
}

/// Search bills as an eight-column table (possibly empty).
pub async fn pesquisar_materias<F: Fetcher + ?Sized>(fetcher: &F, filters: &SearchFilters) -> RecordBatch {
    let rows = buscar_materias(fetcher, filters).await;
    table(senado::materia_schema(), &rows)
}

/// Current status of one bill; `None` when unavailable.
pub async fn situacao_atual<F: Fetcher + ?Sized>(fetcher: &F, codigo: &str) -> Option<SituacaoAtual> {
    let Some(path) = status_path(codigo) else {
        warn!(codigo, "not a valid bill code, skipping status lookup");
        return None;
    };
    let doc = fetcher.fetch(&path, &[]).await?;
    let status = current_status(&doc, codigo);
    if status.is_none() {
        debug!(codigo, "no status record in response");
    }
    status
}

/// Recently updated bills, returning typed rows.
pub async fn buscar_atualizadas<F: Fetcher + ?Sized>(fetcher: &F) -> Vec<MateriaAtualizada> {
    let Some(doc) = fetcher.fetch(UPDATED_PATH, &[]).await else {
        return Vec::new();
    };
    let rows = updated_results(&doc);
    info!(count = rows.len(), "recently updated bills");
    rows
}

/// Recently updated bills as a table with a `ultima_atualizacao` column.
pub async fn materias_atualizadas<F: Fetcher + ?Sized>(fetcher: &F) -> RecordBatch {
    let rows = buscar_atualizadas(fetcher).await;
    table(senado::atualizada_schema(), &rows)
}

/// Look up every tracked bill in turn and record status changes.
///
/// Returns the number of bills whose status changed. Failed lookups leave
/// the item untouched.
pub async fn refresh_watchlist<F: Fetcher + ?Sized>(fetcher: &F, watchlist: &mut Watchlist) -> usize {
    let codigos: Vec<String> = watchlist.itens.keys().cloned().collect();
    let mut changed = 0;
    for codigo in codigos {
        let Some(status) = situacao_atual(fetcher, &codigo).await else {
            continue;
        };
        if watchlist.record_status(&codigo, &status.descricao) {
            info!(codigo = %codigo, situacao = %status.descricao, "status changed");
            changed += 1;
        }
    }
    changed
}
