//! Watchlist of tracked bills, persisted as a single JSON file.
//!
//! The file holds two top-level fields: `itens` (bill code → tracking
//! metadata) and `historico` (append-only change log). It is read and written
//! whole on every access. There is no locking and no atomic rename: a single
//! user and a single process are assumed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use senado_core::Materia;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::StoreError;

/// User-chosen metadata kept for one tracked bill.
///
/// Every field defaults to empty so hand-edited files still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackedItem {
    pub sigla: String,
    pub numero: String,
    pub ano: String,
    pub ementa: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nota: Option<String>,
    /// RFC 3339 timestamp string.
    pub adicionado_em: String,
    /// Last status description seen by a refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ultima_situacao: Option<String>,
}

impl TrackedItem {
    /// Build an item from a search row, keeping its current status.
    pub fn from_materia(materia: &Materia) -> Self {
        Self {
            sigla: materia.sigla.clone(),
            numero: materia.numero.clone(),
            ano: materia.ano.clone(),
            ementa: materia.ementa.clone(),
            ultima_situacao: (!materia.situacao.is_empty()).then(|| materia.situacao.clone()),
            ..Default::default()
        }
    }

    pub fn with_nota(mut self, nota: Option<String>) -> Self {
        self.nota = nota.filter(|n| !n.trim().is_empty());
        self
    }

    /// Short label such as `PL 2/2025`, empty when the bill is not identified.
    pub fn label(&self) -> String {
        if self.sigla.is_empty() && self.numero.is_empty() {
            return String::new();
        }
        format!("{} {}/{}", self.sigla, self.numero, self.ano)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Adicionado,
    Removido,
    SituacaoAlterada,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HistoryAction::Adicionado => "adicionado",
            HistoryAction::Removido => "removido",
            HistoryAction::SituacaoAlterada => "situacao_alterada",
        };
        f.write_str(s)
    }
}

/// One entry of the change log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub codigo: String,
    pub acao: HistoryAction,
    /// RFC 3339 timestamp string.
    pub quando: String,
    #[serde(default)]
    pub detalhe: String,
}

impl HistoryEvent {
    fn now(codigo: &str, acao: HistoryAction, detalhe: String) -> Self {
        Self {
            codigo: codigo.to_string(),
            acao,
            quando: Utc::now().to_rfc3339(),
            detalhe,
        }
    }
}

/// In-memory watchlist. `historico` only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watchlist {
    #[serde(default)]
    pub itens: BTreeMap<String, TrackedItem>,
    #[serde(default)]
    pub historico: Vec<HistoryEvent>,
}

impl Watchlist {
    pub fn is_tracked(&self, codigo: &str) -> bool {
        self.itens.contains_key(codigo)
    }

    /// Start tracking `codigo`. Returns `false`, recording nothing, when it
    /// is already tracked.
    pub fn track(&mut self, codigo: &str, mut item: TrackedItem) -> bool {
        if self.is_tracked(codigo) {
            return false;
        }
        if item.adicionado_em.is_empty() {
            item.adicionado_em = Utc::now().to_rfc3339();
        }
        let detalhe = item.label();
        self.itens.insert(codigo.to_string(), item);
        self.historico
            .push(HistoryEvent::now(codigo, HistoryAction::Adicionado, detalhe));
        true
    }

    /// Stop tracking `codigo`, returning the removed item.
    pub fn untrack(&mut self, codigo: &str) -> Option<TrackedItem> {
        let item = self.itens.remove(codigo)?;
        self.historico
            .push(HistoryEvent::now(codigo, HistoryAction::Removido, item.label()));
        Some(item)
    }

    /// Record a freshly observed status for a tracked bill.
    ///
    /// Returns `true` when the status changed and an event was appended.
    /// Untracked codes and empty or unchanged descriptions are ignored.
    pub fn record_status(&mut self, codigo: &str, descricao: &str) -> bool {
        let descricao = descricao.trim();
        if descricao.is_empty() {
            return false;
        }
        let Some(item) = self.itens.get_mut(codigo) else {
            return false;
        };
        if item.ultima_situacao.as_deref() == Some(descricao) {
            return false;
        }
        item.ultima_situacao = Some(descricao.to_string());
        self.historico.push(HistoryEvent::now(
            codigo,
            HistoryAction::SituacaoAlterada,
            descricao.to_string(),
        ));
        true
    }

    /// Change-log entries for one bill, oldest first.
    pub fn history_of<'a>(&'a self, codigo: &'a str) -> impl Iterator<Item = &'a HistoryEvent> {
        self.historico.iter().filter(move |e| e.codigo == codigo)
    }
}

/// File-backed watchlist. The path is injected by the caller.
#[derive(Debug, Clone)]
pub struct WatchlistStore {
    path: PathBuf,
}

impl WatchlistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the watchlist.
    ///
    /// A missing file yields an empty watchlist. An unreadable or unparsable
    /// file also yields an empty watchlist; the failure is only logged.
    pub fn load(&self) -> Watchlist {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no watchlist file, starting empty");
            return Watchlist::default();
        }
        self.read()
            .inspect_err(|e| {
                warn!(error = %e, path = %self.path.display(), "unreadable watchlist, starting empty")
            })
            .unwrap_or_default()
    }

    fn read(&self) -> Result<Watchlist, StoreError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Overwrite the backing file with `watchlist`, creating parent
    /// directories as needed.
    pub fn save(&self, watchlist: &Watchlist) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut json = serde_json::to_string_pretty(watchlist)?;
        json.push('\n');
        std::fs::write(&self.path, json).map_err(io_err)?;
        info!(
            path = %self.path.display(),
            itens = watchlist.itens.len(),
            historico = watchlist.historico.len(),
            "saved watchlist"
        );
        Ok(())
    }

    /// Load, apply `f`, and save.
    pub fn update<T>(&self, f: impl FnOnce(&mut Watchlist) -> T) -> Result<T, StoreError> {
        let mut watchlist = self.load();
        let out = f(&mut watchlist);
        self.save(&watchlist)?;
        Ok(out)
    }
}
