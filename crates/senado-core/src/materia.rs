//! Bill ("matéria") projections of the Senate open data service.

use serde::{Deserialize, Serialize};

/// A row that can be projected onto a named table column.
///
/// Returns `None` for columns the row does not know about; the table
/// builder fills those with an empty string.
pub trait TableRow {
    fn column(&self, name: &str) -> Option<&str>;
}

/// One bill as returned by `/materia/pesquisa/lista`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Materia {
    pub codigo: String,
    /// Bill-type code, e.g. `PL`, `PEC`.
    pub sigla: String,
    pub numero: String,
    pub ano: String,
    pub ementa: String,
    pub autor: String,
    /// Description of the current procedural status.
    pub situacao: String,
    pub link_tramitacao: String,
}

impl TableRow for Materia {
    fn column(&self, name: &str) -> Option<&str> {
        let value = match name {
            "codigo" => &self.codigo,
            "sigla" => &self.sigla,
            "numero" => &self.numero,
            "ano" => &self.ano,
            "ementa" => &self.ementa,
            "autor" => &self.autor,
            "situacao" => &self.situacao,
            "link_tramitacao" => &self.link_tramitacao,
            _ => return None,
        };
        Some(value)
    }
}

/// One bill as returned by `/materia/atualizadas`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MateriaAtualizada {
    pub codigo: String,
    pub sigla: String,
    pub numero: String,
    pub ano: String,
    pub ultima_atualizacao: String,
    pub ementa: String,
}

impl TableRow for MateriaAtualizada {
    fn column(&self, name: &str) -> Option<&str> {
        let value = match name {
            "codigo" => &self.codigo,
            "sigla" => &self.sigla,
            "numero" => &self.numero,
            "ano" => &self.ano,
            "ultima_atualizacao" => &self.ultima_atualizacao,
            "ementa" => &self.ementa,
            _ => return None,
        };
        Some(value)
    }
}

/// Current status of a single bill, fetched on demand and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SituacaoAtual {
    pub codigo: String,
    pub descricao: String,
    /// Date of the status as reported by the service (not reformatted).
    pub data: String,
    /// Body (committee, plenary, ...) currently holding the bill.
    pub orgao: String,
}
