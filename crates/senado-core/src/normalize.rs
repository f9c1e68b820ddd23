//! Record normalisation for decoded service responses.
//!
//! The service nests records inconsistently across schema versions and
//! collapses single-element lists into a lone mapping. Everything here is
//! total: missing substructures yield empty strings or zero records, never
//! an error.

use serde_json::Value;
use tracing::debug;

use crate::materia::{Materia, MateriaAtualizada, SituacaoAtual};

/// Known root elements of `/materia/pesquisa/lista`, newest schema last.
pub const SEARCH_ROOTS: &[&str] = &["PesquisaBasicaMateria", "PesquisaBasicaMateriav7"];
/// Known root element of `/materia/situacaoatual/{codigo}`.
pub const STATUS_ROOTS: &[&str] = &["SituacaoAtualMateria"];
/// Known root element of `/materia/atualizadas`.
pub const UPDATED_ROOTS: &[&str] = &["AtualizacoesMateria"];
/// Container path from a root down to the bill records.
pub const MATERIA_PATH: &[&str] = &["Materias", "Materia"];

/// `true` for anything other than null or an empty string/object/array.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Look up `key`, treating null and empty values as absent.
fn get_present<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| is_present(v))
}

/// Find the logical root node: the first of `names` present at the top of
/// the document, or the whole document when none match.
pub fn locate_root<'a>(doc: &'a Value, names: &[&str]) -> &'a Value {
    names
        .iter()
        .find_map(|name| get_present(doc, name))
        .unwrap_or(doc)
}

/// View a value as a sequence.
///
/// Arrays are returned element-wise, null becomes an empty sequence, and any
/// other value (typically a lone mapping) becomes a one-element sequence.
pub fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Descend through `path` from `root` and return the records found there.
///
/// Any missing step yields zero records.
pub fn records_at<'a>(root: &'a Value, path: &[&str]) -> Vec<&'a Value> {
    let mut node = root;
    for key in path {
        match get_present(node, key) {
            Some(next) => node = next,
            None => {
                debug!(key, "record container missing, zero records");
                return Vec::new();
            }
        }
    }
    as_list(node)
}

/// Render a scalar as a cleaned string.
///
/// Absent or null → `""`; numbers and booleans are stringified; strings are
/// trimmed. A mapping carrying element text under `#text` yields that text.
/// Any other structure is rendered as compact JSON.
pub fn clean_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Object(map)) => match map.get("#text") {
            Some(text) => clean_text(Some(text)),
            None => Value::Object(map.clone()).to_string(),
        },
        Some(other) => other.to_string(),
    }
}

/// First non-empty cleaned value among `keys`.
fn first_text(record: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| clean_text(record.get(key)))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Cleaned text of `field` inside the optional sub-structure `block`.
fn nested_text(record: &Value, block: &str, field: &str) -> String {
    get_present(record, block)
        .map(|sub| clean_text(sub.get(field)))
        .unwrap_or_default()
}

/// Normalise a `/materia/pesquisa/lista` document into bill rows.
pub fn search_results(doc: &Value) -> Vec<Materia> {
    let root = locate_root(doc, SEARCH_ROOTS);
    records_at(root, MATERIA_PATH)
        .into_iter()
        .map(|m| Materia {
            codigo: clean_text(m.get("Codigo")),
            sigla: clean_text(m.get("Sigla")),
            numero: clean_text(m.get("Numero")),
            ano: clean_text(m.get("Ano")),
            ementa: clean_text(m.get("Ementa")),
            autor: clean_text(m.get("Autor")),
            situacao: nested_text(m, "SituacaoAtual", "DescricaoSituacao"),
            link_tramitacao: first_text(m, &["LinkProcesso", "UrlTramitacao"]),
        })
        .collect()
}

/// Normalise a `/materia/atualizadas` document into update rows.
pub fn updated_results(doc: &Value) -> Vec<MateriaAtualizada> {
    let root = locate_root(doc, UPDATED_ROOTS);
    records_at(root, MATERIA_PATH)
        .into_iter()
        .map(|m| MateriaAtualizada {
            codigo: clean_text(m.get("Codigo")),
            sigla: clean_text(m.get("Sigla")),
            numero: clean_text(m.get("Numero")),
            ano: clean_text(m.get("Ano")),
            ultima_atualizacao: first_text(m, &["DataUltimaAtualizacao", "DataAtualizacao"]),
            ementa: clean_text(m.get("Ementa")),
        })
        .collect()
}

/// Normalise a `/materia/situacaoatual/{codigo}` document.
///
/// Returns `None` when the document holds neither a bill block nor a status
/// block. When the bill block carries no code, `codigo` is echoed back.
pub fn current_status(doc: &Value, codigo: &str) -> Option<SituacaoAtual> {
    let root = locate_root(doc, STATUS_ROOTS);
    let materia = get_present(root, "Materia")
        .or_else(|| records_at(root, MATERIA_PATH).into_iter().next());
    let situacao = get_present(root, "SituacaoAtual")
        .or_else(|| materia.and_then(|m| get_present(m, "SituacaoAtual")));

    if materia.is_none() && situacao.is_none() {
        return None;
    }

    let codigo_resposta = materia
        .map(|m| clean_text(m.get("Codigo")))
        .unwrap_or_default();
    let status_field = |field: &str| {
        situacao
            .map(|s| clean_text(s.get(field)))
            .unwrap_or_default()
    };

    Some(SituacaoAtual {
        codigo: if codigo_resposta.is_empty() {
            codigo.trim().to_string()
        } else {
            codigo_resposta
        },
        descricao: status_field("DescricaoSituacao"),
        data: status_field("DataSituacao"),
        orgao: status_field("DescricaoOrgao"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn locate_root_prefers_known_names_in_order() {
        let doc = json!({"PesquisaBasicaMateriav7": {"Materias": null}});
        assert_eq!(
            locate_root(&doc, SEARCH_ROOTS),
            &json!({"Materias": null})
        );
    }

    #[test]
    fn locate_root_falls_back_to_document() {
        let doc = json!({"Materias": {"Materia": {"Codigo": "1"}}});
        assert_eq!(locate_root(&doc, SEARCH_ROOTS), &doc);
    }

    #[test]
    fn locate_root_skips_empty_known_root() {
        let doc = json!({"PesquisaBasicaMateria": null, "PesquisaBasicaMateriav7": {"X": "1"}});
        assert_eq!(locate_root(&doc, SEARCH_ROOTS), &json!({"X": "1"}));
    }

    #[test]
    fn as_list_wraps_single_mapping() {
        let single = json!({"Codigo": "1"});
        assert_eq!(as_list(&single).len(), 1);
        let many = json!([{"Codigo": "1"}, {"Codigo": "2"}]);
        assert_eq!(as_list(&many).len(), 2);
        assert!(as_list(&Value::Null).is_empty());
    }

    #[test]
    fn records_at_missing_container_is_empty() {
        assert!(records_at(&json!({}), MATERIA_PATH).is_empty());
        assert!(records_at(&json!({"Materias": null}), MATERIA_PATH).is_empty());
        assert!(records_at(&json!({"Materias": {"Outro": "x"}}), MATERIA_PATH).is_empty());
    }

    #[test]
    fn clean_text_rules() {
        assert_eq!(clean_text(None), "");
        assert_eq!(clean_text(Some(&Value::Null)), "");
        assert_eq!(clean_text(Some(&json!("  PL  "))), "PL");
        assert_eq!(clean_text(Some(&json!(2025))), "2025");
        assert_eq!(clean_text(Some(&json!(1.5))), "1.5");
        assert_eq!(clean_text(Some(&json!(true))), "true");
        assert_eq!(
            clean_text(Some(&json!({"@tipo": "x", "#text": " Senado "}))),
            "Senado"
        );
    }

    #[test]
    fn search_two_records_in_order() {
        let doc = json!({
            "PesquisaBasicaMateria": {
                "Materias": {
                    "Materia": [
                        {
                            "Codigo": "100",
                            "Sigla": "PL",
                            "Numero": "1",
                            "Ano": "2025",
                            "Ementa": " Dispõe sobre X. ",
                            "Autor": "Senador A",
                            "SituacaoAtual": {"DescricaoSituacao": "Em tramitação"},
                            "LinkProcesso": "https://example.org/100"
                        },
                        {
                            "Codigo": "101",
                            "Sigla": "PL",
                            "Numero": "2",
                            "Ano": "2025",
                            "UrlTramitacao": "https://example.org/101"
                        }
                    ]
                }
            }
        });
        let rows = search_results(&doc);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].codigo, "100");
        assert_eq!(rows[0].ementa, "Dispõe sobre X.");
        assert_eq!(rows[0].situacao, "Em tramitação");
        assert_eq!(rows[0].link_tramitacao, "https://example.org/100");
        assert_eq!(rows[1].situacao, "");
        assert_eq!(rows[1].autor, "");
        assert_eq!(rows[1].link_tramitacao, "https://example.org/101");
    }

    #[test]
    fn search_single_collapsed_record_yields_one_row() {
        let doc = json!({"PesquisaBasicaMateria": {"Materias": {"Materia": {"Codigo": "7"}}}});
        let rows = search_results(&doc);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].codigo, "7");
        assert_eq!(rows[0].sigla, "");
    }

    #[test]
    fn search_without_records_is_empty() {
        let doc = json!({"PesquisaBasicaMateria": {"Materias": null}});
        assert!(search_results(&doc).is_empty());
    }

    #[test]
    fn empty_link_processo_falls_back_to_url_tramitacao() {
        let doc = json!({"Materias": {"Materia": {
            "LinkProcesso": null,
            "UrlTramitacao": "https://example.org/t"
        }}});
        assert_eq!(search_results(&doc)[0].link_tramitacao, "https://example.org/t");
    }

    #[test]
    fn updated_uses_alternate_date_field() {
        let doc = json!({"AtualizacoesMateria": {"Materias": {"Materia": [
            {"Codigo": "1", "DataUltimaAtualizacao": "2025-05-01 10:00:00"},
            {"Codigo": "2", "DataAtualizacao": "2025-05-02"}
        ]}}});
        let rows = updated_results(&doc);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ultima_atualizacao, "2025-05-01 10:00:00");
        assert_eq!(rows[1].ultima_atualizacao, "2025-05-02");
    }

    #[test]
    fn status_from_flat_blocks() {
        let doc = json!({"SituacaoAtualMateria": {
            "Materia": {"Codigo": "555"},
            "SituacaoAtual": {
                "DescricaoSituacao": "Aprovada",
                "DataSituacao": "2025-06-10",
                "DescricaoOrgao": "Plenário"
            }
        }});
        let s = current_status(&doc, "555").unwrap();
        assert_eq!(s.codigo, "555");
        assert_eq!(s.descricao, "Aprovada");
        assert_eq!(s.data, "2025-06-10");
        assert_eq!(s.orgao, "Plenário");
    }

    #[test]
    fn status_echoes_requested_code_when_missing() {
        let doc = json!({"SituacaoAtualMateria": {
            "SituacaoAtual": {"DescricaoSituacao": "Arquivada"}
        }});
        let s = current_status(&doc, " 42 ").unwrap();
        assert_eq!(s.codigo, "42");
        assert_eq!(s.orgao, "");
    }

    #[test]
    fn status_inside_materias_container() {
        let doc = json!({"SituacaoAtualMateria": {"Materias": {"Materia": {
            "Codigo": "9",
            "SituacaoAtual": {"DescricaoSituacao": "Pronta para pauta"}
        }}}});
        let s = current_status(&doc, "9").unwrap();
        assert_eq!(s.descricao, "Pronta para pauta");
    }

    #[test]
    fn status_without_record_is_none() {
        let doc = json!({"SituacaoAtualMateria": {"Metadados": {"Versao": "1"}}});
        assert_eq!(current_status(&doc, "1"), None);
    }
}
