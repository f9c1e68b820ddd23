/// Arrow table definitions for normalised Senate records.
pub mod senado {
    use std::sync::Arc;

    use arrow::array::{Array, ArrayRef, StringArray};
    use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
    use arrow::error::ArrowError;
    use arrow::record_batch::RecordBatch;

    use crate::materia::{Materia, MateriaAtualizada, TableRow};

    /// Column order of the bill search table.
    pub const MATERIA_COLUMNS: &[&str] = &[
        "codigo",
        "sigla",
        "numero",
        "ano",
        "ementa",
        "autor",
        "situacao",
        "link_tramitacao",
    ];

    /// Column order of the recently-updated table.
    pub const ATUALIZADA_COLUMNS: &[&str] = &[
        "codigo",
        "sigla",
        "numero",
        "ano",
        "ultima_atualizacao",
        "ementa",
    ];

    fn utf8_schema(columns: &[&str]) -> Schema {
        Schema::new(
            columns
                .iter()
                .map(|name| Field::new(*name, DataType::Utf8, false))
                .collect::<Vec<_>>(),
        )
    }

    /// Schema for bill search results. Every column is non-null Utf8.
    pub fn materia_schema() -> SchemaRef {
        Arc::new(utf8_schema(MATERIA_COLUMNS))
    }

    /// Schema for recently-updated bills.
    pub fn atualizada_schema() -> SchemaRef {
        Arc::new(utf8_schema(ATUALIZADA_COLUMNS))
    }

    /// Reindex `rows` onto `schema`: one column per schema field, in schema
    /// order, with `""` wherever a row has no value for that column.
    pub fn reindex<R: TableRow>(schema: SchemaRef, rows: &[R]) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = schema
            .fields()
            .iter()
            .map(|field| {
                let values: StringArray = rows
                    .iter()
                    .map(|row| Some(row.column(field.name()).unwrap_or("")))
                    .collect();
                Arc::new(values) as ArrayRef
            })
            .collect();
        RecordBatch::try_new(schema, columns)
    }

    /// Bill search table.
    pub fn materias_batch(rows: &[Materia]) -> Result<RecordBatch, ArrowError> {
        reindex(materia_schema(), rows)
    }

    /// Recently-updated table.
    pub fn atualizadas_batch(rows: &[MateriaAtualizada]) -> Result<RecordBatch, ArrowError> {
        reindex(atualizada_schema(), rows)
    }

    /// Read a Utf8 cell, `None` when the column is missing.
    pub fn cell(batch: &RecordBatch, column: &str, row: usize) -> Option<String> {
        let idx = batch.schema().index_of(column).ok()?;
        let arr = batch.column(idx).as_any().downcast_ref::<StringArray>()?;
        (row < arr.len()).then(|| arr.value(row).to_string())
    }
}
