pub mod materia;
pub mod normalize;
pub mod schema;
pub mod xml;

pub use materia::{Materia, MateriaAtualizada, SituacaoAtual, TableRow};
pub use normalize::{as_list, clean_text, locate_root, records_at};
pub use schema::senado;
pub use xml::{XmlError, parse_document};
