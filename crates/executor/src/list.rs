use crate::{CommandOutput, Engine};
use common::DbResult;
use parser::ObjectKind;

/// LIST TABLES / LIST MATRICES: one line of statistics per object.
pub(crate) fn run(engine: &mut Engine, kind: ObjectKind) -> DbResult<CommandOutput> {
    match kind {
        ObjectKind::Table => {
            let mut rows: Vec<Vec<String>> = engine
                .catalog
                .tables()
                .map(|meta| {
                    vec![
                        meta.name.clone(),
                        meta.column_count().to_string(),
                        meta.row_count.to_string(),
                        meta.block_count.to_string(),
                        if meta.permanent { "yes" } else { "no" }.to_string(),
                    ]
                })
                .collect();
            rows.sort();
            Ok(CommandOutput::Listing {
                headers: ["name", "columns", "rows", "blocks", "permanent"]
                    .map(String::from)
                    .to_vec(),
                rows,
            })
        }
        ObjectKind::Matrix => {
            let mut rows: Vec<Vec<String>> = engine
                .catalog
                .matrices()
                .map(|meta| {
                    vec![
                        meta.name.clone(),
                        meta.dimension.to_string(),
                        meta.block_count.to_string(),
                        match meta.symmetric {
                            Some(true) => "yes",
                            Some(false) => "no",
                            None => "unknown",
                        }
                        .to_string(),
                    ]
                })
                .collect();
            rows.sort();
            Ok(CommandOutput::Listing {
                headers: ["name", "dimension", "blocks", "symmetric"]
                    .map(String::from)
                    .to_vec(),
                rows,
            })
        }
    }
}
