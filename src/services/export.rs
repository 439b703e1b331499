use serde::Serialize;

use crate::errors::InternalError;

/// Renders already-scoped rows as CSV
///
/// The renderer never filters; whatever rows it is handed end up in the
/// document.
#[derive(Debug, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub const CONTENT_TYPE: &'static str = "text/csv";

    /// Serialize `rows` with a header line taken from the row's field names
    pub fn render<R: Serialize>(&self, rows: &[R]) -> Result<Vec<u8>, InternalError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| InternalError::Export(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| InternalError::Export(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        id: i32,
        code: String,
        city: Option<String>,
    }

    #[test]
    fn test_render_writes_header_and_rows() {
        let rows = vec![
            Row { id: 1, code: "PRP-100001".to_string(), city: Some("Lyon".to_string()) },
            Row { id: 2, code: "PRP-100002".to_string(), city: None },
        ];

        let csv = String::from_utf8(CsvExporter.render(&rows).unwrap()).unwrap();

        assert_eq!(csv, "id,code,city\n1,PRP-100001,Lyon\n2,PRP-100002,\n");
    }

    #[test]
    fn test_render_quotes_embedded_commas() {
        let rows = vec![Row { id: 1, code: "PRP-1".to_string(), city: Some("Paris, FR".to_string()) }];

        let csv = String::from_utf8(CsvExporter.render(&rows).unwrap()).unwrap();

        assert!(csv.contains("\"Paris, FR\""));
    }

    #[test]
    fn test_render_empty_rows_is_empty_document() {
        let rows: Vec<Row> = Vec::new();

        assert!(CsvExporter.render(&rows).unwrap().is_empty());
    }
}
