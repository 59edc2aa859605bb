//! PDF export for the watchlist.
//!
//! The table is rendered from a tera template to HTML and converted with
//! wkhtmltopdf when it is installed. Without it the HTML itself is served
//! so the browser's print dialog can produce the document.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use std::collections::HashMap;
use std::process::Stdio;
use tera::{Context, Tera};
use tokio::process::Command;
use tracing::{error, info, warn};

/// Register custom Tera filters used by page and export templates.
///
/// - `format`: printf-style formatting, e.g. `"%.1f" | format(value=rating)`
/// - `money`:  2-decimal rendering; passes through already-formatted strings
pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("format", tera_format_filter);
    tera.register_filter("money", tera_money_filter);
}

/// Implements printf-style `format` filter for Tera.
/// Usage: `"%.1f" | format(value=some_number)`
fn tera_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let format_str = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("format filter expects a string input"))?;

    let val = args
        .get("value")
        .ok_or_else(|| tera::Error::msg("format filter requires a 'value' argument"))?;

    let num = match val {
        tera::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        tera::Value::Null => 0.0,
        _ => 0.0,
    };

    // Parse %.<N>f patterns
    let result = if let Some(rest) = format_str.strip_prefix("%.") {
        if let Some(precision_str) = rest.strip_suffix('f') {
            let precision: usize = precision_str.parse().unwrap_or(2);
            format!("{:.*}", precision, num)
        } else {
            format!("{}", num)
        }
    } else {
        format!("{}", num)
    };

    Ok(tera::Value::String(result))
}

/// Money filter. Decimal prices serialize as pre-formatted strings, so
/// strings pass through untouched; bare numbers are fixed to 2 places.
fn tera_money_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    match value {
        tera::Value::String(s) => Ok(tera::Value::String(s.clone())),
        tera::Value::Number(n) => {
            Ok(tera::Value::String(format!("{:.2}", n.as_f64().unwrap_or(0.0))))
        }
        _ => Ok(tera::Value::String("0.00".to_string())),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("template error: {0}")]
    Template(String),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders export documents, converting to PDF when wkhtmltopdf exists.
#[derive(Clone, Debug)]
pub struct PdfExporter {
    tera: Tera,
    wkhtmltopdf_path: Option<String>,
}

impl PdfExporter {
    /// Create an exporter with templates from the given directory.
    pub fn new(template_dir: &str) -> Result<Self, ExportError> {
        let mut tera = Tera::new(&format!("{}/**/*", template_dir))
            .map_err(|e| ExportError::Template(e.to_string()))?;

        register_template_filters(&mut tera);

        Ok(Self { tera, wkhtmltopdf_path: detect_wkhtmltopdf() })
    }

    /// Create an exporter with the embedded template, for fresh checkouts
    /// and tests where the templates directory is not on disk.
    pub fn with_embedded_templates() -> Self {
        let mut tera = Tera::default();
        register_template_filters(&mut tera);

        tera.add_raw_template(
            "watchlist.html.tera",
            include_str!("../../../templates/export/watchlist.html.tera"),
        )
        .expect("embedded watchlist export template should parse");

        Self { tera, wkhtmltopdf_path: detect_wkhtmltopdf() }
    }

    #[cfg(test)]
    fn without_converter(mut self) -> Self {
        self.wkhtmltopdf_path = None;
        self
    }

    /// Render the watchlist export. `export_data` carries `generated_at`
    /// and the table rows.
    pub async fn generate_watchlist_pdf(
        &self,
        export_data: &serde_json::Value,
    ) -> Result<ExportResult, ExportError> {
        let mut context = Context::new();
        context.insert(
            "generated_at",
            &export_data.get("generated_at").cloned().unwrap_or(serde_json::json!("")),
        );
        context.insert(
            "rows",
            &export_data.get("rows").cloned().unwrap_or(serde_json::json!([])),
        );

        let html = self
            .tera
            .render("watchlist.html.tera", &context)
            .map_err(|e| ExportError::Template(e.to_string()))?;

        if let Some(ref wkhtmltopdf) = self.wkhtmltopdf_path {
            match self.convert_html_to_pdf(&html, wkhtmltopdf).await {
                Ok(pdf_bytes) => Ok(ExportResult::Pdf(pdf_bytes)),
                Err(e) => {
                    warn!(error = %e, "PDF conversion failed, falling back to HTML");
                    Ok(ExportResult::Html(html))
                }
            }
        } else {
            Ok(ExportResult::Html(html))
        }
    }

    async fn convert_html_to_pdf(
        &self,
        html: &str,
        wkhtmltopdf_path: &str,
    ) -> Result<Vec<u8>, ExportError> {
        let temp_dir = std::env::temp_dir();
        let html_path = temp_dir.join(format!("watchlist_{}.html", uuid::Uuid::new_v4()));
        let pdf_path = temp_dir.join(format!("watchlist_{}.pdf", uuid::Uuid::new_v4()));

        tokio::fs::write(&html_path, html).await?;

        let output = Command::new(wkhtmltopdf_path)
            .arg("--page-size")
            .arg("A4")
            .arg("--margin-top")
            .arg("10mm")
            .arg("--margin-bottom")
            .arg("10mm")
            .arg("--margin-left")
            .arg("10mm")
            .arg("--margin-right")
            .arg("10mm")
            .arg("--encoding")
            .arg("utf-8")
            .arg("--enable-local-file-access")
            .arg(&html_path)
            .arg(&pdf_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(stderr = %stderr, "wkhtmltopdf failed");
            return Err(ExportError::Conversion(stderr.to_string()));
        }

        let pdf_bytes = tokio::fs::read(&pdf_path).await?;

        let _ = tokio::fs::remove_file(&html_path).await;
        let _ = tokio::fs::remove_file(&pdf_path).await;

        info!(size = pdf_bytes.len(), "PDF generated successfully");

        Ok(pdf_bytes)
    }
}

fn detect_wkhtmltopdf() -> Option<String> {
    let path = which::which("wkhtmltopdf").ok().map(|p| p.to_string_lossy().to_string());
    match &path {
        Some(found) => info!(path = %found, "wkhtmltopdf found"),
        None => warn!("wkhtmltopdf not found in PATH - exports will serve printable HTML"),
    }
    path
}

/// Result of export rendering.
pub enum ExportResult {
    Pdf(Vec<u8>),
    Html(String),
}

impl ExportResult {
    /// Convert to an Axum response.
    pub fn into_response(self, filename: &str) -> Response {
        match self {
            ExportResult::Pdf(bytes) => Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "application/pdf")
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}.pdf\"", filename),
                )
                .body(Body::from(bytes))
                .unwrap(),
            ExportResult::Html(html) => Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
                .body(Body::from(html))
                .unwrap(),
        }
    }
}
