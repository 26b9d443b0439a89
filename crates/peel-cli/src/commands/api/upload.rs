//! Upload command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use peel_client::{ApiRequest, FormData};

use crate::session::SessionContext;

use super::parse_key_value;
use super::request::print_response;

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Endpoint path relative to the API URL, e.g. /resume/upload/
    pub endpoint: String,

    /// File field (repeatable)
    #[arg(short, long = "file", value_name = "FIELD=PATH", value_parser = parse_key_value, required = true)]
    pub files: Vec<(String, String)>,

    /// Text field (repeatable)
    #[arg(short = 'F', long = "field", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub fields: Vec<(String, String)>,

    /// Send without credentials
    #[arg(long)]
    pub public: bool,

    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,
}

pub async fn run(args: UploadArgs, ctx: &SessionContext) -> Result<()> {
    let session = ctx.open().await?;

    let mut form = FormData::new();
    for (key, value) in &args.fields {
        form = form.text(key.clone(), value.clone());
    }
    for (field, path) in &args.files {
        let path = PathBuf::from(path);
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        form = form.file(field.clone(), file_name, bytes, mime_for(&path));
    }

    let mut request = ApiRequest::post(args.endpoint.clone()).form(form);
    if args.public {
        request = request.skip_auth();
    }

    let response: Value = session
        .client
        .send(request)
        .await
        .with_context(|| format!("Upload to {} failed", args.endpoint))?;

    print_response(&response, args.compact)
}

/// Guess a MIME type for the document formats the backend accepts.
fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "odt" => Some("application/vnd.oasis.opendocument.text"),
        "rtf" => Some("application/rtf"),
        "txt" => Some("text/plain"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
