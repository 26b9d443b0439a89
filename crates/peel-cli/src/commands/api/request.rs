//! Generic request command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use peel_client::{ApiRequest, Method};

use crate::output;
use crate::session::SessionContext;

use super::parse_key_value;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Endpoint path relative to the API URL, e.g. /jobs/
    pub endpoint: String,

    /// Query parameter (repeatable)
    #[arg(short, long = "query", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub query: Vec<(String, String)>,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Send without credentials
    #[arg(long)]
    pub public: bool,

    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,
}

pub async fn run(method: Method, args: RequestArgs, ctx: &SessionContext) -> Result<()> {
    let session = ctx.open().await?;
    let request = build_request(method, &args)?;

    let response: Value = session
        .client
        .send(request)
        .await
        .with_context(|| format!("Request to {} failed", args.endpoint))?;

    print_response(&response, args.compact)
}

fn build_request(method: Method, args: &RequestArgs) -> Result<ApiRequest> {
    let mut request = ApiRequest::new(method, args.endpoint.clone());

    for (key, value) in &args.query {
        request = request.query_pair(key.clone(), value.clone());
    }

    if let Some(data) = &args.data {
        let body: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        request = request.json(body);
    }

    if args.public {
        request = request.skip_auth();
    }

    Ok(request)
}

pub(crate) fn print_response(response: &Value, compact: bool) -> Result<()> {
    match response {
        Value::Null => {
            output::success("Done (no content)");
            Ok(())
        }
        value if compact => output::json(value),
        value => output::json_pretty(value),
    }
}
