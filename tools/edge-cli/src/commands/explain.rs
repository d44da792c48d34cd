//! Show what the processor does to a synthetic request.

use anyhow::Result;
use edge_core::{BodyEncoding, Event, Request, Response};
use edge_security::{parse_policy, Disposition, ResponseProcessor};

use super::ExplainArgs;
use crate::context::Context;
use crate::output::outcome_badge;

/// Run the explain command.
pub fn run(args: ExplainArgs, ctx: &Context) -> Result<()> {
    let processor = ResponseProcessor::new(ctx.config()?, ctx.logger());

    let mut event = Event::new(
        Some(Request::new(args.path.as_str()).with_host(args.host.as_str())),
        Some(Response::new(args.status)),
    );
    let disposition = processor.process(&mut event)?;
    let response = event.take_response().unwrap_or_else(|| Response::new(args.status));

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "host": args.host,
            "path": args.path,
            "status": args.status,
            "disposition": disposition,
            "headers": response.headers,
            "bodyEncoding": response.body_encoding,
        }));
        return Ok(());
    }

    ctx.output.header(&format!("{} {} ({})", args.host, args.path, args.status));
    ctx.output.kv("outcome", &outcome_badge(outcome(&disposition)));
    ctx.output.kv("detail", &disposition.to_string());

    let rows = header_rows(&response);
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    ctx.output.header("Headers");
    for (name, value) in &rows {
        ctx.output.table_row(&[name.as_str(), value.as_str()], &[width, 0]);
    }

    if let Some(policy) = response.header("content-security-policy") {
        ctx.output.header("Content-Security-Policy");
        for directive in parse_policy(policy) {
            ctx.output.list_item(directive);
        }
    }

    if let Some(body) = &response.body {
        let encoding = match response.body_encoding {
            Some(BodyEncoding::Base64) => "base64",
            _ => "text",
        };
        ctx.output.info("");
        ctx.output.kv("body", &format!("{} bytes ({})", body.len(), encoding));
    }

    Ok(())
}

fn outcome(disposition: &Disposition) -> &'static str {
    match disposition {
        Disposition::PassedThrough { .. } => "passed_through",
        Disposition::ErrorPage => "error_page",
        Disposition::Secured { .. } => "secured",
    }
}

/// Display name and first value of every header, sorted by name.
fn header_rows(response: &Response) -> Vec<(String, String)> {
    let Some(headers) = &response.headers else {
        return Vec::new();
    };

    headers
        .iter()
        .filter_map(|(name, entries)| {
            let entry = entries.first()?;
            let display = entry.key.clone().unwrap_or_else(|| name.clone());
            Some((display, entry.value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use edge_core::HeaderEntry;

    use super::*;

    #[test]
    fn test_header_rows_prefer_display_key() {
        let mut response = Response::new(200);
        response.headers_mut().set("Strict-Transport-Security", "max-age=1");
        response
            .headers_mut()
            .insert_raw("x-bare", vec![HeaderEntry::value_only("1")]);
        response.headers_mut().insert_raw("x-empty", Vec::new());

        assert_eq!(
            header_rows(&response),
            vec![
                ("Strict-Transport-Security".to_string(), "max-age=1".to_string()),
                ("x-bare".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_outcome_names() {
        assert_eq!(outcome(&Disposition::ErrorPage), "error_page");
        assert_eq!(outcome(&Disposition::Secured { policies: vec![] }), "secured");
    }
}
