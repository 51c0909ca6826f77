use std::path::Path;

use sealkit_core::form::{default_ttl, FieldMap, HtmlForm, KeyRing, SystemRequest};

use crate::cli::{FormSignArgs, FormVerifyArgs};
use crate::config::SealkitConfig;
use crate::helpers::{parse_duration, parse_ip};

pub fn handle_form_sign(config: &SealkitConfig, args: &FormSignArgs) -> anyhow::Result<()> {
    let credentials = config.credentials(args.credentials.as_deref())?;
    let group = config.group(args.group.as_deref());
    let ttl = match args.ttl.as_deref().or(config.form.ttl.as_deref()) {
        Some(value) => parse_duration(value)?,
        None => default_ttl(),
    };
    let request = SystemRequest::new(parse_ip(&args.ip)?);

    let signer = KeyRing::global().load(&credentials)?;
    let mut form = HtmlForm::new(&args.name);
    signer.sign_form(&mut form, &request, ttl, &group)?;

    if args.html {
        println!("{}", form.to_html());
    } else if args.json {
        let fields = form.submitted_fields();
        let own = fields.map(&args.name).cloned().unwrap_or_default();
        println!("{}", serde_json::to_string_pretty(&own)?);
    } else {
        for input in form.hidden_inputs() {
            println!("{}={}", input.name, input.value);
        }
    }
    Ok(())
}

pub fn handle_form_verify(config: &SealkitConfig, args: &FormVerifyArgs) -> anyhow::Result<()> {
    let credentials = config.credentials(args.credentials.as_deref())?;
    let group = config.group(args.group.as_deref());
    let request = SystemRequest::new(parse_ip(&args.ip)?);
    let fields = read_fields(&args.fields)?;

    let signer = KeyRing::global().load(&credentials)?;
    if signer.verify(&fields, &group, &request) {
        println!("valid");
        return Ok(());
    }
    println!("invalid");
    Err(anyhow::anyhow!("Form verification failed"))
}

/// Submitted fields as inline JSON, or `@path` to a JSON file.
fn read_fields(value: &str) -> anyhow::Result<FieldMap> {
    let text = match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to read fields {}: {}", path, e))?,
        None => value.to_string(),
    };
    serde_json::from_str(&text).map_err(|e| anyhow::anyhow!("Invalid fields JSON: {}", e))
}
