//! `request` face: build resource requests from the command line
//!
//! Nothing is sent anywhere. The actions show how a key and options are
//! normalized into a request, its query string and its document form.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use serde_json::{json, Value};
use tracing::debug;

use crate::domain::{
    ActionCall, ActionDescriptor, Encoder, Method, OptionBag, OptionSpec, Output, PayloadTypes,
    Render, RenderFormat, Request, Resource, Subject,
};
use crate::infrastructure::traits::Face;
use crate::infrastructure::InfraResult;

pub fn face(payload_types: Arc<dyn PayloadTypes>) -> InfraResult<Face> {
    Face::new("request")
        .summary("Build resource requests and show how they are addressed")
        .option(
            OptionSpec::value("terminus", "NAME")
                .summary("Terminus the request is meant for (forwarded as an option)"),
        )
        .action(
            with_request_options(ActionDescriptor::new("describe", describe))
                .summary("Show the addressing fields of a request")
                .argument("collection")
                .argument("key")
                .when_rendering(RenderFormat::Human, |_, call| {
                    Ok(Box::new(summary(&build_request(call)?)?) as Output)
                }),
        )?
        .action(
            with_request_options(ActionDescriptor::new("query", query))
                .summary("Print the URL query string of a request")
                .argument("collection")
                .argument("key"),
        )?
        .action(
            with_request_options(ActionDescriptor::new("document", move |call| {
                document(call, payload_types.as_ref())
            }))
            .summary("Print the serialized document of a request")
            .option(
                OptionSpec::flag("payload")
                    .summary("Carry the key as a generic resource payload"),
            )
            .argument("collection")
            .argument("key")
            .render_as(RenderFormat::Document),
        )
}

fn with_request_options(action: ActionDescriptor) -> ActionDescriptor {
    action
        .option(OptionSpec::value("method", "METHOD").summary("find, search, save, destroy or head"))
        .option(OptionSpec::value("node", "NAME").summary("Node the request is made for"))
        .option(OptionSpec::value("ip", "ADDRESS").summary("Client address"))
        .option(OptionSpec::flag("authenticated").summary("Mark the request authenticated"))
        .option(OptionSpec::flag("ignore_cache").summary("Bypass the cache"))
        .option(OptionSpec::flag("ignore_terminus").summary("Skip the terminus"))
        .option(OptionSpec::flag("no_cache").summary("Do not use the cache at all"))
        .option(OptionSpec::value("with", "KEY=VALUE").summary("Add a free-form option"))
        .option(OptionSpec::optional_value("format", "NAME").summary("Preferred wire format"))
}

/// Collection, key and request options of the current call.
fn request_parts(call: &ActionCall<'_>) -> anyhow::Result<(String, String, Method, OptionBag)> {
    let [collection, key] = call.arguments else {
        bail!("expected <collection> <key>, got {:?}", call.arguments);
    };

    let mut method = Method::Find;
    let mut options = OptionBag::new();
    options.insert(
        "environment".to_string(),
        Value::from(call.settings.environment.as_str()),
    );

    for (name, value) in call.options {
        match name.as_str() {
            "method" => {
                let text = value.as_str().unwrap_or_default();
                method = text.parse().with_context(|| format!("--method {text}"))?;
            }
            "payload" => {}
            "no_cache" => {
                options.insert("use_cache".to_string(), Value::Bool(false));
            }
            "with" => {
                let pair = value.as_str().unwrap_or_default();
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| anyhow!("--with expects KEY=VALUE, got '{pair}'"))?;
                options.insert(key.to_string(), Value::from(value));
            }
            _ => {
                options.insert(name.clone(), value.clone());
            }
        }
    }
    debug!("request_parts: {collection} {key} {method} {options:?}");
    Ok((collection.clone(), key.clone(), method, options))
}

fn build_request(call: &ActionCall<'_>) -> anyhow::Result<Request> {
    let (collection, key, method, options) = request_parts(call)?;
    let subject: Subject = if call.options.contains_key("payload") {
        Subject::Payload(Arc::new(Resource::new(key)))
    } else {
        Subject::Key(key)
    };
    Ok(Request::new(
        &call.settings.addressing(),
        collection,
        method,
        subject,
        options,
    )?)
}

fn describe(call: &ActionCall<'_>) -> anyhow::Result<Option<Output>> {
    Ok(Some(Box::new(build_request(call)?)))
}

fn query(call: &ActionCall<'_>) -> anyhow::Result<Option<Output>> {
    let request = build_request(call)?;
    Ok(Some(Box::new(request.query_string()?)))
}

/// Serialize the request, then read it back to prove the document is complete.
fn document(call: &ActionCall<'_>, payload_types: &dyn PayloadTypes) -> anyhow::Result<Option<Output>> {
    let request = build_request(call)?;
    let text = request.to_json()?;
    let addressing = call.settings.addressing();
    let reread = Request::from_json(&addressing, payload_types, &text)
        .with_context(|| format!("re-reading {text}"))?;
    debug!("document: {} round-tripped as {}", request, reread);
    Ok(Some(Box::new(serde_json::from_str::<Value>(&text)?)))
}

/// Addressing fields for the human table.
fn summary(request: &Request) -> anyhow::Result<Value> {
    let mut value = json!({
        "collection": request.collection(),
        "method": request.method().as_str(),
        "key": request.key(),
        "escaped_key": request.escaped_key(),
        "authenticated": request.is_authenticated(),
        "use_cache": request.should_use_cache(),
        "ignore_cache": request.should_ignore_cache(),
        "ignore_terminus": request.should_ignore_terminus(),
        "remote": request.is_remote(),
        "plural": request.is_plural(),
        "query": request.query_string()?,
        "raw": request.encode(Encoder::Raw),
    });
    let optional = [
        ("uri", request.uri()),
        ("server", request.server.as_deref()),
        ("protocol", request.protocol.as_deref()),
        ("environment", request.environment()),
        ("node", request.node()),
        ("ip", request.ip()),
    ];
    for (name, field) in optional {
        if let Some(field) = field {
            value[name] = Value::from(field);
        }
    }
    if let Some(port) = request.port {
        value["port"] = Value::from(port);
    }
    Ok(value)
}
