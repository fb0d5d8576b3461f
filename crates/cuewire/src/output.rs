use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use cuewire_osc::DecodedReply;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ReplyBody<'a> {
    Value { reply: &'a Value },
    Frames { frames: Vec<String> },
}

#[derive(Serialize)]
struct ReplyOutput<'a> {
    source: &'a str,
    #[serde(flatten)]
    body: ReplyBody<'a>,
    timestamp: String,
}

pub fn print_reply(reply: &DecodedReply, source: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", render_json(reply, source)),
        OutputFormat::Table => println!("{}", render_table(reply, source)),
        OutputFormat::Pretty => println!("{}", render_pretty(reply, source)),
        OutputFormat::Raw => print_raw(reply),
    }
}

fn render_json(reply: &DecodedReply, source: &str) -> String {
    let body = match reply {
        DecodedReply::Value(value) => ReplyBody::Value { reply: value },
        DecodedReply::Frames(frames) => ReplyBody::Frames {
            frames: frames.iter().map(|f| payload_preview(f)).collect(),
        },
    };
    let out = ReplyOutput {
        source,
        body,
        timestamp: now_unix_seconds(),
    };
    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
}

fn render_table(reply: &DecodedReply, source: &str) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    match reply {
        DecodedReply::Value(_) => {
            let envelope = reply.envelope();
            let field = |f: Option<&str>| f.unwrap_or("-").to_string();
            table
                .set_header(vec!["SOURCE", "ADDRESS", "STATUS", "DATA"])
                .add_row(vec![
                    source.to_string(),
                    field(envelope.as_ref().and_then(|e| e.address.as_deref())),
                    field(reply.status()),
                    reply.data().map_or_else(|| "-".to_string(), compact),
                ]);
        }
        DecodedReply::Frames(frames) => {
            table.set_header(vec!["SOURCE", "FRAME", "PAYLOAD"]);
            for (index, frame) in frames.iter().enumerate() {
                table.add_row(vec![
                    source.to_string(),
                    index.to_string(),
                    payload_preview(frame),
                ]);
            }
        }
    }
    table
}

fn render_pretty(reply: &DecodedReply, source: &str) -> String {
    match reply {
        DecodedReply::Value(value) => {
            let body = serde_json::to_string_pretty(value).unwrap_or_else(|_| compact(value));
            format!("from {source}:\n{body}")
        }
        DecodedReply::Frames(frames) => {
            let mut text = format!("from {source}: {} batched frames", frames.len());
            for frame in frames {
                text.push_str("\n  ");
                text.push_str(&payload_preview(frame));
            }
            text
        }
    }
}

fn print_raw(reply: &DecodedReply) {
    let mut out = std::io::stdout();
    match reply {
        DecodedReply::Value(value) => {
            let _ = writeln!(out, "{}", compact(value));
        }
        DecodedReply::Frames(frames) => {
            for frame in frames {
                let _ = out.write_all(frame);
                let _ = out.write_all(b"\n");
            }
        }
    }
    let _ = out.flush();
}

fn compact(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.trim_end_matches('\0').to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
