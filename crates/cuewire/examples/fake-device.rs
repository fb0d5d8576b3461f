//! Stand-in device: answers every command with a JSON reply naming it.
//!
//! Run with:
//!   cargo run --example fake-device
//!
//! In another terminal:
//!   cargo run --features cli -- send --host 127.0.0.1 --port 53999 \
//!     /cue/1/name --wait

use std::io::Write;
use std::net::TcpListener;

use cuewire::frame::{encode, FrameReader};
use cuewire::osc::legacy_decode_binary;
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:53999")?;
    eprintln!("Listening on {}", listener.local_addr()?);

    let (stream, peer) = listener.accept()?;
    eprintln!("Client connected: {peer}");
    let mut writer = stream.try_clone()?;
    let mut reader = FrameReader::new(stream);

    loop {
        let frames = match reader.read_frames() {
            Ok(frames) => frames,
            Err(e) => {
                eprintln!("Client disconnected: {e}");
                break;
            }
        };

        for payload in frames {
            let reply = match legacy_decode_binary(&payload) {
                Ok(command) => {
                    eprintln!("Received {command}");
                    let body = json!({
                        "address": command.address.path(),
                        "status": "ok",
                        "data": command.to_string(),
                    });
                    format!("/reply{}{body}", command.address)
                }
                Err(e) => {
                    eprintln!("Undecodable command: {e}");
                    json!({"status": "error"}).to_string()
                }
            };
            writer.write_all(&encode(reply.as_bytes()))?;
        }
    }

    Ok(())
}
