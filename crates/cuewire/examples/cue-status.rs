//! Ask a device for a cue's name and print the reply envelope.
//!
//! Run with:
//!   cargo run --example cue-status -- 127.0.0.1 53000 5

use cuewire::client::{connect, Address};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "localhost".to_string());
    let port: u16 = args.next().map_or(Ok(53000), |p| p.parse())?;
    let cue = args.next().unwrap_or_else(|| "1".to_string());

    let client = connect(&host, port)?;
    let address = Address::from_segments(["cue", cue.as_str(), "name"])?;
    let reply = client.call(&address, &[])?;

    match reply.envelope() {
        Some(envelope) => {
            println!("status: {}", envelope.status.as_deref().unwrap_or("-"));
            println!("data:   {}", envelope.data.unwrap_or_default());
        }
        None => println!("{reply:?}"),
    }

    client.shutdown()?;
    Ok(())
}
