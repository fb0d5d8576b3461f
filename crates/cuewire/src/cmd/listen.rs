use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cuewire_client::{ClientError, Server};
use tracing::{info, warn};

use crate::cmd::ListenArgs;
use crate::exit::{client_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_reply, OutputFormat};

/// How often the receive loop wakes to check for Ctrl-C.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let server = Server::bind_with_timeout(&args.bind, args.port, Some(POLL_INTERVAL))
        .map_err(|err| client_error("bind failed", err))?;
    info!(local_addr = %server.local_addr(), "waiting for notifications");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        let (reply, from) = match server.receive_from() {
            Ok(received) => received,
            Err(ClientError::Timeout(_)) => continue,
            Err(ClientError::Decode(err)) => {
                warn!(error = %err, "skipping undecodable notification");
                continue;
            }
            Err(err) => return Err(client_error("receive failed", err)),
        };

        print_reply(&reply, &from.to_string(), format);
        printed = printed.saturating_add(1);

        if args.count.is_some_and(|count| printed >= count) {
            break;
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
