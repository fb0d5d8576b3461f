use std::time::Duration;

use cuewire_client::{connect_with_config, ClientConfig};
use cuewire_osc::{Address, Argument, OscMessage};
use serde_json::Value;
use tracing::debug;

use crate::cmd::SendArgs;
use crate::exit::{client_error, encode_error, CliError, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let address =
        Address::parse(&args.address).map_err(|err| encode_error("invalid address", err))?;
    let arguments = match &args.json_args {
        Some(json) => parse_json_arguments(json)?,
        None => args
            .args
            .iter()
            .map(|raw| parse_argument(raw))
            .collect::<CliResult<Vec<_>>>()?,
    };
    let message = OscMessage::new(address).with_args(arguments);

    // Encode up front so a bad argument fails before anything connects.
    message
        .encode_payload()
        .map_err(|err| encode_error("invalid command", err))?;

    let config = ClientConfig {
        reply_timeout: timeout,
        connect_timeout: Some(timeout),
        ..ClientConfig::default()
    };
    let client = connect_with_config(&args.device.host, args.device.port, config)
        .map_err(|err| client_error("connect failed", err))?;
    debug!(peer = %client.peer_addr(), tags = %message.type_tags(), "connected");

    if args.wait {
        let reply = client
            .call_message(&message)
            .map_err(|err| client_error("call failed", err))?;
        print_reply(&reply, &client.peer_addr().to_string(), format);
    } else {
        client
            .send_message(&message)
            .map_err(|err| client_error("send failed", err))?;
    }

    client
        .shutdown()
        .map_err(|err| client_error("shutdown failed", err))?;
    Ok(SUCCESS)
}

/// Parse one positional argument.
///
/// `i:`, `f:` and `s:` force the type. Unprefixed text is an integer if it
/// parses as one, then a finite float, otherwise a string.
fn parse_argument(raw: &str) -> CliResult<Argument> {
    if let Some(text) = raw.strip_prefix("i:") {
        return text
            .parse::<i32>()
            .map(Argument::Int)
            .map_err(|_| CliError::usage(format!("not a 32-bit integer: {text:?}")));
    }
    if let Some(text) = raw.strip_prefix("f:") {
        return text
            .parse::<f32>()
            .map(Argument::Float)
            .map_err(|_| CliError::usage(format!("not a float: {text:?}")));
    }
    if let Some(text) = raw.strip_prefix("s:") {
        return Ok(Argument::from(text));
    }

    if let Ok(int) = raw.parse::<i32>() {
        return Ok(Argument::Int(int));
    }
    match raw.parse::<f32>() {
        Ok(float) if float.is_finite() => Ok(Argument::Float(float)),
        _ => Ok(Argument::from(raw)),
    }
}

fn parse_json_arguments(json: &str) -> CliResult<Vec<Argument>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|err| CliError::usage(format!("--json-args is not valid JSON: {err}")))?;
    let items = match &value {
        Value::Array(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    };
    items
        .iter()
        .map(|item| Argument::try_from(item).map_err(|err| encode_error("--json-args", err)))
        .collect()
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::USAGE;

    #[test]
    fn prefixed_arguments_force_type() {
        assert_eq!(parse_argument("i:7").unwrap(), Argument::Int(7));
        assert_eq!(parse_argument("f:7").unwrap(), Argument::Float(7.0));
        assert_eq!(parse_argument("s:7").unwrap(), Argument::from("7"));
        assert_eq!(parse_argument("s:").unwrap(), Argument::from(""));
    }

    #[test]
    fn unprefixed_arguments_are_inferred() {
        assert_eq!(parse_argument("0").unwrap(), Argument::Int(0));
        assert_eq!(parse_argument("-3").unwrap(), Argument::Int(-3));
        assert_eq!(parse_argument("0.5").unwrap(), Argument::Float(0.5));
        assert_eq!(parse_argument("Intro").unwrap(), Argument::from("Intro"));
        assert_eq!(parse_argument("nan").unwrap(), Argument::from("nan"));
    }

    #[test]
    fn bad_prefixed_argument_is_usage_error() {
        assert_eq!(parse_argument("i:1.5").unwrap_err().code, USAGE);
        assert_eq!(parse_argument("f:abc").unwrap_err().code, USAGE);
    }

    #[test]
    fn json_arguments() {
        assert_eq!(
            parse_json_arguments(r#"[1, 0.5, "x"]"#).unwrap(),
            vec![Argument::Int(1), Argument::Float(0.5), Argument::from("x")]
        );
        assert_eq!(parse_json_arguments("3").unwrap(), vec![Argument::Int(3)]);
        assert_eq!(parse_json_arguments("[true]").unwrap_err().code, USAGE);
        assert_eq!(parse_json_arguments("[").unwrap_err().code, USAGE);
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }
}
