use aux_protocol::codec::{address_name, command_name};
use aux_protocol::logging::ConsoleLogger;
use aux_protocol::{AuxError, Packet, Session, SessionConfig};
use std::process::ExitCode;

fn parse_number(arg: &str) -> Result<i64, String> {
    let parsed = match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => arg.parse::<i64>(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", arg, e))
}

fn parse_code(arg: &str, what: &str) -> Result<u8, String> {
    let value = parse_number(arg)?;
    u8::try_from(value).map_err(|_| format!("{} {} is not a byte", what, arg))
}

fn run(args: &[String], console: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = SessionConfig::load(&args[1])?;
    let destination = parse_code(&args[2], "destination")?;
    let command = parse_code(&args[3], "command")?;
    let values = args[4..]
        .iter()
        .map(|a| parse_number(a.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut session = Session::open(&config)?;
    if console {
        session = session.with_logger(ConsoleLogger::new());
    }
    session.set_debug(true);

    // Range-check the payload before anything goes on the wire
    let request = Packet::from_values(session.my_address(), destination, command, values)?;

    println!(
        "Sending {} to {}: {}",
        command_name(command),
        address_name(destination),
        request.to_hex_string()
    );

    match session.send_receive(destination, command, request.data())? {
        Some(response) => println!("{}", response.describe()),
        None => println!("No response"),
    }

    session.close()?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args: Vec<String> = std::env::args().collect();
    // --console sends the session's packet trace straight to stderr
    let console = args.iter().any(|a| a == "--console");
    args.retain(|a| a != "--console");
    if args.len() < 4 {
        eprintln!("Usage: {} [--console] <config.json> <destination> <command> [data bytes...]", args[0]);
        eprintln!("Numbers may be decimal or 0x-prefixed hex.");
        return ExitCode::from(2);
    }

    match run(&args, console) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(AuxError::Io(io)) = e.downcast_ref::<AuxError>() {
                log::error!("link failure: {}", io);
            } else {
                log::error!("{}", e);
            }
            ExitCode::FAILURE
        }
    }
}
