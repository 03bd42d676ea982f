use mailwire::{ClientConfig, DnsResolver, LogHandler, Message, SmtpClient, SmtpServer};
use std::env;
use std::process;

const USAGE: &str =
    "Usage: mailwire server [addr] [hostname]\n       mailwire client <from> <to> [host:port]";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let result = match args.get(1).map(String::as_str) {
        Some("server") => run_server(&args[2..]),
        Some("client") => run_client(&args[2..]),
        _ => {
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    if let Err(e) = result {
        log::error!("{e}");
        process::exit(1);
    }
}

fn run_server(args: &[String]) -> Result<(), mailwire::SmtpError> {
    let addr = args.first().map_or("127.0.0.1:2525", String::as_str);
    let hostname = args.get(1).map_or("mailwire.local", String::as_str);

    log::info!("Starting SMTP server as {hostname}");
    SmtpServer::new(hostname).start(addr, |_| LogHandler)
}

fn run_client(args: &[String]) -> Result<(), mailwire::SmtpError> {
    let (Some(from), Some(to)) = (args.first(), args.get(1)) else {
        eprintln!("{USAGE}");
        process::exit(1);
    };

    let mut config = ClientConfig::default();
    if let Some(relay) = args.get(2) {
        match relay.rsplit_once(':') {
            Some((host, port)) => {
                config.host = Some(host.to_string());
                config.port = port.parse().unwrap_or_else(|_| {
                    eprintln!("Invalid port: {port}");
                    process::exit(1);
                });
            }
            None => config.host = Some(relay.clone()),
        }
    }

    let client = SmtpClient::new(config, Box::new(DnsResolver::from_system_conf()?));
    let message = Message::new(from)
        .to(to)
        .subject("Test Email")
        .body("This is a test message");

    client.send(&message)?;
    log::info!("Message sent to {to}");
    Ok(())
}
