//! Standalone TCP entry point. Accepts connections on a configured port and hands each
//! one to the store actor spawned by `embers::Server`.

use bytes::Bytes;
use embers::{Addr, Server, VERSION};
use std::process::ExitCode;
use tokio::net::TcpListener;

struct Options {
    port: u16,
    databases: usize,
    requirepass: Option<Bytes>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            port: 6379,
            databases: 16,
            requirepass: None,
        }
    }
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options::default();
    let mut args = std::env::args().skip(1);

    while let Some(flag) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("{flag} requires a value"));
        match flag.as_str() {
            "--port" => {
                let value = value()?;
                options.port = value
                    .parse()
                    .map_err(|_| format!("invalid port: {value}"))?;
            }
            "--databases" => {
                let value = value()?;
                options.databases = value
                    .parse()
                    .map_err(|_| format!("invalid databases: {value}"))?;
            }
            "--requirepass" => {
                options.requirepass = Some(Bytes::from(value()?));
            }
            _ => return Err(format!("unrecognized argument: {flag}")),
        }
    }

    Ok(options)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let server = Server::new(options.databases, options.requirepass);
    let address = format!("127.0.0.1:{}", options.port);

    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %address, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(version = VERSION, %address, "listening");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(error) => {
                tracing::warn!(%error, "failed to accept connection");
                continue;
            }
        };

        let local = match stream.local_addr() {
            Ok(local) => local,
            Err(error) => {
                tracing::warn!(%error, "failed to read local address");
                continue;
            }
        };

        if let Err(error) = stream.set_nodelay(true) {
            tracing::warn!(%error, "failed to set TCP_NODELAY");
        }

        server.connect(stream, Some(Addr { local, peer }));
    }
}
