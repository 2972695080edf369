use clap::Parser;
use std::env;
use std::time::Duration;

use udp_echo::client;
use udp_echo::server::EchoServer;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[clap(name = "udp-echo")]
struct Opts {
    port: u16,
    #[clap(long = "host", default_value = "127.0.0.1")]
    host: String,
    #[clap(long = "interval-ms", default_value_t = 1000)]
    interval_ms: u64,
    #[clap(long)]
    probe: bool,
    #[clap(long = "message", default_value = "this is a ping!")]
    message: String,
}

fn main() -> anyhow::Result<()> {
    env::set_var("RUST_LOG", "debug");
    env_logger::init();

    let opts = Opts::parse();
    let address = format!("{}:{}", opts.host, opts.port);

    if opts.probe {
        let reply = client::probe(&address, opts.message.as_bytes(), PROBE_TIMEOUT)?;
        println!("{}", String::from_utf8_lossy(&reply));
        return Ok(());
    }

    let server = EchoServer::bind(&address, Duration::from_millis(opts.interval_ms))?;
    eprintln!("pinging...");
    server.run()
}
