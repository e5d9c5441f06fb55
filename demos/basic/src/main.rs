mod app;
mod game;
mod graphics;
mod scene;

use std::{env, net::SocketAddr, process};

use app::{App, DemoConfig};

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut config = DemoConfig::default();
    if let Some(addr) = env::args().nth(1) {
        match addr.parse::<SocketAddr>() {
            Ok(addr) => config.server.listen_addr = addr,
            Err(error) => {
                log::error!("Invalid listen address '{}': {}", addr, error);
                process::exit(2);
            }
        }
    }

    if let Err(error) = App::new(config).run() {
        log::error!("Demo failed: {}", error);
        process::exit(1);
    }
}
