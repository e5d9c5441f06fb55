//! The acceptor over real loopback TCP connections

use std::{net::SocketAddr, thread, time::Duration};

use modbox_client::{ClientConfig, ClientError, ModuleClient};
use modbox_server::{ModuleServer, ServerConfig, ServerHandle};
use modbox_shared::{ArgValue, Signature, TypeCode};
use modbox_test::basic_registry;

fn init_logger() {
    env_logger::builder().is_test(true).try_init().ok();
}

fn start_server(config: ServerConfig) -> (ServerHandle, thread::JoinHandle<()>) {
    let server = ModuleServer::new(config, basic_registry());
    server.spawn().unwrap()
}

fn loopback_config() -> ServerConfig {
    ServerConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        ..ServerConfig::default()
    }
}

fn client_config(name: &str) -> ClientConfig {
    ClientConfig {
        module_name: name.to_string(),
        ..ClientConfig::default()
    }
}

fn add(client: &mut modbox_client::TcpModuleClient, value: u64) -> Result<u64, ClientError> {
    let result = client.call(
        "test.add",
        &[ArgValue::U64(value), ArgValue::F64(2.5)],
        &Signature::from([TypeCode::U64]),
    )?;
    match result.as_slice() {
        [ArgValue::U64(sum)] => Ok(*sum),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn module_calls_over_tcp() {
    init_logger();
    let (handle, acceptor) = start_server(loopback_config());

    let mut client = ModuleClient::connect(handle.local_addr(), client_config("tcp")).unwrap();
    assert_eq!(add(&mut client, 3), Ok(4));
    client.exit().unwrap();

    handle.stop();
    acceptor.join().unwrap();
    assert!(handle.is_stopped());
}

#[test]
fn each_connection_gets_its_own_worker() {
    init_logger();
    let (handle, acceptor) = start_server(loopback_config());
    let addr = handle.local_addr();

    let modules: Vec<_> = (0..8u64)
        .map(|index| {
            thread::spawn(move || {
                let mut client =
                    ModuleClient::connect(addr, client_config(&format!("module-{}", index))).unwrap();
                let results: Vec<u64> = (0..20)
                    .map(|step| add(&mut client, index * 100 + step).unwrap())
                    .collect();
                client.exit().unwrap();
                (index, results)
            })
        })
        .collect();

    for module in modules {
        let (index, results) = module.join().unwrap();
        let expected: Vec<u64> = (0..20).map(|step| index * 100 + step + 1).collect();
        assert_eq!(results, expected);
    }

    handle.stop();
    acceptor.join().unwrap();
}

#[test]
fn unknown_command_does_not_disturb_other_connections() {
    init_logger();
    let (handle, acceptor) = start_server(loopback_config());

    let mut healthy = ModuleClient::connect(handle.local_addr(), client_config("healthy")).unwrap();
    let mut broken = ModuleClient::connect(handle.local_addr(), client_config("broken")).unwrap();

    broken
        .call("no.such.function", &[], &Signature::from([TypeCode::U64]))
        .unwrap_err();
    assert!(!broken.is_open());

    assert_eq!(add(&mut healthy, 10), Ok(11));
    healthy.exit().unwrap();

    handle.stop();
    acceptor.join().unwrap();
}

#[test]
fn idle_module_is_closed_by_the_read_timeout() {
    init_logger();
    let (handle, acceptor) = start_server(ServerConfig {
        read_timeout: Some(Duration::from_millis(50)),
        ..loopback_config()
    });

    let mut client = ModuleClient::connect(handle.local_addr(), client_config("idle")).unwrap();
    thread::sleep(Duration::from_millis(300));
    assert!(add(&mut client, 1).is_err());

    handle.stop();
    acceptor.join().unwrap();
}

#[test]
fn stopped_server_refuses_new_modules() {
    init_logger();
    let (handle, acceptor) = start_server(loopback_config());
    let addr = handle.local_addr();

    handle.stop();
    acceptor.join().unwrap();
    // stopping twice is harmless
    handle.stop();

    let result = ModuleClient::connect(addr, client_config("late"));
    assert!(matches!(result, Err(ClientError::Connect { .. })));
}
