//! Module protocol sessions over in-memory streams
//!
//! Every test drives a real ModuleWorker thread through the module-side
//! client and checks both what the module sees and how the session ended.

use std::io::{Read, Write};

use modbox_server::{ModuleError, ModuleServer, ServerConfig, SessionEnd};
use modbox_shared::{
    ArgValue, HandlerError, MarshalError, Marshaler, ProtocolError, Signature, TypeCode,
    SERVER_HEADER,
};
use modbox_test::{basic_registry, local_module, LocalStreamPair};

fn init_logger() {
    env_logger::builder().is_test(true).try_init().ok();
}

fn server() -> ModuleServer {
    ModuleServer::new(ServerConfig::default(), basic_registry())
}

fn u64_sig() -> Signature {
    Signature::from([TypeCode::U64])
}

#[test]
fn add_returns_first_argument_plus_one() {
    init_logger();
    let server = server();
    let mut module = local_module(&server, "adder");

    let result = module
        .client
        .call("test.add", &[ArgValue::U64(3), ArgValue::F64(2.5)], &u64_sig())
        .unwrap();
    assert_eq!(result, vec![ArgValue::U64(4)]);

    let result = module
        .client
        .call("test.add", &[ArgValue::U64(u64::MAX - 1), ArgValue::F64(-0.0)], &u64_sig())
        .unwrap();
    assert_eq!(result, vec![ArgValue::U64(u64::MAX)]);

    module.client.exit().unwrap();
    let (outcome, _) = module.join();
    assert_eq!(outcome.module_name.as_deref(), Some("adder"));
    assert_eq!(outcome.commands_served, 2);
    assert_eq!(outcome.end, SessionEnd::Exited);
}

#[test]
fn strings_survive_the_round_trip() {
    init_logger();
    let server = server();
    let mut module = local_module(&server, "echo");
    let echo_sig: Signature = "s".parse().unwrap();

    for text in ["", "hello", "length prefix \u{0}\u{0}\u{0}\u{5}", "ünïcödé ✓"] {
        let result = module
            .client
            .call("test.echo", &[ArgValue::from(text)], &echo_sig)
            .unwrap();
        assert_eq!(result, vec![ArgValue::Str(text.to_string())]);
    }
    assert_eq!(module.finish().end, SessionEnd::Disconnected);
}

#[test]
fn exit_ends_the_session_without_sending_anything() {
    init_logger();
    let server = server();
    let mut module = local_module(&server, "quitter");

    module.client.exit().unwrap();
    let (outcome, client) = module.join();
    assert_eq!(outcome.end, SessionEnd::Exited);
    assert!(outcome.error().is_none());

    // handshake header already consumed; nothing may follow it
    let (mut reader, _) = client.into_parts();
    assert_eq!(reader.read_to_end_vec().unwrap(), Vec::<u8>::new());
}

#[test]
fn dropped_module_is_a_disconnect() {
    init_logger();
    let server = server();
    let module = local_module(&server, "vanishing");

    let outcome = module.finish();
    assert_eq!(outcome.end, SessionEnd::Disconnected);
    assert!(outcome.is_graceful());
}

#[test]
fn unknown_command_closes_only_its_own_session() {
    init_logger();
    let server = server();
    let mut broken = local_module(&server, "broken");
    let mut healthy = local_module(&server, "healthy");

    let before = healthy
        .client
        .call("test.add", &[ArgValue::U64(1), ArgValue::F64(0.0)], &u64_sig())
        .unwrap();
    assert_eq!(before, vec![ArgValue::U64(2)]);

    // the engine cannot know the argument layout of an unknown command
    broken
        .client
        .call("graphics.explode", &[ArgValue::U64(7)], &Signature::empty())
        .unwrap();
    let (outcome, _) = broken.join();
    assert_eq!(
        outcome.end,
        SessionEnd::Failed(ModuleError::UnknownFunction {
            name: "graphics.explode".to_string()
        })
    );

    let after = healthy
        .client
        .call("test.add", &[ArgValue::U64(41), ArgValue::F64(0.0)], &u64_sig())
        .unwrap();
    assert_eq!(after, vec![ArgValue::U64(42)]);
    healthy.client.exit().unwrap();
    assert_eq!(healthy.join().0.end, SessionEnd::Exited);
}

#[test]
fn handler_failure_closes_the_session() {
    init_logger();
    let server = server();
    let mut module = local_module(&server, "failing");

    module.client.call("test.fail", &[], &Signature::empty()).unwrap();
    // the engine hangs up instead of answering the next call
    let next = module
        .client
        .call("test.add", &[ArgValue::U64(1), ArgValue::F64(1.0)], &u64_sig());
    assert!(next.is_err());

    let (outcome, _) = module.join();
    assert_eq!(
        outcome.end,
        SessionEnd::Failed(ModuleError::Handler {
            name: "test.fail".to_string(),
            source: HandlerError::failed("requested failure"),
        })
    );
    assert_eq!(outcome.commands_served, 0);
}

#[test]
fn add_overflow_is_a_handler_failure() {
    init_logger();
    let server = server();
    let mut module = local_module(&server, "overflowing");

    let result = module
        .client
        .call("test.add", &[ArgValue::U64(u64::MAX), ArgValue::F64(0.0)], &u64_sig());
    assert!(result.is_err());

    let (outcome, _) = module.join();
    assert_eq!(
        outcome.end,
        SessionEnd::Failed(ModuleError::Handler {
            name: "test.add".to_string(),
            source: HandlerError::failed("test.add overflowed"),
        })
    );
}

#[test]
fn handler_panic_is_contained_in_its_session() {
    init_logger();
    let server = server();
    let mut panicking = local_module(&server, "panicking");
    let mut bystander = local_module(&server, "bystander");

    panicking.client.call("test.panic", &[], &Signature::empty()).unwrap();
    let (outcome, _) = panicking.join();
    match outcome.error() {
        Some(ModuleError::Handler {
            source: HandlerError::Panicked { message },
            ..
        }) => assert!(message.contains("requested panic")),
        other => panic!("Expected a contained handler panic, got {:?}", other),
    }

    let result = bystander
        .client
        .call("test.add", &[ArgValue::U64(0), ArgValue::F64(0.0)], &u64_sig())
        .unwrap();
    assert_eq!(result, vec![ArgValue::U64(1)]);
    assert!(bystander.finish().is_graceful());
}

#[test]
fn result_that_breaks_its_signature_closes_the_session() {
    init_logger();
    let server = server();
    let mut module = local_module(&server, "liar");

    let result = module.client.call("test.badResult", &[], &u64_sig());
    assert!(result.is_err());

    let (outcome, _) = module.join();
    assert!(matches!(
        outcome.error(),
        Some(ModuleError::BadSignature { name, source: HandlerError::ResultMismatch { .. } })
            if name == "test.badResult"
    ));
}

#[test]
fn header_mismatch_closes_before_any_command() {
    init_logger();
    let server = server();
    let pair = LocalStreamPair::new();
    let worker = server
        .spawn_worker(pair.engine_reader, pair.engine_writer, "imposter")
        .unwrap();

    let mut module_reader = pair.module_reader;
    let mut module_writer = pair.module_writer;
    let mut header = [0u8; 8];
    module_reader.read_exact(&mut header).unwrap();
    assert_eq!(&header, SERVER_HEADER);

    module_writer.write_all(b"GET / HT").unwrap();
    let outcome = worker.join().unwrap();
    assert_eq!(
        outcome.end,
        SessionEnd::Failed(ModuleError::Protocol(ProtocolError::HeaderMismatch {
            expected: "ModBox/m".to_string(),
            found: "GET / HT".to_string(),
        }))
    );
    assert_eq!(outcome.module_name, None);
}

#[test]
fn truncated_string_fails_instead_of_hanging() {
    init_logger();
    let server = server();
    let module = local_module(&server, "truncated");
    let (_, mut writer) = module.client.into_parts();

    // command "test.echo" whose string argument claims 1000 bytes but sends 3
    let marshaler = Marshaler::default();
    let mut frame = Vec::new();
    marshaler.write_string(&mut frame, "test.echo").unwrap();
    frame.extend(1000u64.to_be_bytes());
    frame.extend(b"abc");
    writer.write_all(&frame).unwrap();
    drop(writer);

    let outcome = module.worker.join().unwrap();
    assert_eq!(
        outcome.end,
        SessionEnd::Failed(ModuleError::Marshal {
            command: "test.echo".to_string(),
            source: MarshalError::UnexpectedEof,
        })
    );
}

#[test]
fn absurd_string_length_is_rejected_up_front() {
    init_logger();
    let server = server();
    let module = local_module(&server, "greedy");
    let (_reader, mut writer) = module.client.into_parts();

    // the writer stays open: the worker must fail on the length alone
    writer.write_all(&u64::MAX.to_be_bytes()).unwrap();

    let outcome = module.worker.join().unwrap();
    assert!(matches!(
        outcome.error(),
        Some(ModuleError::Command {
            source: MarshalError::StringTooLong { len: u64::MAX, .. }
        })
    ));
}

#[test]
fn commands_run_in_the_order_received() {
    init_logger();
    let server = server();
    let mut module = local_module(&server, "sequential");

    let results: Vec<u64> = (0..50u64)
        .map(|value| {
            let result = module
                .client
                .call("test.add", &[ArgValue::U64(value), ArgValue::F64(0.5)], &u64_sig())
                .unwrap();
            match result.as_slice() {
                [ArgValue::U64(sum)] => *sum,
                other => panic!("unexpected result {:?}", other),
            }
        })
        .collect();

    assert_eq!(results, (1..51u64).collect::<Vec<_>>());
    module.client.exit().unwrap();
    assert_eq!(module.join().0.commands_served, 50);
}
