use std::sync::Arc;
use std::time::Duration;

use application::{
    DeviceDiscovery, EngineSettings, PrintSession, QueuePrinterEngine, ScanStatus,
    SessionTimeouts,
};
use domain::{DeviceAddress, DomainError, PrinterBinding, SessionState};
use infrastructure::config::{SimulatedDeviceConfig, SimulatedRadioConfig};
use infrastructure::{MemoryKeyValueStore, MockPrinter, MockPrinterBehavior, SimulatedRadio};
use tokio::sync::Mutex;

const PRINTER: &str = "00:11:22:33:44:55";

fn radio_config() -> SimulatedRadioConfig {
    SimulatedRadioConfig {
        devices: vec![
            SimulatedDeviceConfig {
                address: PRINTER.to_string(),
                name: Some("MTP-II".to_string()),
                bonded: true,
            },
            SimulatedDeviceConfig {
                address: "66:77:88:99:AA:BB".to_string(),
                name: Some("Kitchen".to_string()),
                bonded: false,
            },
        ],
        step_ms: 1000,
        ..Default::default()
    }
}

fn binding() -> Option<PrinterBinding> {
    Some(PrinterBinding::new(
        DeviceAddress::new(PRINTER).unwrap(),
        Some("MTP-II".into()),
    ))
}

struct Rig {
    radio: Arc<SimulatedRadio>,
    printer: MockPrinter,
    discovery: DeviceDiscovery,
}

fn rig(behavior: MockPrinterBehavior) -> Rig {
    let printer = MockPrinter::with_behavior(behavior);
    let radio = Arc::new(SimulatedRadio::with_printer(radio_config(), printer.clone()));
    let discovery = DeviceDiscovery::spawn(radio.clone(), Arc::new(Mutex::new(())));
    Rig {
        radio,
        printer,
        discovery,
    }
}

#[tokio::test]
async fn test_successful_session_sends_payload_once() {
    let rig = rig(MockPrinterBehavior::default());
    let mut session = PrintSession::new(binding(), SessionTimeouts::default());

    let receipt = session
        .run(rig.radio.as_ref(), &rig.discovery, b"ticket bytes")
        .await
        .unwrap();

    assert_eq!(receipt.address.as_str(), PRINTER);
    assert_eq!(receipt.bytes_sent, 12);
    assert_eq!(session.state(), SessionState::Done);
    assert_eq!(rig.printer.jobs().await, vec![b"ticket bytes".to_vec()]);
    assert_eq!(rig.printer.connect_calls(), 1);
    assert_eq!(rig.printer.disconnect_calls(), 1);
}

#[tokio::test]
async fn test_no_binding_never_touches_the_radio() {
    let rig = rig(MockPrinterBehavior::default());
    let mut session = PrintSession::new(None, SessionTimeouts::default());

    let result = session.run(rig.radio.as_ref(), &rig.discovery, b"x").await;

    assert_eq!(result, Err(DomainError::NoPrinterSelected));
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(rig.printer.connect_calls(), 0);
}

#[tokio::test]
async fn test_unknown_address_is_unavailable() {
    let rig = rig(MockPrinterBehavior::default());
    let stranger = PrinterBinding::new(DeviceAddress::new("FF:FF").unwrap(), None);
    let mut session = PrintSession::new(Some(stranger), SessionTimeouts::default());

    let result = session.run(rig.radio.as_ref(), &rig.discovery, b"x").await;

    assert_eq!(result, Err(DomainError::DeviceUnavailable));
    assert_eq!(rig.printer.connect_calls(), 0);
    assert_eq!(rig.printer.disconnect_calls(), 0);
}

#[tokio::test]
async fn test_connect_failure_still_disconnects_once() {
    let rig = rig(MockPrinterBehavior {
        fail_connect: Some("host is down".into()),
        ..Default::default()
    });
    let mut session = PrintSession::new(binding(), SessionTimeouts::default());

    let result = session.run(rig.radio.as_ref(), &rig.discovery, b"x").await;

    assert_eq!(result, Err(DomainError::ConnectFailed("host is down".into())));
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(rig.printer.disconnect_calls(), 1);
    assert!(rig.printer.jobs().await.is_empty());
}

#[tokio::test]
async fn test_write_failure_reports_and_disconnects() {
    let rig = rig(MockPrinterBehavior {
        fail_write: Some("broken pipe".into()),
        ..Default::default()
    });
    let mut session = PrintSession::new(binding(), SessionTimeouts::default());

    let result = session.run(rig.radio.as_ref(), &rig.discovery, b"x").await;

    assert_eq!(result, Err(DomainError::WriteFailed("broken pipe".into())));
    assert_eq!(rig.printer.disconnect_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hung_connect_times_out() {
    let rig = rig(MockPrinterBehavior {
        hang_connect: true,
        ..Default::default()
    });
    let mut session = PrintSession::new(binding(), SessionTimeouts::default());

    let result = session.run(rig.radio.as_ref(), &rig.discovery, b"x").await;

    assert_eq!(result, Err(DomainError::ConnectFailed("timeout".into())));
    assert_eq!(rig.printer.disconnect_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hung_write_times_out() {
    let rig = rig(MockPrinterBehavior {
        hang_write: true,
        ..Default::default()
    });
    let timeouts = SessionTimeouts {
        connect: Duration::from_secs(1),
        send: Duration::from_secs(2),
    };
    let mut session = PrintSession::new(binding(), timeouts);

    let result = session.run(rig.radio.as_ref(), &rig.discovery, b"x").await;

    assert_eq!(result, Err(DomainError::ConnectFailed("timeout".into())));
    assert_eq!(rig.printer.disconnect_calls(), 1);
}

#[tokio::test]
async fn test_permission_and_radio_state_checked_first() {
    let rig = rig(MockPrinterBehavior::default());

    rig.radio.set_enabled(false);
    let mut session = PrintSession::new(binding(), SessionTimeouts::default());
    assert_eq!(
        session.run(rig.radio.as_ref(), &rig.discovery, b"x").await,
        Err(DomainError::RadioDisabled)
    );

    rig.radio.set_enabled(true);
    rig.radio.set_permission_granted(false);
    let mut session = PrintSession::new(binding(), SessionTimeouts::default());
    assert_eq!(
        session.run(rig.radio.as_ref(), &rig.discovery, b"x").await,
        Err(DomainError::PermissionDenied)
    );

    assert_eq!(rig.printer.connect_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_session_cancels_running_scan() {
    let rig = rig(MockPrinterBehavior::default());
    rig.discovery.start_scan().await.unwrap();
    assert_eq!(rig.discovery.scan_status(), ScanStatus::Scanning);

    let mut session = PrintSession::new(binding(), SessionTimeouts::default());
    session
        .run(rig.radio.as_ref(), &rig.discovery, b"x")
        .await
        .unwrap();

    // Round-trip through the actor so the cancel event is applied
    let snapshot = rig.discovery.snapshot().await;
    assert_eq!(snapshot.scan, ScanStatus::Cancelled);
}

#[tokio::test]
async fn test_concurrent_prints_never_share_the_link() {
    let printer = MockPrinter::new();
    let radio = Arc::new(SimulatedRadio::with_printer(radio_config(), printer.clone()));
    let engine = Arc::new(
        QueuePrinterEngine::start(
            Arc::new(MemoryKeyValueStore::new()),
            radio,
            EngineSettings::with_default_counters(),
        )
        .await
        .unwrap(),
    );
    engine
        .bind(DeviceAddress::new(PRINTER).unwrap(), Some("MTP-II".into()))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for number in 1..=5 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.print_ticket("C1", number).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(printer.jobs().await.len(), 5);
    assert_eq!(printer.peak_open_links(), 1);
    assert_eq!(printer.disconnect_calls(), 5);
}
