//! System construction tests.

use opbsim_core::config::{Config, DeviceConfig, DeviceKind};
use opbsim_core::soc::{BusResponse, Console, System};

const TIMER: u32 = 0x4000_0000;
const UART: u32 = 0x4060_0000;

fn config() -> Config {
    Config {
        devices: vec![
            DeviceConfig::contiguous(DeviceKind::TimerCounter, TIMER),
            DeviceConfig::contiguous(DeviceKind::UartLite, UART),
        ],
        ..Config::default()
    }
}

#[test]
fn devices_are_registered_in_configuration_order() {
    let system = System::new(&config(), &Console::default()).unwrap();
    let names: Vec<_> = system.bus.devices().iter().map(|d| d.name().to_owned()).collect();
    assert_eq!(names, ["opb_timer_0", "opb_uartlite_1"]);
}

#[test]
fn registers_are_mapped_by_name() {
    let system = System::new(&config(), &Console::default()).unwrap();
    let tcr1 = system.bus.register_at(TIMER + 20).unwrap();
    assert_eq!((tcr1.device, tcr1.register), (0, 5));
    let control = system.bus.register_at(UART + 12).unwrap();
    assert_eq!((control.device, control.register), (1, 3));
}

#[test]
fn bindings_may_list_registers_in_any_order() {
    let mut uart = DeviceConfig::contiguous(DeviceKind::UartLite, UART);
    uart.registers.reverse();
    let config = Config {
        devices: vec![uart],
        ..Config::default()
    };
    let system = System::new(&config, &Console::default()).unwrap();
    let tx = system.bus.register_at(UART + 4).unwrap();
    assert_eq!(tx.register, 1);
}

#[test]
fn buffered_console_captures_uart_output() {
    let (console, _input, output) = Console::buffered();
    let mut system = System::new(&config(), &console).unwrap();

    let tx = UART + 4;
    while system.bus.write_word(tx, u32::from(b'!')) == BusResponse::Access {}
    let _ = system.bus.tick_devices();
    let _ = system.bus.tick_devices();
    assert_eq!(output.contents(), b"!");
}

#[test]
fn invalid_configuration_builds_nothing() {
    let mut config = config();
    config.memory.mapped_latency = 0;
    assert!(System::new(&config, &Console::default()).is_err());
}
