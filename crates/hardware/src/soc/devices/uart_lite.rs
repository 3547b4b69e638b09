//! OPB UART Lite.
//!
//! A byte-stream serial device with four registers: receive, transmit, status and control.
//! Bytes come from a [`ByteSource`] and go to a [`ByteSink`], so the device can be wired to
//! the host console or to in-memory buffers.
//!
//! Reading `rx` pulls a fresh byte from the source on every bus read. A byte written to `tx`
//! is committed on the next update and emitted on the update after that.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

use crate::soc::register::TwoPhase;
use crate::soc::traits::OpbDevice;

/// Status register contents: receive data valid and transmit FIFO empty.
const STATUS_VALUE: u32 = 0x5;

/// Index of the receive register.
const REG_RX: usize = 0;
/// Index of the transmit register.
const REG_TX: usize = 1;
/// Index of the status register.
const REG_STATUS: usize = 2;
/// Index of the control register.
const REG_CONTROL: usize = 3;

/// Supplier of received bytes.
pub trait ByteSource: fmt::Debug + Send {
    /// Returns the next byte; sources with nothing to give return 0.
    fn read_byte(&mut self) -> u8;
}

/// Consumer of transmitted bytes.
pub trait ByteSink: fmt::Debug + Send {
    /// Accepts one transmitted byte.
    fn write_byte(&mut self, byte: u8);
}

/// Reads bytes from the host's standard input, blocking until one is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> u8 {
        let mut byte = [0u8; 1];
        match io::stdin().read(&mut byte) {
            Ok(1) => byte[0],
            _ => 0,
        }
    }
}

/// Writes bytes to the host's standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ByteSink for StdoutSink {
    fn write_byte(&mut self, byte: u8) {
        let mut out = io::stdout().lock();
        if out.write_all(&[byte]).and_then(|()| out.flush()).is_err() {
            tracing::warn!(byte, "failed to write UART byte to stdout");
        }
    }
}

/// Shared in-memory byte queue usable as both a source and a sink.
///
/// Clones share the same queue, so a test can keep one handle and give another to a device.
#[derive(Debug, Default, Clone)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<VecDeque<u8>>>,
}

impl SharedBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends bytes to the back of the queue.
    pub fn push(&self, data: &[u8]) {
        if let Ok(mut bytes) = self.bytes.lock() {
            bytes.extend(data);
        }
    }

    /// Returns a copy of the queued bytes without consuming them.
    pub fn contents(&self) -> Vec<u8> {
        self.bytes
            .lock()
            .map(|bytes| bytes.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of queued bytes.
    pub fn len(&self) -> usize {
        self.bytes.lock().map_or(0, |bytes| bytes.len())
    }

    /// Returns `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ByteSource for SharedBuffer {
    fn read_byte(&mut self) -> u8 {
        self.bytes
            .lock()
            .ok()
            .and_then(|mut bytes| bytes.pop_front())
            .unwrap_or(0)
    }
}

impl ByteSink for SharedBuffer {
    fn write_byte(&mut self, byte: u8) {
        self.push(&[byte]);
    }
}

/// Transmit register: committed on one update, emitted on the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Transmit {
    reg: TwoPhase,
    armed: bool,
}

impl Transmit {
    fn update(&mut self, sink: &mut dyn ByteSink) {
        if self.armed {
            self.armed = false;
            sink.write_byte(self.reg.get() as u8);
        }
        if self.reg.update() {
            self.armed = true;
        }
    }
}

/// UART Lite peripheral.
#[derive(Debug)]
pub struct UartLite {
    name: String,
    control: TwoPhase,
    tx: Transmit,
    source: Box<dyn ByteSource>,
    sink: Box<dyn ByteSink>,
    read_latency: u32,
    write_latency: u32,
}

impl UartLite {
    /// Register names in declaration order.
    pub const REGISTERS: &'static [&'static str] = &["rx", "tx", "status", "control"];

    /// Creates a UART wired to the given byte source and sink.
    ///
    /// # Arguments
    ///
    /// * `name` - Instance name.
    /// * `read_latency` - Bus read latency in cycles.
    /// * `write_latency` - Bus write latency in cycles.
    /// * `source` - Where received bytes come from.
    /// * `sink` - Where transmitted bytes go.
    pub fn new(
        name: impl Into<String>,
        read_latency: u32,
        write_latency: u32,
        source: Box<dyn ByteSource>,
        sink: Box<dyn ByteSink>,
    ) -> Self {
        Self {
            name: name.into(),
            control: TwoPhase::new(),
            tx: Transmit::default(),
            source,
            sink,
            read_latency,
            write_latency,
        }
    }

    /// Creates a UART on the host console.
    pub fn console(name: impl Into<String>, read_latency: u32, write_latency: u32) -> Self {
        Self::new(
            name,
            read_latency,
            write_latency,
            Box::new(StdinSource),
            Box::new(StdoutSink),
        )
    }
}

impl OpbDevice for UartLite {
    fn name(&self) -> &str {
        &self.name
    }

    fn register_names(&self) -> &'static [&'static str] {
        Self::REGISTERS
    }

    fn read_latency(&self) -> u32 {
        self.read_latency
    }

    fn write_latency(&self) -> u32 {
        self.write_latency
    }

    fn get(&mut self, register: usize) -> u32 {
        if register == REG_RX {
            u32::from(self.source.read_byte())
        } else {
            self.peek(register)
        }
    }

    fn peek(&self, register: usize) -> u32 {
        match register {
            REG_TX => self.tx.reg.get(),
            REG_STATUS => STATUS_VALUE,
            REG_CONTROL => self.control.get(),
            _ => 0,
        }
    }

    fn put(&mut self, register: usize, value: u32) {
        match register {
            REG_TX => self.tx.reg.put(value & 0xFF),
            REG_CONTROL => self.control.put(value),
            _ => tracing::warn!(device = %self.name, register, value, "write to read-only UART register ignored"),
        }
    }

    fn cycle(&mut self) -> bool {
        let _ = self.control.update();
        self.tx.update(self.sink.as_mut());
        false
    }

    fn interrupt(&self) -> bool {
        false
    }

    fn reset(&mut self) {
        self.control.clear();
        self.tx = Transmit::default();
    }
}
