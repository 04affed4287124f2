//! Hardware doubles shared by the unit tests.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType as PinErrorType, InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{ErrorKind, ErrorType, Read, Write};
use embedded_storage::{ReadStorage, Storage};
use rand_core::RngCore;

use crate::config::AccessPointConfig;
use crate::http::OutboundRequest;
use crate::network::{LinkError, WifiLink};
use crate::order::{OrderTransport, TransportError};
use crate::portal::{Connection, Listener};
use crate::storage::Credentials;
use crate::time::{TimeSyncError, WallClock};

/// Delay that records every requested sleep instead of sleeping
#[derive(Default)]
pub struct RecordingDelay {
    pub slept_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.slept_ms.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.slept_ms.push(ms);
    }
}

/// Clock failing a number of syncs before succeeding
pub struct FlakyClock {
    pub failures_left: u32,
    pub now: u64,
    pub syncs: u32,
}

impl FlakyClock {
    pub fn failing(failures: u32) -> Self {
        Self {
            failures_left: failures,
            now: 1_700_000_000_000,
            syncs: 0,
        }
    }
}

impl WallClock for FlakyClock {
    async fn sync(&mut self) -> Result<(), TimeSyncError> {
        self.syncs += 1;
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(TimeSyncError::Timeout);
        }
        Ok(())
    }

    fn now_ms(&self) -> u64 {
        self.now
    }
}

/// Input pin replaying a script of levels, `true` meaning low (pressed).
/// Reads high once the script runs out.
#[derive(Default)]
pub struct ScriptedPin {
    pub presses: VecDeque<bool>,
}

impl ScriptedPin {
    pub fn new(presses: &[bool]) -> Self {
        Self {
            presses: presses.iter().copied().collect(),
        }
    }
}

impl PinErrorType for ScriptedPin {
    type Error = Infallible;
}

impl InputPin for ScriptedPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.is_low()?)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.presses.pop_front().unwrap_or(false))
    }
}

/// Output pin remembering every level written
#[derive(Default)]
pub struct RecordingLed {
    pub levels: Vec<bool>,
}

impl PinErrorType for RecordingLed {
    type Error = Infallible;
}

impl OutputPin for RecordingLed {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.push(true);
        Ok(())
    }
}

/// RNG producing 0, 1, 2, ... as bytes
#[derive(Default)]
pub struct CountingRng(u8);

impl RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for byte in dst {
            *byte = self.0;
            self.0 = self.0.wrapping_add(1);
        }
    }
}

/// In-memory client connection: replays `input`, collects writes
#[derive(Default)]
pub struct MockConnection {
    input: Vec<u8>,
    pos: usize,
    pub output: Vec<u8>,
    pub closed: bool,
    pub fail_writes: bool,
}

impl MockConnection {
    pub fn with_input(input: &[u8]) -> Self {
        Self {
            input: input.to_vec(),
            ..Self::default()
        }
    }

    pub fn failing_writes(input: &[u8]) -> Self {
        Self {
            fail_writes: true,
            ..Self::with_input(input)
        }
    }

    pub fn output_str(&self) -> &str {
        core::str::from_utf8(&self.output).unwrap()
    }

    /// Body of the response written to this connection
    pub fn response_body(&self) -> &[u8] {
        let at = self
            .output
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .unwrap();
        &self.output[at + 4..]
    }

    /// Value of a response header
    pub fn response_header(&self, name: &str) -> Option<String> {
        let head = self.output.split(|&b| b == b'\n').take_while(|line| *line != b"\r");
        for line in head {
            let line = core::str::from_utf8(line).ok()?.trim_end();
            if let Some((key, value)) = line.split_once(':') {
                if key.eq_ignore_ascii_case(name) {
                    return Some(value.trim().into());
                }
            }
        }
        None
    }
}

impl ErrorType for MockConnection {
    type Error = ErrorKind;
}

impl Read for MockConnection {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, ErrorKind> {
        let remaining = &self.input[self.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for MockConnection {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, ErrorKind> {
        if self.fail_writes {
            return Err(ErrorKind::BrokenPipe);
        }
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), ErrorKind> {
        Ok(())
    }
}

impl Connection for MockConnection {
    async fn close(&mut self) {
        self.closed = true;
    }
}

/// Listener handing out queued connections; fails once the queue is empty
#[derive(Default)]
pub struct MockListener {
    pub pending: VecDeque<MockConnection>,
    pub served: Vec<MockConnection>,
    pub closes: usize,
}

impl MockListener {
    pub fn with_requests(requests: &[&[u8]]) -> Self {
        Self {
            pending: requests.iter().map(|r| MockConnection::with_input(r)).collect(),
            ..Self::default()
        }
    }
}

impl Listener for MockListener {
    type Error = ErrorKind;
    type Connection<'a> = &'a mut MockConnection;

    async fn accept(&mut self) -> Result<&mut MockConnection, ErrorKind> {
        let conn = self.pending.pop_front().ok_or(ErrorKind::NotConnected)?;
        self.served.push(conn);
        self.served.last_mut().ok_or(ErrorKind::Other)
    }

    fn close(&mut self) {
        self.closes += 1;
    }
}

/// Transport recording encoded requests and answering with a fixed result
pub struct RecordingTransport {
    pub sent: Vec<String>,
    pub answer: Result<u16, TransportError>,
}

impl RecordingTransport {
    pub fn answering(answer: Result<u16, TransportError>) -> Self {
        Self {
            sent: Vec::new(),
            answer,
        }
    }
}

impl OrderTransport for RecordingTransport {
    async fn send(&mut self, request: &OutboundRequest<'_>) -> Result<u16, TransportError> {
        self.sent.push(request.encode());
        self.answer
    }
}

/// Radio that joins only `known`, after `checks_before_up` negative checks
#[derive(Default)]
pub struct FakeLink {
    pub known: Credentials,
    pub joined: Option<Credentials>,
    pub checks_before_up: u32,
    pending_checks: u32,
    pub link_down: bool,
    pub station_starts: Vec<Credentials>,
    pub ap_starts: usize,
}

impl FakeLink {
    pub fn knowing(known: Credentials) -> Self {
        Self {
            known,
            ..Self::default()
        }
    }
}

impl WifiLink for FakeLink {
    async fn begin_station(&mut self, credentials: &Credentials) -> Result<(), LinkError> {
        self.station_starts.push(credentials.clone());
        self.joined = Some(credentials.clone());
        self.pending_checks = self.checks_before_up;
        Ok(())
    }

    async fn is_connected(&mut self) -> bool {
        if self.link_down {
            return false;
        }
        match &self.joined {
            Some(joined) if *joined == self.known => {
                if self.pending_checks > 0 {
                    self.pending_checks -= 1;
                    false
                } else {
                    true
                }
            }
            _ => false,
        }
    }

    async fn start_access_point(
        &mut self,
        _config: &AccessPointConfig<'_>,
    ) -> Result<(), LinkError> {
        self.ap_starts += 1;
        self.joined = None;
        Ok(())
    }
}

/// NOR-like RAM flash, erased to `0xFF`
pub struct RamFlash(pub Vec<u8>);

impl RamFlash {
    pub fn erased(len: usize) -> Self {
        Self(alloc::vec![0xFF; len])
    }
}

impl ReadStorage for RamFlash {
    type Error = ();

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), ()> {
        let start = offset as usize;
        let src = self.0.get(start..start + bytes.len()).ok_or(())?;
        bytes.copy_from_slice(src);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.0.len()
    }
}

impl Storage for RamFlash {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), ()> {
        let start = offset as usize;
        let dst = self.0.get_mut(start..start + bytes.len()).ok_or(())?;
        dst.copy_from_slice(bytes);
        Ok(())
    }
}
