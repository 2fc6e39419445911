//! Simulated GATT server for the peripheral role.
//!
//! Centrals "write" by calling [`SimPeripheral::central_write`]; the role
//! drains those writes and its echoes land in [`SimPeripheral::notified`].

use std::collections::VecDeque;

use crate::app::ports::{NOTIFY_PAYLOAD, PeripheralPort, RadioError};

pub struct SimPeripheral {
    advertising: Option<u128>,
    refuse_advertising: u32,
    writes: VecDeque<heapless::Vec<u8, NOTIFY_PAYLOAD>>,
    notified: Vec<Vec<u8>>,
    subscribed: bool,
}

impl Default for SimPeripheral {
    fn default() -> Self {
        Self::new()
    }
}

impl SimPeripheral {
    /// Not yet advertising, with one central subscribed.
    pub fn new() -> Self {
        Self {
            advertising: None,
            refuse_advertising: 0,
            writes: VecDeque::new(),
            notified: Vec::new(),
            subscribed: true,
        }
    }

    /// Make the next `n` advertising attempts fail.
    pub fn refuse_advertising(&mut self, n: u32) {
        self.refuse_advertising = n;
    }

    /// Stop advertising, as after a stack reset.
    pub fn stop_advertising(&mut self) {
        self.advertising = None;
    }

    /// Without a subscribed central `notify` fails.
    pub fn set_subscribed(&mut self, on: bool) {
        self.subscribed = on;
    }

    pub fn central_write(&mut self, data: &[u8]) {
        let n = data.len().min(NOTIFY_PAYLOAD);
        let mut v = heapless::Vec::new();
        let _ = v.extend_from_slice(&data[..n]);
        self.writes.push_back(v);
    }

    pub fn advertised_service(&self) -> Option<u128> {
        self.advertising
    }

    pub fn notified(&self) -> &[Vec<u8>] {
        &self.notified
    }

    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }
}

impl PeripheralPort for SimPeripheral {
    fn start_advertising(&mut self, service: u128) -> Result<(), RadioError> {
        if self.refuse_advertising > 0 {
            self.refuse_advertising -= 1;
            return Err(RadioError::Stack);
        }
        self.advertising = Some(service);
        Ok(())
    }

    fn is_advertising(&self) -> bool {
        self.advertising.is_some()
    }

    fn take_status_write(&mut self) -> Option<heapless::Vec<u8, NOTIFY_PAYLOAD>> {
        self.writes.pop_front()
    }

    fn notify(&mut self, data: &[u8]) -> Result<(), RadioError> {
        if !self.subscribed {
            return Err(RadioError::NotConnected);
        }
        self.notified.push(data.to_vec());
        Ok(())
    }
}
