//! Simulated BLE central.
//!
//! A table of advertisers stands in for the air.  Each advertiser can be
//! told to refuse connections, hide a characteristic or refuse the
//! subscription, and open links can be dropped from under the engine.
//! Notifications go through the same [`NotificationQueue`] a real stack
//! callback would feed.
//!
//! A peer only notifies on a link whose data characteristic has been
//! subscribed.  With `echo_writes` enabled a write to a peer's status
//! characteristic comes back as a notification on that link, the way the
//! remote node answers a status change.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::app::ports::{
    Advertisement, CharHandle, LinkHandle, Notification, PeerAddress, RadioError, RadioPort,
};
use crate::broadcast::{DATA_CHAR_UUID, STATUS_CHAR_UUID};
use crate::config::SCAN_BUFFER;
use crate::notifications::NotificationQueue;

const DATA_ATTR: u16 = 0x0010;
const STATUS_ATTR: u16 = 0x0012;

/// A value written through the radio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub address: PeerAddress,
    pub handle: CharHandle,
    pub data: Vec<u8>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Faults {
    refuse_connect: bool,
    missing_data: bool,
    missing_status: bool,
    refuse_subscribe: bool,
    refuse_write: bool,
}

pub struct SimRadio {
    air: Vec<Advertisement>,
    faults: HashMap<PeerAddress, Faults>,
    links: HashMap<LinkHandle, PeerAddress>,
    subscribed: HashSet<CharHandle>,
    next_link: u16,
    writes: Vec<WriteRecord>,
    queue: NotificationQueue,
    echo_writes: bool,
    scans: u32,
    connect_attempts: u32,
}

impl Default for SimRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRadio {
    pub fn new() -> Self {
        Self {
            air: Vec::new(),
            faults: HashMap::new(),
            links: HashMap::new(),
            subscribed: HashSet::new(),
            next_link: 1,
            writes: Vec::new(),
            queue: NotificationQueue::new(),
            echo_writes: false,
            scans: 0,
            connect_attempts: 0,
        }
    }

    /// Put an advertiser on the air.  Scan results come back in insertion
    /// order.
    pub fn advertise(&mut self, address: PeerAddress, service: Option<u128>, rssi: i8) {
        self.air.push(Advertisement {
            address,
            service,
            rssi,
        });
    }

    pub fn set_echo_writes(&mut self, on: bool) {
        self.echo_writes = on;
    }

    pub fn refuse_connect(&mut self, address: PeerAddress) {
        self.faults.entry(address).or_default().refuse_connect = true;
    }

    /// Hide one of the two peer characteristics on `address`.
    pub fn hide_characteristic(&mut self, address: PeerAddress, uuid: u128) {
        let f = self.faults.entry(address).or_default();
        if uuid == DATA_CHAR_UUID {
            f.missing_data = true;
        } else if uuid == STATUS_CHAR_UUID {
            f.missing_status = true;
        }
    }

    pub fn refuse_subscribe(&mut self, address: PeerAddress) {
        self.faults.entry(address).or_default().refuse_subscribe = true;
    }

    pub fn refuse_write(&mut self, address: PeerAddress) {
        self.faults.entry(address).or_default().refuse_write = true;
    }

    pub fn clear_faults(&mut self, address: PeerAddress) {
        self.faults.remove(&address);
    }

    /// Simulate link loss.  The engine only finds out on its next tick.
    pub fn drop_link(&mut self, address: PeerAddress) {
        self.links.retain(|_, a| *a != address);
        self.subscribed.retain(|h| self.links.contains_key(&h.link));
    }

    /// Deliver a notification from `address` as the stack callback would.
    /// Returns `false` when there is no subscribed link or the queue is full.
    pub fn notify_from(&self, address: PeerAddress, payload: &[u8]) -> bool {
        match self.link_to(address) {
            Some(link) if self.notifies(link) => self.queue.push(link, payload).is_ok(),
            _ => false,
        }
    }

    /// Push a raw notification on any link handle, subscribed or not, as a
    /// misbehaving stack might.
    pub fn notify_on(&self, link: LinkHandle, payload: &[u8]) -> bool {
        self.queue.push(link, payload).is_ok()
    }

    pub fn link_to(&self, address: PeerAddress) -> Option<LinkHandle> {
        self.links
            .iter()
            .find(|(_, a)| **a == address)
            .map(|(l, _)| *l)
    }

    pub fn open_links(&self) -> usize {
        self.links.len()
    }

    pub fn writes(&self) -> &[WriteRecord] {
        &self.writes
    }

    pub fn writes_to(&self, address: PeerAddress) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|w| w.address == address)
            .filter_map(|w| w.data.first().copied())
            .collect()
    }

    pub fn scans(&self) -> u32 {
        self.scans
    }

    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts
    }

    pub fn pending_notifications(&self) -> usize {
        self.queue.len()
    }

    /// True when the data characteristic on `link` is subscribed.
    fn notifies(&self, link: LinkHandle) -> bool {
        self.subscribed.contains(&CharHandle {
            link,
            attr: DATA_ATTR,
        })
    }

    fn faults(&self, address: PeerAddress) -> Faults {
        self.faults.get(&address).copied().unwrap_or_default()
    }
}

impl RadioPort for SimRadio {
    fn scan(
        &mut self,
        max_results: usize,
        _timeout_ms: u32,
    ) -> heapless::Vec<Advertisement, SCAN_BUFFER> {
        self.scans += 1;
        self.air
            .iter()
            .take(max_results.min(SCAN_BUFFER))
            .copied()
            .collect()
    }

    fn connect(&mut self, address: PeerAddress, _timeout_ms: u32) -> Result<LinkHandle, RadioError> {
        self.connect_attempts += 1;
        if !self.air.iter().any(|a| a.address == address) {
            return Err(RadioError::Timeout);
        }
        if self.faults(address).refuse_connect {
            return Err(RadioError::Rejected);
        }
        let link = LinkHandle(self.next_link);
        self.next_link = self.next_link.wrapping_add(1).max(1);
        self.links.insert(link, address);
        debug!("sim: link {} open to {}", link.0, address);
        Ok(link)
    }

    fn resolve_characteristic(
        &mut self,
        link: LinkHandle,
        uuid: u128,
    ) -> Result<CharHandle, RadioError> {
        let address = *self.links.get(&link).ok_or(RadioError::NotConnected)?;
        let f = self.faults(address);
        let attr = match uuid {
            DATA_CHAR_UUID if !f.missing_data => DATA_ATTR,
            STATUS_CHAR_UUID if !f.missing_status => STATUS_ATTR,
            _ => return Err(RadioError::NotFound),
        };
        Ok(CharHandle { link, attr })
    }

    fn write_value(&mut self, handle: CharHandle, data: &[u8]) -> Result<(), RadioError> {
        let address = *self
            .links
            .get(&handle.link)
            .ok_or(RadioError::NotConnected)?;
        if self.faults(address).refuse_write {
            return Err(RadioError::Rejected);
        }
        self.writes.push(WriteRecord {
            address,
            handle,
            data: data.to_vec(),
        });
        if self.echo_writes && handle.attr == STATUS_ATTR && self.notifies(handle.link) {
            let _ = self.queue.push(handle.link, data);
        }
        Ok(())
    }

    fn subscribe(&mut self, handle: CharHandle) -> Result<(), RadioError> {
        let address = *self
            .links
            .get(&handle.link)
            .ok_or(RadioError::NotConnected)?;
        if self.faults(address).refuse_subscribe {
            return Err(RadioError::Rejected);
        }
        self.subscribed.insert(handle);
        Ok(())
    }

    fn disconnect(&mut self, link: LinkHandle) {
        self.links.remove(&link);
        self.subscribed.retain(|h| h.link != link);
    }

    fn is_connected(&self, link: LinkHandle) -> bool {
        self.links.contains_key(&link)
    }

    fn take_notification(&mut self) -> Option<Notification> {
        self.queue.pop()
    }
}
