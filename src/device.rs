//! Device-switch table: the file-system layer forwards reads and writes on
//! device inodes to the driver registered under the inode's major number.

use spin::Mutex;
use crate::constants::console::NDEV;
use crate::error::{Error, Result};

/// Lock of the inode a device call arrives on. Drivers that may block drop
/// it for the duration of the call and take it back before returning.
pub trait InodeLock {
    fn unlock(&self);
    fn lock(&self);
}

/// A character device's read and write entry points.
pub trait CharDevice: Sync {
    fn read(&self, ip: &dyn InodeLock, dst: &mut [u8]) -> Result<usize>;
    fn write(&self, ip: &dyn InodeLock, src: &[u8]) -> Result<usize>;
}

pub struct DeviceSwitch {
    devices: Mutex<[Option<&'static dyn CharDevice>; NDEV]>,
}

impl DeviceSwitch {
    pub const fn new() -> DeviceSwitch {
        DeviceSwitch { devices: Mutex::new([None; NDEV]) }
    }

    pub fn register(&self, major: usize, device: &'static dyn CharDevice) -> Result<()> {
        let mut devices = self.devices.lock();
        let slot = devices.get_mut(major).ok_or(Error::NoDevice(major))?;
        if slot.is_some() {
            return Err(Error::AlreadyRegistered(major));
        }
        *slot = Some(device);
        Ok(())
    }

    fn lookup(&self, major: usize) -> Result<&'static dyn CharDevice> {
        self.devices
            .lock()
            .get(major)
            .copied()
            .flatten()
            .ok_or(Error::NoDevice(major))
    }

    pub fn read(&self, major: usize, ip: &dyn InodeLock, dst: &mut [u8]) -> Result<usize> {
        self.lookup(major)?.read(ip, dst)
    }

    pub fn write(&self, major: usize, ip: &dyn InodeLock, src: &[u8]) -> Result<usize> {
        self.lookup(major)?.write(ip, src)
    }
}

pub static DEVSW: DeviceSwitch = DeviceSwitch::new();
