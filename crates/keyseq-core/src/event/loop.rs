// Keyseq Event Loop
// Reads key events from grabbed evdev keyboards

use std::os::unix::io::AsRawFd;

use evdev::{Device, EventType, InputEvent};

use crate::input::{is_keyboard, DeviceFilter};

/// `revents` bits meaning the device is gone or its fd is unusable
const HANGUP_EVENTS: libc::c_short = libc::POLLHUP | libc::POLLERR | libc::POLLNVAL;

/// Result type for event loop operations
pub type EventLoopResult<T> = Result<T, EventLoopError>;

/// Errors that can occur in event loop
#[derive(Debug, thiserror::Error)]
pub enum EventLoopError {
    #[error("No matching keyboard devices found")]
    NoDevices,

    #[error("Failed to grab {name}: {source}")]
    Grab {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Device information for `--list-devices`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
    pub path: Option<String>,
}

/// Owns the input devices and multiplexes them with `poll(2)`.
///
/// Devices are grabbed exclusively when requested, so the original events
/// only reach applications through keyseq's virtual device. Grabs are
/// released on drop, including during unwinding.
///
/// A device that hangs up (unplugged, revoked) is dropped from the set and
/// reported once through [`take_lost_devices`](Self::take_lost_devices).
pub struct EventLoop {
    devices: Vec<Device>,
    poll_fds: Vec<libc::pollfd>,
    grabbed: bool,
    lost: Vec<String>,
}

impl EventLoop {
    /// Open every device the filter selects, optionally grabbing them.
    pub fn open(filter: &DeviceFilter, grab: bool) -> EventLoopResult<Self> {
        let mut devices: Vec<Device> = evdev::enumerate()
            .filter(|(path, device)| {
                filter.matches(
                    device.name().unwrap_or("Unknown"),
                    path.to_str().unwrap_or_default(),
                    Self::is_keyboard_device(device),
                )
            })
            .map(|(_, device)| device)
            .collect();

        if devices.is_empty() {
            return Err(EventLoopError::NoDevices);
        }

        if grab {
            for device in &mut devices {
                // Recover from a previous instance that died holding the grab.
                let _ = device.ungrab();
                device.grab().map_err(|source| EventLoopError::Grab {
                    name: device.name().unwrap_or("Unknown").to_string(),
                    source,
                })?;
            }
        }

        let poll_fds = devices
            .iter()
            .map(|d| libc::pollfd {
                fd: d.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();

        Ok(Self {
            devices,
            poll_fds,
            grabbed: grab,
            lost: Vec::new(),
        })
    }

    /// List all keyboard devices visible to this process
    pub fn list_devices() -> EventLoopResult<Vec<DeviceInfo>> {
        let devices: Vec<DeviceInfo> = evdev::enumerate()
            .filter(|(_, device)| Self::is_keyboard_device(device))
            .enumerate()
            .map(|(index, (path, device))| DeviceInfo {
                index,
                name: device.name().unwrap_or("Unknown").to_string(),
                path: path.to_str().map(str::to_string),
            })
            .collect();

        if devices.is_empty() {
            return Err(EventLoopError::NoDevices);
        }
        Ok(devices)
    }

    fn is_keyboard_device(device: &Device) -> bool {
        let has_ev_key = device.supported_events().contains(EventType::KEY);
        match device.supported_keys() {
            Some(keys) => is_keyboard(has_ev_key, |code| keys.contains(evdev::Key::new(code))),
            None => false,
        }
    }

    /// Wait up to `timeout_ms` for events from any device.
    ///
    /// Returns an empty vector on timeout or when interrupted by a signal,
    /// so the caller can check its shutdown flag. Devices that hung up are
    /// removed; once none are left this returns [`EventLoopError::NoDevices`].
    pub fn poll_for_events(&mut self, timeout_ms: i32) -> EventLoopResult<Vec<InputEvent>> {
        let mut events = Vec::new();

        let ready = unsafe {
            libc::poll(
                self.poll_fds.as_mut_ptr(),
                self.poll_fds.len() as libc::nfds_t,
                timeout_ms,
            )
        };

        if ready < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(events);
            }
            return Err(EventLoopError::Io(err));
        }
        if ready == 0 {
            return Ok(events);
        }

        let mut hung_up = Vec::new();
        for (index, (device, pfd)) in self.devices.iter_mut().zip(&self.poll_fds).enumerate() {
            let mut gone = is_hangup(pfd.revents);
            if pfd.revents & libc::POLLIN != 0 {
                let fetched = device.fetch_events().map(|batch| events.extend(batch));
                if let Err(e) = fetched {
                    if is_fatal_read_error(&e) {
                        log::warn!(
                            "read from {} failed: {}",
                            device.name().unwrap_or("Unknown"),
                            e
                        );
                        gone = true;
                    }
                }
            }
            if gone {
                hung_up.push(index);
            }
        }

        for index in hung_up.into_iter().rev() {
            self.remove_device(index);
        }
        if self.devices.is_empty() {
            return Err(EventLoopError::NoDevices);
        }

        Ok(events)
    }

    fn remove_device(&mut self, index: usize) {
        let mut device = self.devices.remove(index);
        self.poll_fds.remove(index);
        if self.grabbed {
            let _ = device.ungrab();
        }
        let name = device.name().unwrap_or("Unknown").to_string();
        log::warn!("{} disconnected, {} device(s) left", name, self.devices.len());
        self.lost.push(name);
    }

    /// Names of devices dropped since the last call
    pub fn take_lost_devices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lost)
    }

    /// Names of the devices being read
    pub fn device_names(&self) -> Vec<String> {
        self.devices
            .iter()
            .map(|d| d.name().unwrap_or("Unknown").to_string())
            .collect()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Release exclusive access to every device
    pub fn ungrab_all(&mut self) {
        if self.grabbed {
            for device in &mut self.devices {
                let _ = device.ungrab();
            }
            self.grabbed = false;
        }
    }
}

fn is_hangup(revents: libc::c_short) -> bool {
    revents & HANGUP_EVENTS != 0
}

/// Read errors that mean the device will never deliver events again
fn is_fatal_read_error(err: &std::io::Error) -> bool {
    !matches!(
        err.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted
    )
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        // A keyboard left grabbed is dead to the rest of the system.
        self.ungrab_all();
    }
}
