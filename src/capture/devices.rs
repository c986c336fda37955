//! Audio device lookup for microphone and system-audio sources.

use super::SourceKind;
use crate::error::VizError;
use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Name fragments of input devices that re-expose what the machine is playing.
const SYSTEM_SOURCE_HINTS: &[&str] = &["monitor", "loopback", "stereo mix", "blackhole"];

/// A device chosen for capture.
pub struct ResolvedDevice {
    pub device: cpal::Device,
    pub name: String,
    /// Capture runs as an input stream on an output device (WASAPI loopback).
    pub loopback: bool,
}

/// Returns true if an input device name looks like a monitor/loopback source.
pub fn looks_like_system_source(name: &str) -> bool {
    let lower = name.to_lowercase();
    SYSTEM_SOURCE_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Resolves the device for a source from its configured spec.
///
/// `spec` is `"default"`, a numeric index from `sonoscope list-devices`, or an
/// exact device name.
///
/// # Errors
/// - `VizError::Acquisition` if no matching device exists
pub fn resolve(source: SourceKind, spec: &str) -> Result<ResolvedDevice, VizError> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let resolved = match (source, spec) {
            (SourceKind::Microphone, "default") => {
                let device = host
                    .default_input_device()
                    .ok_or_else(|| anyhow!("No audio input device available"))?;
                named(device, false)
            }
            (SourceKind::System, "default") => default_system_device(&host)?,
            (_, spec) => named(find_input_device(&host, spec)?, false),
        };
        Ok(resolved)
    })
    .map_err(|e| VizError::Acquisition(e.to_string()))
}

fn named(device: cpal::Device, loopback: bool) -> ResolvedDevice {
    let name = device
        .name()
        .unwrap_or_else(|_| "Unknown device".to_string());
    ResolvedDevice {
        device,
        name,
        loopback,
    }
}

/// Picks the system-audio device when none is configured.
#[cfg(target_os = "windows")]
fn default_system_device(host: &cpal::Host) -> anyhow::Result<ResolvedDevice> {
    // WASAPI allows an input stream on an output device
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No audio output device available for loopback capture"))?;
    Ok(named(device, true))
}

#[cfg(not(target_os = "windows"))]
fn default_system_device(host: &cpal::Host) -> anyhow::Result<ResolvedDevice> {
    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

    for device in devices {
        if let Ok(name) = device.name() {
            if looks_like_system_source(&name) {
                return Ok(ResolvedDevice {
                    device,
                    name,
                    loopback: false,
                });
            }
        }
    }

    Err(anyhow!(
        "No system audio source found. Set audio.system in sonoscope.toml to a monitor or \
         loopback device from 'sonoscope list-devices', or use the microphone."
    ))
}

/// Finds an input device by numeric index or exact name.
fn find_input_device(host: &cpal::Host, device_spec: &str) -> anyhow::Result<cpal::Device> {
    let devices: Vec<_> = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
        .filter(|d| d.name().is_ok())
        .collect();

    if let Ok(index) = device_spec.parse::<usize>() {
        let count = devices.len();
        return devices.into_iter().nth(index).ok_or_else(|| {
            anyhow!(
                "Device index {} is out of range (0-{})",
                index,
                count.saturating_sub(1)
            )
        });
    }

    devices
        .into_iter()
        .find(|d| d.name().map(|n| n == device_spec).unwrap_or(false))
        .ok_or_else(|| {
            anyhow!(
                "Audio input device '{device_spec}' not found. Use 'sonoscope list-devices' to see available devices."
            )
        })
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms ALSA doesn't exist, so nothing is suppressed.
#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_sources_are_recognized() {
        assert!(looks_like_system_source(
            "Monitor of Built-in Audio Analog Stereo"
        ));
        assert!(looks_like_system_source("alsa_output.pci.analog-stereo.monitor"));
        assert!(looks_like_system_source("Stereo Mix (Realtek Audio)"));
        assert!(looks_like_system_source("BlackHole 2ch"));
    }

    #[test]
    fn test_microphones_are_not_system_sources() {
        assert!(!looks_like_system_source("Built-in Microphone"));
        assert!(!looks_like_system_source("default"));
        assert!(!looks_like_system_source("USB Audio Device"));
    }
}
