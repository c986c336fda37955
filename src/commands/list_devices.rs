//! List available audio devices.

use crate::capture::devices::{looks_like_system_source, suppress_alsa_warnings};
use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait};

/// One enumerated device, as printed.
struct DeviceEntry {
    name: String,
    config: String,
    is_default: bool,
}

/// Lists audio input and output devices.
///
/// Input IDs match the numeric form accepted by `audio.microphone` and
/// `audio.system` in sonoscope.toml. Inputs that look like monitor or loopback
/// sources are flagged as system audio.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn handle_list_devices() -> Result<(), anyhow::Error> {
    let (inputs, outputs) = suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let default_input = host.default_input_device().and_then(|d| d.name().ok());
        let default_output = host.default_output_device().and_then(|d| d.name().ok());

        let inputs = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate input devices: {e}"))?
            .filter_map(|d| {
                let name = d.name().ok()?;
                Some(DeviceEntry {
                    is_default: default_input.as_ref() == Some(&name),
                    config: describe_config(d.default_input_config()),
                    name,
                })
            })
            .collect::<Vec<_>>();

        let outputs = match host.output_devices() {
            Ok(devices) => devices
                .filter_map(|d| {
                    let name = d.name().ok()?;
                    Some(DeviceEntry {
                        is_default: default_output.as_ref() == Some(&name),
                        config: describe_config(d.default_output_config()),
                        name,
                    })
                })
                .collect(),
            Err(e) => {
                tracing::warn!("Failed to enumerate output devices: {e}");
                Vec::new()
            }
        };

        Ok((inputs, outputs))
    })?;

    println!();
    println!("Audio input devices:");
    println!();

    if inputs.is_empty() {
        println!("  No audio input devices found on this system.");
        println!();
    }

    for (index, device) in inputs.iter().enumerate() {
        let default_indicator = if device.is_default { " [DEFAULT]" } else { "" };
        let system_indicator = if looks_like_system_source(&device.name) {
            " [SYSTEM AUDIO]"
        } else {
            ""
        };
        println!("  ID: {index}");
        println!("    Name: {}{default_indicator}{system_indicator}", device.name);
        println!("    Config: {}", device.config);
        println!();
    }

    if !outputs.is_empty() {
        println!("Audio output devices:");
        if cfg!(target_os = "windows") {
            println!("  (the default output is captured via loopback when audio.system = \"default\")");
        }
        println!();
        for device in &outputs {
            let default_indicator = if device.is_default { " [DEFAULT]" } else { "" };
            println!("    {}{default_indicator} {}", device.name, device.config);
        }
        println!();
    }

    Ok(())
}

fn describe_config(
    config: Result<cpal::SupportedStreamConfig, cpal::DefaultStreamConfigError>,
) -> String {
    match config {
        Ok(config) => format!("({}Hz, {} channels)", config.sample_rate().0, config.channels()),
        Err(_) => "(configuration unavailable)".to_string(),
    }
}
