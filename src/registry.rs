use crate::device::Potentiometer;
use crate::error::{ConfigError, DeviceError, StartupError, StartupStage};
use crate::event::Readout;
use crate::metadata::DeviceSpec;
use crate::snapshot::{DeviceSnapshot, Snapshot};

/// Mutable per-device state, mirrored from the commands sent to hardware.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceState {
    /// Active wiper, always `< channel_count`.
    pub current_channel: u8,
    /// Tap per wiper, each in `0..=tap_count`.
    pub taps: Vec<u16>,
    /// Last resistance read back from the device model.
    pub last_value: f32,
}

impl DeviceState {
    fn zeroed(spec: &DeviceSpec) -> Self {
        Self {
            current_channel: 0,
            taps: vec![0; usize::from(spec.channel_count)],
            last_value: 0.0,
        }
    }

    /// Tap of the active wiper.
    #[inline]
    pub fn current_tap(&self) -> u16 {
        self.taps[usize::from(self.current_channel)]
    }

    #[inline]
    pub(crate) fn set_current_tap(&mut self, tap: u16) {
        let channel = usize::from(self.current_channel);
        self.taps[channel] = tap;
    }
}

/// One registered device: constants, mirrored state, and the hardware handle.
pub struct RegistryEntry {
    pub spec: DeviceSpec,
    pub state: DeviceState,
    pub(crate) handle: Box<dyn Potentiometer>,
}

impl RegistryEntry {
    /// Channel argument for the capability interface at the active wiper.
    #[inline]
    pub fn address(&self) -> Option<u8> {
        self.spec.address(self.state.current_channel)
    }

    pub fn readout(&self) -> Readout {
        Readout {
            tap: self.state.current_tap(),
            channel: self.address(),
            value: self.state.last_value,
        }
    }

    /// Re-read the resolved value of the active wiper into `last_value`.
    pub(crate) fn refresh_value(&mut self) -> f32 {
        self.state.last_value = self.handle.read_value(self.address());
        self.state.last_value
    }
}

/// Fixed, ordered collection of devices.
///
/// Devices are added once while building the showcase and never removed.
#[derive(Default)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
    initialized: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device. Its state starts zeroed; call [`initialize`](Self::initialize)
    /// before use.
    pub fn add_device<P: Potentiometer + 'static>(
        &mut self,
        spec: DeviceSpec,
        device: P,
    ) -> Result<usize, ConfigError> {
        spec.validate()?;
        let state = DeviceState::zeroed(&spec);
        self.initialized = false;
        self.entries.push(RegistryEntry {
            spec,
            state,
            handle: Box::new(device),
        });
        Ok(self.entries.len() - 1)
    }

    /// Configure every device and drive every wiper to tap 0.
    ///
    /// Any failure is fatal: tap tracking relies on a known zero start.
    pub fn initialize(&mut self) -> Result<(), StartupError> {
        self.initialized = false;
        for entry in &mut self.entries {
            let fail = |stage: StartupStage, source: DeviceError| StartupError {
                label: entry.spec.label.clone(),
                stage,
                source,
            };

            entry
                .handle
                .configure()
                .map_err(|e| fail(StartupStage::Configure, e))?;

            if entry.spec.is_multi_channel() {
                for channel in 0..entry.spec.channel_count {
                    entry
                        .handle
                        .zero(Some(channel))
                        .map_err(|e| fail(StartupStage::Zero, e))?;
                }
                entry
                    .handle
                    .set_channel(0)
                    .map_err(|e| fail(StartupStage::SelectChannel, e))?;
            } else {
                entry
                    .handle
                    .zero(None)
                    .map_err(|e| fail(StartupStage::Zero, e))?;
            }

            entry.state = DeviceState::zeroed(&entry.spec);
            let value = entry.refresh_value();
            tracing::info!(
                device = %entry.spec.label,
                channels = entry.spec.channel_count,
                taps = entry.spec.tap_count,
                value,
                "device zeroed"
            );
        }
        self.initialized = true;
        Ok(())
    }

    /// Whether every device has been configured and zeroed since the last
    /// [`add_device`](Self::add_device).
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RegistryEntry> {
        self.entries.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut RegistryEntry> {
        self.entries.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    /// Owned view of every device; `selected` is recorded as given.
    pub fn snapshot(&self, selected: usize) -> Snapshot {
        Snapshot {
            selected,
            devices: self
                .entries
                .iter()
                .map(|e| DeviceSnapshot {
                    label: e.spec.label.clone(),
                    tap_count: e.spec.tap_count,
                    channel_count: e.spec.channel_count,
                    channel: e.address(),
                    taps: e.state.taps.clone(),
                    value: e.state.last_value,
                })
                .collect(),
        }
    }
}
