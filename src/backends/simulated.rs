//! In-memory potentiometers.
//!
//! [`SimulatedPot`] behaves like a real part as far as the capability
//! interface can tell: it must be configured first, tracks one wiper per
//! channel, and resolves its value with the linear-taper model. Every call is
//! appended to an optional shared [`BusProbe`], which can also fail selected
//! calls to exercise error paths.

use crate::device::{linear_taper, Potentiometer};
use crate::error::DeviceError;
use crate::metadata::DeviceSpec;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// One capability call as seen on the simulated bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Configure { device: String },
    Zero { device: String, channel: Option<u8> },
    SetTap { device: String, channel: Option<u8>, tap: u16 },
    SetChannel { device: String, channel: u8 },
}

type FaultRule = Box<dyn Fn(&Call) -> bool>;

#[derive(Default)]
struct ProbeInner {
    calls: Vec<Call>,
    fail_on: Option<FaultRule>,
}

/// Shared journal of bus traffic, plus a fault switch.
///
/// Cloning yields another handle to the same journal, so one probe can watch
/// several devices in the order the calls were issued.
#[derive(Clone, Default)]
pub struct BusProbe(Rc<RefCell<ProbeInner>>);

impl BusProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    /// Only the `SetTap` calls, as `(channel, tap)` pairs.
    pub fn taps(&self) -> Vec<(Option<u8>, u16)> {
        self.0
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::SetTap { channel, tap, .. } => Some((*channel, *tap)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().calls.clear();
    }

    /// While set, every command fails with [`DeviceError::Bus`] (it is still recorded).
    pub fn set_failing(&self, failing: bool) {
        if failing {
            self.fail_on(|_| true);
        } else {
            self.0.borrow_mut().fail_on = None;
        }
    }

    /// Fail only the calls matching `rule`, replacing any earlier rule.
    pub fn fail_on(&self, rule: impl Fn(&Call) -> bool + 'static) {
        self.0.borrow_mut().fail_on = Some(Box::new(rule));
    }

    fn record(&self, call: Call) -> Result<(), DeviceError> {
        let mut inner = self.0.borrow_mut();
        let fails = inner.fail_on.as_ref().is_some_and(|rule| rule(&call));
        inner.calls.push(call);
        if fails {
            Err(DeviceError::Bus("simulated bus fault".into()))
        } else {
            Ok(())
        }
    }
}

pub struct SimulatedPot {
    label: String,
    tap_count: u16,
    channel_count: u8,
    resistance_ohms: f32,
    wipers: Vec<u16>,
    active: u8,
    configured: bool,
    probe: Option<BusProbe>,
}

impl SimulatedPot {
    pub fn new(spec: &DeviceSpec) -> Self {
        Self {
            label: spec.label.clone(),
            tap_count: spec.tap_count,
            channel_count: spec.channel_count.max(1),
            resistance_ohms: spec.resistance_ohms,
            wipers: vec![0; usize::from(spec.channel_count.max(1))],
            active: 0,
            configured: false,
            probe: None,
        }
    }

    /// Record traffic (and take faults) from `probe`.
    pub fn with_probe(mut self, probe: BusProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Wiper position of `channel` as the part itself holds it.
    pub fn wiper(&self, channel: Option<u8>) -> u16 {
        self.wipers
            .get(usize::from(self.resolve(channel)))
            .copied()
            .unwrap_or(0)
    }

    fn resolve(&self, channel: Option<u8>) -> u8 {
        channel.unwrap_or(self.active)
    }

    fn record(&self, call: Call) -> Result<(), DeviceError> {
        match &self.probe {
            Some(probe) => probe.record(call),
            None => Ok(()),
        }
    }

    fn check_channel(&self, channel: u8) -> Result<usize, DeviceError> {
        if channel < self.channel_count {
            Ok(usize::from(channel))
        } else {
            Err(DeviceError::InvalidChannel {
                channel,
                channel_count: self.channel_count,
            })
        }
    }

    fn ensure_configured(&self) -> Result<(), DeviceError> {
        if self.configured {
            Ok(())
        } else {
            Err(DeviceError::NotConfigured)
        }
    }
}

impl Potentiometer for SimulatedPot {
    fn configure(&mut self) -> Result<(), DeviceError> {
        self.record(Call::Configure {
            device: self.label.clone(),
        })?;
        self.configured = true;
        Ok(())
    }

    fn zero(&mut self, channel: Option<u8>) -> Result<(), DeviceError> {
        self.ensure_configured()?;
        self.record(Call::Zero {
            device: self.label.clone(),
            channel,
        })?;
        let idx = self.check_channel(self.resolve(channel))?;
        self.wipers[idx] = 0;
        Ok(())
    }

    fn set_tap(&mut self, channel: Option<u8>, tap: u16) -> Result<Duration, DeviceError> {
        let started = Instant::now();
        self.ensure_configured()?;
        self.record(Call::SetTap {
            device: self.label.clone(),
            channel,
            tap,
        })?;
        let idx = self.check_channel(self.resolve(channel))?;
        self.wipers[idx] = tap.min(self.tap_count);
        Ok(started.elapsed())
    }

    fn read_value(&self, channel: Option<u8>) -> f32 {
        linear_taper(self.resistance_ohms, self.wiper(channel), self.tap_count)
    }

    fn set_channel(&mut self, channel: u8) -> Result<(), DeviceError> {
        self.ensure_configured()?;
        if self.channel_count < 2 {
            return Ok(());
        }
        self.record(Call::SetChannel {
            device: self.label.clone(),
            channel,
        })?;
        self.active = self.check_channel(channel)? as u8;
        Ok(())
    }
}

/// One simulated part per spec, all reporting to `probe`.
pub fn create_simulated_devices(specs: &[DeviceSpec], probe: &BusProbe) -> Vec<SimulatedPot> {
    specs
        .iter()
        .map(|spec| SimulatedPot::new(spec).with_probe(probe.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tpl() -> DeviceSpec {
        DeviceSpec::new("TPL0102", 255, 2, 95_700.0)
    }

    #[test]
    fn commands_before_configure_fail() {
        let mut pot = SimulatedPot::new(&tpl());
        assert_eq!(pot.set_tap(Some(0), 3), Err(DeviceError::NotConfigured));
        assert_eq!(pot.zero(None), Err(DeviceError::NotConfigured));
    }

    #[test]
    fn wipers_are_independent_per_channel() {
        let mut pot = SimulatedPot::new(&tpl());
        pot.configure().unwrap();
        pot.set_tap(Some(0), 10).unwrap();
        pot.set_tap(Some(1), 255).unwrap();
        assert_eq!(pot.wiper(Some(0)), 10);
        assert_eq!(pot.read_value(Some(1)), 95_700.0);

        pot.set_channel(1).unwrap();
        assert_eq!(pot.read_value(None), 95_700.0);
    }

    #[test]
    fn unknown_channel_is_rejected() {
        let mut pot = SimulatedPot::new(&tpl());
        pot.configure().unwrap();
        assert_eq!(
            pot.set_channel(2),
            Err(DeviceError::InvalidChannel { channel: 2, channel_count: 2 })
        );
    }

    #[test]
    fn single_channel_set_channel_is_silent() {
        let probe = BusProbe::new();
        let spec = DeviceSpec::new("MCP4011", 63, 1, 49_220.0);
        let mut pot = SimulatedPot::new(&spec).with_probe(probe.clone());
        pot.configure().unwrap();
        probe.clear();
        assert_eq!(pot.set_channel(1), Ok(()));
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn failing_probe_still_records() {
        let probe = BusProbe::new();
        let mut pot = SimulatedPot::new(&tpl()).with_probe(probe.clone());
        pot.configure().unwrap();
        probe.set_failing(true);
        assert!(matches!(pot.set_tap(Some(0), 1), Err(DeviceError::Bus(_))));
        assert_eq!(pot.wiper(Some(0)), 0);
        assert_eq!(probe.taps(), vec![(Some(0), 1)]);
    }

    #[test]
    fn fault_rule_hits_only_matching_calls() {
        let probe = BusProbe::new();
        let mut pot = SimulatedPot::new(&tpl()).with_probe(probe.clone());
        probe.fail_on(|c| matches!(c, Call::SetTap { channel: Some(1), .. }));
        pot.configure().unwrap();
        assert!(pot.set_tap(Some(0), 4).is_ok());
        assert!(matches!(pot.set_tap(Some(1), 4), Err(DeviceError::Bus(_))));
        assert_eq!(pot.wiper(Some(0)), 4);
        assert_eq!(pot.wiper(Some(1)), 0);

        probe.set_failing(false);
        assert!(pot.set_tap(Some(1), 4).is_ok());
    }
}
