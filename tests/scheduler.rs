use digipot_showcase::backends::simulated::{BusProbe, SimulatedPot};
use digipot_showcase::backends::virtual_input::VirtualControls;
use digipot_showcase::display::{DisplaySink, DrawCommand, Field};
use digipot_showcase::input::{Clock, ManualClock};
use digipot_showcase::{
    default_devices, Button, ControlLoop, EventFilter, InputEvent, Registry, Session, Step, Timing,
    UpdateEvent, UpdateListener,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const MS: Duration = Duration::from_millis(1);

#[derive(Clone, Default)]
struct Panel(Rc<RefCell<PanelInner>>);

#[derive(Default)]
struct PanelInner {
    pending: Vec<DrawCommand>,
    frames: Vec<Vec<DrawCommand>>,
}

impl DisplaySink for Panel {
    fn draw(&mut self, command: DrawCommand) {
        self.0.borrow_mut().pending.push(command);
    }

    fn flush(&mut self) {
        let mut inner = self.0.borrow_mut();
        let frame = std::mem::take(&mut inner.pending);
        inner.frames.push(frame);
    }
}

#[derive(Clone, Default)]
struct Tap(Rc<RefCell<Vec<UpdateEvent>>>);

impl UpdateListener for Tap {
    fn on_update(&mut self, event: &UpdateEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

struct Rig {
    control_loop: ControlLoop<VirtualControls, ManualClock, Panel>,
    controls: VirtualControls,
    clock: ManualClock,
    panel: Panel,
    probe: BusProbe,
}

fn rig() -> Rig {
    let probe = BusProbe::new();
    let mut registry = Registry::new();
    for spec in default_devices() {
        let pot = SimulatedPot::new(&spec).with_probe(probe.clone());
        registry.add_device(spec, pot).unwrap();
    }
    registry.initialize().unwrap();
    probe.clear();

    let controls = VirtualControls::new();
    let clock = ManualClock::new();
    let panel = Panel::default();
    let control_loop = ControlLoop::new(
        Session::new(registry).unwrap(),
        controls.clone(),
        clock.clone(),
        panel.clone(),
        &Timing::default(),
    );
    Rig {
        control_loop,
        controls,
        clock,
        panel,
        probe,
    }
}

impl Rig {
    /// Advance one millisecond at a time, polling after each tick.
    fn run_for(&mut self, duration: Duration) -> Vec<InputEvent> {
        let mut inputs = Vec::new();
        let end = self.clock.now() + duration;
        while self.clock.now() < end {
            self.clock.advance(MS);
            inputs.extend(self.control_loop.poll().inputs);
        }
        inputs
    }
}

#[test]
fn initial_screen_is_flushed_on_first_display_tick() {
    let mut rig = rig();
    rig.clock.advance(39 * MS);
    assert!(!rig.control_loop.poll().flushed);
    rig.clock.advance(MS);
    assert!(rig.control_loop.poll().flushed);

    let frames = &rig.panel.0.borrow().frames;
    assert_eq!(frames.len(), 1);
    assert!(frames[0].contains(&DrawCommand::Label(0, "TPL0102".into())));
    assert!(frames[0].contains(&DrawCommand::Highlight(0, true)));
    assert!(frames[0].contains(&DrawCommand::Text(Field::Direction, "---".into())));
}

#[test]
fn detents_within_one_window_collapse_into_one_step() {
    let mut rig = rig();
    rig.controls.turn(4);
    let inputs = rig.run_for(50 * MS);
    assert_eq!(inputs, vec![InputEvent::RotateDelta(Step::Increment)]);
    assert_eq!(rig.probe.taps(), vec![(Some(0), 1)]);

    rig.controls.turn(-2);
    let inputs = rig.run_for(50 * MS);
    assert_eq!(inputs, vec![InputEvent::RotateDelta(Step::Decrement)]);
    assert_eq!(rig.control_loop.session().selected_entry().state.current_tap(), 0);
}

#[test]
fn rotation_is_only_sampled_on_its_cadence() {
    let mut rig = rig();
    rig.clock.advance(10 * MS);
    rig.controls.turn(1);
    rig.control_loop.poll();
    assert!(rig.probe.taps().is_empty());

    rig.clock.advance(40 * MS);
    let report = rig.control_loop.poll();
    assert_eq!(report.inputs, vec![InputEvent::RotateDelta(Step::Increment)]);
}

#[test]
fn bouncing_press_yields_one_selection() {
    let mut rig = rig();
    // chatter for a few ms, then hold
    for level in [true, false, true, false, true] {
        rig.controls.set(Button::Encoder, level);
        rig.run_for(2 * MS);
    }
    let mut inputs = rig.run_for(60 * MS);
    rig.controls.release(Button::Encoder);
    inputs.extend(rig.run_for(60 * MS));

    assert_eq!(inputs, vec![InputEvent::SelectNext]);
    assert_eq!(rig.control_loop.session().selected(), 1);
}

#[test]
fn short_glitch_is_not_a_press() {
    let mut rig = rig();
    // seen high by exactly one sample at 10 ms, gone before the window closes
    rig.controls.press(Button::Channel);
    rig.run_for(12 * MS);
    rig.controls.release(Button::Channel);
    let inputs = rig.run_for(100 * MS);
    assert!(inputs.is_empty());
    assert_eq!(rig.control_loop.session().selected_entry().state.current_channel, 0);
}

#[test]
fn concerns_maturing_together_run_in_fixed_order() {
    let mut rig = rig();
    // buttons are first sampled at 30 ms and settle by the 50 ms pass,
    // the same pass in which the rotary timer comes due
    rig.controls.press(Button::Channel);
    rig.controls.press(Button::Encoder);
    rig.clock.advance(30 * MS);
    assert!(rig.control_loop.poll().inputs.is_empty());

    rig.controls.turn(1);
    rig.clock.advance(20 * MS);
    let report = rig.control_loop.poll();

    assert_eq!(
        report.inputs,
        vec![
            InputEvent::RotateDelta(Step::Increment),
            InputEvent::ChannelToggle,
            InputEvent::SelectNext,
        ]
    );
    let taps = &rig.control_loop.session().registry().get(0).unwrap().state.taps;
    assert_eq!(taps, &vec![1, 0]);
    assert_eq!(rig.control_loop.session().selected(), 1);
}

#[test]
fn updates_reach_display_then_bus_listeners() {
    let mut rig = rig();
    let seen = Tap::default();
    rig.control_loop
        .bus_mut()
        .add_listener(seen.clone(), EventFilter::ValuesOnly, None);

    rig.run_for(40 * MS);
    rig.controls.turn(1);
    rig.run_for(40 * MS);

    assert_eq!(seen.0.borrow().len(), 1);
    let frames = &rig.panel.0.borrow().frames;
    let last = frames.last().unwrap();
    assert_eq!(
        last,
        &vec![
            DrawCommand::Text(Field::Direction, "Inc".into()),
            DrawCommand::Text(Field::Value(0), "375.3".into()),
            DrawCommand::Text(Field::Tap, "1".into()),
        ]
    );
}

#[test]
fn run_until_stops_on_condition() {
    let mut rig = rig();
    let clock = rig.clock.clone();
    rig.controls.turn(1);
    rig.control_loop.run_until(
        |lp| lp.session().selected_entry().state.current_tap() == 1,
        || clock.advance(MS),
    );
    // the rotary pass runs at 50 ms; the idle hook then moves the clock on once more
    assert_eq!(clock.now(), 51 * MS);
}
