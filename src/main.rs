use anyhow::{Context, Result};
use digipot_showcase::backends::simulated::{create_simulated_devices, BusProbe};
use digipot_showcase::backends::terminal::TerminalDisplay;
use digipot_showcase::backends::virtual_input::VirtualControls;
use digipot_showcase::input::SystemClock;
use digipot_showcase::logger::Logger;
use digipot_showcase::{Button, Config, ControlLoop, EventFilter, Registry, Session, Timing};
use std::cell::Cell;
use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Keyboard stand-ins for the physical controls.
#[derive(Clone, Copy, Debug)]
enum Key {
    Turn(i64),
    Press(Button),
    Quit,
}

fn parse_key(c: char) -> Option<Key> {
    match c {
        '+' | '=' | 'l' => Some(Key::Turn(1)),
        '-' | '_' | 'h' => Some(Key::Turn(-1)),
        's' => Some(Key::Press(Button::Encoder)),
        'c' => Some(Key::Press(Button::Channel)),
        'q' => Some(Key::Quit),
        _ => None,
    }
}

/// Replays keys onto the virtual controls one at a time, holding each level
/// long enough for the debouncer and the poll cadence to see it.
struct Operator {
    controls: VirtualControls,
    queue: VecDeque<Key>,
    held: Option<Button>,
    busy_until: Instant,
    hold: Duration,
    gap: Duration,
}

impl Operator {
    fn new(controls: VirtualControls, timing: &Timing) -> Self {
        let margin = Duration::from_millis(5);
        let button_poll = timing.rotary_button().max(timing.channel_button());
        Self {
            controls,
            queue: VecDeque::new(),
            held: None,
            busy_until: Instant::now(),
            hold: timing.debounce() + button_poll * 2 + margin,
            gap: timing.rotary().max(timing.debounce() + button_poll * 2) + margin,
        }
    }

    /// Returns `false` once a quit key has been reached.
    fn step(&mut self, now: Instant) -> bool {
        if now < self.busy_until {
            return true;
        }
        if let Some(button) = self.held.take() {
            self.controls.release(button);
            self.busy_until = now + self.gap;
            return true;
        }
        match self.queue.pop_front() {
            Some(Key::Turn(detents)) => {
                self.controls.turn(detents);
                self.busy_until = now + self.gap;
            }
            Some(Key::Press(button)) => {
                self.controls.press(button);
                self.held = Some(button);
                self.busy_until = now + self.hold;
            }
            Some(Key::Quit) => return false,
            None => {}
        }
        true
    }
}

fn spawn_stdin_reader() -> Receiver<Key> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            for key in line.chars().filter_map(parse_key) {
                if tx.send(key).is_err() {
                    return;
                }
            }
        }
        let _ = tx.send(Key::Quit);
    });
    rx
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("loading {}", path.to_string_lossy()))?,
        None => Config::default(),
    };

    let labels: Vec<String> = config.devices.iter().map(|d| d.label.clone()).collect();
    tracing::info!(devices = %labels.join(", "), "digital potentiometers showcase");

    let probe = BusProbe::new();
    let mut registry = Registry::new();
    for (spec, pot) in config
        .devices
        .iter()
        .zip(create_simulated_devices(&config.devices, &probe))
    {
        registry.add_device(spec.clone(), pot)?;
    }
    registry.initialize().context("startup aborted")?;
    let session = Session::new(registry)?;

    let controls = VirtualControls::new();
    let mut control_loop = ControlLoop::new(
        session,
        controls.clone(),
        SystemClock::new(),
        TerminalDisplay::stdout(),
        &config.timing,
    );
    control_loop
        .bus_mut()
        .add_listener(Logger::new(labels), EventFilter::All, None);

    tracing::info!("keys: + / - turn, s select, c channel, q quit");
    let keys = spawn_stdin_reader();
    let mut operator = Operator::new(controls, &config.timing);
    let running = Cell::new(true);

    control_loop.run_until(
        |_| !running.get(),
        || {
            loop {
                match keys.try_recv() {
                    Ok(key) => operator.queue.push_back(key),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        operator.queue.push_back(Key::Quit);
                        break;
                    }
                }
            }
            running.set(operator.step(Instant::now()));
            std::thread::sleep(Duration::from_millis(1));
        },
    );

    let snapshot = control_loop.session().snapshot();
    println!("{}", snapshot.to_json().context("serializing final state")?);
    Ok(())
}
