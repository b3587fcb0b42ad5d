use nix::sys::signal::SigSet;
use std::io;
use std::sync::mpsc;
use std::thread;

use unsegen::input::Input;

use crate::config::Config;
use crate::error::Result;

pub enum Event {
    Input(Input),
    Update,
    Resize,
}

/// Funnels terminal input, clock ticks and resize signals into one queue
/// consumed by the main loop.
pub struct Dispatcher {
    rx: mpsc::Receiver<Event>,
    _input_handle: thread::JoinHandle<()>,
    _update_handle: thread::JoinHandle<()>,
    _signal_handle: thread::JoinHandle<()>,
}

impl Dispatcher {
    /// `signals` are blocked on the calling thread and its future children
    /// and waited for on a dedicated thread instead.
    pub fn from_config(config: &Config, signals: SigSet) -> Result<Dispatcher> {
        signals.thread_block().map_err(io::Error::from)?;

        let tick_rate = config.tick_rate;
        let (tx, rx) = mpsc::channel();

        let input_handle = {
            let tx = tx.clone();
            thread::spawn(move || {
                let stdin = io::stdin();
                let stdin = stdin.lock();
                for evt in Input::read_all(stdin) {
                    match evt {
                        Ok(key) => {
                            if tx.send(Event::Input(key)).is_err() {
                                return;
                            }
                        }
                        Err(e) => log::warn!("could not read input: {}", e),
                    }
                }
            })
        };

        let update_handle = {
            let tx = tx.clone();
            thread::spawn(move || loop {
                if tx.send(Event::Update).is_err() {
                    return;
                }
                thread::sleep(tick_rate);
            })
        };

        let signal_handle = {
            thread::spawn(move || loop {
                match signals.wait() {
                    Ok(signal) => {
                        log::debug!("received {:?}", signal);
                        if tx.send(Event::Resize).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        log::warn!("stopped waiting for signals: {}", e);
                        return;
                    }
                }
            })
        };

        Ok(Dispatcher {
            rx,
            _input_handle: input_handle,
            _update_handle: update_handle,
            _signal_handle: signal_handle,
        })
    }

    pub fn next(&self) -> std::result::Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}
