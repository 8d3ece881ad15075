//! Mocks and helpers shared by the unit tests.

extern crate std;

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
use std::boxed::Box;
use std::cell::RefCell;
use std::rc::Rc;
use std::vec;
use std::vec::Vec;

use crate::backend::{BackendError, BackendKind, CommunicationBackend, KeyboardMode};
use crate::config::{Config, MAX_ENCODED_LEN};
use crate::input::{InputError, InputSource};
use crate::mode::GameModeId;
use crate::orchestrator::BootPlatform;
use crate::persistence::{Persistence, PersistenceError};
use crate::types::{Buttons, InputState, SharedInputState};

/// Something observable a mock did, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Bootloader,
    Booted,
    Load,
    Save,
    Send(char),
    Mode(char, GameModeId),
    Keyboard(Buttons),
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// A fresh shared state with `'static` lifetime.
pub fn leak_shared() -> &'static SharedInputState {
    Box::leak(Box::new(SharedInputState::new()))
}

/// Input source that replays a script of button samples.
///
/// After the script runs out the last entry repeats.
pub struct ScriptedInput {
    script: Vec<Result<Buttons, InputError>>,
    next: usize,
    pub reads: usize,
}

impl ScriptedInput {
    pub fn new(script: &[Result<Buttons, InputError>]) -> Self {
        Self {
            script: script.to_vec(),
            next: 0,
            reads: 0,
        }
    }

    pub fn repeating(buttons: Buttons) -> Self {
        Self::new(&[Ok(buttons)])
    }
}

impl InputSource for ScriptedInput {
    fn update_inputs(&mut self, inputs: &mut InputState) -> Result<(), InputError> {
        self.reads += 1;
        let step = self.script[self.next.min(self.script.len() - 1)];
        self.next += 1;
        inputs.buttons = step?;
        Ok(())
    }
}

/// Backend that logs every call and can be told to fail.
pub struct MockBackend {
    pub name: char,
    shared: &'static SharedInputState,
    log: EventLog,
    pub fail: bool,
    pub reported: Vec<InputState>,
}

impl MockBackend {
    pub fn new(name: char, shared: &'static SharedInputState) -> Self {
        Self {
            name,
            shared,
            log: event_log(),
            fail: false,
            reported: Vec::new(),
        }
    }

    pub fn with_log(mut self, log: &EventLog) -> Self {
        self.log = log.clone();
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl CommunicationBackend for MockBackend {
    async fn send_report(&mut self) -> Result<(), BackendError> {
        self.log.borrow_mut().push(Event::Send(self.name));
        if self.fail {
            return Err(BackendError::Io);
        }
        self.reported.push(self.shared.snapshot());
        Ok(())
    }

    fn inputs(&self) -> &'static SharedInputState {
        self.shared
    }

    fn set_game_mode(&mut self, mode: GameModeId) {
        self.log.borrow_mut().push(Event::Mode(self.name, mode));
    }

    fn kind(&self) -> BackendKind {
        BackendKind::UsbHid
    }
}

/// Keyboard overlay that logs the buttons it was given.
pub struct MockKeyboard {
    log: EventLog,
}

impl MockKeyboard {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl KeyboardMode for MockKeyboard {
    async fn send_report(&mut self, inputs: &InputState) -> Result<(), BackendError> {
        self.log.borrow_mut().push(Event::Keyboard(inputs.buttons));
        Ok(())
    }
}

/// In-memory flash sector holding one encoded config record.
pub struct MockStore {
    pub sector: Vec<u8>,
    pub fail_read: bool,
    pub fail_write: bool,
    pub log: EventLog,
}

impl MockStore {
    /// An erased sector.
    pub fn erased(log: &EventLog) -> Self {
        Self {
            sector: vec![0xFF; 256],
            fail_read: false,
            fail_write: false,
            log: log.clone(),
        }
    }

    /// A sector holding `config`.
    pub fn holding(config: &Config, log: &EventLog) -> Self {
        let mut store = Self::erased(log);
        config.encode(&mut store.sector).unwrap();
        store
    }
}

impl Persistence for MockStore {
    fn load_config(&mut self, out: &mut Config) -> Result<(), PersistenceError> {
        self.log.borrow_mut().push(Event::Load);
        if self.fail_read {
            return Err(PersistenceError::Read);
        }
        *out = Config::decode(&self.sector)?;
        Ok(())
    }

    fn save_config(&mut self, config: &Config) -> Result<(), PersistenceError> {
        self.log.borrow_mut().push(Event::Save);
        if self.fail_write {
            return Err(PersistenceError::Write);
        }
        let mut record = [0u8; MAX_ENCODED_LEN];
        let len = config.encode(&mut record)?;
        self.sector.fill(0xFF);
        self.sector[..len].copy_from_slice(&record[..len]);
        Ok(())
    }
}

/// Platform whose bootloader entry panics so tests can observe it.
pub struct MockPlatform {
    log: EventLog,
}

pub const BOOTLOADER_PANIC: &str = "entered bootloader";

impl MockPlatform {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl BootPlatform for MockPlatform {
    fn enter_bootloader(&mut self) -> ! {
        self.log.borrow_mut().push(Event::Bootloader);
        panic!("{}", BOOTLOADER_PANIC);
    }

    fn indicate_booted(&mut self) {
        self.log.borrow_mut().push(Event::Booted);
    }
}

/// Run a future that never pends to completion.
pub fn block_on<F: Future>(mut f: F) -> F::Output {
    fn noop_raw_waker() -> RawWaker {
        fn noop(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            noop_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
        RawWaker::new(core::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
    let mut cx = Context::from_waker(&waker);

    // SAFETY: We don't move f after pinning
    let mut f = unsafe { Pin::new_unchecked(&mut f) };

    match f.as_mut().poll(&mut cx) {
        Poll::Ready(result) => result,
        Poll::Pending => panic!("Mock future returned Pending unexpectedly"),
    }
}
