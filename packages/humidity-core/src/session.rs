use log::{info, warn};
use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::{
    attempt::attempt_connection, catalog::NetworkIdentity, clock::Clock, radio::WifiRadio,
    selector::select_candidates,
};

/// Externally visible link phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    /// Rounds of scan-and-attempt run until one associates; `round` counts
    /// the rounds that already failed.
    Searching { round: u32 },
    Connected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEvent {
    /// The radio already reports a usable link.
    LinkUp,
    /// The link is down and a search begins.
    SearchStarted,
    RoundFailed,
    Associated,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct LinkMachine {
    view: LinkState,
    established: u32,
}

impl LinkMachine {
    fn enter_searching(&mut self) -> Outcome<State> {
        self.view = LinkState::Searching { round: 0 };
        Transition(State::searching())
    }

    fn enter_connected(&mut self) -> Outcome<State> {
        self.view = LinkState::Connected;
        Transition(State::connected())
    }
}

#[state_machine(initial = "State::idle()")]
impl LinkMachine {
    #[state]
    fn idle(&mut self, event: &LinkEvent) -> Outcome<State> {
        match event {
            LinkEvent::LinkUp => self.enter_connected(),
            LinkEvent::SearchStarted => self.enter_searching(),
            LinkEvent::RoundFailed | LinkEvent::Associated => Handled,
        }
    }

    #[state]
    fn searching(&mut self, event: &LinkEvent) -> Outcome<State> {
        match event {
            LinkEvent::RoundFailed => {
                if let LinkState::Searching { round } = self.view {
                    self.view = LinkState::Searching {
                        round: round.saturating_add(1),
                    };
                }
                Handled
            }
            LinkEvent::Associated => {
                self.established = self.established.saturating_add(1);
                self.enter_connected()
            }
            LinkEvent::LinkUp => self.enter_connected(),
            LinkEvent::SearchStarted => Handled,
        }
    }

    #[state]
    fn connected(&mut self, event: &LinkEvent) -> Outcome<State> {
        match event {
            LinkEvent::SearchStarted => self.enter_searching(),
            LinkEvent::LinkUp | LinkEvent::RoundFailed | LinkEvent::Associated => Handled,
        }
    }
}

/// Keeps the station associated with one of the catalog networks.
pub struct NetworkSession {
    catalog: &'static [NetworkIdentity],
    machine: statig::blocking::StateMachine<LinkMachine>,
}

impl NetworkSession {
    pub fn new(catalog: &'static [NetworkIdentity]) -> Self {
        Self {
            catalog,
            machine: LinkMachine {
                view: LinkState::Idle,
                established: 0,
            }
            .state_machine(),
        }
    }

    pub fn state(&self) -> LinkState {
        self.machine.inner().view
    }

    /// Number of times a search ended in a fresh association.
    pub fn established_count(&self) -> u32 {
        self.machine.inner().established
    }

    /// Returns true when a new link was just established and false when
    /// the radio was already connected.
    ///
    /// A down link is searched for without limit; only the per-candidate
    /// poll budget bounds each round.
    pub async fn ensure_connected<R, C>(&mut self, radio: &mut R, clock: &mut C) -> bool
    where
        R: WifiRadio,
        C: Clock,
    {
        if radio.is_connected() {
            self.machine.handle(&LinkEvent::LinkUp);
            return false;
        }

        info!("Setting up WiFi");
        self.machine.handle(&LinkEvent::SearchStarted);

        info!("Connecting to WiFi");
        while !self.step(radio, clock).await {
            info!("Retrying connection");
        }
        info!("Connected to WiFi");
        true
    }

    /// Runs a single scan-and-attempt round.
    pub async fn step<R, C>(&mut self, radio: &mut R, clock: &mut C) -> bool
    where
        R: WifiRadio,
        C: Clock,
    {
        if !matches!(self.state(), LinkState::Searching { .. }) {
            self.machine.handle(&LinkEvent::SearchStarted);
        }

        if let Err(err) = radio.start().await {
            warn!("WiFi start failed err={}", err.as_str());
            self.machine.handle(&LinkEvent::RoundFailed);
            return false;
        }

        let candidates = select_candidates(radio, self.catalog).await;
        if attempt_connection(radio, clock, &candidates).await {
            self.machine.handle(&LinkEvent::Associated);
            true
        } else {
            self.machine.handle(&LinkEvent::RoundFailed);
            false
        }
    }
}
