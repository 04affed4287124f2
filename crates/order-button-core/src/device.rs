//! Top-level device controller.
//!
//! [`Device`] owns every piece of mutable state ([`DeviceState`]) and all
//! hardware handles, and runs the network-mode state machine as one
//! sequential loop. Nothing else touches credentials, the connection state
//! or the retry counter.

use alloc::vec::Vec;

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use log::{error, info, warn};
use rand_core::RngCore;
use thiserror_no_std::Error;

use crate::button::{ButtonEvent, PressDetector};
use crate::config::{CONNECTED_HOLD_MS, DeviceConfig, POLL_INTERVAL_MS};
use crate::network::{ConnectionState, LinkError, LinkStep, NetworkMachine, WifiLink};
use crate::order::{OrderError, OrderSigner, OrderTransport, TransportError};
use crate::portal::{Listener, PortalError, PortalServer};
use crate::storage::{CredentialStore, Credentials, SecretStore, StorageError};
use crate::time::{self, WallClock};

/// Hardware a device is built from.
pub trait Board {
    type Link: WifiLink;
    type Listener: Listener;
    type Transport: OrderTransport;
    type Clock: WallClock;
    type Store: CredentialStore;
    type Button: InputPin;
    type Led: OutputPin;
    type Delay: DelayNs;
    type Rng: RngCore;
}

/// Concrete handles for a [`Board`].
pub struct DeviceParts<B: Board> {
    pub link: B::Link,
    pub listener: B::Listener,
    pub transport: B::Transport,
    pub clock: B::Clock,
    pub store: B::Store,
    pub button: B::Button,
    pub led: B::Led,
    pub delay: B::Delay,
    pub rng: B::Rng,
}

/// Why the controller stopped. The platform restarts the device.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RestartReason {
    #[error("order request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("configuration portal failed: {0}")]
    Portal(#[from] PortalError),
    #[error("radio failed: {0}")]
    Link(#[from] LinkError),
}

/// State owned by the controller loop.
#[derive(Debug)]
pub struct DeviceState {
    pub credentials: Credentials,
    pub network: NetworkMachine,
}

pub struct Device<'c, B: Board> {
    link: B::Link,
    listener: B::Listener,
    transport: B::Transport,
    clock: B::Clock,
    store: B::Store,
    button: PressDetector<B::Button>,
    led: B::Led,
    delay: B::Delay,
    rng: B::Rng,
    signer: OrderSigner<'c>,
    config: DeviceConfig<'c>,
    state: DeviceState,
}

impl<'c, B: Board> Device<'c, B> {
    /// Loads the stored credentials and the signing secret.
    ///
    /// Unreadable credentials are replaced by empty ones, which sends the
    /// device to the portal after its station attempts run out.
    pub fn new<K: SecretStore>(
        mut parts: DeviceParts<B>,
        secrets: &mut K,
        config: DeviceConfig<'c>,
    ) -> Result<Self, StorageError> {
        let credentials = parts.store.load().unwrap_or_else(|e| {
            error!("Stored credentials unusable: {}", e);
            Credentials::default()
        });
        let secret: Vec<u8> = secrets.load_secret()?;
        if secret.is_empty() {
            warn!("Signing secret is empty");
        }
        info!("Loaded credentials: {:?}", credentials);

        let signer = OrderSigner::new(secret, config.claims.clone(), config.endpoint.clone());
        Ok(Self {
            link: parts.link,
            listener: parts.listener,
            transport: parts.transport,
            clock: parts.clock,
            store: parts.store,
            button: PressDetector::new(parts.button),
            led: parts.led,
            delay: parts.delay,
            rng: parts.rng,
            signer,
            config,
            state: DeviceState {
                credentials,
                network: NetworkMachine::new(),
            },
        })
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.network.state()
    }

    /// Runs until the device has to restart.
    pub async fn run(&mut self) -> RestartReason {
        loop {
            if let Err(reason) = self.step().await {
                error!("Restart required: {}", reason);
                return reason;
            }
        }
    }

    /// One turn of the control loop for the current connection state.
    pub async fn step(&mut self) -> Result<(), RestartReason> {
        match self.state.network.state() {
            ConnectionState::Disconnected => {
                self.state.network.start();
                self.begin_station().await;
            }
            ConnectionState::Connecting(_) => {
                let connected = self.link.is_connected().await;
                match self.state.network.on_link_check(connected) {
                    LinkStep::Established => self.startup_sequence().await,
                    LinkStep::Retry { delay_ms } | LinkStep::Exhausted { delay_ms } => {
                        self.delay.delay_ms(delay_ms as u32).await;
                    }
                    LinkStep::Up | LinkStep::Lost | LinkStep::Idle => {}
                }
            }
            ConnectionState::Connected => self.monitor().await?,
            ConnectionState::APMode => self.configure().await?,
        }
        Ok(())
    }

    async fn begin_station(&mut self) {
        info!("Joining {:?}", self.state.credentials.ssid);
        if let Err(e) = self.link.begin_station(&self.state.credentials).await {
            warn!("Station start failed: {}", e);
        }
    }

    /// Runs once per entry into `Connected`.
    async fn startup_sequence(&mut self) {
        info!("Connected to {:?}", self.state.credentials.ssid);
        self.led.set_high().ok();
        self.delay.delay_ms(CONNECTED_HOLD_MS).await;
        time::sync_with_retry(&mut self.clock, &mut self.delay).await;
        self.led.set_low().ok();
    }

    /// Connected operation: watch the link and the button.
    async fn monitor(&mut self) -> Result<(), RestartReason> {
        let connected = self.link.is_connected().await;
        if self.state.network.on_link_check(connected) == LinkStep::Lost {
            self.begin_station().await;
            return Ok(());
        }

        self.delay.delay_ms(POLL_INTERVAL_MS).await;
        match self.button.poll() {
            ButtonEvent::Pressed => {
                info!("Button pressed");
                self.led.set_high().ok();
                let now_ms = self.clock.now_ms();
                match self
                    .signer
                    .place(&mut self.transport, &mut self.rng, now_ms)
                    .await
                {
                    Ok(_) => {}
                    Err(OrderError::Transport(e)) => {
                        self.led.set_low().ok();
                        return Err(e.into());
                    }
                    Err(OrderError::Signing(e)) => error!("Could not sign order: {}", e),
                }
            }
            ButtonEvent::Held => {}
            ButtonEvent::Released => {
                self.led.set_low().ok();
            }
        }
        Ok(())
    }

    /// Access-point operation: serve the portal until new credentials arrive.
    async fn configure(&mut self) -> Result<(), RestartReason> {
        warn!(
            "Entering configuration portal (cycle {})",
            self.state.network.portal_cycles()
        );
        self.link
            .start_access_point(&self.config.access_point)
            .await?;

        let credentials = PortalServer::new(&mut self.listener)
            .run(&mut self.store, &mut self.delay)
            .await?;

        self.state.credentials = credentials;
        self.state.network.on_credentials_submitted();
        self.begin_station().await;
        Ok(())
    }

    /// Hands the hardware back, e.g. to rebuild the device after a restart.
    pub fn into_parts(self) -> DeviceParts<B> {
        DeviceParts {
            link: self.link,
            listener: self.listener,
            transport: self.transport,
            clock: self.clock,
            store: self.store,
            button: self.button.into_inner(),
            led: self.led,
            delay: self.delay,
            rng: self.rng,
        }
    }
}
