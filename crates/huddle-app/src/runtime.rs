//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Protocol bridge to Client
//! - [`Driver`]: Platform-specific I/O

use huddle_client::{ClientConfig, Environment};

use crate::{App, AppAction, AppEvent, Bridge, Driver, DriverEvent};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for time
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    bridge: Bridge<E>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
{
    /// Create a new runtime with the given driver and environment.
    pub fn new(driver: D, env: E) -> Self {
        Self::with_config(driver, env, ClientConfig::default())
    }

    /// Create a new runtime with explicit client configuration.
    pub fn with_config(driver: D, env: E, config: ClientConfig) -> Self {
        Self { driver, app: App::new(), bridge: Bridge::with_config(env, config) }
    }

    /// Run the main event loop until the user quits or input closes.
    ///
    /// This is the core orchestration loop that:
    /// 1. Waits on the driver, bounded by the client's next deadline
    /// 2. Routes input through the App and transport events through the Bridge
    /// 3. Ticks the client so expired timers fire
    /// 4. Sends outgoing commands through the driver
    ///
    /// On exit every subscription is released before the driver stops.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        loop {
            let should_quit = self.process_cycle().await?;
            if should_quit {
                break;
            }
        }

        self.shutdown().await
    }

    /// Submit a display name without going through the prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if sending the join fails.
    pub async fn submit_name(&mut self, name: &str) -> Result<(), D::Error> {
        self.process_actions(vec![AppAction::SubmitName { raw: name.to_string() }]).await?;
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let timer = self.bridge.time_until_next_deadline(self.driver.now());
        let event = self.driver.next_event(timer).await?;

        match event {
            DriverEvent::Input(key) => {
                let actions = self.app.handle(AppEvent::Key(key));
                if self.process_actions(actions).await? {
                    return Ok(true);
                }
            },
            DriverEvent::Transport(event) => {
                let events = self.bridge.handle_transport_event(event);
                self.send_outgoing().await?;
                if self.process_bridge_events(events).await? {
                    return Ok(true);
                }
            },
            DriverEvent::TimerFired => {},
            DriverEvent::Closed => return Ok(true),
        }

        let now = self.driver.now();
        let events = self.bridge.handle_tick(now);
        self.send_outgoing().await?;
        self.process_bridge_events(events).await
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),

                    // Protocol operations go through the bridge
                    AppAction::SubmitName { .. }
                    | AppAction::ComposeChanged { .. }
                    | AppAction::SendMessage { .. } => {
                        let events = self.bridge.process_app_action(action);
                        for event in events {
                            let new_actions = self.app.handle(event);
                            pending_actions.extend(new_actions);
                        }
                        self.send_outgoing().await?;
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Release every subscription, then stop the driver.
    async fn shutdown(&mut self) -> Result<(), D::Error> {
        let events = self.bridge.teardown();
        for event in events {
            self.app.handle(event);
        }
        self.send_outgoing().await?;
        self.driver.stop();
        Ok(())
    }

    /// Send all pending outgoing commands to the transport.
    async fn send_outgoing(&mut self) -> Result<(), D::Error> {
        let commands = self.bridge.take_outgoing();
        for command in commands {
            self.driver.send(command).await?;
        }
        Ok(())
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the Bridge
    pub fn bridge(&self) -> &Bridge<E> {
        &self.bridge
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }
}
