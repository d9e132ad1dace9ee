//! One complete exchange with an attestation broker.
//!
//! ```text
//! Connecting -> AwaitingHelloAck -> AnsweringChallenge -> AwaitingFeedback
//!            -> SubmittingAttestation -> AwaitingFinalFeedback -> Resolved | Rejected
//! ```
//!
//! Every inbound event (frame, transport error, close, timer) goes through
//! [`BrokerSession::handle`]. The session settles exactly once, closes its
//! connection exactly once, and drops the report timer with itself, so a
//! settled session can never time out afterwards.

use std::time::Duration;

use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, error, info, warn};

use crate::{
    errors::Reject,
    frame::{parse_inbound, Feedback, Inbound, Opcode, OpcodeTable},
    keys::{self, PrivateKey},
    keystore::KeyStore,
    ser::{encode_attestation, encode_attestation_report, encode_hello, encode_kosk_result},
    transport::{Connection, TransportError, WsConnection},
    types::{Attestation, AttestationReport, QrData, Signer, DEFAULT_EVM_WALLET},
};

pub const DEFAULT_REPORT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    AwaitingHelloAck,
    AnsweringChallenge,
    AwaitingFeedback,
    SubmittingAttestation,
    AwaitingFinalFeedback,
    Resolved,
    Rejected,
}

impl SessionState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub opcodes: OpcodeTable,
    /// Bound on the wait for `signature.accepted` / `signature.invalid`.
    pub report_timeout: Duration,
    pub evm_wallet: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            opcodes: OpcodeTable::default(),
            report_timeout: DEFAULT_REPORT_TIMEOUT,
            evm_wallet: DEFAULT_EVM_WALLET.to_owned(),
        }
    }
}

#[derive(Debug)]
enum Event {
    Frame(Vec<u8>),
    Transport(TransportError),
    Closed,
    TimerFired,
}

impl From<Option<Result<Vec<u8>, TransportError>>> for Event {
    fn from(r: Option<Result<Vec<u8>, TransportError>>) -> Self {
        match r {
            Some(Ok(frame)) => Self::Frame(frame),
            Some(Err(e)) => Self::Transport(e),
            None => Self::Closed,
        }
    }
}

/// Session over an already-open connection. Consumed by [`BrokerSession::run`].
pub struct BrokerSession<C: Connection> {
    conn: C,
    state: SessionState,
    attestation: Attestation,
    key: PrivateKey,
    name: String,
    config: SessionConfig,
    report_deadline: Option<Instant>,
    closed: bool,
}

impl<C: Connection> BrokerSession<C> {
    pub fn new(conn: C, attestation: Attestation, key: PrivateKey, name: &str, config: SessionConfig) -> Self {
        Self {
            conn,
            state: SessionState::Connecting,
            attestation,
            key,
            name: name.to_owned(),
            config,
            report_deadline: None,
            closed: false,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    fn enter(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "session transition");
        self.state = next;
    }

    /// Drive the exchange to a terminal state.
    ///
    /// # Errors
    ///
    /// The `Reject` the session settled with.
    pub async fn run(mut self) -> Result<(), Reject> {
        let outcome = self.drive().await;
        self.report_deadline = None;
        self.enter(if outcome.is_ok() { SessionState::Resolved } else { SessionState::Rejected });
        if !self.closed {
            self.closed = true;
            self.conn.close().await;
        }
        match &outcome {
            Ok(()) => info!("attestation accepted by broker"),
            Err(r) => warn!(reason = %r.reason, detail = r.message.as_deref().unwrap_or(""), "session rejected"),
        }
        outcome
    }

    async fn drive(&mut self) -> Result<(), Reject> {
        self.on_open().await?;
        loop {
            let event = match self.report_deadline {
                Some(deadline) => tokio::select! {
                    biased;
                    r = self.conn.recv() => Event::from(r),
                    () = tokio::time::sleep_until(deadline) => Event::TimerFired,
                },
                None => Event::from(self.conn.recv().await),
            };
            if self.handle(event).await? {
                return Ok(());
            }
        }
    }

    async fn send(&mut self, op: Opcode, body: &[u8]) -> Result<(), Reject> {
        let frame = self.config.opcodes.frame(op, body);
        debug!(opcode = %op, len = frame.len(), "sending frame");
        self.conn
            .send(frame)
            .await
            .map_err(|e| Reject::error(format!("transport: {e}")))
    }

    async fn on_open(&mut self) -> Result<(), Reject> {
        info!("sending hello");
        let signer = Signer::new(
            &self.name,
            &self.config.evm_wallet,
            keys::derive_public_key(&self.key).to_vec(),
            keys::derive_short_public_key(&self.key).to_vec(),
        );
        let body = encode_hello(&signer)?;
        self.send(Opcode::Hello, &body).await?;
        self.enter(SessionState::AwaitingHelloAck);
        Ok(())
    }

    async fn answer_challenge(&mut self, random: &[u8]) -> Result<(), Reject> {
        self.enter(SessionState::AnsweringChallenge);
        info!("answering kosk challenge");
        let signature = keys::sign(random, &self.key);
        let body = encode_kosk_result(false, random, &signature)?;
        self.send(Opcode::KoskResult, &body).await?;
        self.enter(SessionState::AwaitingFeedback);
        Ok(())
    }

    async fn submit_attestation(&mut self) -> Result<(), Reject> {
        self.enter(SessionState::SubmittingAttestation);
        info!("sending attestation");
        let raw = encode_attestation(&self.attestation)?;
        let report = AttestationReport {
            attestation: self.attestation.clone(),
            signature: keys::sign(&raw, &self.key).to_vec(),
        };
        let body = encode_attestation_report(&report)?;
        self.send(Opcode::Attestation, &body).await?;
        self.report_deadline = Some(Instant::now() + self.config.report_timeout);
        self.enter(SessionState::AwaitingFinalFeedback);
        Ok(())
    }

    /// Single dispatcher for inbound events. `Ok(true)` means resolved.
    async fn handle(&mut self, event: Event) -> Result<bool, Reject> {
        let raw = match event {
            Event::Frame(raw) => raw,
            Event::TimerFired => return Err(Reject::timeout()),
            Event::Transport(e) => {
                error!(error = %e, "connection error");
                return Err(Reject::error(format!("transport: {e}")));
            }
            Event::Closed => return Err(Reject::error("connection closed by broker")),
        };

        match (self.state, parse_inbound(&self.config.opcodes, &raw)?) {
            (_, Inbound::Error(msg)) => {
                error!(broker_error = %msg, "broker error");
                Err(Reject::error(msg))
            }
            (_, Inbound::Unexpected(byte)) => Err(Reject::error(format!("unknown opcode {byte}"))),
            (SessionState::AwaitingHelloAck, Inbound::KoskChallenge(c)) => {
                self.answer_challenge(&c.random).await?;
                Ok(false)
            }
            (_, Inbound::Feedback(Feedback::ConfOk)) => Ok(false),
            (_, Inbound::Feedback(Feedback::Unknown(s))) => {
                warn!(feedback = %s, "unknown broker feedback");
                Ok(false)
            }
            (SessionState::AwaitingFeedback, Inbound::Feedback(Feedback::KoskOk)) => {
                self.submit_attestation().await?;
                Ok(false)
            }
            (SessionState::AwaitingFinalFeedback, Inbound::Feedback(Feedback::SignatureAccepted)) => Ok(true),
            (SessionState::AwaitingFinalFeedback, Inbound::Feedback(Feedback::SignatureInvalid)) => {
                Err(Reject::invalid_signature())
            }
            (state, inbound) => Err(Reject::error(format!(
                "unexpected {} in state {state:?}",
                describe(&inbound)
            ))),
        }
    }
}

fn describe(inbound: &Inbound) -> String {
    match inbound {
        Inbound::KoskChallenge(_) => "kosk challenge".to_owned(),
        Inbound::Feedback(f) => format!("feedback {}", f.as_str()),
        Inbound::Error(_) => "error".to_owned(),
        Inbound::Unexpected(b) => format!("opcode {b}"),
    }
}

/// Connect to `broker_url` and run one session over a websocket.
///
/// # Errors
///
/// `Reject` with reason `Error` if the connection cannot be opened, otherwise
/// whatever the session settles with.
pub async fn sign_attestation(
    broker_url: &str,
    attestation: Attestation,
    key: PrivateKey,
    name: &str,
    config: SessionConfig,
) -> Result<(), Reject> {
    info!(broker = broker_url, "connecting to broker");
    let conn = WsConnection::connect(broker_url).await.map_err(|e| {
        error!(error = %e, "connect failed");
        Reject::error(format!("connect: {e}"))
    })?;
    BrokerSession::new(conn, attestation, key, name, config).run().await
}

/// Entry point for callers: allows at most one session in flight.
#[derive(Debug, Default)]
pub struct BrokerClient {
    config: SessionConfig,
    in_flight: Mutex<()>,
}

impl BrokerClient {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self { config, in_flight: Mutex::new(()) }
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Sign the scanned payload against the broker it names.
    ///
    /// # Errors
    ///
    /// `Reject` with reason `Error` if another session is in flight, otherwise
    /// the session outcome.
    pub async fn sign(&self, qr: &QrData, key: PrivateKey, name: &str) -> Result<(), Reject> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            return Err(Reject::error("session already in progress"));
        };
        sign_attestation(&qr.url, qr.data.clone(), key, name, self.config.clone()).await
    }

    /// Like [`BrokerClient::sign`] over a connection the caller already opened.
    ///
    /// # Errors
    ///
    /// As [`BrokerClient::sign`].
    pub async fn sign_over<C: Connection>(
        &self,
        conn: C,
        attestation: Attestation,
        key: PrivateKey,
        name: &str,
    ) -> Result<(), Reject> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            return Err(Reject::error("session already in progress"));
        };
        BrokerSession::new(conn, attestation, key, name, self.config.clone()).run().await
    }

    /// Sign with the key and display name held by `store`.
    ///
    /// # Errors
    ///
    /// `Reject` with reason `Error` when the store has no key or no name.
    pub async fn sign_with_store<S: KeyStore>(&self, store: &S, qr: &QrData) -> Result<(), Reject> {
        let key = store
            .private_key()
            .map_err(|e| Reject::error(format!("key store: {e}")))?
            .ok_or_else(|| Reject::error("no private key in key store"))?;
        let name = store
            .display_name()
            .map_err(|e| Reject::error(format!("key store: {e}")))?
            .ok_or_else(|| Reject::error("no display name in key store"))?;
        self.sign(qr, key, &name).await
    }
}
