use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use crate::catalogue::{AuthResult, LoginFailReason, LoginStatus};
use crate::errors::{SdkError, SdkResult};
use crate::events::{CallbackSlot, Handler, NativeEvent};
use crate::native::{AuthCommand, Command, NativeSdk, Secret};
use crate::sdk::Lifecycle;

/// Settled attempts remembered for late waiters.
const SETTLED_KEPT: usize = 16;

/// Where the SDK authentication stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    None,
    Processing,
    Success,
    Failed,
}

/// Identifies one authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthTicket {
    attempt: u64,
}

struct AuthRecord {
    phase: AuthState,
    attempt: u64,
    /// Attempt still waiting for its result, if any.
    pending: Option<u64>,
    last_result: Option<AuthResult>,
    /// Outcome of each recently settled attempt, abandoned ones included.
    settled: BTreeMap<u64, AuthResult>,
    login_status: LoginStatus,
}

impl AuthRecord {
    fn settle(&mut self, attempt: u64, result: AuthResult) {
        self.settled.insert(attempt, result);
        while self.settled.len() > SETTLED_KEPT {
            self.settled.pop_first();
        }
    }
}

impl Default for AuthRecord {
    fn default() -> Self {
        Self {
            phase: AuthState::None,
            attempt: 0,
            pending: None,
            last_result: None,
            settled: BTreeMap::new(),
            login_status: LoginStatus::Idle,
        }
    }
}

pub(crate) struct AuthInner {
    native: Arc<dyn NativeSdk>,
    life: Arc<Lifecycle>,
    record: Mutex<AuthRecord>,
    /// Bumped whenever an attempt settles.
    settled_tx: watch::Sender<u64>,
    on_auth: CallbackSlot<AuthResult>,
    on_logout: CallbackSlot<()>,
    on_identity_expired: CallbackSlot<()>,
    on_identity_expiring: CallbackSlot<()>,
    on_login_return: CallbackSlot<(LoginStatus, Option<LoginFailReason>)>,
}

impl AuthInner {
    pub(crate) fn new(native: Arc<dyn NativeSdk>, life: Arc<Lifecycle>) -> Self {
        let (settled_tx, _) = watch::channel(0);
        Self {
            native,
            life,
            record: Mutex::new(AuthRecord::default()),
            settled_tx,
            on_auth: CallbackSlot::new(),
            on_logout: CallbackSlot::new(),
            on_identity_expired: CallbackSlot::new(),
            on_identity_expiring: CallbackSlot::new(),
            on_login_return: CallbackSlot::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AuthRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn state(&self) -> AuthState {
        self.lock().phase
    }

    /// Forget the authentication. Attempt numbers keep counting so old
    /// tickets never match a new attempt.
    pub(crate) fn reset(&self) {
        let mut record = self.lock();
        let attempt = record.attempt;
        *record = AuthRecord {
            attempt,
            ..AuthRecord::default()
        };
    }

    /// Open a new attempt, send `command`, roll back if it is refused.
    fn begin(&self, command: AuthCommand) -> SdkResult<AuthTicket> {
        let (attempt, previous) = {
            let mut record = self.lock();
            if record.phase == AuthState::Processing {
                tracing::warn!("authentication already in progress");
                return Err(SdkError::WrongUsage);
            }
            let previous = record.phase;
            record.attempt += 1;
            record.pending = Some(record.attempt);
            record.phase = AuthState::Processing;
            (record.attempt, previous)
        };

        tracing::debug!("auth attempt {attempt}: {command:?}");
        if let Err(e) = self.native.execute(Command::Auth(command)) {
            let mut record = self.lock();
            if record.pending == Some(attempt) {
                record.pending = None;
                record.phase = previous;
            }
            return Err(e);
        }
        Ok(AuthTicket { attempt })
    }

    pub(crate) fn handle_event(&self, event: NativeEvent) {
        match event {
            NativeEvent::AuthResult(result) => self.on_result(result),
            NativeEvent::LogoutConfirmed => {
                {
                    let mut record = self.lock();
                    record.phase = AuthState::None;
                    record.last_result = None;
                    record.login_status = LoginStatus::Idle;
                }
                tracing::info!("logged out");
                self.on_logout.emit(());
            }
            NativeEvent::IdentityExpired => {
                tracing::info!("auth identity expired");
                self.on_identity_expired.emit(());
            }
            NativeEvent::AuthIdentityExpiring => {
                tracing::debug!("auth identity expires in ten minutes");
                self.on_identity_expiring.emit(());
            }
            NativeEvent::LoginReturn { status, reason } => {
                self.lock().login_status = status;
                tracing::info!("login status {status:?} ({reason:?})");
                self.on_login_return.emit((status, reason));
            }
            other => tracing::debug!("not an auth event: {other:?}"),
        }
    }

    fn on_result(&self, result: AuthResult) {
        let attempt = {
            let mut record = self.lock();
            let Some(attempt) = record.pending.take() else {
                tracing::debug!("auth result {result:?} without a pending attempt dropped");
                return;
            };
            record.phase = if result == AuthResult::Success {
                AuthState::Success
            } else {
                AuthState::Failed
            };
            record.last_result = Some(result);
            record.settle(attempt, result);
            attempt
        };
        tracing::info!("auth attempt {attempt} finished: {result:?}");
        self.settled_tx.send_modify(|n| *n += 1);
        self.on_auth.emit(result);
    }

    /// Give up on `attempt` if it is still pending. A result arriving later
    /// finds nothing pending and is dropped.
    fn abandon(&self, attempt: u64) -> bool {
        let mut record = self.lock();
        if record.pending != Some(attempt) {
            return false;
        }
        record.pending = None;
        record.phase = AuthState::Failed;
        record.last_result = Some(AuthResult::Overtime);
        record.settle(attempt, AuthResult::Overtime);
        true
    }

    fn settled(&self, attempt: u64) -> Option<AuthResult> {
        self.lock().settled.get(&attempt).copied()
    }
}

/// Handle over SDK authentication and login.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<AuthInner>,
    generation: u64,
}

impl AuthSession {
    pub(crate) fn new(inner: Arc<AuthInner>, generation: u64) -> Self {
        Self { inner, generation }
    }

    fn check(&self) -> SdkResult {
        self.inner.life.check(self.generation)
    }

    /// Authenticate with an app key and secret. The outcome arrives through
    /// the auth callback.
    pub fn authenticate(&self, app_key: &str, app_secret: &str) -> SdkResult<AuthTicket> {
        self.check()?;
        let app_key = app_key.trim();
        let app_secret = Secret::new(app_secret);
        if app_key.is_empty() || app_secret.is_blank() {
            return Err(SdkError::InvalidParameter);
        }
        self.inner.begin(AuthCommand::SdkAuth {
            app_key: app_key.to_string(),
            app_secret,
        })
    }

    /// Authenticate with a JWT.
    pub fn authenticate_with_token(&self, token: &str) -> SdkResult<AuthTicket> {
        self.check()?;
        let token = Secret::new(token.trim());
        if token.is_blank() {
            return Err(SdkError::InvalidParameter);
        }
        self.inner.begin(AuthCommand::SdkAuthWithToken { token })
    }

    /// Wait for the outcome of `ticket`. On timeout the attempt is
    /// abandoned and `Overtime` is returned.
    ///
    /// Any recent ticket can be awaited, including one that settled
    /// before a newer attempt finished.
    pub async fn wait_for_result(&self, ticket: AuthTicket, timeout: Duration) -> AuthResult {
        let mut rx = self.inner.settled_tx.subscribe();
        let inner = &self.inner;
        // A timeout or a closed channel both fall through to the lookup.
        let _ = tokio::time::timeout(
            timeout,
            rx.wait_for(|_| inner.settled(ticket.attempt).is_some()),
        )
        .await;
        if inner.abandon(ticket.attempt) {
            tracing::warn!("auth attempt {} timed out", ticket.attempt);
        }
        inner.settled(ticket.attempt).unwrap_or(AuthResult::Overtime)
    }

    /// Log out. Requires a successful authentication; confirmation arrives
    /// through the logout callback.
    pub fn logout(&self) -> SdkResult {
        self.check()?;
        if self.inner.state() != AuthState::Success {
            return Err(SdkError::WrongUsage);
        }
        self.inner.native.execute(Command::Auth(AuthCommand::Logout))
    }

    /// Start an SSO login with the given URI protocol.
    pub fn sso_login(&self, uri_protocol: &str) -> SdkResult {
        self.check()?;
        let uri_protocol = uri_protocol.trim();
        if uri_protocol.is_empty() {
            return Err(SdkError::InvalidParameter);
        }
        if self.inner.state() != AuthState::Success {
            return Err(SdkError::Unauthentication);
        }
        self.inner.native.execute(Command::Auth(AuthCommand::SsoLogin {
            uri_protocol: uri_protocol.to_string(),
        }))
    }

    pub fn state(&self) -> AuthState {
        self.inner.state()
    }

    /// Result of the last finished attempt.
    pub fn auth_result(&self) -> Option<AuthResult> {
        self.inner.lock().last_result
    }

    pub fn login_status(&self) -> LoginStatus {
        self.inner.lock().login_status
    }

    pub fn set_auth_callback(&self, handler: Handler<AuthResult>) -> Option<Handler<AuthResult>> {
        self.inner.on_auth.replace(handler)
    }

    pub fn set_logout_callback(&self, handler: Handler<()>) -> Option<Handler<()>> {
        self.inner.on_logout.replace(handler)
    }

    pub fn set_identity_expired_callback(&self, handler: Handler<()>) -> Option<Handler<()>> {
        self.inner.on_identity_expired.replace(handler)
    }

    /// Informational ten-minute warning before the identity expires.
    pub fn set_identity_expiring_callback(&self, handler: Handler<()>) -> Option<Handler<()>> {
        self.inner.on_identity_expiring.replace(handler)
    }

    pub fn set_login_return_callback(
        &self,
        handler: Handler<(LoginStatus, Option<LoginFailReason>)>,
    ) -> Option<Handler<(LoginStatus, Option<LoginFailReason>)>> {
        self.inner.on_login_return.replace(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InitOptions;
    use crate::events::handler;
    use crate::loopback::LoopbackSdk;
    use crate::sdk::Sdk;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// The `Sdk` must outlive the session: it owns event routing.
    fn sdk_with(native: Arc<LoopbackSdk>) -> (Sdk, AuthSession) {
        let sdk = Sdk::new(native);
        sdk.initialize(&InitOptions::new("/x", "https://zoom.us")).unwrap();
        let auth = sdk.auth().unwrap();
        (sdk, auth)
    }

    #[test]
    fn blank_credentials_are_rejected_before_native() {
        let native = Arc::new(LoopbackSdk::new());
        let (_sdk, auth) = sdk_with(native.clone());
        assert_eq!(auth.authenticate("", "secret"), Err(SdkError::InvalidParameter));
        assert_eq!(auth.authenticate("key", "  "), Err(SdkError::InvalidParameter));
        assert_eq!(auth.authenticate_with_token(""), Err(SdkError::InvalidParameter));
        assert!(native.commands().is_empty());
        assert_eq!(auth.state(), AuthState::None);
    }

    #[test]
    fn success_then_logout() {
        let native = Arc::new(LoopbackSdk::new());
        let (_sdk, auth) = sdk_with(native);
        let logouts = Arc::new(AtomicUsize::new(0));
        let l = logouts.clone();
        auth.set_logout_callback(handler(move |_| {
            l.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(auth.logout(), Err(SdkError::WrongUsage));
        auth.authenticate("key", "secret").unwrap();
        assert_eq!(auth.state(), AuthState::Success);
        assert_eq!(auth.auth_result(), Some(AuthResult::Success));

        auth.logout().unwrap();
        assert_eq!(auth.state(), AuthState::None);
        assert_eq!(logouts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn second_attempt_while_processing_is_refused() {
        let native = Arc::new(LoopbackSdk::manual());
        let (_sdk, auth) = sdk_with(native);
        auth.authenticate_with_token("jwt").unwrap();
        assert_eq!(auth.state(), AuthState::Processing);
        assert_eq!(auth.authenticate("key", "secret"), Err(SdkError::WrongUsage));
    }

    #[test]
    fn refused_attempt_rolls_back() {
        let native = Arc::new(LoopbackSdk::new());
        let (_sdk, auth) = sdk_with(native.clone());
        native.fail_next(SdkError::ServiceFailed);
        assert_eq!(auth.authenticate("key", "secret"), Err(SdkError::ServiceFailed));
        assert_eq!(auth.state(), AuthState::None);
    }

    #[test]
    fn sso_requires_sdk_auth() {
        let native = Arc::new(LoopbackSdk::new());
        let (_sdk, auth) = sdk_with(native);
        assert_eq!(auth.sso_login("myapp"), Err(SdkError::Unauthentication));
        auth.authenticate("key", "secret").unwrap();
        auth.sso_login("myapp").unwrap();
        assert_eq!(auth.login_status(), LoginStatus::Success);
    }

    #[tokio::test]
    async fn wait_sees_result_already_delivered() {
        let native = Arc::new(LoopbackSdk::new());
        native.set_auth_outcome(AuthResult::JwtTokenWrong);
        let (_sdk, auth) = sdk_with(native);
        let ticket = auth.authenticate_with_token("jwt").unwrap();
        let result = auth.wait_for_result(ticket, Duration::from_millis(50)).await;
        assert_eq!(result, AuthResult::JwtTokenWrong);
        assert_eq!(auth.state(), AuthState::Failed);
    }

    #[tokio::test]
    async fn late_result_after_timeout_is_dropped() {
        let native = Arc::new(LoopbackSdk::manual());
        let (_sdk, auth) = sdk_with(native.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        auth.set_auth_callback(handler(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        let ticket = auth.authenticate("key", "secret").unwrap();
        let result = auth.wait_for_result(ticket, Duration::from_millis(20)).await;
        assert_eq!(result, AuthResult::Overtime);
        assert_eq!(auth.state(), AuthState::Failed);

        native.inject(NativeEvent::AuthResult(AuthResult::Success));
        assert_eq!(auth.state(), AuthState::Failed);
        assert_eq!(auth.auth_result(), Some(AuthResult::Overtime));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn older_ticket_keeps_its_result() {
        let native = Arc::new(LoopbackSdk::new());
        native.set_auth_outcome(AuthResult::KeyOrSecretWrong);
        let (_sdk, auth) = sdk_with(native.clone());
        let first = auth.authenticate("key", "wrong").unwrap();

        native.set_auth_outcome(AuthResult::Success);
        let second = auth.authenticate("key", "secret").unwrap();

        let timeout = Duration::from_millis(20);
        assert_eq!(auth.wait_for_result(first, timeout).await, AuthResult::KeyOrSecretWrong);
        assert_eq!(auth.wait_for_result(second, timeout).await, AuthResult::Success);
        assert_eq!(auth.state(), AuthState::Success);
    }
}
