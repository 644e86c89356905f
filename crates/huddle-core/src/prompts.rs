//! Single-use continuations for join flows that need more input.
//!
//! The native layer destroys its handler after one answer, and a newer
//! request replaces an older one. A prompt therefore accepts exactly one
//! submit or cancel, and only while it is the latest of its kind and its
//! meeting session is still alive.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::catalogue::{RequiredInfoType, WebinarNeedRegisterType};
use crate::errors::{SdkError, SdkResult};
use crate::meeting::SessionScope;
use crate::native::{Command, ConfigCommand, NativeSdk, Secret};
use crate::sdk::Lifecycle;

/// Loose shape check: something before and after a single `@`, and a dot
/// in the domain.
pub(crate) fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

struct PromptToken {
    id: u64,
    latest: Arc<AtomicU64>,
    consumed: AtomicBool,
    scope: Arc<SessionScope>,
    life: Arc<Lifecycle>,
    generation: u64,
    native: Arc<dyn NativeSdk>,
}

impl PromptToken {
    fn is_live(&self) -> bool {
        !self.consumed.load(Ordering::Acquire)
            && self.latest.load(Ordering::Acquire) == self.id
            && !self.scope.is_expired()
            && self.life.check(self.generation).is_ok()
    }

    /// Claim the single use and hand the answer to the native layer.
    fn consume(&self, command: ConfigCommand) -> SdkResult {
        if !self.is_live() || self.consumed.swap(true, Ordering::AcqRel) {
            tracing::warn!("prompt {} reused or stale", self.id);
            return Err(SdkError::WrongUsage);
        }
        tracing::debug!("prompt {} answered: {command:?}", self.id);
        self.native.execute(Command::Config(command))
    }
}

/// Issues prompt tokens and tracks which one is current.
#[derive(Default)]
pub(crate) struct PromptIssuer {
    next_id: AtomicU64,
    latest: Arc<AtomicU64>,
}

impl PromptIssuer {
    fn issue(
        &self,
        native: Arc<dyn NativeSdk>,
        life: Arc<Lifecycle>,
        scope: Arc<SessionScope>,
    ) -> Arc<PromptToken> {
        let id = self.next_id.fetch_add(1, Ordering::AcqRel) + 1;
        self.latest.store(id, Ordering::Release);
        Arc::new(PromptToken {
            id,
            latest: self.latest.clone(),
            consumed: AtomicBool::new(false),
            scope,
            generation: life.current(),
            life,
            native,
        })
    }

    /// Make every outstanding prompt stale.
    pub(crate) fn invalidate(&self) {
        self.latest.store(0, Ordering::Release);
    }
}

/// The meeting needs a password, a screen name, or a meeting id before
/// joining can continue.
#[derive(Clone)]
pub struct PasswordPrompt {
    token: Arc<PromptToken>,
    required: RequiredInfoType,
}

impl PasswordPrompt {
    pub(crate) fn issue(
        issuer: &PromptIssuer,
        required: RequiredInfoType,
        native: Arc<dyn NativeSdk>,
        life: Arc<Lifecycle>,
        scope: Arc<SessionScope>,
    ) -> Self {
        Self {
            token: issuer.issue(native, life, scope),
            required,
        }
    }

    pub fn required(&self) -> RequiredInfoType {
        self.required
    }

    /// Whether an answer can still be given.
    pub fn is_live(&self) -> bool {
        self.token.is_live()
    }

    pub fn submit_password_and_screen_name(&self, password: &str, screen_name: &str) -> SdkResult {
        let password = Secret::new(password);
        if password.is_blank() {
            return Err(SdkError::InvalidParameter);
        }
        if self.required == RequiredInfoType::PasswordAndScreenName && screen_name.trim().is_empty() {
            return Err(SdkError::InvalidParameter);
        }
        if !self.required.needs_password() {
            return Err(SdkError::WrongUsage);
        }
        self.token.consume(ConfigCommand::InputPasswordAndScreenName {
            password,
            screen_name: screen_name.trim().to_string(),
        })
    }

    pub fn submit_meeting_id_and_screen_name(&self, meeting_id: &str, screen_name: &str) -> SdkResult {
        let meeting_id = meeting_id.trim();
        let screen_name = screen_name.trim();
        if meeting_id.is_empty() || screen_name.is_empty() {
            return Err(SdkError::InvalidParameter);
        }
        if self.required != RequiredInfoType::MeetingIdAndScreenName {
            return Err(SdkError::WrongUsage);
        }
        self.token.consume(ConfigCommand::InputMeetingIdAndScreenName {
            meeting_id: meeting_id.to_string(),
            screen_name: screen_name.to_string(),
        })
    }

    pub fn submit_screen_name(&self, screen_name: &str) -> SdkResult {
        let screen_name = screen_name.trim();
        if screen_name.is_empty() {
            return Err(SdkError::InvalidParameter);
        }
        if self.required != RequiredInfoType::ScreenName {
            return Err(SdkError::WrongUsage);
        }
        self.token
            .consume(ConfigCommand::InputScreenName(screen_name.to_string()))
    }

    /// Give up joining.
    pub fn cancel(&self) -> SdkResult {
        self.token.consume(ConfigCommand::CancelPasswordPrompt)
    }
}

/// A webinar requires registration before joining.
#[derive(Clone)]
pub struct WebinarRegistrationPrompt {
    token: Arc<PromptToken>,
    kind: WebinarNeedRegisterType,
    url: Option<String>,
}

impl WebinarRegistrationPrompt {
    pub(crate) fn issue(
        issuer: &PromptIssuer,
        kind: WebinarNeedRegisterType,
        url: Option<String>,
        native: Arc<dyn NativeSdk>,
        life: Arc<Lifecycle>,
        scope: Arc<SessionScope>,
    ) -> Self {
        Self {
            token: issuer.issue(native, life, scope),
            kind,
            url,
        }
    }

    pub fn kind(&self) -> WebinarNeedRegisterType {
        self.kind
    }

    /// Registration page, for `ByRegisterUrl`.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_live(&self) -> bool {
        self.token.is_live()
    }

    /// Confirm the user registered through the web page.
    pub fn register_by_url(&self) -> SdkResult {
        if self.kind != WebinarNeedRegisterType::ByRegisterUrl {
            return Err(SdkError::WrongUsage);
        }
        self.token.consume(ConfigCommand::RegisterWebinarByUrl)
    }

    pub fn submit_email_and_screen_name(&self, email: &str, screen_name: &str) -> SdkResult {
        if !is_plausible_email(email) || screen_name.trim().is_empty() {
            return Err(SdkError::InvalidParameter);
        }
        if self.kind != WebinarNeedRegisterType::ByEmailAndDisplayName {
            return Err(SdkError::WrongUsage);
        }
        self.token.consume(ConfigCommand::InputWebinarRegistration {
            email: email.trim().to_string(),
            screen_name: screen_name.trim().to_string(),
        })
    }

    pub fn cancel(&self) -> SdkResult {
        self.token.consume(ConfigCommand::CancelWebinarRegistration)
    }
}
