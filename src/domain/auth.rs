//! Phone-OTP authentication
//!
//! The two-step flow is an explicit state machine: requesting a code moves
//! Unauthenticated → CodeRequested, a successful verification moves
//! CodeRequested → Authenticated, and a failed one stays in CodeRequested
//! with an attempt counter. Code delivery sits behind [`OtpGateway`] so the
//! real provider (a network collaborator) and the in-repo mock are
//! interchangeable.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::{AuthEvent, DomainEvent};
use crate::domain::value_objects::PhoneNumber;
use crate::{Result, StoreError};

/// Failed verifications allowed before the session falls back to
/// Unauthenticated and a fresh code must be requested.
pub const MAX_VERIFY_ATTEMPTS: u8 = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_phone_verified: bool,
}

/// Sends and checks one-time codes for a phone number.
pub trait OtpGateway: Send + Sync {
    fn request_code(&self, phone: &PhoneNumber) -> Result<()>;
    fn verify_code(&self, phone: &PhoneNumber, code: &str) -> Result<bool>;
}

/// Stand-in for a hosted OTP provider: logs the code it "sends" and accepts
/// any 6-digit code on verification.
#[derive(Debug, Default)]
pub struct MockOtpGateway;

impl OtpGateway for MockOtpGateway {
    fn request_code(&self, phone: &PhoneNumber) -> Result<()> {
        let code: u32 = rand::random::<u32>() % 1_000_000;
        tracing::info!(phone = %phone, "mock OTP gateway issued code {:06}", code);
        Ok(())
    }

    fn verify_code(&self, _phone: &PhoneNumber, code: &str) -> Result<bool> {
        Ok(code.len() == 6 && code.chars().all(|c| c.is_ascii_digit()))
    }
}

#[derive(Clone, Debug)]
pub enum AuthState {
    Unauthenticated,
    CodeRequested { phone: PhoneNumber, attempts: u8 },
    Authenticated { user: User },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified(User),
    Rejected { attempts_left: u8 },
}

#[derive(Debug)]
pub struct AuthSession {
    state: AuthState,
    events: Vec<DomainEvent>,
}

impl Default for AuthSession {
    fn default() -> Self { Self::new() }
}

impl AuthSession {
    pub fn new() -> Self {
        Self { state: AuthState::Unauthenticated, events: vec![] }
    }

    pub fn state(&self) -> &AuthState { &self.state }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated { user } => Some(user),
            _ => None,
        }
    }

    /// Requests a code for `phone`. Valid from any state: a repeat call in
    /// CodeRequested is a resend and resets the attempt counter.
    pub fn request_code(&mut self, phone: PhoneNumber, gateway: &dyn OtpGateway) -> Result<()> {
        gateway.request_code(&phone)?;
        self.raise(AuthEvent::CodeRequested { phone: phone.clone() });
        self.state = AuthState::CodeRequested { phone, attempts: 0 };
        Ok(())
    }

    /// Checks `code` against the pending request. A wrong code keeps the
    /// session in CodeRequested until [`MAX_VERIFY_ATTEMPTS`] failures, after
    /// which the session reverts to Unauthenticated.
    pub fn verify(&mut self, code: &str, gateway: &dyn OtpGateway) -> Result<VerifyOutcome> {
        let (phone, attempts) = match &self.state {
            AuthState::CodeRequested { phone, attempts } => (phone.clone(), *attempts),
            _ => return Err(StoreError::NoPendingCode),
        };

        if gateway.verify_code(&phone, code)? {
            let user = User {
                id: Uuid::new_v4().to_string(),
                name: String::new(),
                email: String::new(),
                address: None,
                phone: Some(phone.to_string()),
                is_phone_verified: true,
            };
            self.raise(AuthEvent::Authenticated { user_id: user.id.clone() });
            self.state = AuthState::Authenticated { user: user.clone() };
            return Ok(VerifyOutcome::Verified(user));
        }

        let attempts = attempts + 1;
        if attempts >= MAX_VERIFY_ATTEMPTS {
            self.state = AuthState::Unauthenticated;
            return Err(StoreError::AttemptsExhausted);
        }
        self.state = AuthState::CodeRequested { phone, attempts };
        Ok(VerifyOutcome::Rejected { attempts_left: MAX_VERIFY_ATTEMPTS - attempts })
    }

    pub fn logout(&mut self) {
        if !matches!(self.state, AuthState::Unauthenticated) {
            self.raise(AuthEvent::LoggedOut);
        }
        self.state = AuthState::Unauthenticated;
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise(&mut self, e: AuthEvent) { self.events.push(DomainEvent::Auth(e)); }
}
