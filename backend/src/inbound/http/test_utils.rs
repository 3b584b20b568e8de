//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    MockAccountService, MockMediaQuery, MockObservationService, MockPlantService,
    MockTokenService,
};
use crate::domain::{Account, Caller, Email, PasswordHash};
use crate::inbound::http::state::HttpState;

/// One mock per driving port; set expectations, then convert into state.
#[derive(Default)]
pub struct MockServices {
    pub accounts: MockAccountService,
    pub tokens: MockTokenService,
    pub plants: MockPlantService,
    pub observations: MockObservationService,
    pub media: MockMediaQuery,
}

impl MockServices {
    /// Mocks whose bearer check resolves every token to `caller`.
    pub fn signed_in(caller: &Caller) -> Self {
        let mut services = Self::default();
        let caller = caller.clone();
        services
            .tokens
            .expect_authenticate_bearer()
            .returning(move |_| Ok(caller.clone()));
        services
    }

    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(self.accounts),
            Arc::new(self.tokens),
            Arc::new(self.plants),
            Arc::new(self.observations),
            Arc::new(self.media),
        ))
    }
}

/// Unprivileged caller for a fresh account with `email`.
pub fn caller_for(email: &Email) -> Caller {
    Caller::from_account(&Account::new(
        email.clone(),
        PasswordHash::from_phc("$argon2id$stub"),
    ))
}
