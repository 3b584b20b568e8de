//! Tests for the token service.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockLoginService, MockTokenBlacklist};
use crate::domain::{AccountId, Email, ErrorCode, PasswordHash};

/// Unsigned codec: the service's rules are under test, not signatures.
struct JsonCodec;

impl TokenCodec for JsonCodec {
    fn encode(&self, claims: &TokenClaims) -> Result<String, TokenCodecError> {
        serde_json::to_string(claims).map_err(|err| TokenCodecError::signing(err.to_string()))
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, TokenCodecError> {
        serde_json::from_str(token).map_err(|err| TokenCodecError::invalid(err.to_string()))
    }
}

struct StepClock(Mutex<DateTime<Utc>>);

impl StepClock {
    fn advance(&self, by: Duration) {
        let mut now = self.0.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for StepClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}

#[derive(Default)]
struct MemoryBlacklist(Mutex<HashMap<Uuid, RevokedToken>>);

#[async_trait]
impl TokenBlacklist for MemoryBlacklist {
    async fn revoke(&self, token: &RevokedToken) -> Result<RevokeOutcome, TokenBlacklistError> {
        let mut entries = self.0.lock().expect("blacklist lock");
        if entries.contains_key(&token.jti) {
            return Ok(RevokeOutcome::AlreadyRevoked);
        }
        entries.insert(token.jti, token.clone());
        Ok(RevokeOutcome::Revoked)
    }

    async fn is_revoked(&self, jti: &Uuid) -> Result<bool, TokenBlacklistError> {
        Ok(self.0.lock().expect("blacklist lock").contains_key(jti))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenBlacklistError> {
        let mut entries = self.0.lock().expect("blacklist lock");
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}

#[fixture]
fn account() -> Account {
    Account::new(
        Email::parse("a@x.com").expect("email"),
        PasswordHash::from_phc("$argon2id$stub"),
    )
}

#[fixture]
fn clock() -> Arc<StepClock> {
    let start = Utc
        .with_ymd_and_hms(2024, 3, 1, 8, 0, 0)
        .single()
        .expect("timestamp");
    Arc::new(StepClock(Mutex::new(start)))
}

fn login_for(account: &Account) -> MockLoginService {
    let mut login = MockLoginService::new();
    let found = account.clone();
    login
        .expect_authenticate()
        .returning(move |creds| Ok((creds.password() == "pw123").then(|| found.clone())));
    let active = account.clone();
    login
        .expect_find_active()
        .returning(move |id| Ok((*id == active.id).then(|| active.clone())));
    login
}

fn issuer<B: TokenBlacklist>(
    login: MockLoginService,
    blacklist: B,
    clock: Arc<StepClock>,
) -> TokenIssuer<B> {
    TokenIssuer::new(
        Arc::new(login),
        Arc::new(blacklist),
        Arc::new(JsonCodec),
        clock,
    )
}

fn credentials(password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts("a@x.com", password).expect("credentials")
}

#[rstest]
#[tokio::test]
async fn obtain_then_refresh_yields_working_access(account: Account, clock: Arc<StepClock>) {
    let service = issuer(login_for(&account), MemoryBlacklist::default(), clock);

    let pair = service
        .obtain_pair(&credentials("pw123"))
        .await
        .expect("pair issued");
    let access = service.refresh(&pair.refresh).await.expect("refreshed");
    let caller = service
        .authenticate_bearer(&access)
        .await
        .expect("access works");
    assert_eq!(caller.account_id(), &account.id);
}

#[rstest]
#[tokio::test]
async fn wrong_password_mints_nothing(account: Account, clock: Arc<StepClock>) {
    let service = issuer(login_for(&account), MockTokenBlacklist::new(), clock);
    let err = service
        .obtain_pair(&credentials("nope"))
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::InvalidCredentials);
}

#[rstest]
#[tokio::test]
async fn revoked_refresh_cannot_refresh_or_be_revoked_again(
    account: Account,
    clock: Arc<StepClock>,
) {
    let service = issuer(login_for(&account), MemoryBlacklist::default(), clock);
    let caller = Caller::from_account(&account);
    let pair = service
        .obtain_pair(&credentials("pw123"))
        .await
        .expect("pair issued");

    service
        .revoke(&caller, Some(pair.refresh.clone()))
        .await
        .expect("first revoke");

    let refresh_err = service.refresh(&pair.refresh).await.expect_err("revoked");
    assert_eq!(refresh_err.code(), ErrorCode::TokenInvalid);

    for _ in 0..2 {
        let again = service
            .revoke(&caller, Some(pair.refresh.clone()))
            .await
            .expect_err("already revoked");
        assert_eq!(again.code(), ErrorCode::TokenInvalid);
        assert_eq!(again.message(), INVALID_TOKEN_MESSAGE);
    }
}

#[rstest]
#[tokio::test]
async fn logout_revokes_outstanding_access_tokens(account: Account, clock: Arc<StepClock>) {
    let service = issuer(login_for(&account), MemoryBlacklist::default(), clock);
    let pair = service
        .obtain_pair(&credentials("pw123"))
        .await
        .expect("pair issued");
    service
        .revoke(&Caller::from_account(&account), Some(pair.refresh))
        .await
        .expect("revoked");

    let err = service
        .authenticate_bearer(&pair.access)
        .await
        .expect_err("parent revoked");
    assert_eq!(err.code(), ErrorCode::TokenInvalid);
}

#[rstest]
#[tokio::test]
async fn expired_tokens_are_rejected(account: Account, clock: Arc<StepClock>) {
    let service = issuer(
        login_for(&account),
        MemoryBlacklist::default(),
        Arc::clone(&clock),
    );
    let pair = service
        .obtain_pair(&credentials("pw123"))
        .await
        .expect("pair issued");

    clock.advance(Duration::minutes(5));
    let err = service
        .authenticate_bearer(&pair.access)
        .await
        .expect_err("access expired");
    assert_eq!(err.code(), ErrorCode::TokenInvalid);
    service.refresh(&pair.refresh).await.expect("refresh still valid");

    clock.advance(Duration::days(1));
    let err = service.refresh(&pair.refresh).await.expect_err("refresh expired");
    assert_eq!(err.code(), ErrorCode::TokenInvalid);
}

#[rstest]
#[tokio::test]
async fn token_types_are_not_interchangeable(account: Account, clock: Arc<StepClock>) {
    let service = issuer(login_for(&account), MemoryBlacklist::default(), clock);
    let pair = service
        .obtain_pair(&credentials("pw123"))
        .await
        .expect("pair issued");

    let err = service.refresh(&pair.access).await.expect_err("access as refresh");
    assert_eq!(err.code(), ErrorCode::TokenInvalid);
    let err = service
        .authenticate_bearer(&pair.refresh)
        .await
        .expect_err("refresh as bearer");
    assert_eq!(err.code(), ErrorCode::TokenInvalid);
}

#[rstest]
#[case(None)]
#[case(Some(String::new()))]
#[case(Some("   ".to_owned()))]
#[tokio::test]
async fn revoke_requires_a_token(
    account: Account,
    clock: Arc<StepClock>,
    #[case] refresh: Option<String>,
) {
    let mut blacklist = MockTokenBlacklist::new();
    blacklist.expect_revoke().never();
    let service = issuer(login_for(&account), blacklist, clock);
    let err = service
        .revoke(&Caller::from_account(&account), refresh)
        .await
        .expect_err("missing token");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "Refresh token is required.");
}

#[rstest]
#[tokio::test]
async fn revoke_rejects_tokens_of_other_accounts(account: Account, clock: Arc<StepClock>) {
    let mut blacklist = MockTokenBlacklist::new();
    blacklist.expect_revoke().never();
    let service = issuer(login_for(&account), blacklist, clock);
    let pair = service
        .obtain_pair(&credentials("pw123"))
        .await
        .expect("pair issued");

    let mut stranger = account.clone();
    stranger.id = AccountId::random();
    let err = service
        .revoke(&Caller::from_account(&stranger), Some(pair.refresh))
        .await
        .expect_err("foreign token");
    assert_eq!(err.code(), ErrorCode::TokenInvalid);
}

#[rstest]
#[tokio::test]
async fn revoke_purges_entries_past_their_expiry(account: Account, clock: Arc<StepClock>) {
    let now = clock.utc();
    let mut blacklist = MockTokenBlacklist::new();
    blacklist
        .expect_revoke()
        .withf(move |entry| entry.revoked_at == now && entry.expires_at > now)
        .times(1)
        .return_once(|_| Ok(RevokeOutcome::Revoked));
    blacklist
        .expect_purge_expired()
        .withf(move |at| *at == now)
        .times(1)
        .return_once(|_| Ok(3));

    let service = issuer(login_for(&account), blacklist, clock);
    let pair = service.issue_for(&account).await.expect("pair issued");
    service
        .revoke(&Caller::from_account(&account), Some(pair.refresh))
        .await
        .expect("revoked");
}

#[rstest]
#[tokio::test]
async fn blacklist_outage_surfaces_as_unavailable(account: Account, clock: Arc<StepClock>) {
    let mut blacklist = MockTokenBlacklist::new();
    blacklist
        .expect_is_revoked()
        .times(1)
        .return_once(|_| Err(TokenBlacklistError::connection("down")));
    let service = issuer(login_for(&account), blacklist, clock);
    let pair = service.issue_for(&account).await.expect("pair issued");
    let err = service.refresh(&pair.refresh).await.expect_err("outage");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn deactivated_account_cannot_refresh_or_authenticate(
    account: Account,
    clock: Arc<StepClock>,
) {
    let mut login = MockLoginService::new();
    login.expect_find_active().returning(|_| Ok(None));
    let service = issuer(login, MemoryBlacklist::default(), clock);
    let pair = service.issue_for(&account).await.expect("pair issued");

    let err = service.refresh(&pair.refresh).await.expect_err("inactive");
    assert_eq!(err.code(), ErrorCode::TokenInvalid);
    let err = service
        .authenticate_bearer(&pair.access)
        .await
        .expect_err("inactive");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn tampered_tokens_are_rejected(account: Account, clock: Arc<StepClock>) {
    let service = issuer(login_for(&account), MemoryBlacklist::default(), clock);
    let err = service.refresh("garbage").await.expect_err("malformed");
    assert_eq!(err.code(), ErrorCode::TokenInvalid);
}

#[rstest]
#[case::fresh(RevokeOutcome::Revoked, 1)]
#[case::repeat(RevokeOutcome::AlreadyRevoked, 0)]
#[tokio::test]
async fn expired_entries_are_purged_after_recording_a_revocation(
    account: Account,
    clock: Arc<StepClock>,
    #[case] outcome: RevokeOutcome,
    #[case] purges: usize,
) {
    let mut seq = mockall::Sequence::new();
    let mut blacklist = MockTokenBlacklist::new();
    blacklist
        .expect_revoke()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_| Ok(outcome));
    blacklist
        .expect_purge_expired()
        .times(purges)
        .in_sequence(&mut seq)
        .returning(|_| Ok(0));
    let service = issuer(login_for(&account), blacklist, clock);
    let pair = service.issue_for(&account).await.expect("pair issued");

    let result = service
        .revoke(&Caller::from_account(&account), Some(pair.refresh))
        .await;
    assert_eq!(result.is_ok(), purges == 1);
}
