//! JWT token service implementation.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use sigil_core::ports::{AuthError, TokenClaims, TokenService};

/// JWT token service configuration.
///
/// The signing key is loaded once at startup and never changes for the life
/// of the process; rotating it means redeploying.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: Vec<u8>,
    pub token_lifetime: TimeDelta,
    pub issuer: String,
}

impl JwtConfig {
    pub const DEFAULT_ISSUER: &'static str = "sigil";

    /// Config with the default one hour lifetime and issuer.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            token_lifetime: TimeDelta::hours(1),
            issuer: Self::DEFAULT_ISSUER.to_string(),
        }
    }

    /// Config with a random 256-bit key. Tokens do not survive a restart.
    pub fn ephemeral() -> Self {
        let mut secret = vec![0u8; 32];
        OsRng.fill_bytes(&mut secret);
        Self::new(secret)
    }

    pub fn with_lifetime(mut self, lifetime: TimeDelta) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("token_lifetime", &self.token_lifetime)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Internal JWT claims structure for serialization.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // account identifier
    iat: i64,    // issued at
    exp: i64,    // expiration timestamp
    iss: String, // issuer
}

/// HS256 JWT token service.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(&config.secret);
        let decoding_key = DecodingKey::from_secret(&config.secret);

        // Expiry is checked by hand after the signature so that the boundary
        // is exact (`now >= exp`) and carries no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iss"]);

        Self {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Issue a token as if the current time were `issued_at`.
    pub fn generate_token_at(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
        lifetime: TimeDelta,
    ) -> Result<String, AuthError> {
        let exp = issued_at
            .checked_add_signed(lifetime)
            .ok_or_else(|| AuthError::TokenIssue("token lifetime out of range".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenIssue(e.to_string()))
    }

    /// Verify a token as if the current time were `now`.
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = token_data.claims;

        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }

        if now.timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(TokenClaims {
            subject: claims.sub,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(&self, subject: &str, lifetime: TimeDelta) -> Result<String, AuthError> {
        self.generate_token_at(subject, Utc::now(), lifetime)
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.validate_token_at(token, Utc::now())
    }

    fn token_lifetime(&self) -> TimeDelta {
        self.config.token_lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig::new("test-secret-key").with_issuer("test-issuer")
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    /// Swap one character of the segment at `segment` (0 = header,
    /// 1 = payload, 2 = signature) for a different base64url character.
    fn tamper(token: &str, segment: usize, offset: usize) -> String {
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let mut chars: Vec<char> = parts[segment].chars().collect();
        chars[offset] = if chars[offset] == 'A' { 'B' } else { 'A' };
        parts[segment] = chars.into_iter().collect();
        parts.join(".")
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = JwtTokenService::new(test_config());

        let token = service
            .generate_token("a@x.com", TimeDelta::hours(1))
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.subject, "a@x.com");
        assert_eq!(claims.expires_at - claims.issued_at, 3600);
    }

    #[test]
    fn test_default_lifetime_is_one_hour() {
        let service = JwtTokenService::new(JwtConfig::new("k"));
        assert_eq!(service.token_lifetime(), TimeDelta::hours(1));
    }

    #[test]
    fn test_expiry_boundary() {
        let service = JwtTokenService::new(test_config());
        let lifetime = TimeDelta::seconds(60);
        let token = service
            .generate_token_at("a@x.com", epoch(), lifetime)
            .unwrap();

        let just_before = epoch() + lifetime - TimeDelta::seconds(1);
        let at_expiry = epoch() + lifetime;
        let just_after = epoch() + lifetime + TimeDelta::seconds(1);

        assert!(service.validate_token_at(&token, just_before).is_ok());
        assert!(matches!(
            service.validate_token_at(&token, at_expiry),
            Err(AuthError::TokenExpired)
        ));
        assert!(matches!(
            service.validate_token_at(&token, just_after),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_expired_token_with_bad_signature_is_invalid() {
        let service = JwtTokenService::new(test_config());
        let token = service
            .generate_token_at("a@x.com", epoch(), TimeDelta::seconds(60))
            .unwrap();

        let forged = tamper(&token, 2, 0);
        let later = epoch() + TimeDelta::hours(2);

        assert!(matches!(
            service.validate_token_at(&forged, later),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_validate_malformed_token() {
        let service = JwtTokenService::new(test_config());

        for garbage in ["", "invalid-token", "a.b.c", "Bearer x.y.z"] {
            assert!(matches!(
                service.validate_token(garbage),
                Err(AuthError::InvalidToken(_))
            ));
        }
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let service = JwtTokenService::new(test_config());
        let token = service
            .generate_token("a@x.com", TimeDelta::hours(1))
            .unwrap();

        for (segment, offset) in [(0, 3), (1, 5), (1, 12), (2, 0), (2, 20)] {
            let tampered = tamper(&token, segment, offset);
            assert!(
                matches!(
                    service.validate_token(&tampered),
                    Err(AuthError::InvalidToken(_))
                ),
                "segment {segment} offset {offset} was accepted"
            );
        }
    }

    #[test]
    fn test_token_from_other_key_is_invalid() {
        let ours = JwtTokenService::new(test_config());
        let theirs = JwtTokenService::new(
            JwtConfig::new("some-other-secret").with_issuer("test-issuer"),
        );

        let token = theirs
            .generate_token("a@x.com", TimeDelta::hours(1))
            .unwrap();

        assert!(matches!(
            ours.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_validate_wrong_issuer_token() {
        let service1 = JwtTokenService::new(JwtConfig::new("same-secret").with_issuer("issuer1"));
        let service2 = JwtTokenService::new(JwtConfig::new("same-secret").with_issuer("issuer2"));

        let token = service1
            .generate_token("a@x.com", TimeDelta::hours(1))
            .unwrap();

        assert!(matches!(
            service2.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_unsupported_algorithm_is_invalid() {
        let config = test_config();
        let service = JwtTokenService::new(config.clone());
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "a@x.com".to_string(),
            iat: now,
            exp: now + 3600,
            iss: config.issuer.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(&config.secret),
        )
        .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_lifetime_past_calendar_range_is_issue_error() {
        let service = JwtTokenService::new(test_config());

        let result = service.generate_token_at("a@x.com", epoch(), TimeDelta::seconds(9_000_000_000_000));

        assert!(matches!(result, Err(AuthError::TokenIssue(_))));
    }

    fn sign_raw<T: Serialize>(config: &JwtConfig, claims: &T) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(&config.secret),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_claims_are_invalid() {
        #[derive(Serialize)]
        struct NoSubject {
            iat: i64,
            exp: i64,
            iss: String,
        }

        #[derive(Serialize)]
        struct NoExpiry {
            sub: String,
            iat: i64,
            iss: String,
        }

        #[derive(Serialize)]
        struct NoIssuer {
            sub: String,
            iat: i64,
            exp: i64,
        }

        let config = test_config();
        let service = JwtTokenService::new(config.clone());
        let now = epoch().timestamp();

        let tokens = [
            sign_raw(
                &config,
                &NoSubject {
                    iat: now,
                    exp: now + 3600,
                    iss: config.issuer.clone(),
                },
            ),
            sign_raw(
                &config,
                &NoExpiry {
                    sub: "a@x.com".to_string(),
                    iat: now,
                    iss: config.issuer.clone(),
                },
            ),
            sign_raw(
                &config,
                &NoIssuer {
                    sub: "a@x.com".to_string(),
                    iat: now,
                    exp: now + 3600,
                },
            ),
        ];

        for (i, token) in tokens.iter().enumerate() {
            assert!(
                matches!(
                    service.validate_token_at(token, epoch()),
                    Err(AuthError::InvalidToken(_))
                ),
                "token {i} was accepted"
            );
        }
    }

    #[test]
    fn test_empty_subject_is_invalid() {
        let config = test_config();
        let service = JwtTokenService::new(config.clone());
        let now = epoch().timestamp();
        let token = sign_raw(
            &config,
            &Claims {
                sub: String::new(),
                iat: now,
                exp: now + 3600,
                iss: config.issuer.clone(),
            },
        );

        assert!(matches!(
            service.validate_token_at(&token, epoch()),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_ephemeral_keys_differ() {
        let a = JwtConfig::ephemeral();
        let b = JwtConfig::ephemeral();

        assert_eq!(a.secret.len(), 32);
        assert_ne!(a.secret, b.secret);
        assert!(!format!("{a:?}").contains(&format!("{:?}", a.secret)));
    }
}
