//! Token lifecycle tests against the public engine API
//!
//! Covers the issue → verify → extract flow, tampering and concurrent use of
//! a single shared engine.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jwt_security::{ConfigError, Principal, TokenEngine};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const ZERO_SECRET: &str = "00000000000000000000000000000000";

fn engine() -> TokenEngine {
    TokenEngine::from_secret(ZERO_SECRET).expect("Failed to build engine")
}

fn principals() -> Vec<Principal> {
    vec![
        Principal::new("alice", ["ADMIN", "USER"]),
        Principal::new("bob", Vec::<String>::new()),
        Principal::new("carol@example.com", ["ROLE_READER"]),
        Principal::new("dave", ["Z", "A", "M", "A"]),
        Principal::new("émile", ["ÜBER_ADMIN"]),
    ]
}

#[test]
fn test_scenario_alice() {
    let engine = engine();
    let alice = Principal::new("alice", ["ADMIN", "USER"]);

    let token = engine.create_token(&alice, "15m").expect("Failed to create token");

    assert_eq!(token.split('.').count(), 3);
    assert_eq!(engine.extract_username(&token).unwrap(), "alice");
    assert_eq!(engine.extract_roles(&token).unwrap(), vec!["ADMIN", "USER"]);
    assert!(engine.is_token_valid(&token, "alice"));
    assert!(!engine.is_token_valid(&token, "bob"));
}

#[test]
fn test_fresh_tokens_are_valid_for_their_subject() {
    let engine = engine();
    for principal in principals() {
        for lifetime in ["1m", "15m", "24h", "7d", "3600", "90s"] {
            let token = engine.create_token(&principal, lifetime).unwrap();
            assert!(
                engine.is_token_valid(&token, &principal.username),
                "{} / {}",
                principal.username,
                lifetime
            );
        }
    }
}

#[test]
fn test_roles_round_trip_in_order() {
    let engine = engine();
    for principal in principals() {
        let token = engine.create_token(&principal, "15m").unwrap();
        assert_eq!(engine.extract_roles(&token).unwrap(), principal.authority_names());
    }
}

#[test]
fn test_other_usernames_are_rejected() {
    let engine = engine();
    let token = engine
        .create_token(&Principal::new("alice", ["USER"]), "15m")
        .unwrap();

    for other in ["bob", "ALICE", "alice ", " alice", "", "alic"] {
        assert!(!engine.is_token_valid(&token, other), "{:?}", other);
    }
}

#[test]
fn test_zero_lifetime_tokens_are_never_valid() {
    let engine = engine();
    for principal in principals() {
        let token = engine.create_token(&principal, "0s").unwrap();
        assert!(!engine.is_token_valid(&token, &principal.username));
    }
}

#[test]
fn test_short_lived_token_expires() {
    let engine = engine();
    let token = engine
        .create_token(&Principal::new("alice", ["USER"]), "1s")
        .unwrap();

    thread::sleep(Duration::from_millis(2100));
    assert!(!engine.is_token_valid(&token, "alice"));
}

#[test]
fn test_one_second_token_is_valid_on_creation() {
    let engine = engine();
    let alice = Principal::new("alice", ["USER"]);

    // Spans at least one second boundary
    let deadline = Instant::now() + Duration::from_millis(1200);
    let mut created = 0;
    while Instant::now() < deadline {
        let token = engine.create_token(&alice, "1s").unwrap();
        assert!(engine.is_token_valid(&token, "alice"), "token {} invalid on creation", created);
        created += 1;
    }
    assert!(created > 0);
}

#[test]
fn test_signature_tampering_is_detected() {
    let engine = engine();
    let token = engine
        .create_token(&Principal::new("alice", ["ADMIN"]), "15m")
        .unwrap();

    let (unsigned, signature) = token.rsplit_once('.').unwrap();

    // The final character also carries padding bits, skip it
    for idx in 0..signature.len() - 1 {
        let mut bytes = signature.as_bytes().to_vec();
        bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
        let tampered = format!("{}.{}", unsigned, String::from_utf8(bytes).unwrap());

        assert!(!engine.is_token_valid(&tampered, "alice"), "position {}", idx);
        assert!(engine.extract_username(&tampered).is_err());
    }
}

#[test]
fn test_payload_tampering_is_detected() {
    let engine = engine();
    let token = engine
        .create_token(&Principal::new("alice", ["USER"]), "15m")
        .unwrap();

    let parts: Vec<&str> = token.split('.').collect();
    let payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
    let escalated = String::from_utf8(payload)
        .unwrap()
        .replace("\"USER\"", "\"ADMIN\"");
    let tampered = format!(
        "{}.{}.{}",
        parts[0],
        URL_SAFE_NO_PAD.encode(escalated.as_bytes()),
        parts[2]
    );

    assert_ne!(tampered, token);
    assert!(!engine.is_token_valid(&tampered, "alice"));
    assert!(engine.extract_roles(&tampered).is_err());
}

#[test]
fn test_tokens_from_different_instants_differ() {
    let engine = engine();
    let alice = Principal::new("alice", ["USER"]);

    let first = engine.create_token(&alice, "15m").unwrap();
    thread::sleep(Duration::from_millis(1100));
    let second = engine.create_token(&alice, "15m").unwrap();

    assert_ne!(first, second);
    assert!(engine.is_token_valid(&first, "alice"));
    assert!(engine.is_token_valid(&second, "alice"));
}

#[test]
fn test_distinct_keys_are_isolated() {
    let a = engine();
    let b = TokenEngine::from_secret("J8Kq2mPvRx4TnZs9YwLcGf7DhBe3Xa6W").unwrap();
    let alice = Principal::new("alice", ["USER"]);

    let token = a.create_token(&alice, "15m").unwrap();
    assert!(a.is_token_valid(&token, "alice"));
    assert!(!b.is_token_valid(&token, "alice"));
}

#[test]
fn test_sixteen_character_secret_fails_startup() {
    let result = TokenEngine::from_secret("0123456789abcdef");
    assert!(matches!(result, Err(ConfigError::SecretTooShort { .. })));
}

#[test]
fn test_shared_engine_across_threads() {
    let engine = Arc::new(engine());
    let token = engine
        .create_token(&Principal::new("alice", ["ADMIN", "USER"]), "15m")
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let token = token.clone();
            thread::spawn(move || {
                let own = engine
                    .create_token(&Principal::new(format!("user-{i}"), ["USER"]), "5m")
                    .unwrap();
                for _ in 0..50 {
                    assert!(engine.is_token_valid(&token, "alice"));
                    assert!(engine.is_token_valid(&own, &format!("user-{i}")));
                    assert!(!engine.is_token_valid(&own, "alice"));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }
}
