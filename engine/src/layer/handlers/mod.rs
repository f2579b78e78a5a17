use super::*;
use commonware_utils::hex;

fn wager_error(
    participant: &PublicKey,
    bet_id: Option<u64>,
    error_code: u8,
    message: impl Into<String>,
) -> Event {
    Event::WagerError {
        participant: participant.clone(),
        bet_id,
        error_code,
        message: message.into(),
    }
}

fn wager_error_vec(
    participant: &PublicKey,
    bet_id: Option<u64>,
    error_code: u8,
    message: impl Into<String>,
) -> Vec<Event> {
    vec![wager_error(participant, bet_id, error_code, message)]
}

/// Allow-list check for the administrative capability. The admin key is
/// provided out-of-band; an unset variable means no admin operations are
/// possible at all.
fn is_admin_public_key(public: &PublicKey) -> bool {
    match std::env::var("FAIRROLL_ADMIN_PUBLIC_KEY_HEX") {
        Ok(admin_hex) => hex(public.as_ref()) == admin_hex.to_lowercase(),
        Err(_) => false,
    }
}

mod admin;
mod rewards;
mod token;
mod wager;
