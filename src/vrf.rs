//! Request/fulfillment boundary with the external randomness oracle.
//!
//! The outbound half allocates a correlation id and advertises the request
//! through the program log; the oracle echoes the id back when it delivers
//! the random values through the fulfillment instruction.

use solana_program::program_error::ProgramError;

use crate::error::RaffleError;

/// Random values requested per draw; only the first is consumed
pub const RANDOM_VALUES_PER_REQUEST: u32 = 1;

/// Allocate the next correlation id from the round's request counter.
/// The first issued id is 1, so a pending id is never 0.
pub fn next_request_id(counter: u64) -> Result<u64, ProgramError> {
    counter.checked_add(1).ok_or(ProgramError::ArithmeticOverflow)
}

/// Map a random value onto the player list
pub fn winner_index(random_value: u64, player_count: u32) -> u32 {
    if player_count == 0 {
        return 0;
    }
    (random_value % player_count as u64) as u32
}

/// The single random value a fulfillment must carry
pub fn first_random_value(values: &[u64]) -> Result<u64, RaffleError> {
    values.first().copied().ok_or(RaffleError::EmptyRandomness)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_index_wraps_modulo_players() {
        assert_eq!(winner_index(7, 1), 0);
        assert_eq!(winner_index(7, 4), 3);
        assert_eq!(winner_index(8, 4), 0);
        assert_eq!(winner_index(u64::MAX, 3), (u64::MAX % 3) as u32);
    }

    #[test]
    fn winner_index_guards_empty_round() {
        assert_eq!(winner_index(42, 0), 0);
    }

    #[test]
    fn request_ids_start_at_one() {
        assert_eq!(next_request_id(0).unwrap(), 1);
        assert_eq!(next_request_id(1).unwrap(), 2);
        assert!(next_request_id(u64::MAX).is_err());
    }

    #[test]
    fn fulfillment_must_carry_a_value() {
        assert_eq!(first_random_value(&[7, 9]).unwrap(), 7);
        assert_eq!(first_random_value(&[]), Err(RaffleError::EmptyRandomness));
    }
}
