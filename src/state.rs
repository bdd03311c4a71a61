use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use solana_program::{
    clock::UnixTimestamp,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::{Pubkey, PUBKEY_BYTES},
};
use std::convert::TryFrom;

use crate::error::RaffleError;

/// Seed for the raffle account PDA
pub const RAFFLE_SEED: &[u8] = b"raffle";

/// Capacity of the player list; bounded by the fixed account size
pub const MAX_PLAYERS: usize = 64;

/// Lifecycle state of the round
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RaffleState {
    /// Accepting entries
    Open,
    /// Randomness request outstanding, entries closed
    Calculating,
}

impl TryFrom<u8> for RaffleState {
    type Error = &'static str;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            0 => Ok(RaffleState::Open),
            1 => Ok(RaffleState::Calculating),
            _ => Err("Invalid raffle state"),
        }
    }
}

impl From<RaffleState> for u8 {
    fn from(state: RaffleState) -> Self {
        match state {
            RaffleState::Open => 0,
            RaffleState::Calculating => 1,
        }
    }
}

/// Raffle round account data
#[derive(Debug, Clone, Copy)]
pub struct Raffle {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Lifecycle state of the current round
    pub state: RaffleState,
    /// Only this key may deliver randomness fulfillments
    pub oracle_authority: Pubkey,
    /// Minimum payment to enter, in lamports
    pub entrance_fee: u64,
    /// Minimum seconds between round resolutions
    pub interval: i64,
    /// Time of the last round resolution (or initialization)
    pub last_timestamp: UnixTimestamp,
    /// Sum of entry payments collected since the last payout
    pub pot_lamports: u64,
    /// Number of occupied player slots
    pub player_count: u32,
    /// Entrants in entry order; the same key may appear more than once
    pub players: [Pubkey; MAX_PLAYERS],
    /// Whether a randomness request is outstanding
    pub has_pending_request: bool,
    /// Correlation id of the outstanding request, valid iff has_pending_request
    pub pending_request_id: u64,
    /// Total randomness requests issued; the next id is counter + 1
    pub request_counter: u64,
    /// Winner of the last resolved round (default key if none yet)
    pub recent_winner: Pubkey,
}

impl Raffle {
    /// Create a freshly initialized raffle in the open state
    pub fn new(
        oracle_authority: Pubkey,
        entrance_fee: u64,
        interval: i64,
        now: UnixTimestamp,
    ) -> Self {
        Self {
            is_initialized: true,
            state: RaffleState::Open,
            oracle_authority,
            entrance_fee,
            interval,
            last_timestamp: now,
            pot_lamports: 0,
            player_count: 0,
            players: [Pubkey::default(); MAX_PLAYERS],
            has_pending_request: false,
            pending_request_id: 0,
            request_counter: 0,
            recent_winner: Pubkey::default(),
        }
    }

    /// True iff all four readiness conditions hold: the round is open, at
    /// least one player entered, the pot is funded, and the interval elapsed
    pub fn upkeep_needed(&self, now: UnixTimestamp) -> bool {
        self.state == RaffleState::Open
            && self.player_count > 0
            && self.pot_lamports > 0
            && now.saturating_sub(self.last_timestamp) >= self.interval
    }

    /// Append an entrant to the player list
    pub fn push_player(&mut self, player: Pubkey) -> Result<(), RaffleError> {
        let slot = self.player_count as usize;
        if slot >= MAX_PLAYERS {
            return Err(RaffleError::RoundFull);
        }
        self.players[slot] = player;
        self.player_count += 1;
        Ok(())
    }

    /// Add an entry payment to the pot
    pub fn add_to_pot(&mut self, amount: u64) -> Result<(), ProgramError> {
        self.pot_lamports = self
            .pot_lamports
            .checked_add(amount)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Player at `index`, in entry order
    pub fn player(&self, index: u32) -> Result<Pubkey, RaffleError> {
        if index >= self.player_count {
            return Err(RaffleError::IndexOutOfRange);
        }
        Ok(self.players[index as usize])
    }

    /// Winner of the last resolved round, if any
    pub fn recent_winner(&self) -> Option<Pubkey> {
        if self.recent_winner == Pubkey::default() {
            None
        } else {
            Some(self.recent_winner)
        }
    }

    /// Correlation id of the outstanding randomness request, if any
    pub fn pending_request(&self) -> Option<u64> {
        if self.has_pending_request {
            Some(self.pending_request_id)
        } else {
            None
        }
    }

    /// Clear the player list and zero the pot for the next round
    pub fn reset(&mut self) {
        self.players = [Pubkey::default(); MAX_PLAYERS];
        self.player_count = 0;
        self.pot_lamports = 0;
    }
}

/// Derive the raffle account PDA
pub fn find_raffle_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[RAFFLE_SEED], program_id)
}

impl Sealed for Raffle {}

impl IsInitialized for Raffle {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

const PLAYERS_LEN: usize = PUBKEY_BYTES * MAX_PLAYERS;

impl Pack for Raffle {
    const LEN: usize = 1 + 1 + 32 + 8 + 8 + 8 + 8 + 4 + PLAYERS_LEN + 1 + 8 + 8 + 32;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, Raffle::LEN];
        let (
            is_initialized,
            state,
            oracle_authority,
            entrance_fee,
            interval,
            last_timestamp,
            pot_lamports,
            player_count,
            players_flat,
            has_pending_request,
            pending_request_id,
            request_counter,
            recent_winner,
        ) = array_refs![src, 1, 1, 32, 8, 8, 8, 8, 4, PLAYERS_LEN, 1, 8, 8, 32];

        let state = RaffleState::try_from(state[0])
            .map_err(|_| ProgramError::InvalidAccountData)?;

        let mut players = [Pubkey::default(); MAX_PLAYERS];
        for (i, slot) in players.iter_mut().enumerate() {
            *slot = Pubkey::new_from_array(*array_ref![
                players_flat,
                i * PUBKEY_BYTES,
                PUBKEY_BYTES
            ]);
        }

        let player_count = u32::from_le_bytes(*player_count);
        if player_count as usize > MAX_PLAYERS {
            return Err(ProgramError::InvalidAccountData);
        }

        Ok(Raffle {
            is_initialized: is_initialized[0] != 0,
            state,
            oracle_authority: Pubkey::new_from_array(*oracle_authority),
            entrance_fee: u64::from_le_bytes(*entrance_fee),
            interval: i64::from_le_bytes(*interval),
            last_timestamp: UnixTimestamp::from_le_bytes(*last_timestamp),
            pot_lamports: u64::from_le_bytes(*pot_lamports),
            player_count,
            players,
            has_pending_request: has_pending_request[0] != 0,
            pending_request_id: u64::from_le_bytes(*pending_request_id),
            request_counter: u64::from_le_bytes(*request_counter),
            recent_winner: Pubkey::new_from_array(*recent_winner),
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, Raffle::LEN];
        let (
            is_initialized_dst,
            state_dst,
            oracle_authority_dst,
            entrance_fee_dst,
            interval_dst,
            last_timestamp_dst,
            pot_lamports_dst,
            player_count_dst,
            players_dst,
            has_pending_request_dst,
            pending_request_id_dst,
            request_counter_dst,
            recent_winner_dst,
        ) = mut_array_refs![dst, 1, 1, 32, 8, 8, 8, 8, 4, PLAYERS_LEN, 1, 8, 8, 32];

        is_initialized_dst[0] = self.is_initialized as u8;
        state_dst[0] = self.state.into();
        oracle_authority_dst.copy_from_slice(self.oracle_authority.as_ref());
        *entrance_fee_dst = self.entrance_fee.to_le_bytes();
        *interval_dst = self.interval.to_le_bytes();
        *last_timestamp_dst = self.last_timestamp.to_le_bytes();
        *pot_lamports_dst = self.pot_lamports.to_le_bytes();
        *player_count_dst = self.player_count.to_le_bytes();
        for (i, player) in self.players.iter().enumerate() {
            players_dst[i * PUBKEY_BYTES..(i + 1) * PUBKEY_BYTES]
                .copy_from_slice(player.as_ref());
        }
        has_pending_request_dst[0] = self.has_pending_request as u8;
        *pending_request_id_dst = self.pending_request_id.to_le_bytes();
        *request_counter_dst = self.request_counter.to_le_bytes();
        recent_winner_dst.copy_from_slice(self.recent_winner.as_ref());
    }
}
