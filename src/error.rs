use solana_program::{
    decode_error::DecodeError, msg, program_error::PrintProgramError,
    program_error::ProgramError,
};
use thiserror::Error;

/// Errors that may be returned by the raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum RaffleError {
    /// Entry payment is below the entrance fee
    #[error("Entry payment is below the entrance fee")]
    InsufficientPayment,

    /// Round is not accepting entries
    #[error("Round is not open")]
    RoundNotOpen,

    /// Upkeep conditions do not hold
    #[error("Upkeep is not needed")]
    UpkeepNotNeeded,

    /// Fulfillment does not match the pending randomness request
    #[error("Unknown randomness request")]
    UnknownRequest,

    /// Player index is out of range
    #[error("Player index out of range")]
    IndexOutOfRange,

    /// Round has reached its player capacity
    #[error("Round is full")]
    RoundFull,

    /// Fulfillment was not signed by the configured oracle authority
    #[error("Invalid oracle authority")]
    InvalidOracleAuthority,

    /// Winner account does not match the drawn player
    #[error("Winner account does not match the drawn player")]
    WinnerMismatch,

    /// Oracle delivered no random values
    #[error("Empty randomness delivery")]
    EmptyRandomness,

    /// Prize transfer could not be completed
    #[error("Payout failed")]
    PayoutFailed,
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for RaffleError {
    fn type_of() -> &'static str {
        "Raffle Error"
    }
}

impl PrintProgramError for RaffleError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
