use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::state::find_raffle_address;

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub enum RaffleInstruction {
    /// Create and initialize the raffle round account
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` Payer funding the raffle account
    /// 1. `[writable]` The raffle account (PDA, seed "raffle")
    /// 2. `[]` Oracle authority allowed to deliver fulfillments
    /// 3. `[]` The system program
    Initialize {
        /// Minimum payment to enter, in lamports
        entrance_fee: u64,
        /// Minimum seconds between round resolutions
        interval: i64,
    },

    /// Enter the current round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The entering participant
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The system program
    Enter {
        /// Payment in lamports; must be at least the entrance fee
        amount: u64,
    },

    /// Evaluate the upkeep predicate; the result is published as one byte
    /// of return data (read-only, callable by anyone at any time)
    ///
    /// Accounts expected:
    /// 0. `[]` The raffle account
    CheckUpkeep,

    /// Close the round and request randomness from the oracle; the
    /// correlation id is published as return data and in the program log
    ///
    /// Accounts expected:
    /// 0. `[writable]` The raffle account
    PerformUpkeep,

    /// Oracle callback delivering the requested random values
    ///
    /// Accounts expected:
    /// 0. `[signer]` The oracle authority configured at initialization
    /// 1. `[writable]` The raffle account
    /// 2. `[writable]` The drawn winner's account, credited with the pot
    FulfillRandomness {
        /// Correlation id echoed from the request
        request_id: u64,
        /// Delivered random values; only the first is consumed
        random_values: Vec<u64>,
    },
}

impl RaffleInstruction {
    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|_| ProgramError::InvalidInstructionData)
    }

    /// Packs a RaffleInstruction into a byte buffer
    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        borsh::to_vec(self).map_err(|_| ProgramError::InvalidInstructionData)
    }
}

/// Create an initialize instruction
pub fn initialize(
    program_id: &Pubkey,
    payer: &Pubkey,
    oracle_authority: &Pubkey,
    entrance_fee: u64,
    interval: i64,
) -> Result<Instruction, ProgramError> {
    let (raffle, _) = find_raffle_address(program_id);
    let data = RaffleInstruction::Initialize {
        entrance_fee,
        interval,
    }
    .pack()?;

    let accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new(raffle, false),
        AccountMeta::new_readonly(*oracle_authority, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create an enter instruction
pub fn enter(
    program_id: &Pubkey,
    player: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let (raffle, _) = find_raffle_address(program_id);
    let data = RaffleInstruction::Enter { amount }.pack()?;

    let accounts = vec![
        AccountMeta::new(*player, true),
        AccountMeta::new(raffle, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create a check_upkeep instruction
pub fn check_upkeep(program_id: &Pubkey) -> Result<Instruction, ProgramError> {
    let (raffle, _) = find_raffle_address(program_id);
    let data = RaffleInstruction::CheckUpkeep.pack()?;

    let accounts = vec![AccountMeta::new_readonly(raffle, false)];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create a perform_upkeep instruction
pub fn perform_upkeep(program_id: &Pubkey) -> Result<Instruction, ProgramError> {
    let (raffle, _) = find_raffle_address(program_id);
    let data = RaffleInstruction::PerformUpkeep.pack()?;

    let accounts = vec![AccountMeta::new(raffle, false)];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create a fulfill_randomness instruction
pub fn fulfill_randomness(
    program_id: &Pubkey,
    oracle_authority: &Pubkey,
    winner: &Pubkey,
    request_id: u64,
    random_values: Vec<u64>,
) -> Result<Instruction, ProgramError> {
    let (raffle, _) = find_raffle_address(program_id);
    let data = RaffleInstruction::FulfillRandomness {
        request_id,
        random_values,
    }
    .pack()?;

    let accounts = vec![
        AccountMeta::new_readonly(*oracle_authority, true),
        AccountMeta::new(raffle, false),
        AccountMeta::new(*winner, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_data_round_trip() {
        let original = RaffleInstruction::FulfillRandomness {
            request_id: 3,
            random_values: vec![7, 11],
        };
        let packed = original.pack().unwrap();
        assert_eq!(RaffleInstruction::unpack(&packed).unwrap(), original);

        let enter = RaffleInstruction::Enter { amount: 100 };
        let packed = enter.pack().unwrap();
        assert_eq!(RaffleInstruction::unpack(&packed).unwrap(), enter);
    }

    #[test]
    fn unpack_rejects_garbage() {
        assert!(RaffleInstruction::unpack(&[]).is_err());
        assert!(RaffleInstruction::unpack(&[9, 9, 9]).is_err());
    }
}
