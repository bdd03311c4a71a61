// Autoraffle
// A self-running raffle on Solana: automation cranks close each round and
// an external randomness oracle draws the winner

pub mod error;
pub mod instruction;
pub mod processor;
pub mod state;
pub mod vrf;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;

use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey,
};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    processor::Processor::process(program_id, accounts, instruction_data)
}
