use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed, set_return_data},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

use crate::error::RaffleError;
use crate::instruction::RaffleInstruction;
use crate::state::{find_raffle_address, Raffle, RaffleState, RAFFLE_SEED};
use crate::vrf;

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;

        match instruction {
            RaffleInstruction::Initialize {
                entrance_fee,
                interval,
            } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(accounts, entrance_fee, interval, program_id)
            }
            RaffleInstruction::Enter { amount } => {
                msg!("Instruction: Enter");
                Self::process_enter(accounts, amount, program_id)
            }
            RaffleInstruction::CheckUpkeep => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(accounts, program_id)
            }
            RaffleInstruction::PerformUpkeep => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(accounts, program_id)
            }
            RaffleInstruction::FulfillRandomness {
                request_id,
                random_values,
            } => {
                msg!("Instruction: Fulfill Randomness");
                Self::process_fulfill_randomness(accounts, request_id, &random_values, program_id)
            }
        }
    }

    /// Create the raffle round account and put it in the open state.
    /// The entrance fee, interval and oracle authority are immutable
    /// afterwards.
    fn process_initialize(
        accounts: &[AccountInfo],
        entrance_fee: u64,
        interval: i64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let oracle_authority_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !payer_info.is_signer {
            msg!("Payer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let (expected_raffle_pubkey, bump_seed) = find_raffle_address(program_id);
        if *raffle_info.key != expected_raffle_pubkey {
            msg!("Invalid raffle account address");
            return Err(ProgramError::InvalidArgument);
        }

        if raffle_info.owner == program_id {
            let raffle = Raffle::unpack_unchecked(&raffle_info.data.borrow())?;
            if raffle.is_initialized {
                msg!("Raffle account is already initialized");
                return Err(ProgramError::AccountAlreadyInitialized);
            }
        } else {
            let rent = Rent::get()?;
            let rent_lamports = rent.minimum_balance(Raffle::LEN);

            invoke_signed(
                &system_instruction::create_account(
                    payer_info.key,
                    raffle_info.key,
                    rent_lamports,
                    Raffle::LEN as u64,
                    program_id,
                ),
                &[
                    payer_info.clone(),
                    raffle_info.clone(),
                    system_program_info.clone(),
                ],
                &[&[RAFFLE_SEED, &[bump_seed]]],
            )?;
        }

        let clock = Clock::get()?;
        let raffle = Raffle::new(
            *oracle_authority_info.key,
            entrance_fee,
            interval,
            clock.unix_timestamp,
        );
        Raffle::pack(raffle, &mut raffle_info.data.borrow_mut())?;

        msg!(
            "raffle initialized: entrance_fee={} interval={} oracle={}",
            entrance_fee,
            interval,
            oracle_authority_info.key
        );
        Ok(())
    }

    /// Record an entry: the participant pays `amount` lamports into the
    /// raffle account and takes a slot in the current round
    fn process_enter(
        accounts: &[AccountInfo],
        amount: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::unpack(&raffle_info.data.borrow())?;

        if raffle.state != RaffleState::Open {
            msg!("Round is not open for entries");
            return Err(RaffleError::RoundNotOpen.into());
        }

        if amount < raffle.entrance_fee {
            msg!(
                "Payment of {} lamports is below the entrance fee of {}",
                amount,
                raffle.entrance_fee
            );
            return Err(RaffleError::InsufficientPayment.into());
        }

        raffle.push_player(*player_info.key)?;
        raffle.add_to_pot(amount)?;

        invoke(
            &system_instruction::transfer(player_info.key, raffle_info.key, amount),
            &[
                player_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        Raffle::pack(raffle, &mut raffle_info.data.borrow_mut())?;

        msg!("raffle entered: player={} amount={}", player_info.key, amount);
        Ok(())
    }

    /// Evaluate the upkeep predicate and publish the result as return data.
    /// Read-only; safe to call at any time by any actor.
    fn process_check_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let raffle = Raffle::unpack(&raffle_info.data.borrow())?;
        let clock = Clock::get()?;
        let upkeep_needed = raffle.upkeep_needed(clock.unix_timestamp);

        set_return_data(&[upkeep_needed as u8]);
        msg!("upkeep needed: {}", upkeep_needed);
        Ok(())
    }

    /// Close the round and submit the randomness request. Upkeep conditions
    /// are re-checked at call time; a prior check_upkeep result is never
    /// trusted.
    fn process_perform_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::unpack(&raffle_info.data.borrow())?;
        let clock = Clock::get()?;

        if !raffle.upkeep_needed(clock.unix_timestamp) {
            msg!("Upkeep conditions do not hold");
            return Err(RaffleError::UpkeepNotNeeded.into());
        }

        let request_id = vrf::next_request_id(raffle.request_counter)?;
        raffle.request_counter = request_id;
        raffle.has_pending_request = true;
        raffle.pending_request_id = request_id;
        raffle.state = RaffleState::Calculating;

        Raffle::pack(raffle, &mut raffle_info.data.borrow_mut())?;

        set_return_data(&request_id.to_le_bytes());
        msg!(
            "randomness requested: subscription={} request_id={} num_values={}",
            raffle_info.key,
            request_id,
            vrf::RANDOM_VALUES_PER_REQUEST
        );
        Ok(())
    }

    /// Oracle callback: validate the correlation id, draw the winner, reset
    /// the round and pay out the pot. All round bookkeeping is written back
    /// before any lamports move; an observer reentered through the payout
    /// sees a fully reset round.
    fn process_fulfill_randomness(
        accounts: &[AccountInfo],
        request_id: u64,
        random_values: &[u64],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        if !oracle_info.is_signer {
            msg!("Oracle authority must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::unpack(&raffle_info.data.borrow())?;

        if *oracle_info.key != raffle.oracle_authority {
            msg!("Fulfillment not signed by the configured oracle authority");
            return Err(RaffleError::InvalidOracleAuthority.into());
        }

        if raffle.pending_request() != Some(request_id) {
            msg!("No pending request with id {}", request_id);
            return Err(RaffleError::UnknownRequest.into());
        }

        let random_value = vrf::first_random_value(random_values)?;
        let index = vrf::winner_index(random_value, raffle.player_count);
        let winner = raffle.player(index)?;

        if *winner_info.key != winner {
            msg!("Expected winner account {}", winner);
            return Err(RaffleError::WinnerMismatch.into());
        }

        let prize = raffle.pot_lamports;
        let clock = Clock::get()?;

        raffle.recent_winner = winner;
        raffle.has_pending_request = false;
        raffle.pending_request_id = 0;
        raffle.reset();
        raffle.last_timestamp = clock.unix_timestamp;
        raffle.state = RaffleState::Open;
        Raffle::pack(raffle, &mut raffle_info.data.borrow_mut())?;

        let raffle_balance = raffle_info.lamports();
        **raffle_info.lamports.borrow_mut() = raffle_balance
            .checked_sub(prize)
            .ok_or(RaffleError::PayoutFailed)?;
        **winner_info.lamports.borrow_mut() = winner_info
            .lamports()
            .checked_add(prize)
            .ok_or(RaffleError::PayoutFailed)?;

        msg!("winner picked: winner={} prize={}", winner, prize);
        Ok(())
    }
}
