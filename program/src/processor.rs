use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, set_return_data},
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack},
    pubkey::Pubkey,
    rent::Rent,
    system_instruction, system_program,
    sysvar::Sysvar,
};

use crate::{
    error::RaffleError,
    events::{self, RaffleEnter, RequestedRaffleWinner, WinnerPicked},
    instruction::RaffleInstruction,
    state::{winner_index, Raffle, RaffleParams, RaffleState, MAX_PLAYERS},
    utils::lamports_to_sol,
};

/// Program state handler.
pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;

        match instruction {
            RaffleInstruction::InitializeRaffle { params } => {
                msg!("Instruction: Initialize Raffle");
                Self::process_initialize_raffle(program_id, accounts, params)
            }
            RaffleInstruction::EnterRaffle { amount } => {
                msg!("Instruction: Enter Raffle");
                Self::process_enter_raffle(program_id, accounts, amount)
            }
            RaffleInstruction::CheckUpkeep { .. } => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(program_id, accounts)
            }
            RaffleInstruction::PerformUpkeep { .. } => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(program_id, accounts)
            }
            RaffleInstruction::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Fulfill Random Words");
                Self::process_fulfill_random_words(program_id, accounts, request_id, &random_words)
            }
        }
    }

    fn process_initialize_raffle(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        params: RaffleParams,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !payer_info.is_signer || !raffle_info.is_signer {
            msg!("Payer and raffle account must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if params.entrance_fee == 0 {
            msg!("Entrance fee must be greater than zero");
            return Err(RaffleError::InvalidEntranceFee.into());
        }

        if raffle_info.owner == program_id {
            let existing = Raffle::unpack_unchecked(&raffle_info.data.borrow())?;
            if existing.is_initialized() {
                msg!("Raffle account {} is already initialized", raffle_info.key);
                return Err(RaffleError::AlreadyInitialized.into());
            }
        } else {
            if *system_program_info.key != system_program::id() {
                return Err(ProgramError::IncorrectProgramId);
            }
            let rent = Rent::get()?;
            invoke(
                &system_instruction::create_account(
                    payer_info.key,
                    raffle_info.key,
                    rent.minimum_balance(Raffle::LEN),
                    Raffle::LEN as u64,
                    program_id,
                ),
                &[
                    payer_info.clone(),
                    raffle_info.clone(),
                    system_program_info.clone(),
                ],
            )?;
        }

        let now = Clock::get()?.unix_timestamp;
        let raffle = Raffle::new(&params, *coordinator_info.key, now);
        Raffle::pack(raffle, &mut raffle_info.data.borrow_mut())?;

        msg!(
            "Raffle initialized: fee={} SOL interval={}s subscription={} coordinator={}",
            lamports_to_sol(params.entrance_fee),
            params.interval,
            params.subscription_id,
            coordinator_info.key
        );
        Ok(())
    }

    fn process_enter_raffle(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        amount: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Self::load_raffle(program_id, raffle_info)?;

        if amount < raffle.entrance_fee {
            msg!("Sent {} lamports, entrance fee is {}", amount, raffle.entrance_fee);
            return Err(RaffleError::NotEnoughEntered.into());
        }
        if raffle.raffle_state != RaffleState::Open {
            return Err(RaffleError::NotOpen.into());
        }
        if raffle.players.len() >= MAX_PLAYERS {
            msg!("Raffle already holds {} players", MAX_PLAYERS);
            return Err(RaffleError::RaffleFull.into());
        }

        invoke(
            &system_instruction::transfer(player_info.key, raffle_info.key, amount),
            &[
                player_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        raffle.players.push(*player_info.key);
        let player_count = raffle.players.len();
        Raffle::pack(raffle, &mut raffle_info.data.borrow_mut())?;

        msg!("Player {} entered, {} players in round", player_info.key, player_count);
        events::emit(&RaffleEnter {
            raffle: *raffle_info.key,
            player: *player_info.key,
            amount,
        })
    }

    fn process_check_upkeep(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        let raffle = Self::load_raffle(program_id, raffle_info)?;
        let upkeep_needed = Self::upkeep_needed(&raffle, raffle_info)?;

        // perform data is always empty
        set_return_data(&[upkeep_needed as u8]);
        msg!("upkeep_needed={}", upkeep_needed);
        Ok(())
    }

    fn process_perform_upkeep(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let keeper_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        if !keeper_info.is_signer {
            msg!("Keeper must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Self::load_raffle(program_id, raffle_info)?;

        if !Self::upkeep_needed(&raffle, raffle_info)? {
            msg!(
                "Upkeep not needed: balance={} players={} state={}",
                Raffle::pot(raffle_info.lamports(), &Rent::get()?),
                raffle.players.len(),
                u8::from(raffle.raffle_state)
            );
            return Err(RaffleError::UpkeepNotNeeded.into());
        }

        let request_id = raffle
            .request_nonce
            .checked_add(1)
            .ok_or(ProgramError::InvalidAccountData)?;
        raffle.request_nonce = request_id;
        raffle.pending_request_id = request_id;
        raffle.raffle_state = RaffleState::Calculating;

        let request = RequestedRaffleWinner {
            raffle: *raffle_info.key,
            request_id,
            subscription_id: raffle.subscription_id,
            gas_lane: raffle.gas_lane,
            request_confirmations: raffle.request_confirmations(),
            callback_gas_limit: raffle.callback_gas_limit,
            num_words: raffle.num_words(),
        };
        Raffle::pack(raffle, &mut raffle_info.data.borrow_mut())?;

        events::emit(&request)
    }

    fn process_fulfill_random_words(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: &[u64],
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let coordinator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        let mut raffle = Self::load_raffle(program_id, raffle_info)?;

        if !coordinator_info.is_signer || *coordinator_info.key != raffle.coordinator {
            msg!("Fulfillment must be signed by coordinator {}", raffle.coordinator);
            return Err(RaffleError::OnlyCoordinatorCanFulfill.into());
        }

        if request_id == 0
            || raffle.raffle_state != RaffleState::Calculating
            || raffle.pending_request_id != request_id
        {
            msg!("No outstanding request with id {}", request_id);
            return Err(RaffleError::NonexistentRequest.into());
        }

        let random_word = *random_words.first().ok_or(RaffleError::NoRandomWords)?;
        let index =
            winner_index(random_word, raffle.players.len()).ok_or(ProgramError::InvalidAccountData)?;
        let winner = raffle.player(index)?;
        msg!("Random word {} selects player {} of {}", random_word, index, raffle.players.len());

        if *winner_info.key != winner {
            msg!("Expected winner account {}, got {}", winner, winner_info.key);
            return Err(RaffleError::WinnerAccountMismatch.into());
        }

        let prize = Raffle::pot(raffle_info.lamports(), &Rent::get()?);
        let raffle_lamports = raffle_info
            .lamports()
            .checked_sub(prize)
            .ok_or(RaffleError::TransferFailed)?;
        let winner_lamports = winner_info
            .lamports()
            .checked_add(prize)
            .ok_or(RaffleError::TransferFailed)?;
        **raffle_info.try_borrow_mut_lamports()? = raffle_lamports;
        **winner_info.try_borrow_mut_lamports()? = winner_lamports;

        raffle.players.clear();
        raffle.raffle_state = RaffleState::Open;
        raffle.latest_timestamp = Clock::get()?.unix_timestamp;
        raffle.recent_winner = winner;
        raffle.pending_request_id = 0;
        Raffle::pack(raffle, &mut raffle_info.data.borrow_mut())?;

        events::emit(&WinnerPicked {
            raffle: *raffle_info.key,
            winner,
            prize,
            request_id,
        })
    }

    fn load_raffle(program_id: &Pubkey, raffle_info: &AccountInfo) -> Result<Raffle, ProgramError> {
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by the program");
            return Err(ProgramError::IncorrectProgramId);
        }
        Raffle::unpack(&raffle_info.data.borrow())
    }

    fn upkeep_needed(raffle: &Raffle, raffle_info: &AccountInfo) -> Result<bool, ProgramError> {
        let now = Clock::get()?.unix_timestamp;
        let pot = Raffle::pot(raffle_info.lamports(), &Rent::get()?);
        Ok(raffle.upkeep_needed(now, pot))
    }
}
