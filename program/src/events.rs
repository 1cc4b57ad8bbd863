//! Events emitted by the raffle program for off-chain keepers and the
//! randomness coordinator.
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{log::sol_log_data, msg, program_error::ProgramError, pubkey::Pubkey};
use std::fmt::Debug;

pub trait RaffleEvent: BorshSerialize + Debug {
    const NAME: &'static str;
}

/// Emitted when a player enters the current round
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct RaffleEnter {
    pub raffle: Pubkey,
    pub player: Pubkey,
    pub amount: u64,
}

impl RaffleEvent for RaffleEnter {
    const NAME: &'static str = "RaffleEnter";
}

/// Randomness request addressed to the coordinator. The coordinator
/// answers with `FulfillRandomWords` carrying the same `request_id`.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct RequestedRaffleWinner {
    pub raffle: Pubkey,
    pub request_id: u64,
    pub subscription_id: u64,
    pub gas_lane: [u8; 32],
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
}

impl RaffleEvent for RequestedRaffleWinner {
    const NAME: &'static str = "RequestedRaffleWinner";
}

/// Emitted once the pot has been paid out
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct WinnerPicked {
    pub raffle: Pubkey,
    pub winner: Pubkey,
    pub prize: u64,
    pub request_id: u64,
}

impl RaffleEvent for WinnerPicked {
    const NAME: &'static str = "WinnerPicked";
}

/// Log the event as `Program data: <name> <borsh payload>` and as a readable line.
pub fn emit<E: RaffleEvent>(event: &E) -> Result<(), ProgramError> {
    let payload = event.try_to_vec()?;
    sol_log_data(&[E::NAME.as_bytes(), &payload]);
    msg!("{:?}", event);
    Ok(())
}
