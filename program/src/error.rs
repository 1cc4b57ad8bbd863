use solana_program::{
    decode_error::DecodeError, msg, program_error::PrintProgramError, program_error::ProgramError,
};
use thiserror::Error;

/// Errors that may be returned by the raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstructionData,

    /// Raffle account already holds an initialized raffle
    #[error("Raffle already initialized")]
    AlreadyInitialized,

    /// Entrance fee must be non-zero
    #[error("Entrance fee must be greater than zero")]
    InvalidEntranceFee,

    /// Payment below the entrance fee
    #[error("Not enough lamports entered")]
    NotEnoughEntered,

    /// Raffle is calculating a winner
    #[error("Raffle is not open")]
    NotOpen,

    /// No room left in the player list
    #[error("Raffle is full")]
    RaffleFull,

    #[error("Upkeep not needed")]
    UpkeepNotNeeded,

    /// Fulfillment not signed by the configured coordinator
    #[error("Only the coordinator can fulfill randomness")]
    OnlyCoordinatorCanFulfill,

    /// Request id does not match the outstanding request
    #[error("Nonexistent request")]
    NonexistentRequest,

    #[error("No random words supplied")]
    NoRandomWords,

    /// Winner account does not match the drawn player
    #[error("Winner account does not match the selected player")]
    WinnerAccountMismatch,

    /// Prize could not be moved to the winner
    #[error("Transfer failed")]
    TransferFailed,

    #[error("Player index out of bounds")]
    PlayerIndexOutOfBounds,
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
