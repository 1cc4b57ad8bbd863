use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use solana_program::{
    clock::UnixTimestamp,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::{Pubkey, PUBKEY_BYTES},
    rent::Rent,
};

use crate::error::RaffleError;

/// Maximum number of entrants a single round can hold
pub const MAX_PLAYERS: usize = 64;
/// Random words requested per draw
pub const NUM_WORDS: u32 = 1;
/// Block confirmations the oracle waits for before answering
pub const REQUEST_CONFIRMATIONS: u16 = 3;

const HEADER_LEN: usize = 1 + 1 + 32 + 8 + 8 + 8 + 32 + 4 + 8 + 32 + 8 + 8 + 2;
const PLAYERS_LEN: usize = MAX_PLAYERS * PUBKEY_BYTES;

/// State of a raffle round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleState {
    /// Accepting entries
    Open,
    /// Waiting for the oracle to deliver randomness
    Calculating,
}

impl TryFrom<u8> for RaffleState {
    type Error = ProgramError;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            0 => Ok(RaffleState::Open),
            1 => Ok(RaffleState::Calculating),
            _ => Err(ProgramError::InvalidAccountData),
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

/// Parameters fixed when a raffle is created
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaffleParams {
    /// Minimum payment per entry, in lamports
    pub entrance_fee: u64,
    /// Seconds that must pass between draws
    pub interval: u64,
    /// Oracle subscription paying for randomness requests
    pub subscription_id: u64,
    /// Compute budget the oracle should reserve for the callback
    pub callback_gas_limit: u32,
    /// Oracle key hash identifying the price lane
    pub gas_lane: [u8; 32],
}

/// Raffle account data
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raffle {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Current state of the round
    pub raffle_state: RaffleState,
    /// Oracle identity allowed to deliver random words
    pub coordinator: Pubkey,
    pub entrance_fee: u64,
    pub interval: u64,
    pub subscription_id: u64,
    pub gas_lane: [u8; 32],
    pub callback_gas_limit: u32,
    /// Creation time, then the time of the last winner selection
    pub latest_timestamp: UnixTimestamp,
    /// Winner of the last round (default until the first draw)
    pub recent_winner: Pubkey,
    /// Counter used to issue request ids, first id is 1
    pub request_nonce: u64,
    /// Outstanding request id, 0 when none is pending
    pub pending_request_id: u64,
    /// Entrants of the current round in entry order
    pub players: Vec<Pubkey>,
}

impl Raffle {
    pub fn new(params: &RaffleParams, coordinator: Pubkey, now: UnixTimestamp) -> Self {
        Self {
            is_initialized: true,
            raffle_state: RaffleState::Open,
            coordinator,
            entrance_fee: params.entrance_fee,
            interval: params.interval,
            subscription_id: params.subscription_id,
            gas_lane: params.gas_lane,
            callback_gas_limit: params.callback_gas_limit,
            latest_timestamp: now,
            recent_winner: Pubkey::default(),
            request_nonce: 0,
            pending_request_id: 0,
            players: Vec::with_capacity(MAX_PLAYERS),
        }
    }

    /// Whether the keeper should trigger a draw.
    ///
    /// True only when the interval has elapsed, the raffle is open, at
    /// least one player entered and the pot is non-empty.
    pub fn upkeep_needed(&self, now: UnixTimestamp, pot: u64) -> bool {
        let is_open = self.raffle_state == RaffleState::Open;
        let time_passed = self.interval_elapsed(now);
        let has_players = !self.players.is_empty();
        let has_balance = pot > 0;
        time_passed && is_open && has_players && has_balance
    }

    fn interval_elapsed(&self, now: UnixTimestamp) -> bool {
        match now.checked_sub(self.latest_timestamp) {
            Some(elapsed) if elapsed >= 0 => elapsed as u64 >= self.interval,
            _ => false,
        }
    }

    pub fn entrance_fee(&self) -> u64 {
        self.entrance_fee
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn subscription_id(&self) -> u64 {
        self.subscription_id
    }

    pub fn raffle_state(&self) -> RaffleState {
        self.raffle_state
    }

    pub fn recent_winner(&self) -> Pubkey {
        self.recent_winner
    }

    pub fn latest_timestamp(&self) -> UnixTimestamp {
        self.latest_timestamp
    }

    pub fn pending_request_id(&self) -> u64 {
        self.pending_request_id
    }

    pub fn number_of_players(&self) -> usize {
        self.players.len()
    }

    /// Entrant at `index` in the current round
    pub fn player(&self, index: usize) -> Result<Pubkey, RaffleError> {
        self.players
            .get(index)
            .copied()
            .ok_or(RaffleError::PlayerIndexOutOfBounds)
    }

    pub fn num_words(&self) -> u32 {
        NUM_WORDS
    }

    pub fn request_confirmations(&self) -> u16 {
        REQUEST_CONFIRMATIONS
    }

    /// Lamports held for the prize: everything above the rent-exempt reserve.
    pub fn pot(account_lamports: u64, rent: &Rent) -> u64 {
        account_lamports.saturating_sub(rent.minimum_balance(Raffle::LEN))
    }
}

/// Map a random word onto the player list.
pub fn winner_index(random_word: u64, player_count: usize) -> Option<usize> {
    if player_count == 0 {
        return None;
    }
    Some((random_word % player_count as u64) as usize)
}

impl Sealed for Raffle {}

impl IsInitialized for Raffle {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for Raffle {
    const LEN: usize = HEADER_LEN + PLAYERS_LEN;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, Raffle::LEN];
        let (
            is_initialized,
            raffle_state,
            coordinator,
            entrance_fee,
            interval,
            subscription_id,
            gas_lane,
            callback_gas_limit,
            latest_timestamp,
            recent_winner,
            request_nonce,
            pending_request_id,
            player_count,
            players_src,
        ) = array_refs![src, 1, 1, 32, 8, 8, 8, 32, 4, 8, 32, 8, 8, 2, PLAYERS_LEN];

        let is_initialized = match is_initialized {
            [0] => false,
            [1] => true,
            _ => return Err(ProgramError::InvalidAccountData),
        };

        let player_count = u16::from_le_bytes(*player_count) as usize;
        if player_count > MAX_PLAYERS {
            return Err(ProgramError::InvalidAccountData);
        }
        let players = (0..player_count)
            .map(|i| Pubkey::new_from_array(*array_ref![players_src, i * PUBKEY_BYTES, PUBKEY_BYTES]))
            .collect();

        Ok(Raffle {
            is_initialized,
            raffle_state: RaffleState::try_from(raffle_state[0])?,
            coordinator: Pubkey::new_from_array(*coordinator),
            entrance_fee: u64::from_le_bytes(*entrance_fee),
            interval: u64::from_le_bytes(*interval),
            subscription_id: u64::from_le_bytes(*subscription_id),
            gas_lane: *gas_lane,
            callback_gas_limit: u32::from_le_bytes(*callback_gas_limit),
            latest_timestamp: UnixTimestamp::from_le_bytes(*latest_timestamp),
            recent_winner: Pubkey::new_from_array(*recent_winner),
            request_nonce: u64::from_le_bytes(*request_nonce),
            pending_request_id: u64::from_le_bytes(*pending_request_id),
            players,
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, Raffle::LEN];
        let (
            is_initialized_dst,
            raffle_state_dst,
            coordinator_dst,
            entrance_fee_dst,
            interval_dst,
            subscription_id_dst,
            gas_lane_dst,
            callback_gas_limit_dst,
            latest_timestamp_dst,
            recent_winner_dst,
            request_nonce_dst,
            pending_request_id_dst,
            player_count_dst,
            players_dst,
        ) = mut_array_refs![dst, 1, 1, 32, 8, 8, 8, 32, 4, 8, 32, 8, 8, 2, PLAYERS_LEN];

        is_initialized_dst[0] = self.is_initialized as u8;
        raffle_state_dst[0] = self.raffle_state.into();
        coordinator_dst.copy_from_slice(self.coordinator.as_ref());
        *entrance_fee_dst = self.entrance_fee.to_le_bytes();
        *interval_dst = self.interval.to_le_bytes();
        *subscription_id_dst = self.subscription_id.to_le_bytes();
        gas_lane_dst.copy_from_slice(&self.gas_lane);
        *callback_gas_limit_dst = self.callback_gas_limit.to_le_bytes();
        *latest_timestamp_dst = self.latest_timestamp.to_le_bytes();
        recent_winner_dst.copy_from_slice(self.recent_winner.as_ref());
        *request_nonce_dst = self.request_nonce.to_le_bytes();
        *pending_request_id_dst = self.pending_request_id.to_le_bytes();
        // Capacity is enforced on entry; never write past the fixed region.
        let count = self.players.len().min(MAX_PLAYERS);
        *player_count_dst = (count as u16).to_le_bytes();
        players_dst.fill(0);
        for (slot, player) in players_dst
            .chunks_exact_mut(PUBKEY_BYTES)
            .zip(self.players.iter().take(count))
        {
            slot.copy_from_slice(player.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RaffleParams {
        RaffleParams {
            entrance_fee: 10_000_000,
            interval: 30,
            subscription_id: 1,
            callback_gas_limit: 500_000,
            gas_lane: [7; 32],
        }
    }

    fn raffle_with_player() -> Raffle {
        let mut raffle = Raffle::new(&params(), Pubkey::new_unique(), 1_000);
        raffle.players.push(Pubkey::new_unique());
        raffle
    }

    #[test]
    fn upkeep_needed_when_all_conditions_hold() {
        let raffle = raffle_with_player();
        assert!(raffle.upkeep_needed(1_030, 10_000_000));
        assert!(raffle.upkeep_needed(1_031, 10_000_000));
    }

    #[test]
    fn upkeep_not_needed_when_any_condition_fails() {
        let raffle = raffle_with_player();
        assert!(!raffle.upkeep_needed(1_029, 10_000_000), "interval not elapsed");
        assert!(!raffle.upkeep_needed(1_031, 0), "empty pot");

        let mut calculating = raffle.clone();
        calculating.raffle_state = RaffleState::Calculating;
        assert!(!calculating.upkeep_needed(1_031, 10_000_000), "not open");

        let empty = Raffle::new(&params(), Pubkey::new_unique(), 1_000);
        assert!(!empty.upkeep_needed(1_031, 10_000_000), "no players");
    }

    #[test]
    fn clock_running_backwards_never_triggers_upkeep() {
        let raffle = raffle_with_player();
        assert!(!raffle.upkeep_needed(500, 10_000_000));
    }

    #[test]
    fn winner_index_wraps_over_players() {
        assert_eq!(winner_index(777, 1), Some(0));
        assert_eq!(winner_index(6, 4), Some(2));
        assert_eq!(winner_index(u64::MAX, 4), Some(3));
        assert_eq!(winner_index(5, 0), None);
    }

    #[test]
    fn player_lookup_out_of_range_fails() {
        let raffle = raffle_with_player();
        assert!(raffle.player(0).is_ok());
        assert_eq!(raffle.player(1), Err(RaffleError::PlayerIndexOutOfBounds));
    }

    #[test]
    fn pack_preserves_players_and_request() {
        let mut raffle = raffle_with_player();
        raffle.players.push(Pubkey::new_unique());
        raffle.raffle_state = RaffleState::Calculating;
        raffle.request_nonce = 3;
        raffle.pending_request_id = 3;

        let mut data = vec![0u8; Raffle::LEN];
        Raffle::pack(raffle.clone(), &mut data).unwrap();
        assert_eq!(Raffle::unpack(&data).unwrap(), raffle);
    }

    #[test]
    fn unpack_rejects_corrupt_player_count() {
        let mut data = vec![0u8; Raffle::LEN];
        Raffle::pack(raffle_with_player(), &mut data).unwrap();
        let count_offset = HEADER_LEN - 2;
        data[count_offset..HEADER_LEN].copy_from_slice(&(MAX_PLAYERS as u16 + 1).to_le_bytes());
        assert_eq!(Raffle::unpack(&data), Err(ProgramError::InvalidAccountData));
    }

    #[test]
    fn pot_excludes_rent_reserve() {
        let rent = Rent::default();
        let reserve = rent.minimum_balance(Raffle::LEN);
        assert_eq!(Raffle::pot(reserve, &rent), 0);
        assert_eq!(Raffle::pot(reserve + 42, &rent), 42);
    }
}
