use solana_program::native_token::LAMPORTS_PER_SOL;

/// Convert lamports to SOL (for display purposes)
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Convert a fraction of a SOL, given in thousandths, to lamports
pub const fn milli_sol_to_lamports(milli_sol: u64) -> u64 {
    milli_sol * (LAMPORTS_PER_SOL / 1_000)
}
