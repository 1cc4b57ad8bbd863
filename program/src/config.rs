//! Per-cluster deployment parameters.
//!
//! Development clusters have no live randomness coordinator; deployments
//! there provision a local coordinator priced with [`MockCoordinatorConfig`].
use solana_program::{pubkey, pubkey::Pubkey};

use crate::{state::RaffleParams, utils::milli_sol_to_lamports};

/// Clusters where a local coordinator is provisioned instead of the live one
pub const DEVELOPMENT_CLUSTERS: &[&str] = &["localnet", "localhost"];

/// Flat premium charged per randomness request (0.25 LINK in 18-decimal units)
pub const BASE_FEE: u128 = 250_000_000_000_000_000;
/// Oracle token per unit of gas used by the callback
pub const GAS_PRICE_PER_UNIT: u64 = 1_000_000_000;

/// Switchboard V2 oracle on devnet
pub const DEVNET_COORDINATOR: Pubkey = pubkey!("2TfB33aLaneQb5TNVwyDz3jSZXS6jdW2ARw1Dgf84XCG");
/// Switchboard V2 oracle on mainnet-beta
pub const MAINNET_COORDINATOR: Pubkey = pubkey!("SW1TCH7qEPTdLsDHRgPuMQjbQxKdH2aBStViMFnt64f");

const DEFAULT_GAS_LANE: [u8; 32] = [
    0xd8, 0x9b, 0x2b, 0xf1, 0x50, 0xe3, 0xb9, 0xe1, 0x34, 0x46, 0xe8, 0x5b, 0x71, 0xf3, 0xb2,
    0x7b, 0x2c, 0x28, 0x79, 0xe1, 0xa2, 0x4e, 0x5e, 0x81, 0x6a, 0x2e, 0xf7, 0x0b, 0x3a, 0x9b,
    0x2f, 0x85,
];

/// Pricing of the locally provisioned coordinator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockCoordinatorConfig {
    pub base_fee: u128,
    pub gas_price_per_unit: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: &'static str,
    pub entrance_fee: u64,
    pub interval: u64,
    pub callback_gas_limit: u32,
    pub gas_lane: [u8; 32],
    /// Subscription id; development clusters create one at deploy time
    pub subscription_id: Option<u64>,
    /// Live coordinator for the cluster; `None` means provision one locally
    pub coordinator: Option<Pubkey>,
    pub mock_coordinator: Option<MockCoordinatorConfig>,
}

impl NetworkConfig {
    pub fn is_development(&self) -> bool {
        is_development_cluster(self.name)
    }

    /// Arguments for `InitializeRaffle`, falling back to `subscription_id`
    /// when the cluster has no fixed subscription.
    pub fn raffle_params(&self, subscription_id: u64) -> RaffleParams {
        RaffleParams {
            entrance_fee: self.entrance_fee,
            interval: self.interval,
            subscription_id: self.subscription_id.unwrap_or(subscription_id),
            callback_gas_limit: self.callback_gas_limit,
            gas_lane: self.gas_lane,
        }
    }
}

pub fn is_development_cluster(cluster: &str) -> bool {
    DEVELOPMENT_CLUSTERS.contains(&cluster)
}

/// Deployment parameters for a cluster name, `None` for unknown clusters.
pub fn network_config(cluster: &str) -> Option<NetworkConfig> {
    let base = NetworkConfig {
        name: "localnet",
        entrance_fee: milli_sol_to_lamports(10),
        interval: 30,
        callback_gas_limit: 500_000,
        gas_lane: DEFAULT_GAS_LANE,
        subscription_id: None,
        coordinator: None,
        mock_coordinator: Some(MockCoordinatorConfig {
            base_fee: BASE_FEE,
            gas_price_per_unit: GAS_PRICE_PER_UNIT,
        }),
    };

    match cluster {
        "localnet" | "localhost" => Some(NetworkConfig { name: "localnet", ..base }),
        "devnet" => Some(NetworkConfig {
            name: "devnet",
            subscription_id: Some(1),
            coordinator: Some(DEVNET_COORDINATOR),
            mock_coordinator: None,
            ..base
        }),
        "mainnet-beta" => Some(NetworkConfig {
            name: "mainnet-beta",
            entrance_fee: milli_sol_to_lamports(100),
            interval: 86_400,
            coordinator: Some(MAINNET_COORDINATOR),
            mock_coordinator: None,
            ..base
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_clusters_use_mock_coordinator() {
        for cluster in DEVELOPMENT_CLUSTERS {
            let config = network_config(cluster).unwrap();
            assert!(is_development_cluster(cluster));
            assert!(config.coordinator.is_none());
            assert_eq!(
                config.mock_coordinator,
                Some(MockCoordinatorConfig {
                    base_fee: BASE_FEE,
                    gas_price_per_unit: GAS_PRICE_PER_UNIT
                })
            );
        }
        assert!(network_config("devnet").unwrap().mock_coordinator.is_none());
        assert!(network_config("testnet-unknown").is_none());
    }

    #[test]
    fn live_clusters_pin_their_coordinator() {
        for cluster in ["localnet", "localhost", "devnet", "mainnet-beta"] {
            let config = network_config(cluster).unwrap();
            assert_eq!(config.is_development(), is_development_cluster(cluster));
            assert_eq!(config.coordinator.is_some(), !is_development_cluster(cluster));
            assert_eq!(config.mock_coordinator.is_some(), is_development_cluster(cluster));
        }
        assert_eq!(network_config("localhost").unwrap().name, "localnet");
        assert_eq!(
            network_config("devnet").unwrap().coordinator,
            Some(DEVNET_COORDINATOR)
        );
        assert_eq!(
            network_config("mainnet-beta").unwrap().coordinator,
            Some(MAINNET_COORDINATOR)
        );
    }

    #[test]
    fn raffle_params_prefer_fixed_subscription() {
        let local = network_config("localnet").unwrap().raffle_params(7);
        assert_eq!(local.subscription_id, 7);
        assert_eq!(local.entrance_fee, 10_000_000);
        assert_eq!(local.interval, 30);

        let devnet = network_config("devnet").unwrap().raffle_params(7);
        assert_eq!(devnet.subscription_id, 1);
    }
}
