//! Platform impact counters

use terrasync_client::models::ImpactStats;

/// Current snapshot. Fixed until the counters are backed by storage.
pub fn snapshot() -> ImpactStats {
    ImpactStats {
        co2_sequestered_tons: 2847.0,
        waste_diverted_kg: 156_420.0,
        eco_credits_earned: 892_340,
        recovery_rate_percent: 94.0,
        items_processed: 45_231,
        active_users: 12_847,
    }
}
