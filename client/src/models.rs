//! Wire models for the TerraSync API
//!
//! Every type here is a server-authoritative view model. The client only
//! reads fields or forwards identifiers into a later call.

use serde::{Deserialize, Serialize};

/// Result of analyzing one uploaded item image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub item_id: String,
    pub category: String,
    pub subcategory: String,
    pub description: String,
    pub condition: String,
    pub circular_value: CircularValue,
    /// Ordered by preference, most preferred first
    pub recommended_paths: Vec<String>,
    #[serde(default)]
    pub matching_organizations: Vec<MatchingOrganization>,
    pub environmental_impact: EnvironmentalImpact,
}

/// Server-computed valuation bundle attached to an analyzed item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularValue {
    pub monetary_value: f64,
    pub eco_credits: u64,
    pub carbon_savings_kg: f64,
    pub confidence_score: f64,
}

impl CircularValue {
    pub fn confidence_in_range(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingOrganization {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub org_type: String,
    pub match_score: f64,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalImpact {
    pub co2_saved_kg: f64,
    pub waste_diverted_kg: f64,
    pub water_saved_liters: f64,
    pub energy_saved_kwh: f64,
}

/// Outcome of orchestrating a trade for an analyzed item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub trade_id: String,
    /// Opaque state label, e.g. "matched"
    pub status: String,
    #[serde(default)]
    pub negotiation_steps: Vec<NegotiationStep>,
    #[serde(default)]
    pub matches: Vec<TradeMatch>,
    /// `None` when no viable match was found. Still a successful outcome.
    #[serde(default)]
    pub best_match: Option<TradeMatch>,
    pub eco_credits_earned: u64,
    pub carbon_impact_kg: f64,
}

impl TradeResult {
    pub fn has_match(&self) -> bool {
        self.best_match.is_some()
    }

    /// True when there is no best match, or the best match appears among
    /// `matches` by organization id.
    pub fn best_match_is_listed(&self) -> bool {
        match &self.best_match {
            None => true,
            Some(best) => self
                .matches
                .iter()
                .any(|m| m.organization_id == best.organization_id),
        }
    }
}

/// One entry of the server-side negotiation audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationStep {
    pub step: u32,
    pub action: String,
    pub party: String,
    pub details: String,
    pub timestamp: String,
}

/// Candidate organization with proposed terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeMatch {
    pub organization_id: String,
    pub organization_name: String,
    pub organization_type: String,
    pub match_score: f64,
    pub proposed_terms: ProposedTerms,
    #[serde(default)]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedTerms {
    pub credit_offer: f64,
    pub pickup_available: bool,
    pub estimated_carbon_savings: f64,
}

/// Aggregate platform counters. Always a point-in-time snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactStats {
    pub co2_sequestered_tons: f64,
    pub waste_diverted_kg: f64,
    pub eco_credits_earned: u64,
    pub recovery_rate_percent: f64,
    pub items_processed: u64,
    pub active_users: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
}

/// Body of `POST /api/orchestrate-trade`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub item_id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
}

impl TradeRequest {
    pub fn new(item_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            user_id: user_id.into(),
            preferred_path: None,
            location: None,
        }
    }

    pub fn preferred_path(mut self, path: impl Into<String>) -> Self {
        self.preferred_path = Some(path.into());
        self
    }

    pub fn location(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some(GeoLocation { lat, lng });
        self
    }
}

/// Envelope returned by `POST /api/analyze-item`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeItemResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Envelope returned by `POST /api/orchestrate-trade`.
///
/// The trade fields sit next to `success` rather than under a key, so they
/// are kept as raw JSON until `success` has been checked. A failure body
/// may omit them entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrateTradeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub trade: serde_json::Map<String, serde_json::Value>,
}

impl OrchestrateTradeResponse {
    pub fn succeeded(trade: &TradeResult) -> Result<Self, serde_json::Error> {
        let trade = match serde_json::to_value(trade)? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Ok(Self {
            success: true,
            error: None,
            trade,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trade_request_omits_unset_optionals() {
        let body = serde_json::to_value(TradeRequest::new("abc123", "user-demo")).unwrap();
        assert_eq!(body, json!({"item_id": "abc123", "user_id": "user-demo"}));

        let body = serde_json::to_value(
            TradeRequest::new("abc123", "user-demo")
                .preferred_path("donate")
                .location(40.7128, -74.006),
        )
        .unwrap();
        assert_eq!(body["preferred_path"], "donate");
        assert_eq!(body["location"]["lat"], 40.7128);
    }

    #[test]
    fn null_and_missing_best_match_both_decode_to_none() {
        let with_null = json!({
            "trade_id": "trade-1",
            "status": "pending",
            "negotiation_steps": [],
            "matches": [],
            "best_match": null,
            "eco_credits_earned": 0,
            "carbon_impact_kg": 0.0
        });
        let trade: TradeResult = serde_json::from_value(with_null.clone()).unwrap();
        assert!(!trade.has_match());
        assert!(trade.best_match_is_listed());

        let mut missing = with_null;
        missing.as_object_mut().unwrap().remove("best_match");
        let trade: TradeResult = serde_json::from_value(missing).unwrap();
        assert!(trade.best_match.is_none());
    }

    #[test]
    fn best_match_must_be_among_matches() {
        let terms = ProposedTerms {
            credit_offer: 45.0,
            pickup_available: true,
            estimated_carbon_savings: 15.5,
        };
        let listed = TradeMatch {
            organization_id: "ngo-001".into(),
            organization_name: "Green Earth Initiative".into(),
            organization_type: "ngo".into(),
            match_score: 0.92,
            proposed_terms: terms.clone(),
            distance_km: Some(4.2),
        };
        let mut trade = TradeResult {
            trade_id: "trade-1".into(),
            status: "matched".into(),
            negotiation_steps: vec![],
            matches: vec![listed.clone()],
            best_match: Some(listed),
            eco_credits_earned: 45,
            carbon_impact_kg: 15.5,
        };
        assert!(trade.best_match_is_listed());

        trade.matches.clear();
        assert!(!trade.best_match_is_listed());
    }

    #[test]
    fn organization_type_uses_wire_name() {
        let org: MatchingOrganization = serde_json::from_value(json!({
            "id": "ngo-001",
            "name": "Tech for All",
            "type": "ngo",
            "match_score": 0.92,
            "distance_km": 5.2
        }))
        .unwrap();
        assert_eq!(org.org_type, "ngo");
    }

    #[test]
    fn envelope_without_success_flag_is_a_failure() {
        let env: AnalyzeItemResponse = serde_json::from_value(json!({"error": "nope"})).unwrap();
        assert!(!env.success);

        let env: OrchestrateTradeResponse =
            serde_json::from_value(json!({"trade_id": "t"})).unwrap();
        assert!(!env.success);
        assert_eq!(env.trade["trade_id"], "t");
    }
}
