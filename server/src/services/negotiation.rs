//! Mock trade negotiation
//!
//! Runs the same stages a negotiating agent would (initialize, query
//! organizations, evaluate, negotiate, respond, finalize) against a fixed
//! set of partner organizations, recording one audit step per stage.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use terrasync_client::models::{
    NegotiationStep, ProposedTerms, TradeMatch, TradeRequest, TradeResult,
};

use crate::error::AppError;
use crate::models::TradeStatus;

const AGENT: &str = "agent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrganizationKind {
    Ngo,
    RecyclingCenter,
}

impl OrganizationKind {
    fn as_str(self) -> &'static str {
        match self {
            OrganizationKind::Ngo => "ngo",
            OrganizationKind::RecyclingCenter => "recycling_center",
        }
    }
}

struct Partner {
    id: &'static str,
    name: &'static str,
    kind: OrganizationKind,
    match_score: f64,
    credit_offer: f64,
    pickup_available: bool,
    estimated_carbon_savings: f64,
    distance_km: f64,
}

const PARTNERS: [Partner; 3] = [
    Partner {
        id: "ngo-001",
        name: "Green Earth Initiative",
        kind: OrganizationKind::Ngo,
        match_score: 0.92,
        credit_offer: 45.0,
        pickup_available: true,
        estimated_carbon_savings: 15.5,
        distance_km: 4.2,
    },
    Partner {
        id: "recycle-001",
        name: "EcoTech Recycling",
        kind: OrganizationKind::RecyclingCenter,
        match_score: 0.88,
        credit_offer: 38.0,
        pickup_available: true,
        estimated_carbon_savings: 12.0,
        distance_km: 2.8,
    },
    Partner {
        id: "ngo-002",
        name: "Community Reuse Hub",
        kind: OrganizationKind::Ngo,
        match_score: 0.85,
        credit_offer: 42.0,
        pickup_available: false,
        estimated_carbon_savings: 18.0,
        distance_km: 6.5,
    },
];

/// Which partner kinds take items headed down `path`. `None` means all.
fn accepted_kinds(path: Option<&str>) -> Option<&'static [OrganizationKind]> {
    match path.map(|p| p.trim().to_ascii_lowercase()).as_deref() {
        Some("donate") | Some("reuse") => Some(&[OrganizationKind::Ngo]),
        Some("recycle") | Some("refurbish") | Some("upcycle") => {
            Some(&[OrganizationKind::RecyclingCenter])
        }
        Some("dispose") => Some(&[]),
        _ => None,
    }
}

fn query_partners(preferred_path: Option<&str>) -> Vec<TradeMatch> {
    let kinds = accepted_kinds(preferred_path);
    PARTNERS
        .iter()
        .filter(|p| kinds.map_or(true, |k| k.contains(&p.kind)))
        .map(|p| TradeMatch {
            organization_id: p.id.to_string(),
            organization_name: p.name.to_string(),
            organization_type: p.kind.as_str().to_string(),
            match_score: p.match_score,
            proposed_terms: ProposedTerms {
                credit_offer: p.credit_offer,
                pickup_available: p.pickup_available,
                estimated_carbon_savings: p.estimated_carbon_savings,
            },
            distance_km: Some(p.distance_km),
        })
        .collect()
}

fn trade_id(request: &TradeRequest, now: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.item_id.as_bytes());
    hasher.update(request.user_id.as_bytes());
    hasher.update(now.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    format!("trade-{}", hex::encode(&hasher.finalize()[..4]))
}

struct AuditTrail {
    steps: Vec<NegotiationStep>,
    timestamp: String,
}

impl AuditTrail {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            steps: Vec::new(),
            timestamp: now.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        }
    }

    fn record(&mut self, action: &str, party: &str, details: String) {
        self.steps.push(NegotiationStep {
            step: self.steps.len() as u32 + 1,
            action: action.to_string(),
            party: party.to_string(),
            details,
            timestamp: self.timestamp.clone(),
        });
    }
}

pub fn orchestrate(request: &TradeRequest, now: DateTime<Utc>) -> Result<TradeResult, AppError> {
    if request.item_id.trim().is_empty() {
        return Err(AppError::TradeFailed("item_id must not be empty".into()));
    }
    if request.user_id.trim().is_empty() {
        return Err(AppError::TradeFailed("user_id must not be empty".into()));
    }

    let trade_id = trade_id(request, now);
    let mut trail = AuditTrail::new(now);

    trail.record("initialize", AGENT, "Starting negotiation process for item".into());

    let matches = query_partners(request.preferred_path.as_deref());
    trail.record(
        "query_apis",
        AGENT,
        format!(
            "Found {} potential matches from NGOs and recycling centers",
            matches.len()
        ),
    );

    let Some(best) = matches
        .iter()
        .max_by(|a, b| a.match_score.total_cmp(&b.match_score))
        .cloned()
    else {
        trail.record("evaluate", AGENT, "No suitable matches found".into());
        tracing::info!(%trade_id, item_id = %request.item_id, "No match for trade");
        return Ok(TradeResult {
            trade_id,
            status: TradeStatus::Pending.as_str().to_string(),
            negotiation_steps: trail.steps,
            matches,
            best_match: None,
            eco_credits_earned: 0,
            carbon_impact_kg: 0.0,
        });
    };

    trail.record(
        "evaluate",
        AGENT,
        format!(
            "Selected best match: {} with score {}",
            best.organization_name, best.match_score
        ),
    );
    trail.record(
        "negotiate",
        AGENT,
        format!("Sent negotiation request to {}", best.organization_name),
    );
    trail.record(
        "respond",
        &best.organization_name,
        format!(
            "Accepted terms: Pickup within 3 days, {} eco-credits offered",
            best.proposed_terms.credit_offer
        ),
    );
    trail.record(
        "finalize",
        AGENT,
        "Trade successfully orchestrated and matched".into(),
    );

    tracing::info!(
        %trade_id,
        item_id = %request.item_id,
        organization = %best.organization_id,
        "Trade matched"
    );

    Ok(TradeResult {
        trade_id,
        status: TradeStatus::Matched.as_str().to_string(),
        negotiation_steps: trail.steps,
        eco_credits_earned: best.proposed_terms.credit_offer.round() as u64,
        carbon_impact_kg: best.proposed_terms.estimated_carbon_savings,
        matches,
        best_match: Some(best),
    })
}
