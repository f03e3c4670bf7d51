use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{MovementDirection, StockMovement};

/// Request body for recording a stock movement.
#[derive(Debug, Deserialize)]
pub struct RecordMovementRequest {
    pub product_id: Uuid,
    pub quantity: i64,
    pub direction: MovementDirection,
    /// When the movement physically happened; defaults to now.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub occurred_at: Option<OffsetDateTime>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMovementRequest {
    pub note: String,
}

/// Extra list filter on top of the shared pagination parameters.
#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub direction: MovementDirection,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
    pub note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<StockMovement> for MovementResponse {
    fn from(m: StockMovement) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            quantity: m.quantity,
            direction: m.direction,
            occurred_at: m.occurred_at,
            note: m.note,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_request_parses_with_defaults() {
        let json = format!(
            r#"{{"product_id": "{}", "quantity": 5, "direction": "inbound"}}"#,
            Uuid::new_v4()
        );
        let req: RecordMovementRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.quantity, 5);
        assert_eq!(req.direction, MovementDirection::Inbound);
        assert!(req.occurred_at.is_none());
        assert!(req.note.is_none());
    }

    #[test]
    fn record_request_rejects_unknown_direction() {
        let json = format!(
            r#"{{"product_id": "{}", "quantity": 5, "direction": "sideways"}}"#,
            Uuid::new_v4()
        );
        assert!(serde_json::from_str::<RecordMovementRequest>(&json).is_err());
    }
}
