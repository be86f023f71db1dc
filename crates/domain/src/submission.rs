//! Guest order submissions and their validation.

use order_store::OrderLine;

use crate::error::OrderError;

/// A requested line as it arrives from the form: name plus a raw quantity
/// that may be zero or negative (those are dropped, not rejected).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedLine {
    pub item_name: String,
    pub quantity: i64,
}

impl RequestedLine {
    /// Creates a new requested line.
    pub fn new(item_name: impl Into<String>, quantity: i64) -> Self {
        Self {
            item_name: item_name.into(),
            quantity,
        }
    }
}

/// A guest checkout: contact details plus requested lines.
#[derive(Debug, Clone)]
pub struct OrderSubmission {
    pub customer_name: String,
    pub customer_phone: String,
    pub room_number: String,
    pub lines: Vec<RequestedLine>,
}

impl OrderSubmission {
    /// Creates a new submission.
    pub fn new(
        customer_name: impl Into<String>,
        customer_phone: impl Into<String>,
        room_number: impl Into<String>,
        lines: Vec<RequestedLine>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_phone: customer_phone.into(),
            room_number: room_number.into(),
            lines,
        }
    }

    /// Trims the contact fields; every one must be non-empty.
    ///
    /// Collects all empty fields so the guest can fix the form in one go.
    pub(crate) fn validated_contact(&self) -> Result<(String, String, String), OrderError> {
        let name = self.customer_name.trim();
        let phone = self.customer_phone.trim();
        let room = self.room_number.trim();

        let mut missing = Vec::new();
        if name.is_empty() {
            missing.push("name");
        }
        if phone.is_empty() {
            missing.push("phone number");
        }
        if room.is_empty() {
            missing.push("room number");
        }
        if !missing.is_empty() {
            return Err(OrderError::MissingFields { fields: missing });
        }

        Ok((name.to_string(), phone.to_string(), room.to_string()))
    }

    /// Returns the lines that survive the positive-quantity filter.
    pub(crate) fn valid_lines(&self) -> Vec<OrderLine> {
        sanitize_lines(&self.lines)
    }
}

/// Drops entries with quantity < 1 and snapshots the rest, preserving
/// order. Non-numeric quantities never reach this layer; the form adapter
/// drops them during parsing.
pub(crate) fn sanitize_lines(lines: &[RequestedLine]) -> Vec<OrderLine> {
    lines
        .iter()
        .filter_map(|line| {
            u32::try_from(line.quantity)
                .ok()
                .filter(|quantity| *quantity >= 1)
                .map(|quantity| OrderLine::new(line.item_name.clone(), quantity))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_fields_are_trimmed() {
        let submission = OrderSubmission::new(
            "  Nino ",
            " 555-0101",
            "12 ",
            vec![RequestedLine::new("Water", 1)],
        );
        let (name, phone, room) = submission.validated_contact().unwrap();
        assert_eq!(name, "Nino");
        assert_eq!(phone, "555-0101");
        assert_eq!(room, "12");
    }

    #[test]
    fn test_all_missing_fields_are_reported() {
        let submission = OrderSubmission::new("", "  ", "", vec![RequestedLine::new("Water", 1)]);
        let err = submission.validated_contact().unwrap_err();
        match err {
            OrderError::MissingFields { fields } => {
                assert_eq!(fields, vec!["name", "phone number", "room number"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nonpositive_quantities_are_dropped_silently() {
        let lines = vec![
            RequestedLine::new("Water", 3),
            RequestedLine::new("Towels", 0),
            RequestedLine::new("Soap", -2),
            RequestedLine::new("Tea", 1),
        ];
        let sanitized = sanitize_lines(&lines);
        assert_eq!(
            sanitized,
            vec![OrderLine::new("Water", 3), OrderLine::new("Tea", 1)]
        );
    }

    #[test]
    fn test_line_order_is_preserved() {
        let lines = vec![
            RequestedLine::new("Tea", 1),
            RequestedLine::new("Water", 2),
            RequestedLine::new("Soap", 3),
        ];
        let sanitized = sanitize_lines(&lines);
        let names: Vec<&str> = sanitized.iter().map(|l| l.item_name.as_str()).collect();
        assert_eq!(names, vec!["Tea", "Water", "Soap"]);
    }
}
