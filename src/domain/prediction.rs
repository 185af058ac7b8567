//! Prediction result types.
//!
//! Represents the output of the recurrence classifier for one patient.

use serde::{Deserialize, Serialize};

/// Label the training data uses for a recurrence.
pub const RECURRENCE_LABEL: &str = "Yes";

/// Complete prediction record including metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Unique identifier, used to correlate log lines
    pub id: String,

    /// Raw label returned by the classifier (e.g. "Yes" / "No")
    pub label: String,

    /// Timestamp of prediction
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Prediction {
    /// Create a new prediction from a classifier label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: uuid_v4(),
            label: label.into(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Whether the label denotes a predicted recurrence.
    #[must_use]
    pub fn indicates_recurrence(&self) -> bool {
        self.label.eq_ignore_ascii_case(RECURRENCE_LABEL)
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// Generate a random UUID v4 string.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recurrence_flag() {
        assert!(Prediction::new("Yes").indicates_recurrence());
        assert!(!Prediction::new("No").indicates_recurrence());
        assert_eq!(Prediction::new("No").to_string(), "No");
    }

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
        assert_eq!(&id1[14..15], "4");
    }
}
