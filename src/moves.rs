use std::fmt;

use serde::{Deserialize, Serialize};

/// One requested state transition.
///
/// Built client-side from gesture context and sent as-is; only the service
/// decides whether it is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveDescriptor {
    Draw,
    Undo,
    Redo,
    #[serde(rename = "w2f")]
    WasteToFoundation,
    #[serde(rename = "w2t")]
    WasteToTableau { to_col: usize },
    #[serde(rename = "t2f")]
    TableauToFoundation { from_col: usize },
    #[serde(rename = "t2t")]
    TableauToTableau {
        from_col: usize,
        start_index: usize,
        to_col: usize,
    },
    /// Turn the waste back into the stock. Only ever suggested by the hint endpoint.
    Recycle,
}

impl fmt::Display for MoveDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveDescriptor::Draw => write!(f, "draw"),
            MoveDescriptor::Undo => write!(f, "undo"),
            MoveDescriptor::Redo => write!(f, "redo"),
            MoveDescriptor::WasteToFoundation => write!(f, "waste → foundation"),
            MoveDescriptor::WasteToTableau { to_col } => write!(f, "waste → column {to_col}"),
            MoveDescriptor::TableauToFoundation { from_col } => {
                write!(f, "column {from_col} → foundation")
            }
            MoveDescriptor::TableauToTableau { from_col, start_index, to_col } => {
                write!(f, "column {from_col}:{start_index} → column {to_col}")
            }
            MoveDescriptor::Recycle => write!(f, "recycle waste"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_tags_match_service() {
        let t2t = MoveDescriptor::TableauToTableau { from_col: 2, start_index: 3, to_col: 5 };
        assert_eq!(
            serde_json::to_value(t2t).unwrap(),
            json!({"type": "t2t", "from_col": 2, "start_index": 3, "to_col": 5})
        );
        assert_eq!(
            serde_json::to_value(MoveDescriptor::Draw).unwrap(),
            json!({"type": "draw"})
        );
        assert_eq!(
            serde_json::to_value(MoveDescriptor::WasteToTableau { to_col: 1 }).unwrap(),
            json!({"type": "w2t", "to_col": 1})
        );
    }

    #[test]
    fn hint_metadata_is_ignored() {
        let hint: MoveDescriptor = serde_json::from_value(json!({
            "type": "t2f", "from_col": 4, "score": 90,
            "explain": "Superior a fundación", "to_foundation": "clubs"
        }))
        .unwrap();
        assert_eq!(hint, MoveDescriptor::TableauToFoundation { from_col: 4 });

        let recycle: MoveDescriptor =
            serde_json::from_value(json!({"type": "recycle", "from_zone": "waste"})).unwrap();
        assert_eq!(recycle, MoveDescriptor::Recycle);
    }
}
