use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Short label used for the item at `index` (0-based), e.g. `Item 1`.
pub fn short_label(index: usize) -> String {
    format!("Item {}", index + 1)
}

/// One legend line: the short label and the original column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LegendEntry {
    pub label: String,
    pub source_name: String,
}

/// Ordered mapping from short item labels to original column names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ItemLegend {
    pub entries: Vec<LegendEntry>,
}

impl ItemLegend {
    /// Build a legend labelling `names` in order as `Item 1`, `Item 2`, ...
    pub fn from_source_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| LegendEntry {
                label: short_label(idx),
                source_name: name.into(),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Original column name for a short label.
    pub fn source_name(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.source_name.as_str())
    }

    /// Short label for an original column name.
    pub fn label_for(&self, source_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.source_name == source_name)
            .map(|entry| entry.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_column_order() {
        let legend = ItemLegend::from_source_names(["How satisfied?", "Would recommend?"]);

        assert_eq!(legend.len(), 2);
        assert_eq!(legend.entries[0].label, "Item 1");
        assert_eq!(legend.entries[1].label, "Item 2");
        assert_eq!(legend.source_name("Item 2"), Some("Would recommend?"));
        assert_eq!(legend.label_for("How satisfied?"), Some("Item 1"));
        assert_eq!(legend.source_name("Item 3"), None);
    }
}
