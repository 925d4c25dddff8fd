use serde::{Deserialize, Serialize};

use warehouse_core::{DomainError, ItemCode, ItemName};

/// A defined stock-keeping unit (row of `item_definitions`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub code: ItemCode,
    pub name: ItemName,
    pub description: Option<String>,
}

/// Command: define a new item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub code: ItemCode,
    pub name: ItemName,
    pub description: Option<String>,
}

impl NewItem {
    pub fn new(code: ItemCode, name: ItemName) -> Self {
        Self {
            code,
            name,
            description: None,
        }
    }

    /// Parse raw console input into a definition command.
    pub fn parse(code: &str, name: &str) -> Result<Self, DomainError> {
        Ok(Self::new(ItemCode::parse(code)?, ItemName::parse(name)?))
    }

    /// Attach a free-text description. Blank text clears it.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        let trimmed = description.trim();
        self.description = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn into_definition(self) -> ItemDefinition {
        ItemDefinition {
            code: self.code,
            name: self.name,
            description: self.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_blank_name() {
        let err = NewItem::parse("CPU-1", "  ").unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("item name")));
    }

    #[test]
    fn blank_description_is_dropped() {
        let item = NewItem::parse("CPU-1", "CPU").unwrap().with_description("   ");
        assert_eq!(item.description, None);

        let item = item.with_description(" 12th Gen ");
        assert_eq!(item.description.as_deref(), Some("12th Gen"));
    }
}
