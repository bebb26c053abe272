use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result, ensure_len};
use crate::ids::SparePartId;

/// Parts at or below this quantity are reported as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// Maximum number of rows returned by a picker search.
pub const SEARCH_LIMIT: i64 = 10;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparePart {
    pub id: SparePartId,
    pub part_code: String,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub arrived_date: NaiveDate,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SparePart {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= LOW_STOCK_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSparePart {
    pub part_code: String,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub arrived_date: NaiveDate,
    pub quantity: i32,
}

impl NewSparePart {
    pub fn validate(&self) -> Result<()> {
        ensure_len("part_code", &self.part_code, 50)?;
        ensure_len("category", &self.category, 100)?;
        ensure_len("brand", &self.brand, 100)?;
        ensure_len("model", &self.model, 100)?;
        if self.quantity < 0 {
            return Err(ModelError::NegativeQuantity(self.quantity));
        }
        Ok(())
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparePartPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrived_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

impl SparePartPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(code) = &self.part_code {
            ensure_len("part_code", code, 50)?;
        }
        for (field, value) in [
            ("category", &self.category),
            ("brand", &self.brand),
            ("model", &self.model),
        ] {
            if let Some(value) = value {
                ensure_len(field, value, 100)?;
            }
        }
        if let Some(qty) = self.quantity
            && qty < 0
        {
            return Err(ModelError::NegativeQuantity(qty));
        }
        Ok(())
    }

    pub fn apply(&self, part: &mut SparePart) {
        if let Some(code) = &self.part_code {
            part.part_code = code.clone();
        }
        if let Some(category) = &self.category {
            part.category = category.clone();
        }
        if let Some(brand) = &self.brand {
            part.brand = brand.clone();
        }
        if let Some(model) = &self.model {
            part.model = model.clone();
        }
        if let Some(date) = self.arrived_date {
            part.arrived_date = date;
        }
        if let Some(qty) = self.quantity {
            part.quantity = qty;
        }
    }
}

/// Free-text picker query. A missing or blank term means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparePartSearch {
    #[serde(default)]
    pub q: Option<String>,
}

impl SparePartSearch {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            q: Some(term.into()),
        }
    }

    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// One-based pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default = "Page::default_page")]
    pub page: u32,
    #[serde(default = "Page::default_limit")]
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: Self::default_page(),
            limit: Self::default_limit(),
        }
    }
}

impl Page {
    fn default_page() -> u32 {
        1
    }

    fn default_limit() -> u32 {
        DEFAULT_PAGE_SIZE
    }

    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(self) -> i64 {
        let page = self.normalized();
        i64::from(page.page - 1) * i64::from(page.limit)
    }

    pub fn limit(self) -> i64 {
        i64::from(self.normalized().limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_term_means_unfiltered() {
        assert_eq!(SparePartSearch::default().term(), None);
        assert_eq!(SparePartSearch::new("   ").term(), None);
        assert_eq!(SparePartSearch::new(" bolt ").term(), Some("bolt"));
    }

    #[test]
    fn page_defaults_and_clamps() {
        let page = Page::default();
        assert_eq!((page.page, page.limit), (1, 20));
        assert_eq!(page.offset(), 0);

        let page = Page { page: 3, limit: 500 };
        assert_eq!(page.limit(), 100);
        assert_eq!(page.offset(), 200);

        let page = Page { page: 0, limit: 0 };
        assert_eq!(page.normalized(), Page { page: 1, limit: 1 });
    }

    #[test]
    fn new_part_rejects_negative_quantity() {
        let part = NewSparePart {
            part_code: "BOLT-22".into(),
            category: "Fastener".into(),
            brand: "Hilti".into(),
            model: "M8".into(),
            arrived_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            quantity: -1,
        };
        assert_eq!(part.validate(), Err(ModelError::NegativeQuantity(-1)));
    }
}
