use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::DEFAULT_ITEM_CATEGORY;
use crate::defaults::is_default_category;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Es,
    #[default]
    Ca,
    En,
}

/// A product name in every supported language.
///
/// Older documents store category items as a bare name; those deserialize
/// into the `es` slot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(from = "StoredItem")]
pub struct LocalizedItem {
    pub es: String,
    pub ca: String,
    pub en: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredItem {
    Name(String),
    Localized {
        #[serde(default)]
        es: String,
        #[serde(default)]
        ca: String,
        #[serde(default)]
        en: String,
    },
}

impl From<StoredItem> for LocalizedItem {
    fn from(item: StoredItem) -> Self {
        match item {
            StoredItem::Name(es) => LocalizedItem {
                es,
                ..Default::default()
            },
            StoredItem::Localized { es, ca, en } => LocalizedItem { es, ca, en },
        }
    }
}

impl LocalizedItem {
    pub fn new(es: &str, ca: &str, en: &str) -> Self {
        LocalizedItem {
            es: es.to_string(),
            ca: ca.to_string(),
            en: en.to_string(),
        }
    }

    fn get(&self, lang: Lang) -> &str {
        match lang {
            Lang::Es => &self.es,
            Lang::Ca => &self.ca,
            Lang::En => &self.en,
        }
    }

    pub fn display(&self, lang: Lang) -> &str {
        [self.get(lang), &self.es, &self.ca, &self.en]
            .into_iter()
            .find(|name| !name.is_empty())
            .unwrap_or("???")
    }

    /// First non-empty of es/ca/en, lowercased. Used to compare against defaults.
    pub fn normalized_name(&self) -> String {
        [&self.es, &self.ca, &self.en]
            .into_iter()
            .find(|name| !name.is_empty())
            .map(|name| name.to_lowercase())
            .unwrap_or_default()
    }

    pub fn matches_name(&self, normalized: &str) -> bool {
        [&self.es, &self.ca, &self.en]
            .into_iter()
            .any(|name| name.to_lowercase() == normalized)
    }
}

/// An entry on the shopping list itself.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShopItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub note: String,
    #[serde(default = "default_item_category")]
    pub category: String,
}

fn default_item_category() -> String {
    DEFAULT_ITEM_CATEGORY.to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategoryEntry {
    pub icon: String,
    #[serde(default)]
    pub items: Vec<LocalizedItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

pub type Categories = BTreeMap<String, CategoryEntry>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Default,
    Custom,
}

impl CategoryKind {
    pub fn of(key: &str) -> Self {
        if is_default_category(key) {
            CategoryKind::Default
        } else {
            CategoryKind::Custom
        }
    }
}

/// JSON blob stored in a list document's `data` column.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ListData {
    #[serde(default)]
    pub items: Vec<ShopItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Categories>,
    #[serde(rename = "listName", default, skip_serializing_if = "Option::is_none")]
    pub list_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShoppingListDocument {
    pub id: String,
    pub list_code: String,
    pub data: ListData,
    pub created: i64,
    pub updated: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateListPayload {
    pub list_code: String,
    #[serde(default)]
    pub data: ListData,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateListPayload {
    pub data: ListData,
}

/// Normalized item record stored per list, queried by the admin console.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AtomicItem {
    pub id: String,
    pub list: String,
    pub name: String,
    pub checked: bool,
    pub note: String,
    pub category: String,
}

/// Item shape shared by the export file and atomic item creation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ListItemPayload {
    pub name: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default = "default_item_category")]
    pub category: String,
    #[serde(default)]
    pub note: String,
}

impl From<&AtomicItem> for ListItemPayload {
    fn from(item: &AtomicItem) -> Self {
        ListItemPayload {
            name: item.name.clone(),
            checked: item.checked,
            category: item.category.clone(),
            note: item.note.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExportFile {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(rename = "listName", default)]
    pub list_name: Option<String>,
    #[serde(default)]
    pub categories: Option<Categories>,
    pub items: Vec<ListItemPayload>,
    #[serde(rename = "exportDate", default)]
    pub export_date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogCategory {
    pub id: String,
    pub key: String,
    pub icon: String,
    pub order: i64,
    pub name_es: String,
    pub name_ca: String,
    pub name_en: String,
    pub color: String,
    pub hidden: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CatalogCategoryPayload {
    pub key: String,
    pub icon: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub name_es: String,
    #[serde(default)]
    pub name_ca: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub id: String,
    /// Id of the owning catalog category.
    pub category: String,
    pub name_es: String,
    pub name_ca: String,
    pub name_en: String,
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<CatalogCategory>,
}

impl CatalogItem {
    pub fn is_visible(&self) -> bool {
        !self.hidden && !self.expand.as_ref().is_some_and(|c| c.hidden)
    }

    /// Localized names with es filling in missing translations.
    pub fn localized(&self) -> LocalizedItem {
        let fallback = |name: &str| {
            if name.is_empty() {
                self.name_es.clone()
            } else {
                name.to_string()
            }
        };
        LocalizedItem {
            es: self.name_es.clone(),
            ca: fallback(&self.name_ca),
            en: fallback(&self.name_en),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CatalogItemPayload {
    pub category: String,
    #[serde(default)]
    pub name_es: String,
    #[serde(default)]
    pub name_ca: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Deserialize, Debug, Default)]
pub struct CatalogQuery {
    pub visible_only: Option<bool>,
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BulkIdsPayload {
    pub ids: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BulkVisibilityPayload {
    pub ids: Vec<String>,
    pub hidden: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginPayload {
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ServerName {
    pub name: String,
}
