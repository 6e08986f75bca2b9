use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

/// Field names owned by the cart itself; everything else is opaque detail.
const RESERVED_FIELDS: [&str; 4] = ["id", "type", "price", "quantity"];

/// Kind of bookable entity a line refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Flight,
    Hotel,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Flight => "flight",
            ItemType::Hotel => "hotel",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseItemTypeError(String);

impl fmt::Display for ParseItemTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown item type '{}', expected 'flight' or 'hotel'", self.0)
    }
}

impl std::error::Error for ParseItemTypeError {}

impl FromStr for ItemType {
    type Err = ParseItemTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flight" => Ok(ItemType::Flight),
            "hotel" => Ok(ItemType::Hotel),
            other => Err(ParseItemTypeError(other.to_string())),
        }
    }
}

/// Identifier of the underlying flight or hotel.
///
/// Catalogs hand out integer ids, but any JSON number or string is accepted.
/// On its own it is not unique across item types; see [`LineKey`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum EntityId {
    Numeric(i64),
    /// Fractional ids, or integers outside the `i64` range
    Number(Number),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Numeric(n) => write!(f, "{}", n),
            EntityId::Number(n) => write!(f, "{}", n),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    // Same variant as the JSON form would produce, so CLI keys match stored lines
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<i64>() {
            return Ok(EntityId::Numeric(n));
        }
        Ok(match s.parse::<Number>() {
            Ok(n) => EntityId::Number(n),
            Err(_) => EntityId::Text(s.to_string()),
        })
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Numeric(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

/// Identity of a cart line: entity id plus item type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub id: EntityId,
    pub kind: ItemType,
}

impl LineKey {
    pub fn new(id: impl Into<EntityId>, kind: ItemType) -> Self {
        Self { id: id.into(), kind }
    }

    pub fn flight(id: impl Into<EntityId>) -> Self {
        Self::new(id, ItemType::Flight)
    }

    pub fn hotel(id: impl Into<EntityId>) -> Self {
        Self::new(id, ItemType::Hotel)
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.id, self.kind)
    }
}

/// Descriptive fields minus the names the cart owns. Both item types go
/// through this on the way in, so a reserved name can never be written twice.
fn without_reserved(mut details: Map<String, Value>) -> Map<String, Value> {
    details.retain(|name, _| !RESERVED_FIELDS.contains(&name.as_str()));
    details
}

#[derive(Deserialize)]
struct RawBookableItem {
    id: EntityId,
    #[serde(rename = "type")]
    kind: ItemType,
    price: u64,
    #[serde(flatten)]
    details: Map<String, Value>,
}

/// A flight or hotel offered by a detail view, before it enters the cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawBookableItem")]
pub struct BookableItem {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: ItemType,
    /// Unit price, per person or per night
    pub price: u64,
    #[serde(flatten)]
    details: Map<String, Value>,
}

impl From<RawBookableItem> for BookableItem {
    fn from(raw: RawBookableItem) -> Self {
        Self {
            id: raw.id,
            kind: raw.kind,
            price: raw.price,
            details: without_reserved(raw.details),
        }
    }
}

impl BookableItem {
    pub fn new(id: impl Into<EntityId>, kind: ItemType, price: u64) -> Self {
        Self {
            id: id.into(),
            kind,
            price,
            details: Map::new(),
        }
    }

    /// Attach a descriptive field (airline, route, dates...). Reserved field
    /// names are ignored.
    pub fn with_detail(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        if !RESERVED_FIELDS.contains(&name.as_str()) {
            self.details.insert(name, value.into());
        }
        self
    }

    /// Build from a catalog JSON object. Any incoming `quantity` is dropped;
    /// the cart decides quantities.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    pub fn key(&self) -> LineKey {
        LineKey::new(self.id.clone(), self.kind)
    }
}

#[derive(Deserialize)]
struct RawLineItem {
    id: EntityId,
    #[serde(rename = "type")]
    kind: ItemType,
    price: u64,
    quantity: u32,
    #[serde(flatten)]
    details: Map<String, Value>,
}

/// One entry in the cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawLineItem")]
pub struct LineItem {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub price: u64,
    pub quantity: u32,
    #[serde(flatten)]
    details: Map<String, Value>,
}

impl From<RawLineItem> for LineItem {
    fn from(raw: RawLineItem) -> Self {
        Self {
            id: raw.id,
            kind: raw.kind,
            price: raw.price,
            quantity: raw.quantity,
            details: without_reserved(raw.details),
        }
    }
}

impl LineItem {
    /// First insertion of an item: quantity 1
    pub fn first(item: BookableItem) -> Self {
        Self {
            id: item.id,
            kind: item.kind,
            price: item.price,
            quantity: 1,
            details: item.details,
        }
    }

    pub fn key(&self) -> LineKey {
        LineKey::new(self.id.clone(), self.kind)
    }

    pub fn matches(&self, key: &LineKey) -> bool {
        self.kind == key.kind && self.id == key.id
    }

    /// `price * quantity`
    pub fn line_total(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.quantity))
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    pub fn detail(&self, name: &str) -> Option<&Value> {
        self.details.get(name)
    }

    pub fn detail_str(&self, name: &str) -> Option<&str> {
        self.detail(name).and_then(Value::as_str)
    }

    /// Human-readable label: airline for flights, name for hotels
    pub fn label(&self) -> String {
        let preferred = match self.kind {
            ItemType::Flight => self.detail_str("airline"),
            ItemType::Hotel => self.detail_str("name"),
        };
        preferred
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} {}", self.kind, self.id))
    }
}
