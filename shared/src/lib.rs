use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

pub mod config;

pub use config::{ConfigError, Settings};

/// Table name for an entity type: the lower-cased type name with a trailing "s".
///
/// The rule is applied mechanically, so `Inventory` becomes `inventorys`.
pub fn table_name(type_name: &str) -> String {
    format!("{}s", type_name.to_lowercase())
}

/// Audit shape shared by every persisted record.
pub trait Entity {
    const TYPE_NAME: &'static str;

    fn id(&self) -> i32;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;

    fn table_name() -> String {
        table_name(Self::TYPE_NAME)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Addition,
    Removal,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown movement type: {0:?}")]
pub struct UnknownMovementType(pub String);

impl MovementType {
    pub const ALL: [MovementType; 2] = [MovementType::Addition, MovementType::Removal];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Addition => "addition",
            MovementType::Removal => "removal",
        }
    }

    /// Effect of a movement of `quantity` units on the stock level.
    pub fn signed(&self, quantity: i32) -> i64 {
        match self {
            MovementType::Addition => i64::from(quantity),
            MovementType::Removal => -i64::from(quantity),
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = UnknownMovementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "addition" => Ok(MovementType::Addition),
            "removal" => Ok(MovementType::Removal),
            other => Err(UnknownMovementType(other.to_string())),
        }
    }
}

impl ToSql<Text, Pg> for MovementType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for MovementType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        Ok(raw.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_appends_s_to_lowercased_type() {
        assert_eq!(table_name("Book"), "books");
        assert_eq!(table_name("InventoryMovement"), "inventorymovements");
    }

    #[test]
    fn table_name_keeps_naive_pluralization_for_inventory() {
        assert_eq!(table_name("Inventory"), "inventorys");
    }

    #[test]
    fn movement_type_parses_known_values_only() {
        assert_eq!("addition".parse::<MovementType>().unwrap(), MovementType::Addition);
        assert_eq!("removal".parse::<MovementType>().unwrap(), MovementType::Removal);

        let err = "restock".parse::<MovementType>().unwrap_err();
        assert_eq!(err.0, "restock");
        assert!("Addition".parse::<MovementType>().is_err());
    }

    #[test]
    fn movement_type_signs_quantity() {
        assert_eq!(MovementType::Addition.signed(7), 7);
        assert_eq!(MovementType::Removal.signed(3), -3);
    }

    #[test]
    fn movement_type_display_matches_stored_value() {
        for kind in MovementType::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
            assert_eq!(kind.as_str().parse::<MovementType>().unwrap(), kind);
        }
    }
}
