//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing a customer ID with a product or purchase ID.

use thiserror::Error;

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use dimensional_designs_core::define_id;
/// define_id!(CustomerId);
/// define_id!(PurchaseId);
///
/// let customer_id = CustomerId::new(1);
/// let purchase_id = PurchaseId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: CustomerId = purchase_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(CustomerId);
define_id!(ProductId);
define_id!(PurchaseId);

/// Errors that can occur when parsing a [`ProductId`] from request text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductIdError {
    /// The text is empty or contains something other than ASCII digits.
    #[error("invalid product id")]
    Malformed,
    /// The digits are well formed but exceed the id column's range.
    #[error("product id out of range")]
    OutOfRange,
}

impl ProductId {
    /// Parse a product id from its textual form (a path segment or cart token).
    ///
    /// Only plain ASCII digits are accepted: no sign, no whitespace, no
    /// decimal point.
    ///
    /// # Errors
    ///
    /// Returns `ProductIdError::Malformed` for non-digit input and
    /// `ProductIdError::OutOfRange` when the value does not fit in an `i32`.
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProductIdError::Malformed);
        }

        s.parse::<i32>()
            .map(Self)
            .map_err(|_| ProductIdError::OutOfRange)
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_parse_digits() {
        assert_eq!(ProductId::parse("7").unwrap(), ProductId::new(7));
        assert_eq!(ProductId::parse("0").unwrap(), ProductId::new(0));
        assert_eq!(ProductId::parse("007").unwrap(), ProductId::new(7));
    }

    #[test]
    fn test_product_id_parse_rejects_non_digits() {
        for input in ["", "abc", "-1", "+1", " 7", "7 ", "1.5", "7a"] {
            assert_eq!(
                ProductId::parse(input),
                Err(ProductIdError::Malformed),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_product_id_parse_out_of_range() {
        assert_eq!(
            ProductId::parse("99999999999"),
            Err(ProductIdError::OutOfRange)
        );
    }

    #[test]
    fn test_ids_are_distinct_types_with_same_display() {
        let customer = CustomerId::new(3);
        let purchase = PurchaseId::from(3);
        assert_eq!(customer.to_string(), purchase.to_string());
        assert_eq!(i32::from(purchase), 3);
    }

    #[test]
    fn test_id_serde_transparent() {
        let json = serde_json::to_string(&ProductId::new(42)).unwrap();
        assert_eq!(json, "42");
        let parsed: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed.as_i32(), 42);
    }
}
