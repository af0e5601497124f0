//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing a catalog item id with a cart line id.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use snake_shop_core::define_id;
/// define_id!(SkinId);
/// define_id!(LineId);
///
/// let skin = SkinId::new("skin_gold");
/// let line = LineId::new("skin_gold");
///
/// // These are different types, so this won't compile:
/// // let _: SkinId = line;
/// assert_eq!(skin.as_str(), line.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert into the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Catalog item identifier (e.g. `skin_gold`, `extra_life`).
define_id!(ItemId);
// Opaque identifier of a single cart line.
define_id!(CartLineId);

impl ItemId {
    /// The free skin every player starts with.
    pub const DEFAULT_SKIN: &'static str = "default";

    /// Returns `true` for the free starter skin.
    #[must_use]
    pub fn is_default_skin(&self) -> bool {
        self.0 == Self::DEFAULT_SKIN
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_matches_inner() {
        let id = ItemId::new("skin_fire");
        assert_eq!(id.to_string(), "skin_fire");
        assert_eq!(id.as_str(), "skin_fire");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = CartLineId::new("a1b2c3d4e5f60718");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"a1b2c3d4e5f60718\"");

        let back: CartLineId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_default_skin_detection() {
        assert!(ItemId::new("default").is_default_skin());
        assert!(!ItemId::new("skin_gold").is_default_skin());
    }
}
