/// Implements name lookup for an authoring enum that serializes as a string.
///
/// Unknown names resolve to the listed fallback variant instead of failing, so
/// one malformed value never rejects a whole asset. Pair with
/// `#[serde(from = "String", into = "String")]` on the enum.
macro_rules! named_enum {
    ($ty:ident, fallback = $fallback:ident, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Display name used in asset files.
            pub fn name(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }

            /// All accepted names, in declaration order.
            pub fn variants() -> &'static [&'static str] {
                &[$($name),+]
            }

            /// Resolve a name case-insensitively, falling back to the neutral variant.
            pub fn from_name(name: &str) -> Self {
                $(
                    if name.eq_ignore_ascii_case($name) {
                        return $ty::$variant;
                    }
                )+
                $ty::$fallback
            }
        }

        impl From<String> for $ty {
            fn from(name: String) -> Self {
                $ty::from_name(&name)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.name().to_string()
            }
        }
    };
}
