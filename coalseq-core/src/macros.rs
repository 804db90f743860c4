#![macro_use]

macro_rules! impl_table_id {
    ($idtype: ident, $integer_type: ty) => {
        impl $idtype {
            /// NULL value for the type
            pub const NULL: $idtype = Self(-1);

            /// Return `true` if `self` is [`Self::NULL`].
            pub fn is_null(&self) -> bool {
                self.0 == -1
            }

            /// Return the underlying integer.
            pub fn raw(self) -> $integer_type {
                self.0
            }

            /// Return the id as an index into a table column.
            ///
            /// Returns `None` for [`Self::NULL`].
            pub fn as_index(self) -> Option<usize> {
                use num_traits::ToPrimitive;
                self.0.to_usize()
            }
        }

        impl From<$integer_type> for $idtype {
            fn from(value: $integer_type) -> Self {
                if value >= 0 {
                    Self(value)
                } else {
                    Self::NULL
                }
            }
        }

        impl std::fmt::Display for $idtype {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<$idtype> for usize {
            type Error = $crate::Error;

            fn try_from(value: $idtype) -> Result<Self, Self::Error> {
                value.as_index().ok_or_else(|| {
                    $crate::Error::ConversionError(format!("could not convert {} to usize", value))
                })
            }
        }

        impl TryFrom<usize> for $idtype {
            type Error = $crate::Error;

            fn try_from(value: usize) -> Result<Self, Self::Error> {
                use num_traits::ToPrimitive;
                match value.to_i32() {
                    Some(x) => Ok(Self(x)),
                    None => Err($crate::Error::ConversionError(format!(
                        "could not convert {} to {}",
                        value,
                        stringify!($idtype)
                    ))),
                }
            }
        }

        impl From<$idtype> for $integer_type {
            fn from(item: $idtype) -> Self {
                item.0
            }
        }

        impl PartialEq<$integer_type> for $idtype {
            fn eq(&self, other: &$integer_type) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$idtype> for $integer_type {
            fn eq(&self, other: &$idtype) -> bool {
                *self == other.0
            }
        }

        impl PartialOrd<$integer_type> for $idtype {
            fn partial_cmp(&self, other: &$integer_type) -> Option<std::cmp::Ordering> {
                self.0.partial_cmp(other)
            }
        }

        impl PartialOrd<$idtype> for $integer_type {
            fn partial_cmp(&self, other: &$idtype) -> Option<std::cmp::Ordering> {
                self.partial_cmp(&other.0)
            }
        }
    };
}

// Shared by Position and Time.
// The inner value is always finite, so total_cmp
// agrees with the usual float ordering.
macro_rules! impl_finite_float {
    ($newtype: ident, $error: ident) => {
        impl $newtype {
            /// Create a new value.
            ///
            /// Returns `None` if `value` is negative,
            /// NaN, or infinite.
            pub fn new(value: f64) -> Option<Self> {
                if value.is_finite() && value >= 0.0 {
                    // Normalizes -0.0
                    Some(Self(value + 0.0))
                } else {
                    None
                }
            }

            /// Return the underlying value.
            pub fn raw(self) -> f64 {
                self.0
            }
        }

        impl PartialEq for $newtype {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }

        impl Eq for $newtype {}

        impl PartialOrd for $newtype {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $newtype {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl PartialEq<f64> for $newtype {
            fn eq(&self, other: &f64) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$newtype> for f64 {
            fn eq(&self, other: &$newtype) -> bool {
                *self == other.0
            }
        }

        impl PartialOrd<f64> for $newtype {
            fn partial_cmp(&self, other: &f64) -> Option<std::cmp::Ordering> {
                self.0.partial_cmp(other)
            }
        }

        impl PartialOrd<$newtype> for f64 {
            fn partial_cmp(&self, other: &$newtype) -> Option<std::cmp::Ordering> {
                self.partial_cmp(&other.0)
            }
        }

        impl TryFrom<f64> for $newtype {
            type Error = $crate::Error;
            fn try_from(value: f64) -> Result<Self, Self::Error> {
                Self::new(value).ok_or($crate::Error::$error(value))
            }
        }

        impl From<$newtype> for f64 {
            fn from(value: $newtype) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $newtype {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
                write!(f, "{}", self.0)
            }
        }
    };
}
