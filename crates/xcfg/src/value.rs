//! Typed conversion of stored string values
//!
//! Every stored value is a string. Reads that want something else go through a
//! closed set of conversions: [`FromConfigValue`] for scalars and
//! [`ConfigEnum`] for enums declared with [`config_enum!`](crate::config_enum).

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Conversion from a stored string into a typed value
pub trait FromConfigValue: Sized {
    /// Name used in conversion errors
    const TYPE_NAME: &'static str;

    fn from_config_value(value: &str) -> Result<Self>;
}

impl FromConfigValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_config_value(value: &str) -> Result<Self> {
        Ok(value.to_string())
    }
}

impl FromConfigValue for PathBuf {
    const TYPE_NAME: &'static str = "PathBuf";

    fn from_config_value(value: &str) -> Result<Self> {
        Ok(Self::from(value.trim()))
    }
}

impl FromConfigValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_config_value(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(Error::conversion(value, Self::TYPE_NAME))
        }
    }
}

impl FromConfigValue for char {
    const TYPE_NAME: &'static str = "char";

    fn from_config_value(value: &str) -> Result<Self> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::conversion(value, Self::TYPE_NAME)),
        }
    }
}

macro_rules! impl_from_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromConfigValue for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn from_config_value(value: &str) -> Result<Self> {
                    value
                        .trim()
                        .parse::<$ty>()
                        .map_err(|_| Error::conversion(value, Self::TYPE_NAME))
                }
            }
        )+
    };
}

impl_from_str!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Enum whose variants can be read from config values by name
pub trait ConfigEnum: Sized + Copy + PartialEq + 'static {
    /// Name used in conversion errors
    const TYPE_NAME: &'static str;
    /// Every variant with its declared name, in declaration order
    const VARIANTS: &'static [(&'static str, Self)];

    /// Parse a variant by name, optionally ignoring ASCII case
    fn parse_variant(value: &str, ignore_case: bool) -> Result<Self> {
        let wanted = value.trim();
        Self::VARIANTS
            .iter()
            .find(|(name, _)| {
                if ignore_case {
                    name.eq_ignore_ascii_case(wanted)
                } else {
                    *name == wanted
                }
            })
            .map(|(_, variant)| *variant)
            .ok_or_else(|| Error::conversion(value, Self::TYPE_NAME))
    }

    /// Declared name of this variant
    fn variant_name(&self) -> &'static str {
        Self::VARIANTS
            .iter()
            .find(|(_, variant)| variant == self)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }
}

/// Convert a stored string into `T`
pub fn parse_value<T: FromConfigValue>(value: &str) -> Result<T> {
    T::from_config_value(value)
}

/// Convert a stored string into the enum `T`
pub fn parse_enum<T: ConfigEnum>(value: &str, ignore_case: bool) -> Result<T> {
    T::parse_variant(value, ignore_case)
}

/// Declare an enum readable from config values.
///
/// The macro derives `Clone`, `Copy`, `Debug`, `PartialEq` and `Eq` and
/// implements [`ConfigEnum`] using the variant identifiers as names.
///
/// ```
/// xcfg::config_enum! {
///     pub enum Mode { Daily, Hourly }
/// }
///
/// use xcfg::ConfigEnum;
/// assert_eq!(Mode::parse_variant("hourly", true).ok(), Some(Mode::Hourly));
/// ```
#[macro_export]
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::ConfigEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);
            const VARIANTS: &'static [(&'static str, Self)] =
                &[$((stringify!($variant), Self::$variant)),+];
        }
    };
}
