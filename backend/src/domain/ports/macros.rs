//! `define_port_error!`: declares a driven-port error enum together with
//! snake_case constructors for each variant.
//!
//! Struct-like variants get constructors whose parameters accept
//! `impl Into<T>`, so call sites can pass `&str` for `String` fields.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum StoreError {
            Offline => "store offline",
            Connection { message: String } => "connection failed: {message}",
            Missing { id: i64 } => "record {id} missing",
            Conflict { field: String, id: i64 } => "{field} taken by {id}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(StoreError::offline(), StoreError::Offline);
        assert_eq!(StoreError::offline().to_string(), "store offline");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = StoreError::connection("refused");
        assert_eq!(err.to_string(), "connection failed: refused");
    }

    #[test]
    fn mixed_fields_keep_declared_order() {
        assert_eq!(StoreError::missing(7_i64).to_string(), "record 7 missing");
        assert_eq!(
            StoreError::conflict("email", 3_i64).to_string(),
            "email taken by 3"
        );
    }
}
