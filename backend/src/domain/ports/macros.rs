//! Helper macro that generates port error enums with snake_case constructors.
//!
//! Every variant becomes a `thiserror` arm plus a constructor whose fields
//! accept `impl Into<T>`, so adapters can write
//! `ConcertRepositoryError::query(err.to_string())`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
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
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum TicketingCheckError {
            Unreachable { message: String } => "ticketing unreachable: {message}",
            Throttled { retry_after: u32 } => "throttled for {retry_after}s",
            Rejected { message: String, status: u16 } => "rejected ({status}): {message}",
            Closed => "connection closed",
        }
    }

    #[test]
    fn string_fields_accept_str() {
        let err = TicketingCheckError::unreachable("dns");
        assert_eq!(err.to_string(), "ticketing unreachable: dns");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        assert_eq!(
            TicketingCheckError::throttled(30_u32).to_string(),
            "throttled for 30s"
        );
    }

    #[test]
    fn mixed_fields_and_unit_variants() {
        let err = TicketingCheckError::rejected("bad key", 401_u16);
        assert_eq!(err.to_string(), "rejected (401): bad key");
        assert_eq!(TicketingCheckError::closed(), TicketingCheckError::Closed);
    }
}
