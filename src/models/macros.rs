/// Defines a newtype ID wrapper around an integer-like scalar (typically `i64`)
/// and generates:
/// - derives (Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)
/// - `Display`
/// - `From<$inner> for $name` and `From<$name> for $inner`
///
/// Usage:
///   define_id_type!(i64, CustomerId);
#[macro_export]
macro_rules! define_id_type {
    ($inner:ty, $name:ident) => {
        #[derive(
            Debug,
            Copy,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(pub $inner);

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::write!(f, "{}", self.0)
            }
        }

        impl ::std::convert::From<$inner> for $name {
            fn from(v: $inner) -> Self {
                $name(v)
            }
        }

        impl ::std::convert::From<$name> for $inner {
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl $name {
            pub fn new(value: $inner) -> Self {
                $name(value)
            }

            pub fn value(&self) -> $inner {
                self.0
            }
        }
    };
}

/// Implements [`crate::models::AuditedRecord`] for an entity struct with
/// `id`, `tenant_id` and `audit` fields.
///
/// Usage:
///   impl_audited_record!(Customer, EntityKind::Customer);
#[macro_export]
macro_rules! impl_audited_record {
    ($ty:ty, $kind:expr) => {
        impl $crate::models::AuditedRecord for $ty {
            const KIND: $crate::models::EntityKind = $kind;

            fn record_id(&self) -> i64 {
                self.id.value()
            }

            fn set_record_id(&mut self, id: i64) {
                self.id = ::std::convert::From::from(id);
            }

            fn record_tenant_id(&self) -> i64 {
                self.tenant_id.value()
            }

            fn audit(&self) -> &$crate::models::Audit {
                &self.audit
            }

            fn audit_mut(&mut self) -> &mut $crate::models::Audit {
                &mut self.audit
            }
        }
    };
}
