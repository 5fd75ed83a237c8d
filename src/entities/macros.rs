//! Macros for reducing boilerplate when defining tables
//!
//! [`impl_record!`](crate::impl_record) generates the row struct (with the
//! store-assigned `id`) and its [`Record`](crate::core::entity::Record)
//! implementation. Validation stays hand-written per table.

/// Define a row struct and implement `Record` for it
///
/// # Example
/// ```rust,ignore
/// impl_record!(
///     /// A dish on the menu
///     Dish, "dishes", "dish",
///     {
///         name: String,
///         price: f64,
///     },
///     unique: [[name]],
/// );
///
/// impl_record!(
///     LocationStock, "location_stocks", "location_stock",
///     {
///         location_id: i64,
///         category_id: i64,
///         restocked_on: NaiveDate,
///     },
///     date_field: "restocked_on",
///     foreign_keys: [
///         location_id -> "locations", Cascade;
///         category_id -> "supply_categories", Cascade;
///     ],
///     unique: [[location_id, category_id]],
/// );
/// ```
#[macro_export]
macro_rules! impl_record {
    (
        $(#[$meta:meta])*
        $type:ident, $table:expr, $singular:expr,
        {
            $( $(#[$field_meta:meta])* $field:ident : $field_type:ty ),* $(,)?
        }
        $(, date_field: $date_field:expr)?
        $(, foreign_keys: [ $( $fk_field:ident -> $fk_table:expr, $on_delete:ident );* $(;)? ])?
        $(, unique: [ $( [ $( $unique_field:ident ),+ ] ),* $(,)? ])?
        $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            /// Store-assigned id, contiguous within the table
            #[serde(default)]
            pub id: i64,
            $(
                $(#[$field_meta])*
                pub $field: $field_type,
            )*
        }

        impl $crate::core::entity::Record for $type {
            fn table_name() -> &'static str {
                $table
            }

            fn singular_name() -> &'static str {
                $singular
            }

            fn fields() -> &'static [&'static str] {
                &[ $( stringify!($field) ),* ]
            }

            $(
                fn date_field() -> Option<&'static str> {
                    Some($date_field)
                }
            )?

            $(
                fn foreign_keys() -> &'static [$crate::core::schema::ForeignKey] {
                    &[
                        $(
                            $crate::core::schema::ForeignKey {
                                field: stringify!($fk_field),
                                table: $fk_table,
                                on_delete: $crate::core::schema::OnDelete::$on_delete,
                            }
                        ),*
                    ]
                }
            )?

            $(
                fn unique_keys() -> &'static [&'static [&'static str]] {
                    &[ $( &[ $( stringify!($unique_field) ),+ ] ),* ]
                }
            )?

            fn id(&self) -> i64 {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = id;
            }
        }
    };
}
